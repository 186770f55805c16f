//! Wire codec for the sync service.
//!
//! The remote rows use snake_case field names and RFC-3339 timestamp strings
//! (`created_at`, `updated_at`); the domain model is camelCase with typed
//! timestamps. The mapping lives here, in both directions, and nowhere else.
//! Timestamps are carried at microsecond precision on the wire.

use chrono::{DateTime, SecondsFormat, Utc};
use passbook_db::{Json, NewPassword, PasswordPatch, PasswordRecord};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Response envelope every remote endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A password record as the sync service represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    pub id: String,
    pub service: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create-request body (`POST /passwords`). No id or timestamps — the
/// service assigns those.
#[derive(Debug, Serialize)]
pub struct WireNewPassword {
    pub service: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Partial-update body (`PUT /passwords/{id}`). Absent fields stay as they
/// are on the service.
#[derive(Debug, Serialize)]
pub struct WirePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl From<&NewPassword> for WireNewPassword {
    fn from(new: &NewPassword) -> Self {
        Self {
            service: new.service.clone(),
            username: new.username.clone(),
            password: new.password.clone(),
            url: new.url.clone(),
            notes: new.notes.clone(),
            folder: new.folder.clone(),
            tags: new.tags.clone(),
            expires_at: new.expires_at.map(format_timestamp),
        }
    }
}

impl From<&PasswordPatch> for WirePatch {
    fn from(patch: &PasswordPatch) -> Self {
        Self {
            service: patch.service.clone(),
            username: patch.username.clone(),
            password: patch.password.clone(),
            url: patch.url.clone(),
            notes: patch.notes.clone(),
            folder: patch.folder.clone(),
            tags: patch.tags.clone(),
            expires_at: patch.expires_at.map(format_timestamp),
        }
    }
}

/// Map a wire row onto the domain model. Malformed timestamps are a
/// [`CoreError::Wire`] naming the offending field.
pub fn to_domain(wire: WireRecord) -> CoreResult<PasswordRecord> {
    Ok(PasswordRecord {
        created_at: parse_timestamp("created_at", &wire.created_at)?,
        updated_at: parse_timestamp("updated_at", &wire.updated_at)?,
        expires_at: wire
            .expires_at
            .as_deref()
            .map(|raw| parse_timestamp("expires_at", raw))
            .transpose()?,
        tags: wire.tags.map(Json),
        id: wire.id,
        service: wire.service,
        username: wire.username,
        password: wire.password,
        url: wire.url,
        notes: wire.notes,
        folder: wire.folder,
    })
}

/// Map a domain record to its wire representation.
pub fn from_domain(record: &PasswordRecord) -> WireRecord {
    WireRecord {
        id: record.id.clone(),
        service: record.service.clone(),
        username: record.username.clone(),
        password: record.password.clone(),
        url: record.url.clone(),
        notes: record.notes.clone(),
        folder: record.folder.clone(),
        tags: record.tags.as_ref().map(|tags| tags.0.clone()),
        expires_at: record.expires_at.map(format_timestamp),
        created_at: format_timestamp(record.created_at),
        updated_at: format_timestamp(record.updated_at),
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(field: &'static str, raw: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|err| CoreError::wire(field, err.to_string()))
}
