//! Password record models.
//!
//! `PasswordRecord` is the sole entity the vault stores. Identity and both
//! timestamps are assigned by the repository at creation time; callers only
//! ever supply a [`NewPassword`] payload or a [`PasswordPatch`].

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::error::{DbError, DbResult};

/// Maximum length of `service` and `username` after trimming.
pub const MAX_FIELD_LEN: usize = 100;

/// Maximum password length.
pub const MAX_PASSWORD_LEN: usize = 500;

/// One stored credential.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRecord {
    /// Opaque unique identifier, stable for the record's lifetime.
    pub id: String,

    /// The logical system the credential belongs to.
    pub service: String,

    /// Account name at that service.
    pub username: String,

    /// The secret itself. Stored verbatim; never parsed.
    pub password: String,

    /// Login page or API endpoint, if the user recorded one.
    pub url: Option<String>,

    /// Free-form notes.
    pub notes: Option<String>,

    /// Folder/grouping label.
    pub folder: Option<String>,

    /// User-assigned tags as a JSON array column.
    pub tags: Option<Json<Vec<String>>>,

    /// When the credential expires, if the service rotates them.
    pub expires_at: Option<DateTime<Utc>>,

    /// Creation timestamp, set once and never altered.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp. Always >= `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl PasswordRecord {
    pub(crate) fn validate(&self) -> DbResult<()> {
        validate_fields(&self.service, &self.username, &self.password)
    }
}

/// Payload for creating a record. The repository assigns id and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPassword {
    pub service: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewPassword {
    /// Validate the payload against the record rules.
    pub fn validate(&self) -> DbResult<()> {
        validate_fields(&self.service, &self.username, &self.password)
    }

    /// Turn the payload into a fully-formed record: validate, assign an id,
    /// and stamp `created_at == updated_at`.
    pub(crate) fn into_record(self) -> DbResult<PasswordRecord> {
        self.validate()?;
        let now = Utc::now();
        Ok(PasswordRecord {
            id: generate_record_id(),
            service: self.service.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password,
            url: self.url,
            notes: self.notes,
            folder: self.folder,
            tags: self.tags.map(Json),
            expires_at: self.expires_at,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Absent fields are left unchanged; `id` and `created_at`
/// can never be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PasswordPatch {
    /// True when the patch carries no field at all. An empty patch is still a
    /// valid update; it only refreshes `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && self.folder.is_none()
            && self.tags.is_none()
            && self.expires_at.is_none()
    }

    /// Merge the patch onto an existing record, refreshing `updated_at`.
    /// `id` and `created_at` are untouched by construction.
    pub(crate) fn apply(self, record: &mut PasswordRecord) {
        if let Some(service) = self.service {
            record.service = service.trim().to_string();
        }
        if let Some(username) = self.username {
            record.username = username.trim().to_string();
        }
        if let Some(password) = self.password {
            record.password = password;
        }
        if let Some(url) = self.url {
            record.url = Some(url);
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes);
        }
        if let Some(folder) = self.folder {
            record.folder = Some(folder);
        }
        if let Some(tags) = self.tags {
            record.tags = Some(Json(tags));
        }
        if let Some(expires_at) = self.expires_at {
            record.expires_at = Some(expires_at);
        }
        record.updated_at = Utc::now();
    }
}

/// Vault-level counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStats {
    /// Count of all live records.
    pub total: i64,
    /// Whether the vault holds anything at all.
    pub has_any: bool,
}

/// Generate a fresh record id: `pw_` + hex microsecond timestamp + random
/// 32-bit suffix. Not sortable by design; uniqueness comes from the
/// timestamp/suffix combination.
pub fn generate_record_id() -> String {
    let micros = Utc::now().timestamp_micros();
    let suffix: u32 = rand::rng().random();
    format!("pw_{micros:x}{suffix:08x}")
}

fn validate_fields(service: &str, username: &str, password: &str) -> DbResult<()> {
    let service = service.trim();
    if service.is_empty() {
        return Err(DbError::invalid_data("service must not be empty"));
    }
    if service.chars().count() > MAX_FIELD_LEN {
        return Err(DbError::invalid_data(format!(
            "service must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    let username = username.trim();
    if username.is_empty() {
        return Err(DbError::invalid_data("username must not be empty"));
    }
    if username.chars().count() > MAX_FIELD_LEN {
        return Err(DbError::invalid_data(format!(
            "username must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    if password.is_empty() {
        return Err(DbError::invalid_data("password must not be empty"));
    }
    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(DbError::invalid_data(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn valid_payload() -> NewPassword {
        NewPassword {
            service: "Gmail".to_string(),
            username: "user@gmail.com".to_string(),
            password: "hunter2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_record_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_generated_ids_carry_prefix() {
        let id = generate_record_id();
        assert!(id.starts_with("pw_"));
        assert!(id.len() > "pw_".len());
    }

    #[test]
    fn test_into_record_stamps_timestamps() {
        let record = valid_payload().into_record().unwrap();
        assert_eq!(record.created_at, record.updated_at);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_required_fields() {
        for field in ["service", "username", "password"] {
            let mut payload = valid_payload();
            match field {
                "service" => payload.service = "   ".to_string(),
                "username" => payload.username = String::new(),
                _ => payload.password = String::new(),
            }
            let err = payload.validate().unwrap_err();
            assert!(matches!(err, DbError::InvalidData { .. }), "{field}: {err}");
        }
    }

    #[test]
    fn test_validate_enforces_length_caps() {
        let mut payload = valid_payload();
        payload.service = "s".repeat(MAX_FIELD_LEN + 1);
        assert!(payload.validate().is_err());

        let mut payload = valid_payload();
        payload.service = "s".repeat(MAX_FIELD_LEN);
        payload.password = "p".repeat(MAX_PASSWORD_LEN);
        assert!(payload.validate().is_ok());

        payload.password.push('p');
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_patch_apply_preserves_identity() {
        let mut record = valid_payload().into_record().unwrap();
        let original_id = record.id.clone();
        let original_created = record.created_at;

        let patch = PasswordPatch {
            password: Some("correct horse".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut record);

        assert_eq!(record.id, original_id);
        assert_eq!(record.created_at, original_created);
        assert_eq!(record.password, "correct horse");
        assert_eq!(record.service, "Gmail");
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_empty_patch_is_detected() {
        assert!(PasswordPatch::default().is_empty());
    }
}
