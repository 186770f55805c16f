//! Remote repository over the sync service's REST surface.
//!
//! Same contract as the local store, executed over HTTP. Every call carries
//! the client-level timeout and the configured retry policy; transient
//! failures back off exponentially, everything else fails fast. The remote
//! surface has no `GET /passwords/{id}`, batch, or bulk-delete endpoints, so
//! `get`/`stats` derive from the list endpoint, the batch variants iterate
//! (no remote atomicity — the remote is a best-effort mirror), and `clear`
//! is unsupported.

pub mod retry;
pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use passbook_db::{NewPassword, PasswordPatch, PasswordRecord, VaultStats};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{CoreError, CoreResult};
use crate::repository::PasswordRepository;
use self::retry::{RetryConfig, with_retry};
use self::wire::{Envelope, WireNewPassword, WirePatch, WireRecord};

/// HTTP client for the hosted password service.
#[derive(Debug, Clone)]
pub struct RemoteVault {
    http: Client,
    base_url: Url,
    retry: RetryConfig,
}

impl RemoteVault {
    /// Build a client from configuration. The request timeout applies to
    /// every call, including the connect phase.
    pub fn new(config: &RemoteConfig) -> CoreResult<Self> {
        let mut base = config.base_url.trim().to_string();
        if base.is_empty() {
            return Err(CoreError::Config(
                "remote base_url must not be empty".to_string(),
            ));
        }
        // Url::join replaces the last path segment unless the base ends
        // with a slash.
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|err| CoreError::Config(format!("invalid remote base_url: {err}")))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            retry: config.retry.clone(),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> CoreResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| CoreError::Config(format!("invalid endpoint path {path}: {err}")))
    }

    async fn fetch_records(&self, search: Option<&str>) -> CoreResult<Vec<PasswordRecord>> {
        let mut url = self.endpoint("passwords")?;
        if let Some(query) = search {
            url.query_pairs_mut().append_pair("search", query);
        }
        let resp = self.http.get(url).send().await?;
        let wires: Vec<WireRecord> = unwrap_envelope(resp).await?;
        debug!(count = wires.len(), "fetched remote records");
        wires.into_iter().map(wire::to_domain).collect()
    }

    async fn post_record(&self, body: &WireNewPassword) -> CoreResult<PasswordRecord> {
        let resp = self
            .http
            .post(self.endpoint("passwords")?)
            .json(body)
            .send()
            .await?;
        let record: WireRecord = unwrap_envelope(resp).await?;
        wire::to_domain(record)
    }

    async fn put_record(&self, id: &str, body: &WirePatch) -> CoreResult<PasswordRecord> {
        let resp = self
            .http
            .put(self.endpoint(&format!("passwords/{id}"))?)
            .json(body)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::not_found("password", id));
        }
        let record: WireRecord = unwrap_envelope(resp).await?;
        wire::to_domain(record)
    }

    async fn delete_record(&self, id: &str) -> CoreResult<bool> {
        let resp = self
            .http
            .delete(self.endpoint(&format!("passwords/{id}"))?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::not_found("password", id));
        }
        ack_envelope(resp).await?;
        Ok(true)
    }
}

#[async_trait]
impl PasswordRepository for RemoteVault {
    async fn list(&self) -> CoreResult<Vec<PasswordRecord>> {
        with_retry(&self.retry, "list passwords", || self.fetch_records(None)).await
    }

    async fn get(&self, id: &str) -> CoreResult<Option<PasswordRecord>> {
        // No GET /passwords/{id} endpoint; filter the listing.
        let records = self.list().await?;
        Ok(records.into_iter().find(|record| record.id == id))
    }

    async fn search(&self, query: &str) -> CoreResult<Vec<PasswordRecord>> {
        let query = query.trim();
        let search = (!query.is_empty()).then_some(query);
        with_retry(&self.retry, "search passwords", || {
            self.fetch_records(search)
        })
        .await
    }

    async fn create(&self, new: NewPassword) -> CoreResult<PasswordRecord> {
        let body = WireNewPassword::from(&new);
        with_retry(&self.retry, "create password", || self.post_record(&body)).await
    }

    async fn update(&self, id: &str, patch: PasswordPatch) -> CoreResult<PasswordRecord> {
        let body = WirePatch::from(&patch);
        with_retry(&self.retry, "update password", || {
            self.put_record(id, &body)
        })
        .await
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        with_retry(&self.retry, "delete password", || self.delete_record(id)).await
    }

    async fn clear(&self) -> CoreResult<u64> {
        Err(CoreError::Unsupported { op: "clear" })
    }

    async fn stats(&self) -> CoreResult<VaultStats> {
        let records = self.list().await?;
        Ok(VaultStats {
            total: records.len() as i64,
            has_any: !records.is_empty(),
        })
    }

    async fn create_many(&self, batch: Vec<NewPassword>) -> CoreResult<Vec<PasswordRecord>> {
        let mut records = Vec::with_capacity(batch.len());
        for new in batch {
            records.push(self.create(new).await?);
        }
        Ok(records)
    }

    async fn update_many(
        &self,
        batch: Vec<(String, PasswordPatch)>,
    ) -> CoreResult<Vec<PasswordRecord>> {
        let mut records = Vec::with_capacity(batch.len());
        for (id, patch) in batch {
            records.push(self.update(&id, patch).await?);
        }
        Ok(records)
    }

    async fn health(&self) -> CoreResult<()> {
        let resp = self.http.get(self.endpoint("health")?).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, None))
        }
    }
}

fn api_error(status: StatusCode, message: Option<String>) -> CoreError {
    CoreError::Api {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        }),
    }
}

/// Read a response, enforce the success envelope, and yield its data.
async fn unwrap_envelope<T: DeserializeOwned>(resp: Response) -> CoreResult<T> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp
            .json::<Envelope<serde_json::Value>>()
            .await
            .ok()
            .and_then(|envelope| envelope.error);
        return Err(api_error(status, message));
    }
    let envelope: Envelope<T> = resp.json().await?;
    if !envelope.success {
        return Err(api_error(status, envelope.error));
    }
    envelope
        .data
        .ok_or_else(|| api_error(status, Some("missing data in response".to_string())))
}

/// Like [`unwrap_envelope`] for endpoints that answer with a bare
/// `{success: true}` and no data.
async fn ack_envelope(resp: Response) -> CoreResult<()> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp
            .json::<Envelope<serde_json::Value>>()
            .await
            .ok()
            .and_then(|envelope| envelope.error);
        return Err(api_error(status, message));
    }
    let envelope: Envelope<serde_json::Value> = resp.json().await?;
    if !envelope.success {
        return Err(api_error(status, envelope.error));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> RemoteConfig {
        RemoteConfig {
            base_url: base_url.to_string(),
            timeout_secs: 10,
            retry: RetryConfig::default(),
        }
    }

    #[test]
    fn test_endpoint_joins_regardless_of_trailing_slash() {
        for base in ["https://api.example.com/v1", "https://api.example.com/v1/"] {
            let remote = RemoteVault::new(&config(base)).unwrap();
            assert_eq!(
                remote.endpoint("passwords").unwrap().as_str(),
                "https://api.example.com/v1/passwords"
            );
            assert_eq!(
                remote.endpoint("passwords/pw_1").unwrap().as_str(),
                "https://api.example.com/v1/passwords/pw_1"
            );
        }
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        assert!(matches!(
            RemoteVault::new(&config("")).unwrap_err(),
            CoreError::Config(_)
        ));
        assert!(matches!(
            RemoteVault::new(&config("not a url")).unwrap_err(),
            CoreError::Config(_)
        ));
    }
}
