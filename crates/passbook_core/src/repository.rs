//! The repository contract shared by the local store and the remote mirror.

use async_trait::async_trait;
use passbook_db::{NewPassword, PasswordPatch, PasswordRecord, VaultStats};

use crate::error::CoreResult;

/// CRUD + search over password records.
///
/// Both the local SQLite store and the remote REST mirror implement this
/// trait, so the façade can treat either as a drop-in backend. Implementors
/// return domain records only — storage and wire primitives never leak
/// through this seam.
#[async_trait]
pub trait PasswordRepository: Send + Sync {
    /// Every record, most recently updated first.
    async fn list(&self) -> CoreResult<Vec<PasswordRecord>>;

    /// One record by id; a missing id is `None`, not an error.
    async fn get(&self, id: &str) -> CoreResult<Option<PasswordRecord>>;

    /// Records whose service or username contains the query,
    /// case-insensitively. A whitespace-only query behaves like [`list`].
    ///
    /// [`list`]: PasswordRepository::list
    async fn search(&self, query: &str) -> CoreResult<Vec<PasswordRecord>>;

    /// Persist a new record; the backend assigns id and timestamps.
    async fn create(&self, new: NewPassword) -> CoreResult<PasswordRecord>;

    /// Merge a patch onto an existing record. Fails when the id is absent.
    async fn update(&self, id: &str, patch: PasswordPatch) -> CoreResult<PasswordRecord>;

    /// Remove a record, reporting whether it existed.
    async fn delete(&self, id: &str) -> CoreResult<bool>;

    /// Remove every record; returns how many were removed.
    async fn clear(&self) -> CoreResult<u64>;

    /// Record counters.
    async fn stats(&self) -> CoreResult<VaultStats>;

    /// Persist a batch of new records, returned in input order.
    async fn create_many(&self, batch: Vec<NewPassword>) -> CoreResult<Vec<PasswordRecord>>;

    /// Apply a batch of patches, returned in input order.
    async fn update_many(
        &self,
        batch: Vec<(String, PasswordPatch)>,
    ) -> CoreResult<Vec<PasswordRecord>>;

    /// Liveness probe for the backend.
    async fn health(&self) -> CoreResult<()>;
}
