//! Local repository backed by the SQLite store.

use async_trait::async_trait;
use passbook_db::{NewPassword, PasswordPatch, PasswordRecord, VaultDb, VaultStats, queries};

use crate::error::CoreResult;
use crate::repository::PasswordRepository;

/// The local, durable side of a vault. Thin delegation onto
/// [`passbook_db::queries`]; the pool handle stays private to this type and
/// the store layer.
#[derive(Debug, Clone)]
pub struct LocalVault {
    db: VaultDb,
}

impl LocalVault {
    pub fn new(db: VaultDb) -> Self {
        Self { db }
    }

    /// Access the underlying store handle (for lifecycle management).
    pub fn db(&self) -> &VaultDb {
        &self.db
    }
}

#[async_trait]
impl PasswordRepository for LocalVault {
    async fn list(&self) -> CoreResult<Vec<PasswordRecord>> {
        Ok(queries::list_passwords(self.db.pool()).await?)
    }

    async fn get(&self, id: &str) -> CoreResult<Option<PasswordRecord>> {
        Ok(queries::get_password(self.db.pool(), id).await?)
    }

    async fn search(&self, query: &str) -> CoreResult<Vec<PasswordRecord>> {
        Ok(queries::search_passwords(self.db.pool(), query).await?)
    }

    async fn create(&self, new: NewPassword) -> CoreResult<PasswordRecord> {
        Ok(queries::create_password(self.db.pool(), new).await?)
    }

    async fn update(&self, id: &str, patch: PasswordPatch) -> CoreResult<PasswordRecord> {
        Ok(queries::update_password(self.db.pool(), id, patch).await?)
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(queries::delete_password(self.db.pool(), id).await?)
    }

    async fn clear(&self) -> CoreResult<u64> {
        Ok(queries::clear_passwords(self.db.pool()).await?)
    }

    async fn stats(&self) -> CoreResult<VaultStats> {
        Ok(queries::get_stats(self.db.pool()).await?)
    }

    async fn create_many(&self, batch: Vec<NewPassword>) -> CoreResult<Vec<PasswordRecord>> {
        Ok(queries::create_many(self.db.pool(), batch).await?)
    }

    async fn update_many(
        &self,
        batch: Vec<(String, PasswordPatch)>,
    ) -> CoreResult<Vec<PasswordRecord>> {
        Ok(queries::update_many(self.db.pool(), batch).await?)
    }

    async fn health(&self) -> CoreResult<()> {
        Ok(self.db.health_check().await?)
    }
}
