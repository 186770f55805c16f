//! The vault façade.
//!
//! One repository-shaped interface for the UI layer, internally local-only
//! or hybrid per configuration. In hybrid mode every write lands in the
//! local store first — the local store is the durability guarantee — and is
//! then mirrored to the remote on a spawned task. A failed mirror is a
//! logged warning, never an error: the caller's write already succeeded.
//!
//! Reads are always served locally; pulling remote state back down is an
//! external collaborator's job.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use passbook_db::{NewPassword, PasswordPatch, PasswordRecord, VaultDb, VaultStats, search};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::VaultConfig;
use crate::error::CoreResult;
use crate::local::LocalVault;
use crate::remote::RemoteVault;
use crate::repository::PasswordRepository;

type Registry = Mutex<HashMap<String, Arc<Vault>>>;

// One live vault per configuration key, created on first use.
static SHARED: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    SHARED.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A password vault: local store plus optional remote mirror.
pub struct Vault {
    local: LocalVault,
    remote: Option<Arc<dyn PasswordRepository>>,
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("hybrid", &self.remote.is_some())
            .finish()
    }
}

impl Vault {
    /// Open a vault per configuration: local store always, remote mirror
    /// when one is configured.
    pub async fn open(config: &VaultConfig) -> CoreResult<Self> {
        let db = VaultDb::open(config.database.vault_db()).await?;
        let mut vault = Self {
            local: LocalVault::new(db),
            remote: None,
        };
        if let Some(remote_config) = &config.remote {
            vault.remote = Some(Arc::new(RemoteVault::new(remote_config)?));
            info!(base_url = %remote_config.base_url, "vault opened in hybrid mode");
        }
        Ok(vault)
    }

    /// Open an ephemeral in-memory vault (tests, dry runs).
    pub async fn in_memory() -> CoreResult<Self> {
        Ok(Self {
            local: LocalVault::new(VaultDb::open_in_memory().await?),
            remote: None,
        })
    }

    /// Replace the remote mirror with a custom repository implementation.
    pub fn with_remote(mut self, remote: Arc<dyn PasswordRepository>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Get the shared vault for a configuration, opening it on first use.
    /// Exactly one live instance exists per configuration key.
    pub async fn shared(config: &VaultConfig) -> CoreResult<Arc<Vault>> {
        let mut instances = registry().lock().await;
        if let Some(vault) = instances.get(&config.cache_key()) {
            return Ok(vault.clone());
        }
        let vault = Arc::new(Vault::open(config).await?);
        instances.insert(config.cache_key(), vault.clone());
        Ok(vault)
    }

    /// Drop every cached shared instance and close its store. Test isolation:
    /// the next [`Vault::shared`] call reopens from scratch.
    pub async fn reset_shared() {
        if let Some(instances) = SHARED.get() {
            let mut instances = instances.lock().await;
            for (_, vault) in instances.drain() {
                vault.local.db().close().await;
            }
        }
    }

    /// Whether writes are mirrored to a remote.
    pub fn is_hybrid(&self) -> bool {
        self.remote.is_some()
    }

    /// Every record, most recently updated first.
    pub async fn list(&self) -> CoreResult<Vec<PasswordRecord>> {
        self.local.list().await
    }

    /// One record by id; `None` when absent.
    pub async fn get(&self, id: &str) -> CoreResult<Option<PasswordRecord>> {
        self.local.get(id).await
    }

    /// Substring search over service and username.
    pub async fn search(&self, query: &str) -> CoreResult<Vec<PasswordRecord>> {
        self.local.search(query).await
    }

    /// Relevance-ranked search tolerant of typos.
    pub async fn fuzzy_search(&self, query: &str) -> CoreResult<Vec<PasswordRecord>> {
        let records = self.local.list().await?;
        Ok(search::fuzzy_rank(&records, query))
    }

    /// Record counters.
    pub async fn stats(&self) -> CoreResult<VaultStats> {
        self.local.stats().await
    }

    /// Create a record locally, then mirror it.
    pub async fn create(&self, new: NewPassword) -> CoreResult<PasswordRecord> {
        let payload = self.remote.is_some().then(|| new.clone());
        let record = self.local.create(new).await?;
        if let (Some(remote), Some(payload)) = (self.remote.clone(), payload) {
            tokio::spawn(async move {
                if let Err(err) = remote.create(payload).await {
                    warn!(error = %err, "failed to mirror create; local write is authoritative");
                }
            });
        }
        Ok(record)
    }

    /// Update a record locally, then mirror the patch.
    pub async fn update(&self, id: &str, patch: PasswordPatch) -> CoreResult<PasswordRecord> {
        let payload = self.remote.is_some().then(|| patch.clone());
        let record = self.local.update(id, patch).await?;
        if let (Some(remote), Some(payload)) = (self.remote.clone(), payload) {
            let id = id.to_string();
            tokio::spawn(async move {
                if let Err(err) = remote.update(&id, payload).await {
                    warn!(%id, error = %err, "failed to mirror update; local write is authoritative");
                }
            });
        }
        Ok(record)
    }

    /// Delete a record locally, then mirror the deletion. Idempotent: a
    /// missing id is a no-op here, and a remote 404 just means the mirror
    /// already caught up.
    pub async fn delete(&self, id: &str) -> CoreResult<bool> {
        let existed = self.local.delete(id).await?;
        if let Some(remote) = self.remote.clone() {
            let id = id.to_string();
            tokio::spawn(async move {
                match remote.delete(&id).await {
                    Ok(_) => {}
                    Err(err) if err.is_not_found() => {
                        debug!(%id, "record already absent on remote");
                    }
                    Err(err) => warn!(%id, error = %err, "failed to mirror delete"),
                }
            });
        }
        Ok(existed)
    }

    /// Remove every local record. Never mirrored — the remote surface has no
    /// bulk delete, and wiping a synced vault remotely is a decision for a
    /// higher layer.
    pub async fn clear(&self) -> CoreResult<u64> {
        let removed = self.local.clear().await?;
        info!(removed, "cleared local vault");
        Ok(removed)
    }

    /// Create a batch in one local transaction, then mirror it.
    pub async fn create_many(&self, batch: Vec<NewPassword>) -> CoreResult<Vec<PasswordRecord>> {
        let payload = self.remote.is_some().then(|| batch.clone());
        let records = self.local.create_many(batch).await?;
        if let (Some(remote), Some(payload)) = (self.remote.clone(), payload) {
            tokio::spawn(async move {
                if let Err(err) = remote.create_many(payload).await {
                    warn!(error = %err, "failed to mirror batch create; local writes are authoritative");
                }
            });
        }
        Ok(records)
    }

    /// Apply a batch of patches in one local transaction, then mirror it.
    pub async fn update_many(
        &self,
        batch: Vec<(String, PasswordPatch)>,
    ) -> CoreResult<Vec<PasswordRecord>> {
        let payload = self.remote.is_some().then(|| batch.clone());
        let records = self.local.update_many(batch).await?;
        if let (Some(remote), Some(payload)) = (self.remote.clone(), payload) {
            tokio::spawn(async move {
                if let Err(err) = remote.update_many(payload).await {
                    warn!(error = %err, "failed to mirror batch update; local writes are authoritative");
                }
            });
        }
        Ok(records)
    }

    /// Probe the sync service. Local-only vaults have nothing to sync and
    /// report healthy.
    pub async fn sync_health(&self) -> CoreResult<()> {
        match &self.remote {
            Some(remote) => remote.health().await,
            None => Ok(()),
        }
    }
}
