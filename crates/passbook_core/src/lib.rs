//! Passbook Core
//!
//! The vault façade and sync layer: one repository-shaped interface over a
//! durable local store with an optional best-effort remote mirror.
//!
//! # Architecture
//!
//! - **Local-first** - writes land in SQLite before anything touches the
//!   network; the local store is the durability guarantee
//! - **Best-effort sync** - in hybrid mode, writes mirror to the hosted
//!   service on a background task with timeout + retry; failures are logged
//!   warnings, never caller errors
//! - **One backend contract** - [`PasswordRepository`] is implemented by
//!   both [`LocalVault`] and [`RemoteVault`], so either slots in behind the
//!   façade
//!
//! # Usage
//!
//! ```rust,ignore
//! use passbook_core::{Vault, VaultConfig};
//!
//! let config = VaultConfig::load("passbook.toml")?;
//! let vault = Vault::shared(&config).await?;
//! let records = vault.search("gmail").await?;
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod local;
pub mod remote;
pub mod repository;
pub mod service;

pub use config::{DatabaseConfig, RemoteConfig, VaultConfig};
pub use error::{CoreError, CoreResult};
pub use generator::{PasswordSpec, generate_password};
pub use local::LocalVault;
pub use remote::RemoteVault;
pub use remote::retry::RetryConfig;
pub use repository::PasswordRepository;
pub use service::Vault;

// Re-export the record model so most callers only need this crate
pub use passbook_db::{
    NewPassword, PasswordPatch, PasswordRecord, SearchCriteria, VaultStats, search,
};
