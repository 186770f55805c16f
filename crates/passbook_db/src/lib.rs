//! Passbook Storage Layer
//!
//! SQLite-based local store for password vaults.
//!
//! # Architecture
//!
//! - **One database per vault** - a single `passwords` collection with
//!   secondary indexes on `service`, `username`, and `updated_at`
//! - **One pool per opened store** - every query goes through [`VaultDb`];
//!   nothing else opens a second connection to the same file
//! - **Pure search engine** - substring, criteria, and fuzzy ranking over
//!   already-fetched record slices, independent of storage
//!
//! # Usage
//!
//! ```rust,ignore
//! use passbook_db::{VaultDb, queries};
//!
//! let db = VaultDb::open("path/to/vault.db").await?;
//! let records = queries::list_passwords(db.pool()).await?;
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod search;

pub use connection::VaultDb;
pub use error::{DbError, DbResult};

// Re-export key model types for convenience
pub use models::{
    MAX_FIELD_LEN, MAX_PASSWORD_LEN, NewPassword, PasswordPatch, PasswordRecord, VaultStats,
    generate_record_id,
};

// Re-export the search engine types
pub use search::SearchCriteria;

// Re-export the JSON column wrapper so downstream crates can build records
// without depending on sqlx directly
pub use sqlx::types::Json;
