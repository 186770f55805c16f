//! Data models for the vault store.

mod password;

pub use password::*;
