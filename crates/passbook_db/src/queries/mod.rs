//! Database query functions.
//!
//! One domain, one module: `passwords` holds the CRUD, search, and batch
//! operations over the password collection.

mod passwords;

pub use passwords::*;
