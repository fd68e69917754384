//! Domain types shared by every skyqueue crate.
//!
//! Pure logic only: no I/O, no database, no HTTP. The store, worker and API
//! crates build on these types.

pub mod error;
pub mod request;
pub mod types;
