//! SQLite backend for campusdesk.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] implements every
//! storage trait in `campusdesk_core::store`.

mod encode;
mod knowledge;
mod schema;
mod store;
mod tickets;
mod traces;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
