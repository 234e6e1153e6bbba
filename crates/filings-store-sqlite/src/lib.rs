//! SQLite backend for the corporate filing ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each submission is one `IMMEDIATE`
//! transaction; each reconstruction reads one consistent snapshot.

mod encode;
mod events;
mod reconstruct;
mod schema;
mod store;
mod stores;
mod writer;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteLedger;

#[cfg(test)]
mod tests;
