//! Core types and trait definitions for the corporate filing ledger.
//!
//! This crate is deliberately free of database dependencies. It owns the
//! legacy code registry, the filing and document shapes, and the pure diff
//! logic the writer applies; storage backends depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod codes;
pub mod components;
pub mod diff;
pub mod document;
pub mod entity;
pub mod error;
pub mod filing;
pub mod ledger;
pub mod narrative;
pub mod temporal;

pub use error::{Error, Result};
