//! Core types, storage traits, and the message-routing pipeline for
//! campusdesk.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement the traits in [`store`]; model providers
//! implement [`embedding::Embedder`] and [`generate::Generator`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod agent;
pub mod assistant;
pub mod classify;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod ingest;
pub mod knowledge;
pub mod retrieve;
pub mod store;
pub mod text;
pub mod ticket;
pub mod trace;

pub use error::{Error, Result};

#[cfg(test)]
mod fixtures;
