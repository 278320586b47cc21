//! Hosted model support for campusdesk.
//!
//! [`GeminiClient`] talks to the Gemini REST API and implements both
//! [`Embedder`](campusdesk_core::embedding::Embedder) and
//! [`Generator`](campusdesk_core::generate::Generator). Neither ever returns
//! an error to the caller: upstream failures are logged and replaced by the
//! offline hash embedding or the extractive answer.
//!
//! [`Provider`] picks the hosted client or the offline pair at startup.

mod config;
mod error;
mod gemini;
mod provider;

pub use config::GeminiConfig;
pub use error::{Error, Result};
pub use gemini::GeminiClient;
pub use provider::Provider;
