//! Text embeddings and the deterministic offline fallback.
//!
//! A hosted model is preferred when one is configured, but every caller must
//! keep working without it. [`hash_embedding`] is the fallback: it depends
//! only on the input text, so the same text always produces a bit-identical
//! vector.

use std::{future::Future, sync::Arc};

use sha2::{Digest, Sha256};

/// Dimensionality of the offline hash embedding.
pub const HASH_DIMS: usize = 64;

/// Converts text into a fixed-length vector.
///
/// Implementations never fail: upstream errors degrade to
/// [`hash_embedding`]. Blank text embeds to an empty vector.
pub trait Embedder: Send + Sync {
  fn embed<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Vec<f64>> + Send + 'a;
}

impl<T: Embedder> Embedder for Arc<T> {
  fn embed<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Vec<f64>> + Send + 'a {
    (**self).embed(text)
  }
}

/// Deterministic `dims`-dimensional embedding of `text`.
///
/// Each UTF-16 code unit contributes `unit / 255` at position `i % dims`;
/// then the SHA-256 digest of the UTF-8 text, cycled, contributes
/// `byte / 255` at every position. The result is L2-normalised unless its
/// norm is zero, in which case it is returned as-is.
pub fn hash_embedding(text: &str, dims: usize) -> Vec<f64> {
  let mut vec = vec![0.0f64; dims];
  if dims == 0 {
    return vec;
  }

  for (i, unit) in text.encode_utf16().enumerate() {
    vec[i % dims] += f64::from(unit) / 255.0;
  }

  let digest = Sha256::digest(text.as_bytes());
  for (i, slot) in vec.iter_mut().enumerate() {
    *slot += f64::from(digest[i % digest.len()]) / 255.0;
  }

  let norm = vec.iter().map(|v| v * v).sum::<f64>().sqrt();
  if norm == 0.0 {
    return vec;
  }
  vec.into_iter().map(|v| v / norm).collect()
}

/// The offline [`Embedder`]: always [`hash_embedding`].
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
  pub dims: usize,
}

impl Default for HashEmbedder {
  fn default() -> Self { Self { dims: HASH_DIMS } }
}

impl Embedder for HashEmbedder {
  async fn embed(&self, text: &str) -> Vec<f64> {
    if text.trim().is_empty() {
      return Vec::new();
    }
    hash_embedding(text, self.dims)
  }
}
