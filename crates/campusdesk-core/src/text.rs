//! Text and vector helpers shared by ingestion and retrieval.

/// Collapse every run of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(input: &str) -> String {
  input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `input` into chunks of at most `chunk_size` characters after
/// whitespace normalisation.
///
/// Produces `ceil(len / chunk_size)` chunks, where `len` is the normalised
/// length in characters; blank input yields no chunks.
pub fn chunk_text(input: &str, chunk_size: usize) -> Vec<String> {
  let normalized = normalize_whitespace(input);
  if normalized.is_empty() || chunk_size == 0 {
    return Vec::new();
  }

  let chars: Vec<char> = normalized.chars().collect();
  chars
    .chunks(chunk_size)
    .map(|c| c.iter().collect())
    .collect()
}

/// Cosine similarity of two vectors.
///
/// Empty vectors, vectors of different lengths, and zero vectors all score
/// `0.0`.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
  if a.is_empty() || b.is_empty() || a.len() != b.len() {
    return 0.0;
  }

  let mut dot = 0.0;
  let mut norm_a = 0.0;
  let mut norm_b = 0.0;
  for (x, y) in a.iter().zip(b) {
    dot += x * y;
    norm_a += x * x;
    norm_b += y * y;
  }

  if norm_a == 0.0 || norm_b == 0.0 {
    return 0.0;
  }

  // Rounding can push a parallel pair a hair past 1.
  (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}
