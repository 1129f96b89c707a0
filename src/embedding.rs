//! Embedding Seam
//!
//! The embedding model is an external collaborator: an opaque function from
//! text to a fixed-length vector. The `Embedder` trait is the seam; the
//! production implementation lives in `ollama.rs`, and `HashEmbedder` below
//! gives a deterministic, offline vector for tests and degraded operation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use thiserror::Error;

/// Embedding vector.
pub type Embedding = Vec<f32>;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,
    #[error("embedding request failed: {0}")]
    Http(String),
    #[error("embedding service returned malformed response: {0}")]
    Malformed(String),
}

/// Text in, fixed-length vector out. `embed_batch` is order-preserving.
pub trait Embedder: Send + Sync {
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Embedding, EmbeddingError>> + Send;

    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Embedding>, EmbeddingError>> + Send;
}

/// Dimensionality of the hashing embedder's vectors.
const HASH_EMBEDDING_DIM: usize = 256;

/// Feature-hashing embedder. Each token hashes to a fixed bucket and the
/// term-frequency vector is L2-normalized, so the same text always produces
/// the same vector with no vocabulary to maintain. Not semantically deep —
/// deterministic, which is what tests need.
#[derive(Debug, Clone, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn hash_token(token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % HASH_EMBEDDING_DIM
    }

    fn embed_sync(text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();

        let mut tf = vec![0.0f32; HASH_EMBEDDING_DIM];
        for token in &tokens {
            tf[Self::hash_token(token)] += 1.0;
        }

        let norm: f32 = tf.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut tf {
                *x /= norm;
            }
        }

        Ok(tf)
    }
}

impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Self::embed_sync(text)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|t| Self::embed_sync(t)).collect()
    }
}
