//! Metadata-Aware Retrieval
//!
//! Embeds the query, applies any structural filter (explicit or detected in
//! the query text), and runs a filtered similarity search against the play
//! collection. Backend failures propagate — an answer generated on absent
//! context would be worse than an error.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::chroma::client::{ChromaClient, ChromaError, ChromaQueryResult};
use crate::chroma::collection::{act_filter, act_scene_filter};
use crate::embedding::{Embedder, EmbeddingError};

use super::reference::{detect_reference, ActSceneRef};

#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("vector store failed: {0}")]
    Store(#[from] ChromaError),
}

/// One retrieved chunk, in the store's ascending-distance order.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub text: String,
    pub metadata: Value,
    pub distance: f32,
}

/// Build the metadata filter for a reference.
pub fn reference_filter(reference: &ActSceneRef) -> Value {
    match reference.scene {
        Some(scene) => act_scene_filter(reference.act, scene),
        None => act_filter(reference.act),
    }
}

/// Resolve the filter for a query: an explicit filter wins outright;
/// otherwise auto-detection runs over the query text.
pub fn resolve_filter(query: &str, explicit_filter: Option<Value>) -> Option<Value> {
    if explicit_filter.is_some() {
        return explicit_filter;
    }
    detect_reference(query).map(|reference| {
        info!(act = reference.act, scene = ?reference.scene, "Detected Act/Scene reference in query");
        reference_filter(&reference)
    })
}

/// Zip Chroma's parallel result arrays into ordered chunk records.
fn zip_results(result: &ChromaQueryResult) -> Vec<RetrievedChunk> {
    let mut chunks = Vec::new();

    for (query_idx, ids) in result.ids.iter().enumerate() {
        for (result_idx, id) in ids.iter().enumerate() {
            let text = result
                .documents
                .as_ref()
                .and_then(|d| d.get(query_idx))
                .and_then(|d| d.get(result_idx))
                .and_then(|d| d.clone())
                .unwrap_or_default();

            let metadata = result
                .metadatas
                .as_ref()
                .and_then(|m| m.get(query_idx))
                .and_then(|m| m.get(result_idx))
                .and_then(|m| m.clone())
                .unwrap_or(Value::Null);

            let distance = result
                .distances
                .as_ref()
                .and_then(|d| d.get(query_idx))
                .and_then(|d| d.get(result_idx))
                .copied()
                .unwrap_or(f32::MAX);

            chunks.push(RetrievedChunk {
                chunk_id: id.clone(),
                text,
                metadata,
                distance,
            });
        }
    }

    chunks
}

/// Per-query, stateless retrieval over the play collection.
pub struct Retriever<E: Embedder> {
    client: ChromaClient,
    embedder: E,
    collection_name: String,
}

impl<E: Embedder> Retriever<E> {
    pub fn new(client: ChromaClient, embedder: E, collection_name: impl Into<String>) -> Self {
        Self {
            client,
            embedder,
            collection_name: collection_name.into(),
        }
    }

    /// Retrieve up to `top_k` chunks for a query. An empty result is a
    /// legitimate outcome (over-restrictive filter, empty collection), not
    /// an error.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        explicit_filter: Option<Value>,
    ) -> Result<Vec<RetrievedChunk>, RetrieveError> {
        let filter = resolve_filter(query, explicit_filter);
        debug!(query = %query, top_k = top_k, filtered = filter.is_some(), "Retrieving context");

        let embedding = self.embedder.embed(query).await?;
        let collection = self.client.get_collection(&self.collection_name).await?;
        let result = self
            .client
            .query(
                &collection.id,
                embedding,
                top_k as u32,
                filter,
                Some(vec![
                    "documents".to_string(),
                    "metadatas".to_string(),
                    "distances".to_string(),
                ]),
            )
            .await?;

        let chunks = zip_results(&result);
        info!(results = chunks.len(), "Retrieval complete");
        Ok(chunks)
    }
}
