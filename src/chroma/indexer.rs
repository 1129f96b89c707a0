//! Collection Indexing
//!
//! One-shot batch indexing of a finalized chunking run. Chunks are never
//! mutated in place; the only supersession path is a full reset followed by
//! a fresh index.

use tracing::info;

use crate::embedding::{Embedder, EmbeddingError};
use crate::etl::Chunk;

use super::client::{ChromaClient, ChromaError};

/// Upsert batch size. Keeps request bodies reasonable for the store.
const INDEX_BATCH_SIZE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("store failed: {0}")]
    Store(#[from] ChromaError),
}

/// Index a chunking run into the named collection, embedding in batches.
/// Returns the number of chunks indexed.
pub async fn index_chunks<E: Embedder>(
    client: &ChromaClient,
    embedder: &E,
    collection_name: &str,
    chunks: &[Chunk],
) -> Result<usize, IndexError> {
    if chunks.is_empty() {
        info!("No chunks to index");
        return Ok(0);
    }

    let collection = client.get_or_create_collection(collection_name, None).await?;

    for batch in chunks.chunks(INDEX_BATCH_SIZE) {
        let ids: Vec<String> = batch.iter().map(|c| c.chunk_id.clone()).collect();
        let documents: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let metadatas: Vec<serde_json::Value> = batch.iter().map(Chunk::metadata).collect();
        let embeddings = embedder.embed_batch(&documents).await?;

        client
            .upsert(
                &collection.id,
                ids,
                Some(documents),
                Some(embeddings),
                Some(metadatas),
            )
            .await?;
    }

    info!(
        collection = %collection_name,
        chunks = chunks.len(),
        "Indexed chunking run"
    );
    Ok(chunks.len())
}

/// Drop the collection entirely. The next index starts from scratch.
pub async fn reset_collection(client: &ChromaClient, collection_name: &str) -> Result<(), ChromaError> {
    client.delete_collection(collection_name).await
}

/// Number of records currently in the collection; 0 if it does not exist.
pub async fn collection_count(client: &ChromaClient, collection_name: &str) -> Result<u32, ChromaError> {
    match client.get_collection(collection_name).await {
        Ok(collection) => client.count(&collection.id).await,
        Err(ChromaError::CollectionNotFound(_)) => Ok(0),
        Err(e) => Err(e),
    }
}
