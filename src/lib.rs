// Folio Library
// Core chunking and retrieval engine; the CLI binary is a thin shell over it.

pub mod chroma;
pub mod config;
pub mod embedding;
pub mod etl;
pub mod ollama;
pub mod pipeline;
pub mod prompts;
pub mod retrieval;

// Re-export commonly used types for the CLI
pub use config::AppConfig;
pub use embedding::{Embedder, Embedding, EmbeddingError, HashEmbedder};
pub use etl::{
    chunk_pages_file, chunk_speeches, extract_speeches, load_pages, read_chunks_jsonl,
    write_chunks_jsonl, Chunk, ChunkKind, EtlError, Page, ScanCursor, Speech,
};
pub use chroma::{
    collection_count, index_chunks, reset_collection, ChromaClient, ChromaError, IndexError,
};
pub use ollama::OllamaClient;
pub use pipeline::{AnswerGenerator, PipelineError, QueryResponse, RagPipeline, Source};
pub use retrieval::{
    confidence, detect_reference, ActSceneRef, RetrieveError, RetrievedChunk, Retriever,
};
