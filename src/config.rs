//! Runtime Configuration
//!
//! All knobs are environment variables with sensible local defaults, so the
//! CLI works out of the box against a local Chroma and Ollama.

use std::env;
use std::path::PathBuf;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// First page of the source JSON that belongs to the play proper.
/// Earlier pages are front matter (title, dramatis personae).
pub const DEFAULT_START_PAGE: u32 = 9;

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub embedding_model: String,
    pub answer_model: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chroma_base_url: String,
    pub collection_name: String,
    pub ollama_base_url: String,
    pub models: ModelConfig,
    pub top_k: usize,
    pub start_page: u32,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("FOLIO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        Self {
            chroma_base_url: env::var("CHROMA_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            collection_name: env::var("CHROMA_COLLECTION")
                .unwrap_or_else(|_| "julius_caesar".to_string()),
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:11434".to_string()),
            models: ModelConfig {
                embedding_model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "all-minilm".to_string()),
                answer_model: env::var("ANSWER_MODEL")
                    .unwrap_or_else(|_| "qwen2.5:14b-instruct".to_string()),
            },
            top_k: env::var("TOP_K_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOP_K),
            start_page: env::var("FOLIO_START_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_START_PAGE),
            data_dir,
        }
    }

    /// Default location of the chunk artifact written by `folio ingest`.
    pub fn chunks_path(&self) -> PathBuf {
        self.data_dir.join("processed").join("chunks.jsonl")
    }
}
