//! Ollama HTTP Client
//!
//! Production implementation of the embedding seam plus the text-generation
//! call used at the end of the query pipeline. Both talk to a local Ollama
//! server over its REST API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::{Embedder, Embedding, EmbeddingError};
use crate::pipeline::AnswerGenerator;

#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    embedding_model: String,
    answer_model: String,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        embedding_model: impl Into<String>,
        answer_model: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            embedding_model: embedding_model.into(),
            answer_model: answer_model.into(),
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        #[derive(Serialize)]
        struct EmbedReq<'a> {
            model: &'a str,
            input: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbedResp {
            embeddings: Vec<Vec<f32>>,
        }

        let input = text.trim();
        if input.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        debug!(model = %self.embedding_model, chars = input.len(), "Embedding text");
        let resp = self
            .http
            .post(format!("{}/api/embed", self.base_url))
            .json(&EmbedReq {
                model: &self.embedding_model,
                input,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Http(format!("{status}: {body}")));
        }

        let parsed: EmbedResp = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::Malformed(e.to_string()))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Malformed("empty embeddings array".to_string()))
    }

    /// Generate free-text from a complete prompt. The query pipeline is
    /// agnostic to how this text is produced; this is just the local default.
    pub async fn generate_text(&self, prompt: &str) -> anyhow::Result<String> {
        #[derive(Serialize)]
        struct GenerateReq<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct GenerateResp {
            response: String,
        }

        let resp = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateReq {
                model: &self.answer_model,
                prompt,
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResp>()
            .await?;

        Ok(resp.response.trim().to_string())
    }
}

impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_one(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let futures = texts.iter().map(|t| self.embed_one(t));
        futures::future::try_join_all(futures).await
    }
}

impl AnswerGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.generate_text(prompt).await
    }
}
