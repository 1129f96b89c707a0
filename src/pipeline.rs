//! Query Pipeline
//!
//! Retrieve, format, generate. The language model sits behind the
//! `AnswerGenerator` seam; the pipeline is agnostic to how its text is
//! produced. Callers get three distinct outcomes: an answer, an explicit
//! "nothing relevant in the text", or an error — the last two are not the
//! same thing.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::embedding::Embedder;
use crate::prompts::{create_context_from_chunks, create_rag_prompt};
use crate::retrieval::{confidence, RetrieveError, RetrievedChunk, Retriever};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("retrieval failed: {0}")]
    Retrieve(#[from] RetrieveError),
    #[error("answer generation failed: {0}")]
    Generate(#[source] anyhow::Error),
}

/// The answer-generation collaborator: formatted prompt in, prose out.
pub trait AnswerGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = anyhow::Result<String>> + Send;
}

/// One cited source in a response.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub chunk_id: String,
    pub chunk: String,
    pub metadata: Value,
    pub relevance_score: f32,
}

/// Outcome of one question. `NoContext` is a legitimate answer — the
/// question found nothing in the play — and must not be conflated with a
/// backend failure, which surfaces as `PipelineError`.
#[derive(Debug)]
pub enum QueryResponse {
    Answered {
        answer: String,
        sources: Vec<Source>,
        confidence: f32,
    },
    NoContext,
}

/// Convert retrieved chunks to cited sources (relevance = 1 − distance).
pub fn sources_from_chunks(chunks: &[RetrievedChunk]) -> Vec<Source> {
    chunks
        .iter()
        .map(|c| Source {
            chunk_id: c.chunk_id.clone(),
            chunk: c.text.clone(),
            metadata: c.metadata.clone(),
            relevance_score: 1.0 - c.distance,
        })
        .collect()
}

/// End-to-end question answering over the indexed play.
pub struct RagPipeline<E: Embedder, G: AnswerGenerator> {
    retriever: Retriever<E>,
    generator: G,
    top_k: usize,
}

impl<E: Embedder, G: AnswerGenerator> RagPipeline<E, G> {
    pub fn new(retriever: Retriever<E>, generator: G, top_k: usize) -> Self {
        Self {
            retriever,
            generator,
            top_k,
        }
    }

    /// Answer one question. `top_k` overrides the pipeline default for this
    /// call only.
    pub async fn query(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<QueryResponse, PipelineError> {
        let top_k = top_k.unwrap_or(self.top_k);
        info!(question = %question, top_k = top_k, "Processing query");

        let chunks = self.retriever.retrieve(question, top_k, None).await?;
        if chunks.is_empty() {
            info!("No relevant context found");
            return Ok(QueryResponse::NoContext);
        }

        let context = create_context_from_chunks(&chunks);
        let prompt = create_rag_prompt(&context, question);
        let answer = self
            .generator
            .generate(&prompt)
            .await
            .map_err(PipelineError::Generate)?;

        let confidence = confidence(&chunks);
        info!(sources = chunks.len(), confidence = confidence, "Query answered");

        Ok(QueryResponse::Answered {
            answer,
            sources: sources_from_chunks(&chunks),
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sources_invert_distance() {
        let chunks = vec![RetrievedChunk {
            chunk_id: "A1S2-quote-soothsayer".to_string(),
            text: "SOOTHSAYER: Beware the ides of March".to_string(),
            metadata: json!({"act": 1, "scene": 2, "speaker": "SOOTHSAYER"}),
            distance: 0.25,
        }];
        let sources = sources_from_chunks(&chunks);
        assert_eq!(sources.len(), 1);
        assert!((sources[0].relevance_score - 0.75).abs() < 1e-6);
        assert_eq!(sources[0].chunk_id, "A1S2-quote-soothsayer");
    }

    #[test]
    fn test_no_chunks_no_sources() {
        assert!(sources_from_chunks(&[]).is_empty());
    }
}
