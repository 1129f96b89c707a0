//! Folio CLI
//!
//! Command-line interface for ingesting the play and asking questions
//! against the indexed collection. All output is JSON, one object per run.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use folio::{
    chunk_pages_file, collection_count, index_chunks, reset_collection, write_chunks_jsonl,
    AppConfig, ChromaClient, OllamaClient, QueryResponse, RagPipeline, Retriever, Source,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Ask questions against Julius Caesar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, chunk, and index the raw pages file
    Ingest {
        /// Raw pages JSON file (array of {page, raw} records)
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the chunk artifact (default: data dir)
        #[arg(long)]
        chunks_out: Option<PathBuf>,
        /// Drop the collection before indexing
        #[arg(long)]
        reset: bool,
    },
    /// Ask a question against the indexed play
    Query {
        /// The question
        question: String,
        /// Number of context chunks to retrieve
        #[arg(short, long)]
        top_k: Option<usize>,
    },
    /// Report store health and collection size
    Status,
    /// Drop the play collection
    Reset,
}

// ============ Output Types ============

#[derive(Serialize)]
struct IngestOutput {
    chunks: usize,
    indexed: usize,
    chunks_file: String,
}

#[derive(Serialize)]
struct QueryOutput {
    outcome: &'static str,
    answer: Option<String>,
    confidence: f32,
    sources: Vec<Source>,
}

#[derive(Serialize)]
struct StatusOutput {
    store_healthy: bool,
    collection: String,
    record_count: u32,
}

#[derive(Serialize)]
struct ResetOutput {
    collection: String,
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

// ============ Main ============

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let result = match cli.command {
        Commands::Ingest {
            input,
            chunks_out,
            reset,
        } => handle_ingest(&config, &input, chunks_out, reset).await,
        Commands::Query { question, top_k } => handle_query(&config, &question, top_k).await,
        Commands::Status => handle_status(&config).await,
        Commands::Reset => handle_reset(&config).await,
    };

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            let error = ErrorOutput {
                error: e.to_string(),
            };
            println!(
                "{}",
                serde_json::to_string(&error)
                    .unwrap_or_else(|_| r#"{"error":"unserializable error"}"#.to_string())
            );
            std::process::exit(1);
        }
    }
}

// ============ Handlers ============

async fn handle_ingest(
    config: &AppConfig,
    input: &PathBuf,
    chunks_out: Option<PathBuf>,
    reset: bool,
) -> anyhow::Result<String> {
    let chunks = chunk_pages_file(input, config.start_page)?;

    let chunks_path = chunks_out.unwrap_or_else(|| config.chunks_path());
    write_chunks_jsonl(&chunks_path, &chunks)?;

    let client = ChromaClient::new(&config.chroma_base_url);
    if reset {
        reset_collection(&client, &config.collection_name).await?;
    }

    let embedder = OllamaClient::new(
        &config.ollama_base_url,
        &config.models.embedding_model,
        &config.models.answer_model,
    );
    let indexed = index_chunks(&client, &embedder, &config.collection_name, &chunks).await?;

    Ok(serde_json::to_string(&IngestOutput {
        chunks: chunks.len(),
        indexed,
        chunks_file: chunks_path.display().to_string(),
    })?)
}

async fn handle_query(
    config: &AppConfig,
    question: &str,
    top_k: Option<usize>,
) -> anyhow::Result<String> {
    let client = ChromaClient::new(&config.chroma_base_url);
    let ollama = OllamaClient::new(
        &config.ollama_base_url,
        &config.models.embedding_model,
        &config.models.answer_model,
    );
    let retriever = Retriever::new(client, ollama.clone(), &config.collection_name);
    let pipeline = RagPipeline::new(retriever, ollama, config.top_k);

    let output = match pipeline.query(question, top_k).await? {
        QueryResponse::Answered {
            answer,
            sources,
            confidence,
        } => QueryOutput {
            outcome: "answered",
            answer: Some(answer),
            confidence,
            sources,
        },
        QueryResponse::NoContext => QueryOutput {
            outcome: "no_context",
            answer: None,
            confidence: 0.0,
            sources: Vec::new(),
        },
    };

    Ok(serde_json::to_string(&output)?)
}

async fn handle_status(config: &AppConfig) -> anyhow::Result<String> {
    let client = ChromaClient::new(&config.chroma_base_url);
    let store_healthy = client.heartbeat().await.is_ok();
    let record_count = if store_healthy {
        collection_count(&client, &config.collection_name).await?
    } else {
        0
    };

    Ok(serde_json::to_string(&StatusOutput {
        store_healthy,
        collection: config.collection_name.clone(),
        record_count,
    })?)
}

async fn handle_reset(config: &AppConfig) -> anyhow::Result<String> {
    let client = ChromaClient::new(&config.chroma_base_url);
    reset_collection(&client, &config.collection_name).await?;

    Ok(serde_json::to_string(&ResetOutput {
        collection: config.collection_name.clone(),
        status: "reset",
    })?)
}
