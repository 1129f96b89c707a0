//! Chroma Vector Store Integration
//!
//! HTTP client, collection schema, and batch indexing for the play
//! collection. The store is treated as an opaque filtered nearest-neighbor
//! index; everything here is plumbing to and from it.

pub mod client;
pub mod collection;
pub mod indexer;

pub use client::{ChromaClient, ChromaError, ChromaQueryResult, CollectionInfo};
pub use collection::{act_filter, act_scene_filter, COLLECTION_PLAY};
pub use indexer::{collection_count, index_chunks, reset_collection, IndexError};
