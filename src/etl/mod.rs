//! ETL Module
//!
//! Raw Folger page scans in, retrieval chunks out: normalize pages, extract
//! speeches behind a scan cursor, then run the hybrid chunking pass.

pub mod chunker;
pub mod extract;
pub mod normalize;
pub mod speakers;

// Re-export key public types
pub use chunker::{chunk_speeches, group_by_scene, scene_summary, Chunk, ChunkKind};
pub use extract::{extract_page, ScanCursor, Speech};

use std::fs;
use std::io::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Pages file parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One page record of the raw source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub raw: String,
}

/// Extract the full speech sequence from a pages file. Pages below
/// `start_page` are front matter and skipped.
pub fn extract_speeches(pages: &[Page], start_page: u32) -> Vec<Speech> {
    let mut cursor = ScanCursor::new();
    let mut speeches = Vec::new();
    for page in pages {
        if page.page < start_page {
            continue;
        }
        extract_page(&mut cursor, &page.raw, &mut speeches);
    }
    info!(speeches = speeches.len(), "Extracted speech sequence");
    speeches
}

/// Load the raw pages JSON file (an array of `{page, raw}` records).
pub fn load_pages(path: &Path) -> Result<Vec<Page>, EtlError> {
    let content = fs::read_to_string(path)?;
    let pages: Vec<Page> = serde_json::from_str(&content)?;
    debug!(pages = pages.len(), path = %path.display(), "Loaded pages file");
    Ok(pages)
}

/// Run the full pipeline over a pages file: extract, chunk, done.
pub fn chunk_pages_file(path: &Path, start_page: u32) -> Result<Vec<Chunk>, EtlError> {
    let pages = load_pages(path)?;
    let speeches = extract_speeches(&pages, start_page);
    let chunks = chunk_speeches(&speeches);
    info!(chunks = chunks.len(), "Chunking pass complete");
    Ok(chunks)
}

/// Write a chunking run to a JSONL artifact, one chunk per line.
pub fn write_chunks_jsonl(path: &Path, chunks: &[Chunk]) -> Result<(), EtlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    for chunk in chunks {
        serde_json::to_writer(&mut file, chunk)?;
        file.write_all(b"\n")?;
    }
    info!(chunks = chunks.len(), path = %path.display(), "Wrote chunk artifact");
    Ok(())
}

/// Read a chunking run back from a JSONL artifact. Blank lines are skipped.
pub fn read_chunks_jsonl(path: &Path) -> Result<Vec<Chunk>, EtlError> {
    let content = fs::read_to_string(path)?;
    let mut chunks = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        chunks.push(serde_json::from_str(line)?);
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, raw: &str) -> Page {
        Page {
            page,
            raw: raw.to_string(),
        }
    }

    #[test]
    fn test_front_matter_pages_ignored() {
        let pages = vec![
            page(1, "ACT 1 Scene 1 BRUTUS What means this shouting? I do fear the people choose Caesar."),
            page(9, "Dramatis personae and other apparatus, no act marker here."),
        ];
        let speeches = extract_speeches(&pages, 9);
        assert!(speeches.is_empty());
    }

    #[test]
    fn test_extraction_spans_pages() {
        let pages = vec![
            page(9, "ACT 1 Scene 2"),
            page(
                10,
                "CASSIUS Tell me, good Brutus, can you see your face? For the eye sees not itself but by reflection.",
            ),
        ];
        let speeches = extract_speeches(&pages, 9);
        assert_eq!(speeches.len(), 1);
        assert_eq!(speeches[0].act, 1);
        assert_eq!(speeches[0].scene, 2);
        assert_eq!(speeches[0].speaker, "CASSIUS");
    }

    #[test]
    fn test_chunk_jsonl_round_trip() {
        let speeches = vec![
            Speech {
                act: 1,
                scene: 1,
                speaker: "BRUTUS".to_string(),
                text: "a speech long enough to matter for this test case".to_string(),
            },
        ];
        let chunks = chunk_speeches(&speeches);

        let dir = std::env::temp_dir().join("folio_chunker_test");
        let path = dir.join("chunks.jsonl");
        write_chunks_jsonl(&path, &chunks).expect("write");
        let restored = read_chunks_jsonl(&path).expect("read");
        assert_eq!(chunks, restored);
        let _ = std::fs::remove_dir_all(dir);
    }
}
