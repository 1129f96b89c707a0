//! Retrieval Confidence
//!
//! Collapses a result set's distances into one bounded score: the mean of
//! `1 − distance`, clamped to [0, 1]. A coarse proxy, not a calibrated
//! probability — it inherits whatever distance metric the collection uses,
//! and the clamp is a safety net, not a guarantee.

use super::retriever::RetrievedChunk;

/// Score a retrieval result. Empty input scores 0.
pub fn confidence(chunks: &[RetrievedChunk]) -> f32 {
    if chunks.is_empty() {
        return 0.0;
    }
    let mean = chunks.iter().map(|c| 1.0 - c.distance).sum::<f32>() / chunks.len() as f32;
    mean.clamp(0.0, 1.0)
}
