//! Collection Schema and Filters
//!
//! The single play collection plus the metadata filter builders used by
//! retrieval. Chroma filters are exact-match equality on scalar fields,
//! composed conjunctively with `$and`.

use serde_json::{json, Value};

/// The one collection this system manages.
pub const COLLECTION_PLAY: &str = "julius_caesar";

/// Filter chunks to a single act.
pub fn act_filter(act: u32) -> Value {
    json!({ "act": { "$eq": act } })
}

/// Filter chunks to a single (act, scene).
pub fn act_scene_filter(act: u32, scene: u32) -> Value {
    json!({
        "$and": [
            { "act": { "$eq": act } },
            { "scene": { "$eq": scene } }
        ]
    })
}
