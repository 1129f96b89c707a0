//! Speech Extraction
//!
//! Scans normalized page text for speaker headings and carves the page into
//! per-speaker dialogue spans. Act/Scene position is tracked by an explicit
//! cursor threaded through the page calls, so independent extraction runs
//! never share state.
//!
//! This is a heuristic scanner tuned to the Folger text of Julius Caesar.
//! Pages that yield nothing are skipped silently; extraction never fails.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalize::normalize;
use super::speakers::is_valid_speaker;

/// Minimum cleaned-dialogue length worth keeping. Shorter spans are almost
/// always mis-split stage business, not speech.
const MIN_DIALOGUE_CHARS: usize = 25;

lazy_static! {
    static ref ACT_MARKER: Regex = Regex::new(r"(?i)ACT\s+(\d+)").unwrap();
    static ref SCENE_MARKER: Regex = Regex::new(r"(?i)Scene\s+(\d+)").unwrap();
    /// A candidate speaker heading: a short run of upper-case characters and
    /// spaces followed by dialogue-looking text (an upper-case word start, or
    /// one of the play's common one-word openers).
    static ref SPEAKER_HEADING: Regex = Regex::new(
        r"\b([A-Z][A-Z\s]{2,25}?)\b\s+([A-Z][a-z]|\bO\b|\bAy\b|\bNo\b|\bWhat\b|\bWhy\b|\bHow\b|\bI\b)",
    )
    .unwrap();
    /// Residual stage-direction clauses inside a dialogue span.
    static ref STAGE_DIRECTION: Regex = Regex::new(
        r"(?i)\b(Enter|Exit|Exeunt|Re-enter|Aside|They exit|He exits|She exits|All exit).*?\.",
    )
    .unwrap();
    static ref PARENTHETICAL: Regex = Regex::new(r"\(.*?\)").unwrap();
}

/// One extracted speech. Immutable once emitted; `act` and `scene` are
/// always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speech {
    pub act: u32,
    pub scene: u32,
    pub speaker: String,
    pub text: String,
}

impl Speech {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Sticky Act/Scene position within the source stream. One cursor per
/// extraction run; markers persist across pages until overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanCursor {
    pub act: Option<u32>,
    pub scene: Option<u32>,
}

impl ScanCursor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Extract speeches from one page of raw text, appending to `speeches`.
/// Pages seen before the first ACT marker are front matter and yield nothing.
pub fn extract_page(cursor: &mut ScanCursor, raw: &str, speeches: &mut Vec<Speech>) {
    let text = normalize(raw);

    if let Some(caps) = ACT_MARKER.captures(&text) {
        if let Ok(act) = caps[1].parse::<u32>() {
            cursor.act = Some(act);
        }
    }
    if let Some(caps) = SCENE_MARKER.captures(&text) {
        if let Ok(scene) = caps[1].parse::<u32>() {
            cursor.scene = Some(scene);
        }
    }

    let act = match cursor.act {
        Some(act) => act,
        None => return,
    };
    // The first act page carries its own Scene marker; default defensively
    // so the positive-scene invariant holds even on malformed input.
    let scene = cursor.scene.unwrap_or(1);

    // Collect validated headings: (heading start, dialogue start, speaker).
    let headings: Vec<(usize, usize, String)> = SPEAKER_HEADING
        .captures_iter(&text)
        .filter_map(|caps| {
            let speaker = caps.get(1)?.as_str().trim().to_string();
            if !is_valid_speaker(&speaker) {
                return None;
            }
            let heading_start = caps.get(0)?.start();
            let dialogue_start = caps.get(2)?.start();
            Some((heading_start, dialogue_start, speaker))
        })
        .collect();

    for (i, (_, dialogue_start, speaker)) in headings.iter().enumerate() {
        let span_end = headings
            .get(i + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(text.len());
        if *dialogue_start >= span_end {
            continue;
        }

        let dialogue = clean_dialogue(&text[*dialogue_start..span_end]);

        if dialogue.len() > MIN_DIALOGUE_CHARS && !has_structural_prefix(&dialogue) {
            speeches.push(Speech {
                act,
                scene,
                speaker: speaker.clone(),
                text: dialogue,
            });
        }
    }
}

/// Strip residual stage business from a dialogue span.
fn clean_dialogue(span: &str) -> String {
    let cleaned = STAGE_DIRECTION.replace_all(span, "");
    let cleaned = PARENTHETICAL.replace_all(&cleaned, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Headings whose "dialogue" is actually a leftover structural line.
fn has_structural_prefix(dialogue: &str) -> bool {
    ["ACT", "Scene", "Enter", "Exit"]
        .iter()
        .any(|prefix| dialogue.starts_with(prefix))
}
