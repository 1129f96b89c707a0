//! Act/Scene Reference Detection
//!
//! Questions often carry their own structural address ("What happens in
//! Act 3 Scene 1?"). Detecting it up front lets retrieval filter the
//! candidate set instead of hoping the embedding notices the numbers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "act 3 scene 1" / "act 3, scene 1" — digits.
    static ref DIGIT_ACT_SCENE: Regex = Regex::new(r"act\s+(\d+),?\s+scene\s+(\d+)").unwrap();
    /// "act iii scene i" — Roman numerals (queries are lower-cased first).
    static ref ROMAN_ACT_SCENE: Regex = Regex::new(r"act\s+([ivx]+)\s+scene\s+([ivx]+)").unwrap();
    /// "act 3" alone.
    static ref DIGIT_ACT: Regex = Regex::new(r"act\s+(\d+)").unwrap();
}

/// A structural reference found inside a free-text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActSceneRef {
    pub act: u32,
    pub scene: Option<u32>,
}

/// The play has five acts; numerals outside the table are not references.
fn roman_to_number(numeral: &str) -> Option<u32> {
    match numeral.to_uppercase().as_str() {
        "I" => Some(1),
        "II" => Some(2),
        "III" => Some(3),
        "IV" => Some(4),
        "V" => Some(5),
        _ => None,
    }
}

/// Scan a query for an embedded Act/Scene mention. Patterns are tried in
/// priority order and the first that yields a valid act wins. The digit
/// branch accepts any integer (an out-of-range act simply filters down to
/// nothing); the Roman branch only maps I–V.
pub fn detect_reference(query: &str) -> Option<ActSceneRef> {
    let query = query.to_lowercase();

    if let Some(caps) = DIGIT_ACT_SCENE.captures(&query) {
        if let (Ok(act), Ok(scene)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
            return Some(ActSceneRef {
                act,
                scene: Some(scene),
            });
        }
    }

    if let Some(caps) = ROMAN_ACT_SCENE.captures(&query) {
        if let Some(act) = roman_to_number(&caps[1]) {
            // An unmapped scene numeral degrades to an act-only reference.
            return Some(ActSceneRef {
                act,
                scene: roman_to_number(&caps[2]),
            });
        }
    }

    if let Some(caps) = DIGIT_ACT.captures(&query) {
        if let Ok(act) = caps[1].parse::<u32>() {
            return Some(ActSceneRef { act, scene: None });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_act_and_scene() {
        assert_eq!(
            detect_reference("What happens in Act 3 Scene 1?"),
            Some(ActSceneRef { act: 3, scene: Some(1) }),
        );
    }

    #[test]
    fn test_digit_with_comma() {
        assert_eq!(
            detect_reference("summarize act 3, scene 2 please"),
            Some(ActSceneRef { act: 3, scene: Some(2) }),
        );
    }

    #[test]
    fn test_roman_numerals_map_identically() {
        assert_eq!(
            detect_reference("What happens in Act III Scene I?"),
            detect_reference("What happens in Act 3 Scene 1?"),
        );
    }

    #[test]
    fn test_roman_upper_bound() {
        assert_eq!(
            detect_reference("the battle in Act V Scene V"),
            Some(ActSceneRef { act: 5, scene: Some(5) }),
        );
    }

    #[test]
    fn test_act_alone() {
        assert_eq!(
            detect_reference("Who dies in Act 9?"),
            Some(ActSceneRef { act: 9, scene: None }),
        );
    }

    #[test]
    fn test_unmapped_roman_act_is_not_a_reference() {
        assert_eq!(detect_reference("tell me about Act IX Scene I"), None);
    }

    #[test]
    fn test_unmapped_roman_scene_degrades_to_act_only() {
        assert_eq!(
            detect_reference("tell me about Act II Scene IX"),
            Some(ActSceneRef { act: 2, scene: None }),
        );
    }

    #[test]
    fn test_plain_question_has_no_reference() {
        assert_eq!(detect_reference("What does the Soothsayer say to Caesar?"), None);
    }
}
