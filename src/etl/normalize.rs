//! Page Text Normalization
//!
//! Strips the layout artifacts of the Folger page scans: FTLN line-number
//! tokens, repeated running headers, standalone line numbers, and bracketed
//! stage directions. Best-effort cleaning — anything that doesn't match a
//! known artifact pattern passes through unchanged.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "FTLN 0042" line-number tokens.
    static ref FTLN: Regex = Regex::new(r"FTLN\s+\d+").unwrap();
    /// Running page headers like "11 Julius Caesar ACT 1. SC. 1".
    static ref PAGE_HEADER: Regex =
        Regex::new(r"\d+\s+Julius Caesar\s+ACT\s+\d+\.\s+SC\.\s+\d+").unwrap();
    /// Lines that are purely a number (print line numbers).
    static ref NUMERIC_LINE: Regex = Regex::new(r"\n\s*\d+\s*\n").unwrap();
    /// Bracketed stage directions, single-line only.
    static ref BRACKETED: Regex = Regex::new(r"\[.*?\]").unwrap();
    /// Any whitespace run.
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalize one page of raw text. Pure and infallible.
pub fn normalize(raw: &str) -> String {
    let text = FTLN.replace_all(raw, "");
    let text = PAGE_HEADER.replace_all(&text, "");
    let text = NUMERIC_LINE.replace_all(&text, "\n");
    let text = BRACKETED.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_ftln_numbers() {
        let raw = "FTLN 0001 Hence! Home, you idle creatures";
        assert_eq!(normalize(raw), "Hence! Home, you idle creatures");
    }

    #[test]
    fn test_strips_page_header() {
        let raw = "11 Julius Caesar ACT 1. SC. 1 FLAVIUS Hence! Home";
        assert_eq!(normalize(raw), "FLAVIUS Hence! Home");
    }

    #[test]
    fn test_strips_numeric_lines() {
        let raw = "some dialogue\n 15 \nmore dialogue";
        assert_eq!(normalize(raw), "some dialogue more dialogue");
    }

    #[test]
    fn test_strips_bracketed_stage_directions() {
        let raw = "CAESAR [aside to Antony] Let me have men about me that are fat";
        assert_eq!(normalize(raw), "CAESAR Let me have men about me that are fat");
    }

    #[test]
    fn test_collapses_whitespace() {
        let raw = "  What   trade,\n\n thou knave?  ";
        assert_eq!(normalize(raw), "What trade, thou knave?");
    }

    #[test]
    fn test_unmatched_text_passes_through() {
        let raw = "An ordinary line with no artifacts.";
        assert_eq!(normalize(raw), raw);
    }
}
