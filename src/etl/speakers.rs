//! Speaker Vocabulary
//!
//! The canonical cast of Julius Caesar, used to validate candidate speaker
//! headings found by the extraction scan. This is an explicit best-effort
//! strategy tuned to one fixed source text, not a parser contract: swapping
//! the play means swapping this vocabulary (and likely the scan patterns).

use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// Character names as they appear in speech headings, upper-cased.
    /// Includes collective headings ("ALL", "PLEBEIANS") and the ordinal
    /// prefixes the text uses for numbered minor roles.
    pub static ref CHARACTERS: HashSet<&'static str> = [
        "FLAVIUS", "MARULLUS", "CARPENTER", "COBBLER", "CAESAR", "CALPHURNIA",
        "BRUTUS", "PORTIA", "LUCIUS", "CASSIUS", "CASCA", "CINNA", "DECIUS",
        "LIGARIUS", "METELLUS", "CIMBER", "TREBONIUS", "CICERO", "PUBLIUS",
        "POPILIUS", "LENA", "ANTONY", "LEPIDUS", "OCTAVIUS", "SERVANT",
        "SOOTHSAYER", "ARTEMIDORUS", "LUCILIUS", "TITINIUS", "MESSALA",
        "VARRO", "CLAUDIUS", "CATO", "STRATO", "VOLUMNIUS", "DARDANUS",
        "CLITUS", "PINDARUS", "FIRST", "SECOND", "THIRD", "FOURTH", "BOTH",
        "PLEBEIAN", "PLEBEIANS", "SOLDIER", "SOLDIERS", "MESSENGER", "POET",
        "COMMONER", "COMMONERS", "CITIZENS", "SENATORS", "ALL",
    ]
    .into_iter()
    .collect();
}

/// Check a candidate heading against the vocabulary. Case-insensitive;
/// accepts exact matches and substring matches in either direction, so
/// "FIRST PLEBEIAN" validates via "FIRST" and "PLEBEIAN" both.
pub fn is_valid_speaker(candidate: &str) -> bool {
    let name = candidate.trim().to_uppercase();
    if name.is_empty() {
        return false;
    }
    CHARACTERS
        .iter()
        .any(|known| name.contains(known) || known.contains(name.as_str()))
}
