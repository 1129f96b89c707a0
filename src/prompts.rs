//! Prompt Assembly
//!
//! Formats retrieved chunks into a citable context block and wraps it with
//! the scholar persona prompt. Consumed by the answer-generation
//! collaborator; nothing here calls a model.

use crate::retrieval::RetrievedChunk;

pub const SYSTEM_PROMPT: &str = r#"You are an Expert Shakespearean Scholar specializing in William Shakespeare's "The Tragedy of Julius Caesar."

YOUR CONSTRAINTS:
1. ONLY use information from the provided context
2. ALWAYS cite your sources with Act, Scene, and Speaker
3. If the context doesn't contain the answer, say "I cannot find that information in the provided text from the play"
4. Never make up quotes or events
5. Provide textual evidence for every claim

FORMAT YOUR CITATIONS:
Example: "As Brutus says in Act 2, Scene 1: 'It must be by his death...'"
Example: "In Act 3, Scene 2, Antony addresses the crowd...""#;

/// Format retrieved chunks into numbered, attributed context blocks.
pub fn create_context_from_chunks(chunks: &[RetrievedChunk]) -> String {
    let mut parts = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let act = chunk.metadata["act"].as_i64().map(|a| a.to_string());
        let scene = chunk.metadata["scene"].as_i64().map(|s| s.to_string());
        let speaker = chunk.metadata["speaker"].as_str().unwrap_or("Unknown");
        parts.push(format!(
            "[Source {}] Act {}, Scene {} - {}:\n{}\n",
            i + 1,
            act.as_deref().unwrap_or("Unknown"),
            scene.as_deref().unwrap_or("Unknown"),
            speaker,
            chunk.text,
        ));
    }
    parts.join("\n")
}

/// Assemble the full prompt handed to the answer generator.
pub fn create_rag_prompt(context: &str, question: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nCONTEXT FROM THE PLAY:\n{context}\n\nSTUDENT'S QUESTION:\n{question}\n\nYOUR ANSWER (with proper citations):"
    )
}
