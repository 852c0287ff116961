// src/domain/sentence.rs
use serde::Serialize;

/// A sentence mined from a data source, decoupled from where it came from.
/// Immutable once produced; consumed exactly once by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSentence {
    pub id: String,
    pub entry_text: String,
    pub sentence: String,
    pub tags: Vec<String>,
}

/// A `SourceSentence` after enrichment: the extracted word, the
/// model-generated definition, and the cloze-ready sentences in note order
/// (the original context first, the generated example last, empties
/// dropped).
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedSentence {
    pub source: SourceSentence,
    pub word: String,
    pub definition: String,
    pub sentences: Vec<String>,
}
