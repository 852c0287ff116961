// src/domain/mod.rs
pub mod error;
pub mod note;
pub mod sentence;

pub use error::{
    CompletionError, ConfigError, EnrichError, FetchError, LlmError, StoreError, WriteError,
};
pub use note::{NewNote, NoteKey, NoteOutcome, StoredNote};
pub use sentence::{EnrichedSentence, SourceSentence};
