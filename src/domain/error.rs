// src/domain/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems, reported before any network call.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {var}: '{value}'")]
    InvalidVar { var: &'static str, value: String },
    #[error("--{flag} is required with --source {source_kind}")]
    MissingPath {
        flag: &'static str,
        source_kind: &'static str,
    },
}

/// A data source could not produce its batch of sentences.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("Task tracker request failed: {0}")]
    Api(String),
    #[error("Task tracker project not found: {0}")]
    ProjectNotFound(String),
}

/// Enrichment failed for one item; the item is skipped, never the batch.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("No word could be extracted from '{0}'")]
    NoWord(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// Failures talking to the text-generation endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Language model transport error: {0}")]
    Transport(String),
    #[error("Language model rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Malformed language model envelope: {0}")]
    Envelope(String),
    #[error("Language model returned an empty completion")]
    EmptyCompletion,
}

impl LlmError {
    /// Only network trouble and server-side errors are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Failures talking to the flashcard store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Flashcard store unreachable: {0}")]
    Unreachable(String),
    #[error("Flashcard store rejected '{action}': {message}")]
    Protocol { action: String, message: String },
    #[error("Malformed flashcard store response: {0}")]
    MalformedResponse(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unreachable(_))
    }
}

/// A note could not be written after the retry budget was spent.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Marking an item complete in its source failed. The note is already
/// written at this point; nothing is rolled back.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Failed to update task {id}: {message}")]
    Api { id: String, message: String },
}
