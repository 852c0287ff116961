// src/sources/mod.rs
pub mod csv_file;
pub mod text_file;
pub mod todoist;

use tracing::debug;

use crate::domain::{CompletionError, FetchError, SourceSentence};

pub use csv_file::CsvSource;
pub use text_file::TextFileSource;
pub use todoist::TodoistSource;

/// The closed set of data sources. Each produces a finite batch of
/// [`SourceSentence`]s and can mark an item as processed; for the read-only
/// file sources that marking is a no-op.
pub enum SentenceSource {
    Todoist(TodoistSource),
    Csv(CsvSource),
    TextFile(TextFileSource),
}

impl SentenceSource {
    pub fn fetch(&self) -> Result<Vec<SourceSentence>, FetchError> {
        match self {
            SentenceSource::Todoist(source) => source.fetch(),
            SentenceSource::Csv(source) => source.fetch(),
            SentenceSource::TextFile(source) => source.fetch(),
        }
    }

    /// Called only after the item's note has been written.
    pub fn mark_complete(&self, id: &str) -> Result<(), CompletionError> {
        match self {
            SentenceSource::Todoist(source) => source.mark_complete(id),
            SentenceSource::Csv(_) | SentenceSource::TextFile(_) => {
                debug!(id, "Read-only source, nothing to mark complete");
                Ok(())
            }
        }
    }

    /// Flag an item that failed processing so it can be reviewed manually.
    pub fn flag_for_review(&self, id: &str) -> Result<(), CompletionError> {
        match self {
            SentenceSource::Todoist(source) => source.flag_for_review(id),
            SentenceSource::Csv(_) | SentenceSource::TextFile(_) => {
                debug!(id, "Read-only source, review flag logged only");
                Ok(())
            }
        }
    }
}
