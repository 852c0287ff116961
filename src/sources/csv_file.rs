// src/sources/csv_file.rs
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{FetchError, SourceSentence};

/// Sentences from a CSV file with header `id, entry_text, sentence, tags`.
/// `id` and `tags` are optional; tags are comma-separated inside the cell.
pub struct CsvSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    entry_text: String,
    #[serde(default)]
    sentence: String,
    #[serde(default)]
    tags: String,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn fetch(&self) -> Result<Vec<SourceSentence>, FetchError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut sentences = Vec::new();
        for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row_number = index + 1;
            let row = match record {
                Ok(row) => row,
                Err(err) => {
                    warn!(row = row_number, %err, "Skipping malformed CSV row");
                    continue;
                }
            };

            if row.entry_text.is_empty() || row.sentence.is_empty() {
                warn!(row = row_number, "Skipping CSV row missing entry_text or sentence");
                continue;
            }

            let id = if row.id.is_empty() {
                format!("csv-{row_number}")
            } else {
                row.id
            };

            let mut tags: Vec<String> = row
                .tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
            tags.push("Type::Csv".to_string());

            sentences.push(SourceSentence {
                id,
                entry_text: row.entry_text,
                sentence: row.sentence,
                tags,
            });
        }

        debug!(count = sentences.len(), path = %self.path.display(), "Read CSV source");
        Ok(sentences)
    }
}
