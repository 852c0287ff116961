// src/sources/text_file.rs
use std::path::PathBuf;

use regex::Regex;
use tracing::debug;

use crate::domain::{FetchError, SourceSentence};

/// Sentences from a plain text file, one per non-empty line. The word to
/// learn is delimited with `**word**`; the line with the markers removed
/// becomes the context sentence.
pub struct TextFileSource {
    path: PathBuf,
}

impl TextFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn fetch(&self) -> Result<Vec<SourceSentence>, FetchError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;

        let bold = Regex::new(r"\*\*([^*]+?)\*\*").unwrap();

        let sentences: Vec<SourceSentence> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                let line = line.trim();
                SourceSentence {
                    id: format!("textfile-{}", index + 1),
                    entry_text: line.to_string(),
                    sentence: bold.replace_all(line, "$1").into_owned(),
                    tags: vec!["Type::TextFile".to_string()],
                }
            })
            .collect();

        debug!(count = sentences.len(), path = %self.path.display(), "Read text file source");
        Ok(sentences)
    }
}
