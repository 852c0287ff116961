// src/application/pipeline.rs
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::enricher::{Enricher, LanguageModel};
use crate::application::note_writer::{NoteStore, NoteWriter};
use crate::domain::{FetchError, NoteOutcome, StoreError, WriteError};
use crate::sources::SentenceSource;

/// Failures that end a run. Per-item failures never show up here; they are
/// logged, the item is flagged for review, and the batch continues.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The flashcard store stopped answering mid-run, even after retries.
    /// Items already written stay written; the rest wait for the next run.
    #[error("Flashcard store became unavailable: {0}")]
    StoreUnavailable(StoreError),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub fetched: usize,
    pub created: usize,
    pub overwritten: usize,
    pub appended: usize,
    pub skipped: usize,
}

/// Drives fetch, enrich, write, mark-complete for one batch, sequentially
/// and in order. No state is shared across items except the batch tag set.
pub struct Pipeline<L: LanguageModel, S: NoteStore> {
    enricher: Enricher<L>,
    writer: NoteWriter<S>,
}

impl<L: LanguageModel, S: NoteStore> Pipeline<L, S> {
    pub fn new(enricher: Enricher<L>, writer: NoteWriter<S>) -> Self {
        Self { enricher, writer }
    }

    pub fn run(
        &self,
        source: &SentenceSource,
        batch_tags: &[String],
    ) -> Result<RunSummary, PipelineError> {
        let items = source.fetch()?;
        let mut summary = RunSummary {
            fetched: items.len(),
            ..RunSummary::default()
        };

        if items.is_empty() {
            info!("No sentences found in the data source");
            return Ok(summary);
        }
        info!(count = items.len(), "Processing mined sentences");

        for item in &items {
            info!(id = %item.id, entry = %item.entry_text, "Processing item");

            let enriched = match self.enricher.enrich(item) {
                Ok(enriched) => enriched,
                Err(err) => {
                    warn!(id = %item.id, %err, "Enrichment failed, skipping item");
                    self.flag(source, &item.id);
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.writer.write(&enriched, batch_tags) {
                Ok(NoteOutcome::Created) => summary.created += 1,
                Ok(NoteOutcome::Overwritten) => summary.overwritten += 1,
                Ok(NoteOutcome::Appended) => summary.appended += 1,
                Err(WriteError::Store(err)) if err.is_transient() => {
                    error!(id = %item.id, %err, "Flashcard store unreachable, aborting run");
                    return Err(PipelineError::StoreUnavailable(err));
                }
                Err(err) => {
                    warn!(id = %item.id, %err, "Note write failed, skipping item");
                    self.flag(source, &item.id);
                    summary.skipped += 1;
                    continue;
                }
            }

            // The note exists now; a completion failure must not undo it.
            // The item may be reprocessed next run, which the duplicate
            // policy absorbs.
            if let Err(err) = source.mark_complete(&item.id) {
                error!(id = %item.id, %err, "Failed to mark item complete");
            }
        }

        info!(
            fetched = summary.fetched,
            created = summary.created,
            overwritten = summary.overwritten,
            appended = summary.appended,
            skipped = summary.skipped,
            "Run finished"
        );
        Ok(summary)
    }

    fn flag(&self, source: &SentenceSource, id: &str) {
        if let Err(err) = source.flag_for_review(id) {
            error!(id, %err, "Failed to flag item for review");
        }
    }
}
