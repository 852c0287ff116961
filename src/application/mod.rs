// src/application/mod.rs
pub mod cloze;
pub mod enricher;
pub mod note_writer;
pub mod pipeline;
pub mod tags;
pub mod word_extract;

pub use enricher::{Enricher, LanguageModel};
pub use note_writer::{NoteStore, NoteWriter};
pub use pipeline::{Pipeline, PipelineError, RunSummary};
