// src/lib.rs
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod sources;
pub mod util;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::{Enricher, NoteWriter, Pipeline};
use crate::cli::{Args, SourceKind};
use crate::domain::ConfigError;
use crate::infrastructure::{AnkiConnectClient, ChatCompletionClient, Config, TodoistClient};
use crate::sources::{CsvSource, SentenceSource, TextFileSource, TodoistSource};

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting ankimine with arguments");

    let config = Config::from_env()?;
    let batch_tags = args.batch_tags();

    // Fail on missing secrets before touching the network.
    let source = build_source(&args, &config)?;
    let llm = ChatCompletionClient::new(
        &config.llm_base_url,
        config.require_llm_key()?,
        &config.llm_model,
    )?;
    let store = AnkiConnectClient::new(&config.ankiconnect_url, &config.deck, &config.note_type)?;

    store
        .ensure_ready()
        .context("AnkiConnect is not available. Is Anki running with the AnkiConnect add-on?")?;

    let pipeline = Pipeline::new(
        Enricher::new(llm, config.retry),
        NoteWriter::new(store, config.retry),
    );

    let summary = pipeline.run(&source, &batch_tags)?;
    info!(
        fetched = summary.fetched,
        created = summary.created,
        overwritten = summary.overwritten,
        appended = summary.appended,
        skipped = summary.skipped,
        "Sentence mining finished"
    );
    Ok(())
}

fn build_source(args: &Args, config: &Config) -> Result<SentenceSource> {
    match args.source {
        SourceKind::Todoist => {
            let client = TodoistClient::new(config.require_todoist_key()?)?;
            Ok(SentenceSource::Todoist(TodoistSource::new(
                client,
                config.todoist_project.clone(),
                config.review_label.clone(),
            )))
        }
        SourceKind::Csv => {
            let path = args.csv_file.clone().ok_or(ConfigError::MissingPath {
                flag: "csv-file",
                source_kind: "csv",
            })?;
            Ok(SentenceSource::Csv(CsvSource::new(path)))
        }
        SourceKind::TextFile => {
            let path = args.text_file.clone().ok_or(ConfigError::MissingPath {
                flag: "text-file",
                source_kind: "text-file",
            })?;
            Ok(SentenceSource::TextFile(TextFileSource::new(path)))
        }
    }
}
