// src/cli/args.rs
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Args {
    /// Data source to mine sentences from
    #[arg(long, value_enum, default_value_t = SourceKind::Todoist)]
    pub source: SourceKind,

    /// Path to the CSV file (required with --source csv)
    #[arg(long, value_name = "PATH")]
    pub csv_file: Option<PathBuf>,

    /// Path to the text file (required with --source text-file)
    #[arg(long, value_name = "PATH")]
    pub text_file: Option<PathBuf>,

    /// Comma-separated tags applied to every note touched in this run
    /// (e.g. "Topic::Literature,Critical")
    #[arg(short, long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Todoist,
    Csv,
    #[value(alias = "text_file")]
    TextFile,
}

impl Args {
    /// The run-level tag set, parsed from the CLI.
    pub fn batch_tags(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}
