// src/infrastructure/mod.rs
pub mod anki_connect;
pub mod config;
pub mod llm;
pub mod todoist;

pub use anki_connect::AnkiConnectClient;
pub use config::Config;
pub use llm::ChatCompletionClient;
pub use todoist::TodoistClient;
