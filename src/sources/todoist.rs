// src/sources/todoist.rs
use tracing::debug;

use crate::domain::{CompletionError, FetchError, SourceSentence};
use crate::infrastructure::todoist::TodoistClient;

/// Sentences from active tasks of a Todoist project: task content carries
/// the word, the description the context sentence, labels become tags.
pub struct TodoistSource {
    client: TodoistClient,
    project: String,
    review_label: String,
}

impl TodoistSource {
    pub fn new(client: TodoistClient, project: String, review_label: String) -> Self {
        Self {
            client,
            project,
            review_label,
        }
    }

    pub fn fetch(&self) -> Result<Vec<SourceSentence>, FetchError> {
        let tasks = self.client.project_tasks(&self.project)?;

        let sentences: Vec<SourceSentence> = tasks
            .into_iter()
            .map(|task| {
                let mut tags: Vec<String> = task
                    .labels
                    .iter()
                    .map(|label| format!("TaskLabel::{label}"))
                    .collect();
                tags.push("Type::Todoist".to_string());

                SourceSentence {
                    id: task.id,
                    entry_text: task.content,
                    sentence: task.description,
                    tags,
                }
            })
            .collect();

        debug!(count = sentences.len(), project = %self.project, "Fetched Todoist tasks");
        Ok(sentences)
    }

    pub fn mark_complete(&self, id: &str) -> Result<(), CompletionError> {
        self.client.close_task(id)
    }

    /// Adds the review label without touching the task's other labels.
    pub fn flag_for_review(&self, id: &str) -> Result<(), CompletionError> {
        self.client.add_label(id, &self.review_label)
    }
}
