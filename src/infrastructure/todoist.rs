// src/infrastructure/todoist.rs
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::{CompletionError, FetchError};

const DEFAULT_BASE_URL: &str = "https://api.todoist.com/rest/v2";

/// Thin blocking client for the Todoist REST API.
pub struct TodoistClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Project {
    id: String,
    name: String,
}

impl TodoistClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Active tasks of the named project.
    pub fn project_tasks(&self, project_name: &str) -> Result<Vec<Task>, FetchError> {
        let projects: Vec<Project> = self.get("/projects")?;
        let project = projects
            .into_iter()
            .find(|p| p.name == project_name)
            .ok_or_else(|| FetchError::ProjectNotFound(project_name.to_string()))?;

        debug!(project_id = %project.id, "Resolved Todoist project");
        self.get(&format!("/tasks?project_id={}", project.id))
    }

    pub fn close_task(&self, id: &str) -> Result<(), CompletionError> {
        self.post_empty(&format!("/tasks/{id}/close"))
            .map_err(|err| CompletionError::Api {
                id: id.to_string(),
                message: err.to_string(),
            })?;
        info!(id, "Closed Todoist task");
        Ok(())
    }

    /// Add a label to a task, keeping the labels it already has.
    pub fn add_label(&self, id: &str, label: &str) -> Result<(), CompletionError> {
        let to_completion = |err: FetchError| CompletionError::Api {
            id: id.to_string(),
            message: err.to_string(),
        };

        let task: Task = self.get(&format!("/tasks/{id}")).map_err(to_completion)?;
        if task.labels.iter().any(|l| l == label) {
            debug!(id, label, "Task already carries the label");
            return Ok(());
        }

        let mut labels = task.labels;
        labels.push(label.to_string());

        self.http
            .post(format!("{}/tasks/{id}", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "labels": labels }))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| CompletionError::Api {
                id: id.to_string(),
                message: err.to_string(),
            })?;
        info!(id, label, "Labeled Todoist task");
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| FetchError::Api(err.to_string()))?
            .json()
            .map_err(|err| FetchError::Api(err.to_string()))
    }

    fn post_empty(&self, path: &str) -> Result<(), reqwest::Error> {
        self.http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .and_then(|r| r.error_for_status())
            .map(|_| ())
    }
}
