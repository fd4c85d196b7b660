//! Task endpoints.

use crate::error::Result;
use crate::models::{NewTask, TaskItem, TaskPatch};
use crate::transport::AuthHttpClient;

use super::{expect_success, json_body, parse_json};

/// Typed access to `/tasks`.
pub struct TasksApi<'a> {
    http: &'a AuthHttpClient,
}

impl<'a> TasksApi<'a> {
    pub(crate) fn new(http: &'a AuthHttpClient) -> Self {
        Self { http }
    }

    /// List tasks, optionally scoped to one phase.
    pub async fn list(&self, phase_id: Option<&str>) -> Result<Vec<TaskItem>> {
        let path = match phase_id {
            Some(id) => format!("/tasks?phaseId={}", id),
            None => "/tasks".to_string(),
        };
        parse_json(self.http.get(&path).await?).await
    }

    /// Fetch a single task.
    pub async fn get(&self, id: &str) -> Result<TaskItem> {
        parse_json(self.http.get(&format!("/tasks/{}", id)).await?).await
    }

    /// Create a task.
    pub async fn create(&self, task: &NewTask) -> Result<TaskItem> {
        let body = json_body(task)?;
        parse_json(self.http.post_json("/tasks", &body).await?).await
    }

    /// Apply a partial update to a task.
    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<TaskItem> {
        let body = json_body(patch)?;
        parse_json(self.http.put_json(&format!("/tasks/{}", id), &body).await?).await
    }

    /// Delete a task.
    pub async fn delete(&self, id: &str) -> Result<()> {
        expect_success(self.http.delete(&format!("/tasks/{}", id)).await?).await
    }
}
