//! Client for the remote task API.
//!
//! Each operation is one HTTP call. Failures are logged and handed back to
//! the caller as a [`TransportError`]; nothing here retries.

use crate::error::TransportError;
use crate::task::{Task, TaskCreate, TaskMove, TaskUpdate};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

/// Operations the board needs from the task backend.
#[async_trait]
pub trait TaskApi {
    /// All tasks, in any status and any order.
    async fn fetch_tasks(&self) -> Result<Vec<Task>, TransportError>;

    /// Create a task. The server assigns `id` and `order`.
    async fn create_task(&self, payload: &TaskCreate) -> Result<Task, TransportError>;

    /// Change title and/or description. Never touches status or order.
    async fn update_task(&self, id: &str, payload: &TaskUpdate) -> Result<Task, TransportError>;

    /// Change status and/or order.
    async fn move_task(&self, id: &str, payload: &TaskMove) -> Result<Task, TransportError>;

    async fn delete_task(&self, id: &str) -> Result<(), TransportError>;
}

/// [`TaskApi`] over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each percent-encoded as a single path segment.
    fn url(&self, operation: &str, segments: &[&str]) -> Result<Url, TransportError> {
        let invalid = |reason: String| {
            error!(operation, base_url = %self.base_url, %reason, "cannot build task API URL");
            TransportError::InvalidUrl {
                operation: operation.to_string(),
                base_url: self.base_url.clone(),
                reason,
            }
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Response, TransportError> {
        let response = request.send().await.map_err(|source| {
            error!(operation, error = %source, "task API request failed");
            TransportError::Network {
                operation: operation.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(operation, status = status.as_u16(), %body, "task API returned an error status");
            return Err(TransportError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = self.send(operation, request).await?;
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Network {
                operation: operation.to_string(),
                source,
            })?;
        serde_json::from_str(&body).map_err(|source| {
            error!(operation, error = %source, %body, "task API response did not decode");
            TransportError::Decode {
                operation: operation.to_string(),
                body,
                source,
            }
        })
    }
}

#[async_trait]
impl TaskApi for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_tasks(&self) -> Result<Vec<Task>, TransportError> {
        let operation = "fetch tasks";
        let url = self.url(operation, &["tasks"])?;
        let tasks: Vec<Task> = self.send_json(operation, self.client.get(url)).await?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    #[instrument(skip(self))]
    async fn create_task(&self, payload: &TaskCreate) -> Result<Task, TransportError> {
        let operation = "create task";
        let url = self.url(operation, &["tasks"])?;
        self.send_json(operation, self.client.post(url).json(payload))
            .await
    }

    #[instrument(skip(self))]
    async fn update_task(&self, id: &str, payload: &TaskUpdate) -> Result<Task, TransportError> {
        let operation = format!("update task {id}");
        let url = self.url(&operation, &["tasks", id])?;
        self.send_json(&operation, self.client.put(url).json(payload))
            .await
    }

    #[instrument(skip(self))]
    async fn move_task(&self, id: &str, payload: &TaskMove) -> Result<Task, TransportError> {
        let operation = format!("move task {id}");
        let url = self.url(&operation, &["tasks", id, "move"])?;
        self.send_json(&operation, self.client.patch(url).json(payload))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: &str) -> Result<(), TransportError> {
        let operation = format!("delete task {id}");
        let url = self.url(&operation, &["tasks", id])?;
        self.send(&operation, self.client.delete(url)).await?;
        Ok(())
    }
}
