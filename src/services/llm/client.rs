use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::kernel::event::{CompletionDelivery, RequestId};

/// Body of `POST <endpoint>`. Sampling fields are omitted unless set,
/// so the default body is exactly `{"prompt": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion endpoint returned {status}")]
    Status { status: StatusCode, body: String },
}

/// Fire-and-forget client for the completion endpoint.
///
/// Every `send_async` produces exactly one `CompletionDelivery` on the
/// channel handed to `new`. No retries, no cancellation.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    tx: mpsc::Sender<CompletionDelivery>,
}

impl CompletionClient {
    /// `timeout = None` leaves the transport default in place (reqwest has none).
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
        tx: mpsc::Sender<CompletionDelivery>,
    ) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
            tx,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One blocking round trip. Non-2xx statuses are errors.
    pub async fn post(&self, request: &CompletionRequest) -> Result<String, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status { status, body });
        }
        Ok(body)
    }

    /// Returns immediately. The outcome arrives later on the delivery channel.
    /// Must be called from within a tokio runtime.
    pub fn send_async(&self, id: RequestId, request: CompletionRequest) -> JoinHandle<()> {
        let this = self.clone();

        tokio::spawn(async move {
            let delivery = match this.post(&request).await {
                Ok(body) => {
                    info!("Completion request {:?} was successful.", id);
                    CompletionDelivery::succeeded(id, body)
                }
                Err(ClientError::Status { status, body }) => {
                    warn!("Completion request {:?} failed with status {}", id, status);
                    CompletionDelivery::failed(id, body)
                }
                Err(e) => {
                    warn!("Completion request {:?} failed: {}", id, e);
                    CompletionDelivery::failed(id, String::new())
                }
            };

            // Receiver gone means the orchestrator was torn down mid-flight
            if this.tx.send(delivery).await.is_err() {
                debug!("Delivery channel closed, dropping result for {:?}", id);
            }
        })
    }
}
