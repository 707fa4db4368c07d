use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExchangeError;
use crate::state::{Message, Role};

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
}

/// What the chat endpoint answers with. Extra fields are ignored; a `role`
/// outside the known variants fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reply {
    pub role: Role,
    pub content: String,
}

/// HTTP client for the remote chat endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the whole conversation and wait for the assistant's reply.
    ///
    /// No timeout is applied here; the call resolves when the transport does.
    pub async fn send(&self, messages: &[Message]) -> Result<Reply, ExchangeError> {
        info!(endpoint = %self.endpoint, messages = messages.len(), "sending conversation");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status));
        }

        let body = response.bytes().await?;
        let reply: Reply = serde_json::from_slice(&body)?;
        debug!(role = reply.role.as_str(), chars = reply.content.len(), "reply received");
        Ok(reply)
    }
}
