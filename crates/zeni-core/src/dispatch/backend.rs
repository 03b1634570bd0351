//! Conversational backend client

use super::protocol::{ChatRequest, ChatResponse, ClearRequest, HealthResponse};
use crate::config::CallBudget;
use crate::error::TransportError;
use crate::types::SessionId;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// The remote side of the conversation.
///
/// Implementations must never panic on bad input from the network; every
/// failure is reported as a [`TransportError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and return the assistant reply.
    async fn send_message(&self, session: &SessionId, text: &str) -> Result<String, TransportError>;

    /// Liveness probe. Returns the backend's status string.
    async fn ping(&self) -> Result<String, TransportError>;

    /// Drop the server-side history for `session`.
    async fn clear(&self, session: &SessionId) -> Result<(), TransportError>;
}

/// HTTP/JSON implementation of [`ChatBackend`]
pub struct HttpBackend {
    base_url: String,
    chat_client: reqwest::Client,
    chat_budget: CallBudget,
    probe_client: reqwest::Client,
    probe_budget: CallBudget,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        chat_budget: CallBudget,
        probe_budget: CallBudget,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            chat_client: build_client(chat_budget)?,
            chat_budget,
            probe_client: build_client(probe_budget)?,
            probe_budget,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn build_client(budget: CallBudget) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .connect_timeout(budget.connect())
        .timeout(budget.total())
        .build()
        .map_err(|e| TransportError::ConnectionFailed(format!("Failed to build client: {}", e)))
}

fn map_send_error(err: reqwest::Error, budget: CallBudget) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(budget.total().as_millis() as u64)
    } else {
        TransportError::from(err)
    }
}

/// Check the status and decode a JSON body.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    budget: CallBudget,
) -> Result<T, TransportError> {
    let status = response.status();
    debug!("Response code: {}", status);
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| map_send_error(e, budget))?;
    serde_json::from_str(&body).map_err(|e| {
        warn!("Undecodable backend payload: {}", e);
        TransportError::MalformedResponse(e.to_string())
    })
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_message(&self, session: &SessionId, text: &str) -> Result<String, TransportError> {
        debug!("Sending message ({} chars)", text.chars().count());
        let response = self
            .chat_client
            .post(self.url("/chat"))
            .json(&ChatRequest {
                message: text,
                session_id: session.as_str(),
            })
            .send()
            .await
            .map_err(|e| map_send_error(e, self.chat_budget))?;

        let body: ChatResponse = decode(response, self.chat_budget).await?;
        Ok(body.reply)
    }

    async fn ping(&self) -> Result<String, TransportError> {
        let response = self
            .probe_client
            .get(self.url("/"))
            .send()
            .await
            .map_err(|e| map_send_error(e, self.probe_budget))?;

        let body: HealthResponse = decode(response, self.probe_budget).await?;
        Ok(body.status)
    }

    async fn clear(&self, session: &SessionId) -> Result<(), TransportError> {
        let response = self
            .probe_client
            .post(self.url("/clear"))
            .json(&ClearRequest {
                session_id: session.as_str(),
            })
            .send()
            .await
            .map_err(|e| map_send_error(e, self.probe_budget))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Status(status.as_u16()))
        }
    }
}
