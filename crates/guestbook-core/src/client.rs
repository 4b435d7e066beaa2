//! Guestbook HTTP API: wire types shared with the server, and a client.

use crate::entry::Entry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path of the guestbook collection on the server.
pub const API_PATH: &str = "/api/guestbook";

/// Body of `POST /api/guestbook`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Successful reply to `POST /api/guestbook`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub entry: Entry,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached or the connection failed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server rejected request ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Operations the page needs from the guestbook server.
#[async_trait]
pub trait GuestbookApi: Send + Sync {
    /// Fetches the active log, newest first.
    async fn list(&self) -> Result<Vec<Entry>, ClientError>;

    /// Submits a new entry and returns it as stored.
    async fn submit(&self, name: Option<&str>, answer: &str) -> Result<Entry, ClientError>;
}

/// [`GuestbookApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    url: String,
}

impl HttpClient {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}{API_PATH}", base_url.trim_end_matches('/')),
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|b| b.error);
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl GuestbookApi for HttpClient {
    async fn list(&self) -> Result<Vec<Entry>, ClientError> {
        let response = self.http.get(&self.url).send().await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn submit(&self, name: Option<&str>, answer: &str) -> Result<Entry, ClientError> {
        let request = SubmitRequest {
            name: name.map(str::to_string),
            answer: Some(answer.to_string()),
        };
        let response = self.http.post(&self.url).json(&request).send().await?;
        let body = Self::read_body(response).await?;
        let parsed: SubmitResponse = serde_json::from_str(&body)?;
        if !parsed.success {
            return Err(ClientError::Rejected {
                status: 200,
                message: None,
            });
        }
        Ok(parsed.entry)
    }
}
