use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedBody(err.to_string())
    }
}

/// Result of an `/ask` call the server actually answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskReply {
    /// 2xx with the assistant's reply text
    Answer(String),
    /// Non-2xx; `error` is the server's message when it sent one
    Rejected { status: u16, error: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub agent: String,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct AskResponseBody {
    response: Option<String>,
    error: Option<String>,
}

/// Validate an `/ask` response into an [`AskReply`]
pub fn decode_ask(status: u16, body: &str) -> Result<AskReply, ApiError> {
    let body: AskResponseBody = serde_json::from_str(body)?;
    if (200..300).contains(&status) {
        body.response.map(AskReply::Answer).ok_or_else(|| {
            ApiError::MalformedBody("success response without a `response` field".to_string())
        })
    } else {
        Ok(AskReply::Rejected {
            status,
            error: body.error,
        })
    }
}

/// The fortune-telling backend as seen by the session controller
#[async_trait]
pub trait FortuneBackend: Send + Sync + 'static {
    async fn ask(&self, message: &str) -> Result<AskReply, ApiError>;

    /// Resolves `Ok` for any HTTP response; only transport failure is an error
    async fn reset(&self) -> Result<(), ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

#[derive(Clone)]
pub struct FortuneClient {
    client: Client,
    base_url: String,
}

impl FortuneClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // The server keys the conversation on a session cookie
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FortuneBackend for FortuneClient {
    async fn ask(&self, message: &str) -> Result<AskReply, ApiError> {
        let url = format!("{}/ask", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { message })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_ask(status, &body)
    }

    async fn reset(&self) -> Result<(), ApiError> {
        let url = format!("{}/reset", self.base_url);

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "reset answered with a non-success status");
        }
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
