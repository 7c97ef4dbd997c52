use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AppConfig, COMPLETION_MAX_TOKENS, COMPLETION_TEMPERATURE};
use crate::models::message::ChatMessage;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request to the model endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response from the model endpoint: {0}")]
    Malformed(String),
}

impl LlmError {
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, LlmError::Api { status: 429, .. })
    }
}

/// Chat-completion seam. The Azure client implements this; tests
/// substitute fakes so the composer runs without network access.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Maps a non-success response to an `LlmError`, pulling the message
/// out of the Azure error body when one is present.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Azure OpenAI client. Deployments are addressed in the URL path and
/// authenticated with the `api-key` header.
#[derive(Clone)]
pub struct AzureOpenAiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<AppConfig>,
}

impl AzureOpenAiClient {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(AzureOpenAiClient { http, config })
    }

    pub(crate) fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        let base = self.config.endpoint.as_str().trim_end_matches('/');
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            base, deployment, operation, self.config.api_version
        )
    }
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = self.deployment_url(&self.config.deployment_name, "chat/completions");
        let request = ChatCompletionRequest {
            messages,
            temperature: COMPLETION_TEMPERATURE,
            max_tokens: COMPLETION_MAX_TOKENS,
        };

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::Malformed("no completion choices returned".to_string()))
    }
}
