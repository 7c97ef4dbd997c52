use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::services::llm_service::{api_error, AzureOpenAiClient, LlmError};

/// Embedding seam, mirrors `ChatModel`.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingModel for AzureOpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = self.deployment_url(&self.config.embedding_deployment_name, "embeddings");

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.config.api_key)
            .json(&EmbeddingRequest { input: [text] })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: EmbeddingResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| LlmError::Malformed("no embedding data returned".to_string()))
    }
}
