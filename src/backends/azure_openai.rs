//! Azure OpenAI client: chat completions and embeddings against two
//! deployments of one resource, sharing a single HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::OpenAiConfig;
use crate::errors::BackendError;

use super::{CompletionBackend, CompletionRequest, EmbeddingBackend};

#[derive(Clone)]
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    deployment: String,
    embedding_deployment: String,
    api_version: String,
    client: Client,
}

impl AzureOpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            embedding_deployment: config.embedding_deployment.clone(),
            api_version: config.api_version.clone(),
            client,
        })
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint, deployment, operation, self.api_version
        )
    }

    async fn post(&self, url: String, payload: &Value) -> Result<Value, BackendError> {
        let response = self
            .client
            .post(url)
            .header("api-key", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let payload = json!({
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let url = self.deployment_url(&self.deployment, "chat/completions");
        let body = self.post(url, &payload).await?;

        extract_completion_text(&body)
    }
}

#[async_trait]
impl EmbeddingBackend for AzureOpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let payload = json!({ "input": text });

        let url = self.deployment_url(&self.embedding_deployment, "embeddings");
        let body = self.post(url, &payload).await?;

        extract_embedding(&body)
    }
}

fn extract_completion_text(body: &Value) -> Result<String, BackendError> {
    body.get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| BackendError::Malformed("missing choices[0].message.content".to_string()))
}

fn extract_embedding(body: &Value) -> Result<Vec<f32>, BackendError> {
    let values = body
        .get("data")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("embedding"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| BackendError::Malformed("missing data[0].embedding".to_string()))?;

    Ok(values
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect())
}
