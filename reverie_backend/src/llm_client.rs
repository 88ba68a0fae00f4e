use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Anything that can turn a list of role-tagged messages into one completion.
///
/// The engine only ever needs this single capability, so retry and fallback
/// policy lives with the callers rather than behind this trait.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: Option<SamplingOptions>,
    ) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Optional sampling knobs forwarded to the provider. Unset fields are omitted
/// from the request so the provider's own defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(flatten)]
    sampling: SamplingOptions,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client (Ollama, LM Studio, vLLM, OpenAI, etc.)
#[derive(Clone)]
pub struct LlmClient {
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            api_url,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_url: config.llm_api_url.clone(),
            api_key: config.llm_api_key.clone().unwrap_or_default(),
            model: config.llm_model.clone(),
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }

    /// Generate a completion with a specific model
    pub async fn generate_with_model(
        &self,
        messages: Vec<Message>,
        model: &str,
        options: Option<SamplingOptions>,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            sampling: options.unwrap_or_default(),
        };

        let mut req = self.client.post(self.completions_url()).json(&request);

        // Local models don't need a key
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = req.send().await.context("Failed to send LLM request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            anyhow::bail!("LLM API returned error {}: {}", status, body);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No response from LLM"))?
            .message
            .content
            .unwrap_or_default();

        tracing::debug!(model, chars = content.len(), "LLM completion received");
        Ok(content)
    }
}

#[async_trait]
impl Oracle for LlmClient {
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: Option<SamplingOptions>,
    ) -> Result<String> {
        self.generate_with_model(messages, &self.model, options)
            .await
    }
}
