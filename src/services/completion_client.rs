use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling knobs forwarded to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    pub max_tokens: u32,
}

impl SamplingConfig {
    /// Diverse batches for over-generation.
    pub fn generation() -> Self {
        Self {
            temperature: 0.6,
            top_p: Some(0.95),
            frequency_penalty: Some(0.5),
            presence_penalty: Some(0.5),
            max_tokens: 2000,
        }
    }

    pub fn corrective() -> Self {
        Self {
            temperature: 0.0,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            max_tokens: 1500,
        }
    }

    pub fn grading() -> Self {
        Self {
            temperature: 0.0,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            max_tokens: 800,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the first choice's text, or `None` when the service produced no choice.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        sampling: SamplingConfig,
    ) -> Result<Option<String>>;
}

/// Chat-completions client for OpenAI and API-compatible proxies.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    #[serde(flatten)]
    sampling: SamplingConfig,
}

#[derive(Deserialize)]
struct RespChoiceMsg {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RespChoice {
    message: Option<RespChoiceMsg>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<RespChoice>,
}

impl OpenAiCompletionClient {
    pub fn new(
        client: Client,
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
            model: model.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        sampling: SamplingConfig,
    ) -> Result<Option<String>> {
        let api_key = self.api_key.as_deref().ok_or(Error::CredentialMissing)?;

        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system_prompt,
                },
                Msg {
                    role: "user",
                    content: user_prompt,
                },
            ],
            sampling,
        };

        tracing::debug!(
            model = %self.model,
            temperature = sampling.temperature,
            max_tokens = sampling.max_tokens,
            "Sending chat completion request"
        );

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&req)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Completion service returned an error");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = res.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);

        if let Some(text) = &content {
            tracing::debug!(
                "Assistant content (truncated): {}",
                text.chars().take(1000).collect::<String>().replace('\n', " ")
            );
        }
        Ok(content)
    }
}
