use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{AdvisorClient, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "sonar";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct PerplexityClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl PerplexityClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_perplexity_api_key()?.to_string();
        let base_url =
            std::env::var("PERPLEXITY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("PERPLEXITY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("PERPLEXITY_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("PERPLEXITY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }

    async fn chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> anyhow::Result<ChatCompletionResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("Perplexity request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Perplexity response body")?;
        if !status.is_success() {
            return Err(LlmDiagnosticsError {
                provider: Provider::Perplexity,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        serde_json::from_str::<ChatCompletionResponse>(&text)
            .with_context(|| format!("failed to decode Perplexity response JSON: {text}"))
    }
}

#[async_trait::async_trait]
impl AdvisorClient for PerplexityClient {
    fn provider(&self) -> Provider {
        Provider::Perplexity
    }

    async fn ask(&self, prompt: &str) -> anyhow::Result<String> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
        };

        let res = self.chat_completion(req).await?;
        match res.first_content() {
            Some(answer) if !answer.trim().is_empty() => Ok(answer),
            _ => Err(LlmDiagnosticsError {
                provider: Provider::Perplexity,
                stage: "content",
                detail: "response contained no message content".to_string(),
                raw_output: None,
            }
            .into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl ChatCompletionResponse {
    fn first_content(&self) -> Option<String> {
        self.choices
            .first()?
            .message
            .as_ref()
            .map(|m| m.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_first_choice_content() {
        let v = json!({
            "id": "resp_1",
            "model": "sonar",
            "created": 1700000000,
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "1. AAPL\n..."}}
            ]
        });

        let res: ChatCompletionResponse = serde_json::from_value(v).unwrap();
        assert_eq!(res.first_content().as_deref(), Some("1. AAPL\n..."));
    }

    #[test]
    fn missing_choices_yield_no_content() {
        let res: ChatCompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert!(res.first_content().is_none());

        let res: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"index": 0}]})).unwrap();
        assert!(res.first_content().is_none());
    }
}
