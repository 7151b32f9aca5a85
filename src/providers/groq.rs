use anyhow::{Result, Context, anyhow};
use async_trait::async_trait;
use log::{debug, error};
use serde::Deserialize;
use std::env;

use crate::llm_manager::LLMProvider;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Deserialize)]
struct GroqError {
    error: GroqErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GroqErrorDetails {
    message: String,
}

/// Error for a non-success reply, using the API's message when the body has one.
fn api_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<GroqError>(body) {
        Ok(parsed) => anyhow!("Groq API error: {}", parsed.error.message),
        Err(_) => anyhow!("Groq API error (status {}): {}", status, body),
    }
}

#[derive(Debug, Clone)]
pub struct GroqProvider {
    pub model: String,
    pub temperature: f32,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(model: Option<String>, temperature: Option<f32>, base_url: Option<String>) -> Result<Self> {
        let api_key = env::var("GROQ_API_KEY")
            .context("GROQ_API_KEY environment variable not set")?;
        Ok(Self {
            model: model.unwrap_or_else(|| "llama3-8b-8192".to_string()),
            temperature: temperature.unwrap_or(0.0),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    fn name(&self) -> &str { "groq" }
    fn model_name(&self) -> &str { &self.model }

    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let req_body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "system", "content": prompt}],
            "temperature": self.temperature,
        });
        debug!("Sending classification prompt to Groq model {}", self.model);
        let resp = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await
            .context("Failed to send request to Groq")?;
        let status = resp.status();
        let body = resp.text().await.context("Failed to read Groq response")?;
        if !status.is_success() {
            error!("Groq API error (status {})", status);
            return Err(api_error(status, &body));
        }
        let json: serde_json::Value = serde_json::from_str(&body).context("Failed to parse Groq response")?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("No content in Groq response"))?;
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_body_message_is_reported() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let err = api_error(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.to_string(), "Groq API error: Invalid API Key");
    }

    #[test]
    fn test_unstructured_error_body_is_kept() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream unavailable");
        let message = err.to_string();
        assert!(message.contains("502"));
        assert!(message.ends_with("upstream unavailable"));
    }
}
