use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use log::warn;

use crate::llm_manager::LLMProvider;

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    choices: Vec<OllamaChoice>,
}

#[derive(Debug, Deserialize)]
struct OllamaChoice {
    message: OllamaMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: OllamaErrorDetails,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Ollama local LLM provider implementation
pub struct OllamaProvider {
    model: String,
    base_url: String,
    client: Client,
    temperature: f32,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default settings
    pub fn new(
        model: Option<String>,
        temperature: Option<f32>,
        base_url: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            model: model.unwrap_or_else(|| "llama3.2".to_string()),
            base_url: base_url.unwrap_or_else(|| "http://localhost:11434".to_string()),
            client: Client::new(),
            temperature: temperature.unwrap_or(0.0),
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            messages: vec![OllamaMessage {
                role: "system".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<OllamaError>(&response_text) {
                return Err(anyhow!(
                    "Ollama API error: {} (type: {:?})",
                    error_response.error.message,
                    error_response.error.error_type
                ));
            }
            return Err(anyhow!(
                "Ollama API error (status {}): {}",
                status,
                response_text
            ));
        }

        let api_response: OllamaResponse = serde_json::from_str(&response_text)
            .context("Failed to parse Ollama API response")?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No choices in Ollama response"))?;
        if let Some(reason) = choice.finish_reason.as_deref().filter(|r| *r != "stop") {
            warn!("Ollama response finished with reason: {}", reason);
        }
        Ok(choice.message.content.trim().to_string())
    }
}
