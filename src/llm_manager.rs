use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};

use crate::config::{Config, ProviderKind};
use crate::intent;
use crate::providers::groq::GroqProvider;
use crate::providers::ollama::OllamaProvider;
use crate::providers::openai::OpenAIProvider;

/// Trait representing an LLM provider.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Name of the provider.
    fn name(&self) -> &str;

    /// Send a prompt to the provider and return the response.
    async fn send_prompt(&self, prompt: &str) -> Result<String>;

    /// Model name of the provider.
    fn model_name(&self) -> &str {
        "Unknown"
    }
}

/// Offline provider used when no remote LLM is available.
///
/// Answers classification prompts with the keyword rule table, so the LLM
/// strategy still works without network access.
pub struct LocalProvider;

#[async_trait]
impl LLMProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let utterance = prompt
            .lines()
            .find_map(|line| line.trim().strip_prefix("User input:"))
            .map(|rest| rest.trim().trim_matches('"'))
            .unwrap_or(prompt);
        Ok(intent::classify(utterance).to_string())
    }

    fn model_name(&self) -> &str {
        "rules"
    }
}

/// Manager that keeps track of the configured providers.
pub struct LLMManager {
    providers: Vec<Box<dyn LLMProvider>>,
}

impl LLMManager {
    /// Create a new manager with the given providers.
    pub fn new(providers: Vec<Box<dyn LLMProvider>>) -> Self {
        Self { providers }
    }

    /// Build the provider selected in the configuration, falling back to the
    /// offline provider when it cannot be constructed.
    pub fn from_config(config: &Config) -> Self {
        let kind = config.classifier.provider;
        let settings = config.provider_config(kind);
        let model = settings.map(|s| s.model.clone());
        let temperature = settings.and_then(|s| s.temperature);
        let base_url = settings.and_then(|s| s.base_url.clone());

        let built: Result<Box<dyn LLMProvider>> = match kind {
            ProviderKind::Groq => GroqProvider::new(model, temperature, base_url)
                .map(|p| Box::new(p) as Box<dyn LLMProvider>),
            ProviderKind::OpenAI => OpenAIProvider::new(model, temperature, base_url)
                .map(|p| Box::new(p) as Box<dyn LLMProvider>),
            ProviderKind::Ollama => OllamaProvider::new(model, temperature, base_url)
                .map(|p| Box::new(p) as Box<dyn LLMProvider>),
            ProviderKind::Local => Ok(Box::new(LocalProvider) as Box<dyn LLMProvider>),
        };

        let provider: Box<dyn LLMProvider> = match built {
            Ok(provider) => provider,
            Err(e) => {
                warn!("Could not set up {:?} provider, using offline rules instead: {:#}", kind, e);
                Box::new(LocalProvider)
            }
        };
        info!("Using provider {}/{}", provider.name(), provider.model_name());

        Self::new(vec![provider])
    }

    /// Get the active provider.
    pub fn provider(&self) -> Option<&dyn LLMProvider> {
        self.providers.first().map(|p| &**p)
    }

    /// Send a prompt to the first available provider.
    pub async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let provider = self
            .provider()
            .ok_or_else(|| anyhow::anyhow!("No providers available"))?;
        provider.send_prompt(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_provider_reads_user_input_line() {
        let prompt = "Identify the intent.\n\nUser input: \"What's the weather in Paris?\"\n";
        let reply = LocalProvider.send_prompt(prompt).await.unwrap();
        assert_eq!(reply, "get_weather");
    }

    #[tokio::test]
    async fn test_empty_manager_errors() {
        let manager = LLMManager::new(Vec::new());
        assert!(manager.send_prompt("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_local_selection() {
        let mut config = Config::default();
        config.classifier.provider = ProviderKind::Local;
        let manager = LLMManager::from_config(&config);
        assert_eq!(manager.provider().unwrap().name(), "local");
        assert_eq!(manager.send_prompt("hey there").await.unwrap(), "greeting");
    }
}
