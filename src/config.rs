use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};

/// Main configuration structure for mini_assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Intent classification configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// AI provider configurations, used by the LLM strategy
    #[serde(default)]
    pub ai_providers: AIProvidersConfig,

    /// Terminal display configuration
    #[serde(default)]
    pub ui: UIConfig,
}

/// Which classifier decides the intent of each utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierStrategy {
    /// Ordered keyword and phrase rules
    Rules,
    /// Remote or local language model
    Llm,
}

/// Backend for the LLM strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAI,
    Ollama,
    /// Offline provider answering with the rule table
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// "rules" or "llm"
    #[serde(default = "default_strategy")]
    pub strategy: ClassifierStrategy,

    /// Provider used when the strategy is "llm"
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AIProvidersConfig {
    /// Groq configuration
    pub groq: Option<ProviderConfig>,

    /// OpenAI configuration
    pub openai: Option<ProviderConfig>,

    /// Ollama configuration
    pub ollama: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Model to use
    pub model: String,

    /// Temperature setting
    pub temperature: Option<f32>,

    /// Override for the API endpoint
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Enable colorful output
    #[serde(default = "default_colorful")]
    pub colorful: bool,

    /// First line printed by the agent
    #[serde(default = "default_banner")]
    pub banner: String,
}

// Default value functions
fn default_strategy() -> ClassifierStrategy { ClassifierStrategy::Rules }
fn default_provider() -> ProviderKind { ProviderKind::Groq }
fn default_colorful() -> bool { true }
fn default_banner() -> String {
    "Hi! I am your mini assistant. How can I help you today?".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            strategy: default_strategy(),
            provider: default_provider(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        UIConfig {
            colorful: default_colorful(),
            banner: default_banner(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            classifier: ClassifierConfig::default(),
            ai_providers: AIProvidersConfig {
                groq: Some(ProviderConfig {
                    model: "llama3-8b-8192".to_string(),
                    temperature: Some(0.0),
                    base_url: None,
                }),
                openai: Some(ProviderConfig {
                    model: "gpt-4o-mini".to_string(),
                    temperature: Some(0.0),
                    base_url: None,
                }),
                ollama: Some(ProviderConfig {
                    model: "llama3.2".to_string(),
                    temperature: Some(0.0),
                    base_url: None,
                }),
            },
            ui: UIConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    /// Load configuration from command line argument or default locations
    pub fn load(config_path: &Option<String>) -> Result<Self> {
        if let Some(path) = config_path {
            let expanded_path = shellexpand::tilde(path);
            return Self::from_file(&*expanded_path);
        }

        // Try loading from default locations
        let default_paths = vec![
            "mini_assistant.toml",
            ".mini_assistant.toml",
            "~/.config/mini_assistant/config.toml",
        ];

        for path in default_paths {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(&*expanded_path).exists() {
                match Self::from_file(&*expanded_path) {
                    Ok(config) => return Ok(config),
                    Err(e) => log::warn!("Failed to load config from {}: {:#}", path, e),
                }
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Merge with command-line arguments (CLI args take precedence)
    pub fn merge_with_args(&mut self, llm: bool, provider: Option<ProviderKind>, plain: bool) {
        if llm {
            self.classifier.strategy = ClassifierStrategy::Llm;
        }
        if let Some(provider) = provider {
            self.classifier.provider = provider;
        }
        if plain {
            self.ui.colorful = false;
        }
    }

    /// Settings for the given provider, if configured
    pub fn provider_config(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        match kind {
            ProviderKind::Groq => self.ai_providers.groq.as_ref(),
            ProviderKind::OpenAI => self.ai_providers.openai.as_ref(),
            ProviderKind::Ollama => self.ai_providers.ollama.as_ref(),
            ProviderKind::Local => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [classifier]
            strategy = "llm"

            [ai_providers.openai]
            model = "gpt-4o"
            "#,
        )
        .unwrap();

        assert_eq!(config.classifier.strategy, ClassifierStrategy::Llm);
        assert_eq!(config.classifier.provider, ProviderKind::Groq);
        assert_eq!(config.provider_config(ProviderKind::OpenAI).unwrap().model, "gpt-4o");
        assert!(config.provider_config(ProviderKind::Groq).is_none());
        assert!(config.ui.colorful);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.merge_with_args(true, Some(ProviderKind::Ollama), true);
        assert_eq!(config.classifier.strategy, ClassifierStrategy::Llm);
        assert_eq!(config.classifier.provider, ProviderKind::Ollama);
        assert!(!config.ui.colorful);
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("mini_assistant_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.classifier.provider = ProviderKind::OpenAI;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.classifier.provider, ProviderKind::OpenAI);
        assert_eq!(
            loaded.provider_config(ProviderKind::Groq).unwrap().model,
            "llama3-8b-8192"
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load(&Some("/nonexistent/mini_assistant.toml".to_string())).is_err());
    }
}
