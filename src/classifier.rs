//! Intent classification strategies.
//!
//! Both strategies produce a [`Classification`]: the intent plus, for the
//! LLM strategy, an optional reply the model already wrote (a joke, the result
//! of a calculation) that the agent should print as is.

use async_trait::async_trait;
use log::{debug, warn};
use thiserror::Error;

use crate::intent::{self, Intent};
use crate::llm_manager::LLMManager;

/// Outcome of classifying one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub direct_response: Option<String>,
}

impl Classification {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            direct_response: None,
        }
    }

    pub fn with_response(intent: Intent, response: impl Into<String>) -> Self {
        let response = response.into();
        Self {
            intent,
            direct_response: (!response.trim().is_empty()).then_some(response),
        }
    }
}

/// Maps an utterance to an intent.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Classify the utterance. Never fails: anything unrecognized is
    /// [`Intent::Unknown`].
    async fn classify(&self, utterance: &str) -> Classification;
}

/// Ordered keyword rules.
#[derive(Debug, Default)]
pub struct RuleClassifier;

#[async_trait]
impl IntentClassifier for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    async fn classify(&self, utterance: &str) -> Classification {
        Classification::new(intent::classify(utterance))
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classification service failed: {0:#}")]
    Service(#[from] anyhow::Error),
    #[error("unexpected reply shape: {0:?}")]
    MalformedReply(String),
}

/// Words in the utterance that suggest arithmetic.
const CALCULATION_CUES: [&str; 7] = ["calculate", "what is", "solve", "+", "-", "*", "/"];

/// Delegates classification to a language model.
pub struct LlmClassifier {
    llm: LLMManager,
}

impl LlmClassifier {
    pub fn new(llm: LLMManager) -> Self {
        Self { llm }
    }

    fn build_prompt(utterance: &str) -> String {
        let labels = Intent::ALL
            .iter()
            .map(|intent| format!("'{}'", intent))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "You are an assistant for a CLI conversational agent.\n\n\
             Your tasks:\n\
             - Identify the user's intent from:\n  {}.\n\
             - If intent is 'tell_joke' or 'calculate', respond with the answer directly \
             (a joke or the calculated result) in the format:\n  intent: <your response>\n\
             - Otherwise, ONLY reply with the intent keyword and nothing else.\n\n\
             User input: \"{}\"\n",
            labels, utterance
        )
    }

    /// Read either "intent: response" or a bare intent keyword.
    pub fn parse_reply(reply: &str) -> Result<Classification, ClassifierError> {
        let content = reply.trim();
        if let Some((label, response)) = content.split_once(':') {
            if let Ok(intent) = label.parse::<Intent>() {
                return Ok(Classification::with_response(intent, response.trim()));
            }
        }
        content
            .parse::<Intent>()
            .map(Classification::new)
            .map_err(|_| ClassifierError::MalformedReply(content.to_string()))
    }

    /// Guess from the user's own words when the model reply is unusable.
    pub fn fallback(utterance: &str, reply: &str) -> Classification {
        let lowered = utterance.to_lowercase();
        if lowered.contains("joke") {
            Classification::with_response(Intent::TellJoke, reply.trim())
        } else if CALCULATION_CUES.iter().any(|cue| lowered.contains(cue)) {
            Classification::with_response(Intent::Calculate, reply.trim())
        } else {
            Classification::new(Intent::Unknown)
        }
    }

    async fn try_classify(&self, utterance: &str) -> Result<Classification, ClassifierError> {
        let reply = self.llm.send_prompt(&Self::build_prompt(utterance)).await?;
        debug!("Classifier reply: {:?}", reply);
        match Self::parse_reply(&reply) {
            Ok(classification) => Ok(classification),
            Err(e) => {
                warn!("{}; falling back to keyword heuristics", e);
                Ok(Self::fallback(utterance, &reply))
            }
        }
    }
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    async fn classify(&self, utterance: &str) -> Classification {
        match self.try_classify(utterance).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("{}", e);
                Classification::new(Intent::Unknown)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_manager::LLMProvider;

    struct ScriptedProvider {
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send_prompt(&self, _prompt: &str) -> anyhow::Result<String> {
            self.reply
                .map(str::to_string)
                .map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn scripted(reply: Result<&'static str, &'static str>) -> LlmClassifier {
        LlmClassifier::new(LLMManager::new(vec![Box::new(ScriptedProvider { reply })]))
    }

    #[tokio::test]
    async fn test_rule_classifier_has_no_direct_response() {
        let classification = RuleClassifier.classify("hello, what's the weather").await;
        assert_eq!(classification, Classification::new(Intent::Greeting));
    }

    #[test]
    fn test_parse_bare_keyword() {
        let parsed = LlmClassifier::parse_reply("  get_weather\n").unwrap();
        assert_eq!(parsed, Classification::new(Intent::GetWeather));
    }

    #[test]
    fn test_parse_intent_with_response() {
        let parsed = LlmClassifier::parse_reply("calculate: 2 + 2 = 4").unwrap();
        assert_eq!(parsed.intent, Intent::Calculate);
        assert_eq!(parsed.direct_response.as_deref(), Some("2 + 2 = 4"));

        let parsed = LlmClassifier::parse_reply("tell_joke:").unwrap();
        assert_eq!(parsed, Classification::new(Intent::TellJoke));
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(LlmClassifier::parse_reply("Sure! Here is a joke: ...").is_err());
        assert!(LlmClassifier::parse_reply("").is_err());
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back_to_joke() {
        let reply = "Why did the crab never share? Because he's shellfish.";
        let classification = scripted(Ok(reply)).classify("tell me a joke").await;
        assert_eq!(classification.intent, Intent::TellJoke);
        assert_eq!(classification.direct_response.as_deref(), Some(reply));
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back_to_calculate() {
        let classification = scripted(Ok("It is 42")).classify("what is 6 * 7").await;
        assert_eq!(classification.intent, Intent::Calculate);
        assert_eq!(classification.direct_response.as_deref(), Some("It is 42"));
    }

    #[tokio::test]
    async fn test_malformed_reply_without_cues_is_unknown() {
        let classification = scripted(Ok("I am not sure")).classify("sing me a song").await;
        assert_eq!(classification, Classification::new(Intent::Unknown));
    }

    #[tokio::test]
    async fn test_service_failure_is_unknown() {
        let classification = scripted(Err("connection refused")).classify("tell me a joke").await;
        assert_eq!(classification, Classification::new(Intent::Unknown));
    }

    #[tokio::test]
    async fn test_well_formed_reply() {
        let classification = scripted(Ok("ask_city")).classify("where do I live").await;
        assert_eq!(classification, Classification::new(Intent::AskCity));
    }

    #[test]
    fn test_prompt_lists_every_label() {
        let prompt = LlmClassifier::build_prompt("hi");
        for intent in Intent::ALL {
            assert!(prompt.contains(&format!("'{}'", intent)));
        }
        assert!(prompt.contains("User input: \"hi\""));
    }
}
