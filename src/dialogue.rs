//! Per-turn orchestration.
//!
//! A turn runs through: exit check, maintenance commands, name capture,
//! pending clarification, then classification and dispatch. Every path ends in
//! a reply; nothing here can fail a turn.

use log::{debug, info};

use crate::classifier::IntentClassifier;
use crate::context::{ContextTracker, PendingContext};
use crate::entities;
use crate::intent::Intent;
use crate::memory::{Memory, USER_CITY, USER_NAME};
use crate::tools::Toolbox;

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

pub const FAREWELL: &str = "Goodbye! Have a nice day.";
const ASK_FOR_CITY: &str = "May I know which city you would like the weather update for?";
const CITY_NOT_DETECTED: &str = "I couldn't detect the city, could you please repeat?";
const REMINDER_INCOMPLETE: &str =
    "Please provide both the reminder text and time (e.g., 'Remind me to call mom at 7 PM').";
const NAME_UNKNOWN: &str = "I don't know your name yet. Could you please tell me your name?";
const CITY_UNKNOWN: &str = "I don't know your city yet. Could you please tell me your city?";
const MEMORY_EMPTY: &str = "I don't remember anything yet.";
const FORGOTTEN: &str = "Okay, I've forgotten everything you told me.";
const HELP: &str = "Sorry, I didn't understand that. I can provide weather updates, set reminders, \
                    and share news. Try asking something like 'What's the weather in Delhi?' or \
                    'Remind me to call mom at 7 PM'.";

/// What the agent says at the end of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Keep the conversation going.
    Say(String),
    /// The user asked to leave; the loop should stop after printing this.
    Farewell(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Say(text) | Reply::Farewell(text) => text,
        }
    }

    pub fn is_farewell(&self) -> bool {
        matches!(self, Reply::Farewell(_))
    }
}

/// Owns the conversation state and produces one reply per utterance.
pub struct DialogueController {
    classifier: Box<dyn IntentClassifier>,
    tools: Box<dyn Toolbox>,
    memory: Memory,
    context: ContextTracker,
}

impl DialogueController {
    pub fn new(classifier: Box<dyn IntentClassifier>, tools: Box<dyn Toolbox>) -> Self {
        info!("Dialogue controller using {} classifier", classifier.name());
        Self {
            classifier,
            tools,
            memory: Memory::new(),
            context: ContextTracker::new(),
        }
    }

    #[cfg(test)]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    #[cfg(test)]
    pub fn pending(&self) -> PendingContext {
        self.context.current()
    }

    /// Handle one utterance.
    pub async fn respond(&mut self, utterance: &str) -> Reply {
        let trimmed = utterance.trim();
        if EXIT_WORDS.iter().any(|word| trimmed.eq_ignore_ascii_case(word)) {
            return Reply::Farewell(FAREWELL.to_string());
        }

        if let Some(reply) = self.handle_command(trimmed) {
            return Reply::Say(reply);
        }

        if let Some(name) = entities::extract_name(utterance) {
            debug!("Extracted name: {}", name);
            let reply = format!("Hi {}! How can I help you today?", name);
            self.memory.update(USER_NAME, name);
            return Reply::Say(reply);
        }

        match self.context.take() {
            PendingContext::AwaitingCityForWeather => {
                debug!("Resolving pending context {}", PendingContext::AwaitingCityForWeather);
                return Reply::Say(self.resolve_pending_city(trimmed));
            }
            PendingContext::Idle => {}
        }

        let classification = self.classifier.classify(utterance).await;
        debug!("Classified {:?} as {}", utterance, classification.intent);
        if let Some(response) = classification.direct_response {
            return Reply::Say(response);
        }

        Reply::Say(self.dispatch(classification.intent, utterance))
    }

    fn handle_command(&mut self, input: &str) -> Option<String> {
        match input {
            "/memory" => {
                if self.memory.is_empty() {
                    return Some(MEMORY_EMPTY.to_string());
                }
                let facts = self
                    .memory
                    .snapshot()
                    .into_iter()
                    .map(|(key, value)| format!("{} = {}", key, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!("Here's what I remember: {}", facts))
            }
            "/forget" => {
                self.memory.clear();
                self.context.reset();
                Some(FORGOTTEN.to_string())
            }
            _ => None,
        }
    }

    /// The utterance following a city prompt. Without a recognizable city
    /// phrase the whole input is taken as the city name.
    fn resolve_pending_city(&mut self, trimmed: &str) -> String {
        let city = entities::extract_city(trimmed)
            .or_else(|| (!trimmed.is_empty()).then(|| trimmed.to_string()));
        match city {
            Some(city) => {
                let reply = self.tools.get_weather(&city);
                self.memory.update(USER_CITY, city);
                reply
            }
            None => CITY_NOT_DETECTED.to_string(),
        }
    }

    fn dispatch(&mut self, intent: Intent, utterance: &str) -> String {
        match intent {
            Intent::Greeting => match self.memory.get(USER_NAME) {
                Some(name) => format!("Hi {}! How can I help you today?", name),
                None => "Hello! What can I do for you today?".to_string(),
            },
            Intent::GetWeather => self.handle_weather(utterance),
            Intent::SetReminder => match entities::extract_reminder(utterance) {
                Some(reminder) => {
                    debug!("Extracted reminder: {:?}", reminder);
                    self.tools.set_reminder(&reminder.text, &reminder.time)
                }
                None => REMINDER_INCOMPLETE.to_string(),
            },
            Intent::GetNews => {
                let topic = entities::extract_topic(utterance);
                debug!("Extracted topic: {}", topic);
                self.tools.get_news(&topic)
            }
            Intent::AskName => match self.memory.get(USER_NAME) {
                Some(name) => format!("Your name is {}.", name),
                None => NAME_UNKNOWN.to_string(),
            },
            Intent::AskCity => match self.memory.get(USER_CITY) {
                Some(city) => format!("Your city is {}.", city),
                None => CITY_UNKNOWN.to_string(),
            },
            Intent::TellJoke | Intent::Calculate | Intent::Unknown => HELP.to_string(),
        }
    }

    fn handle_weather(&mut self, utterance: &str) -> String {
        if let Some(city) = entities::extract_city(utterance) {
            debug!("Extracted city: {}", city);
            let reply = self.tools.get_weather(&city);
            self.memory.update(USER_CITY, city);
            return reply;
        }
        if let Some(city) = self.memory.get(USER_CITY) {
            return self.tools.get_weather(city);
        }
        self.context.await_city_for_weather();
        debug!("Pending context set to {}", self.context.current());
        ASK_FOR_CITY.to_string()
    }
}
