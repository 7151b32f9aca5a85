use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::entities;

/// Closed set of actions an utterance can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    GetWeather,
    SetReminder,
    GetNews,
    AskName,
    AskCity,
    TellJoke,
    Calculate,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::Greeting,
        Intent::GetWeather,
        Intent::SetReminder,
        Intent::GetNews,
        Intent::AskName,
        Intent::AskCity,
        Intent::TellJoke,
        Intent::Calculate,
        Intent::Unknown,
    ];

    /// Snake-case label, as exchanged with the classification service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::GetWeather => "get_weather",
            Intent::SetReminder => "set_reminder",
            Intent::GetNews => "get_news",
            Intent::AskName => "ask_name",
            Intent::AskCity => "ask_city",
            Intent::TellJoke => "tell_joke",
            Intent::Calculate => "calculate",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == label)
            .ok_or_else(|| anyhow!("Unknown intent label: {}", s))
    }
}

/// How a rule decides whether it applies to an utterance.
#[derive(Clone, Copy)]
pub enum Matcher {
    /// Any of the words appears as a whole word.
    Words(&'static [&'static str]),
    /// Any of the fragments appears anywhere.
    Contains(&'static [&'static str]),
    /// Arbitrary phrase predicate.
    Predicate(fn(&str) -> bool),
}

impl Matcher {
    fn matches(&self, lowered: &str) -> bool {
        match self {
            Matcher::Words(words) => lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| words.iter().any(|word| *word == token)),
            Matcher::Contains(fragments) => fragments.iter().any(|f| lowered.contains(f)),
            Matcher::Predicate(predicate) => predicate(lowered),
        }
    }
}

/// One row of the precedence table.
#[derive(Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub matcher: Matcher,
}

/// Rules in precedence order; the first match wins. Greetings are checked
/// before everything else, so "hello, what's the weather" is a greeting.
pub static RULES: &[IntentRule] = &[
    // Whole words, unlike the substring rules below: a plain substring test
    // would read "Chicago" or "which" as "hi".
    IntentRule {
        intent: Intent::Greeting,
        matcher: Matcher::Words(&["hi", "hello", "hey"]),
    },
    IntentRule {
        intent: Intent::GetWeather,
        matcher: Matcher::Contains(&["weather"]),
    },
    IntentRule {
        intent: Intent::SetReminder,
        matcher: Matcher::Contains(&["remind", "reminder"]),
    },
    IntentRule {
        intent: Intent::GetNews,
        matcher: Matcher::Contains(&["news"]),
    },
    IntentRule {
        intent: Intent::AskName,
        matcher: Matcher::Predicate(entities::is_ask_name),
    },
    IntentRule {
        intent: Intent::AskCity,
        matcher: Matcher::Predicate(entities::is_ask_city),
    },
];

/// Evaluate `rules` in order against the utterance.
pub fn classify_with(rules: &[IntentRule], utterance: &str) -> Intent {
    let lowered = utterance.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matcher.matches(&lowered))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Unknown)
}

/// Classify with the default precedence table.
pub fn classify(utterance: &str) -> Intent {
    classify_with(RULES, utterance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_rules() {
        assert_eq!(classify("Hello there"), Intent::Greeting);
        assert_eq!(classify("What's the WEATHER like?"), Intent::GetWeather);
        assert_eq!(classify("Remind me to call mom at 7 PM"), Intent::SetReminder);
        assert_eq!(classify("set a reminder"), Intent::SetReminder);
        assert_eq!(classify("any news?"), Intent::GetNews);
        assert_eq!(classify("do you know my name"), Intent::AskName);
        assert_eq!(classify("what is my city"), Intent::AskCity);
        assert_eq!(classify("sing me a song"), Intent::Unknown);
    }

    #[test]
    fn test_greeting_takes_precedence_over_weather() {
        assert_eq!(classify("hello, what's the weather"), Intent::Greeting);
    }

    #[test]
    fn test_greeting_words_do_not_match_inside_other_words() {
        // Substring matching would classify both of these as greetings.
        assert_eq!(classify("What's the weather in Chicago?"), Intent::GetWeather);
        assert_eq!(classify("which news is trending"), Intent::GetNews);
        assert_eq!(classify("they said hey!"), Intent::Greeting);
        assert_eq!(classify("Hi, remind me to call mom"), Intent::Greeting);
    }

    #[test]
    fn test_rule_order_is_data() {
        let reordered = [RULES[1], RULES[0]];
        assert_eq!(classify_with(&reordered, "hello, what's the weather"), Intent::GetWeather);
        assert_eq!(classify_with(&[], "hello"), Intent::Unknown);
    }

    #[test]
    fn test_labels_round_trip() {
        for intent in Intent::ALL {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
        assert_eq!(" Tell_Joke ".parse::<Intent>().unwrap(), Intent::TellJoke);
        assert!("dance".parse::<Intent>().is_err());
    }
}
