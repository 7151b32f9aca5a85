//! Pattern-based entity extraction.
//!
//! Every extractor is a pure function over the raw utterance. A miss is an
//! ordinary `None` (or the default topic), never an error.

use std::sync::LazyLock;

use regex::Regex;

/// Topic used when a news request names none.
pub const DEFAULT_TOPIC: &str = "general";

/// A fully specified reminder. Both fields are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub text: String,
    pub time: String,
}

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:i am|i['’]m|my name is)\s+(\w+)").expect("Invalid name regex")
});

static CITY_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin\s+([A-Za-z\s]+)").expect("Invalid city regex"));

static CITY_OF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bof\s+([A-Za-z\s]+)").expect("Invalid city regex"));

static CITY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([A-Za-z\s]+)\s+city\b([A-Za-z\s]*)").expect("Invalid city regex")
});

static REMINDER_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)remind me to\s+(.*?)\s+\b(?:at|on)\s+").expect("Invalid reminder regex")
});

static REMINDER_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:at|on)\s+(\d{1,2}\s*(?:am|pm)?)").expect("Invalid reminder regex")
});

static TOPIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)news(?: about| on)?\s+([A-Za-z\s]+)").expect("Invalid topic regex")
});

static ASK_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bwhat\s+is\s+my\s+name\b",
        r"(?i)\btell\s+me\s+my\s+name\b",
        r"(?i)\bdo\s+you\s+know\s+my\s+name\b",
        r"(?i)\bwho\s+am\s+i\b",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("Invalid ask-name regex"))
    .collect()
});

static ASK_CITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bwhat\s+is\s+my\s+city\b",
        r"(?i)\btell\s+me\s+my\s+city\b",
        r"(?i)\bdo\s+you\s+know\s+my\s+city\b",
        r"(?i)\babout\s+my\s+city\b",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("Invalid ask-city regex"))
    .collect()
});

/// Name introduced with "i am X", "i'm X" or "my name is X".
pub fn extract_name(utterance: &str) -> Option<String> {
    NAME_RE
        .captures(utterance)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// City mentioned as "in <words>", "of <words>" or "<words> city", in that
/// priority order.
///
/// The captured run of words is not bounded, so trailing words come along:
/// "in Delhi today" yields "Delhi today". For the suffix form the keyword
/// itself is dropped and the words on both sides are kept.
pub fn extract_city(utterance: &str) -> Option<String> {
    let prefixed = [&*CITY_IN_RE, &*CITY_OF_RE].into_iter().find_map(|re| {
        re.captures(utterance)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|city| !city.is_empty())
    });
    if prefixed.is_some() {
        return prefixed;
    }

    let caps = CITY_SUFFIX_RE.captures(utterance)?;
    let city = caps
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!city.is_empty()).then_some(city)
}

/// Reminder framed as "remind me to X at/on Y".
///
/// Returns `None` unless both the text and the time are found.
pub fn extract_reminder(utterance: &str) -> Option<Reminder> {
    let text = REMINDER_TEXT_RE
        .captures(utterance)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|text| !text.is_empty());
    let time = REMINDER_TIME_RE
        .captures(utterance)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());

    match (text, time) {
        (Some(text), Some(time)) => Some(Reminder { text, time }),
        _ => None,
    }
}

/// News topic from "news about X" / "news on X", or [`DEFAULT_TOPIC`].
pub fn extract_topic(utterance: &str) -> String {
    TOPIC_RE
        .captures(utterance)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|topic| !topic.is_empty())
        .unwrap_or(DEFAULT_TOPIC)
        .to_string()
}

/// Whether the user is asking for the name the agent remembers.
pub fn is_ask_name(utterance: &str) -> bool {
    ASK_NAME_PATTERNS.iter().any(|re| re.is_match(utterance))
}

/// Whether the user is asking for the city the agent remembers.
pub fn is_ask_city(utterance: &str) -> bool {
    ASK_CITY_PATTERNS.iter().any(|re| re.is_match(utterance))
}
