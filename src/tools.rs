/// Backend actions the agent can fulfil.
pub trait Toolbox {
    fn get_weather(&self, city: &str) -> String;

    fn set_reminder(&self, text: &str, time: &str) -> String;

    fn get_news(&self, topic: &str) -> String;
}

/// Offline stand-ins returning canned, deterministic answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTools;

impl Toolbox for MockTools {
    fn get_weather(&self, city: &str) -> String {
        format!("The weather in {} is 72°F and sunny.", city)
    }

    fn set_reminder(&self, text: &str, time: &str) -> String {
        format!("Reminder set: '{}' at {}.", text, time)
    }

    fn get_news(&self, topic: &str) -> String {
        format!("Top news in {}: 'AI is transforming the world!'", topic)
    }
}
