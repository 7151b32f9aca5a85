use std::collections::HashMap;

/// Key under which the user's name is remembered.
pub const USER_NAME: &str = "user_name";
/// Key under which the user's city is remembered.
pub const USER_CITY: &str = "user_city";

/// Facts learned about the user during this process.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    store: HashMap<String, String>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fact, replacing any previous value for `key`.
    pub fn update(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.store.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.store.get(key).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// All facts sorted by key.
    pub fn snapshot(&self) -> Vec<(&str, &str)> {
        let mut facts: Vec<(&str, &str)> = self
            .store
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        facts.sort_unstable_by_key(|(k, _)| *k);
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unset_key() {
        let memory = Memory::new();
        assert_eq!(memory.get(USER_NAME), None);
        assert_eq!(memory.get(USER_NAME), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut memory = Memory::new();
        memory.update(USER_CITY, "Paris");
        memory.update(USER_CITY, "Tokyo");
        assert_eq!(memory.get(USER_CITY), Some("Tokyo"));
        assert_eq!(memory.snapshot().len(), 1);
    }

    #[test]
    fn test_snapshot_and_clear() {
        let mut memory = Memory::new();
        memory.update(USER_NAME, "Alice");
        memory.update(USER_CITY, "Paris");
        assert_eq!(memory.snapshot(), vec![(USER_CITY, "Paris"), (USER_NAME, "Alice")]);

        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.get(USER_CITY), None);
    }
}
