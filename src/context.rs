use std::fmt;

/// Clarification the agent is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingContext {
    #[default]
    Idle,
    AwaitingCityForWeather,
}

impl fmt::Display for PendingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingContext::Idle => f.write_str("idle"),
            PendingContext::AwaitingCityForWeather => f.write_str("awaiting_city_for_weather"),
        }
    }
}

/// Single-slot tracker for the one clarification that may carry over to the
/// next turn.
///
/// A pending state is handed out exactly once by [`ContextTracker::take`];
/// after that the tracker is idle again whatever the turn does with it.
#[derive(Debug, Default)]
pub struct ContextTracker {
    slot: PendingContext,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PendingContext {
        self.slot
    }

    /// Wait for a city on the next turn.
    pub fn await_city_for_weather(&mut self) {
        self.slot = PendingContext::AwaitingCityForWeather;
    }

    /// Remove and return the pending state.
    pub fn take(&mut self) -> PendingContext {
        std::mem::take(&mut self.slot)
    }

    pub fn reset(&mut self) {
        self.slot = PendingContext::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_returns_to_idle() {
        let mut tracker = ContextTracker::new();
        assert_eq!(tracker.current(), PendingContext::Idle);

        tracker.await_city_for_weather();
        assert_eq!(tracker.current(), PendingContext::AwaitingCityForWeather);

        assert_eq!(tracker.take(), PendingContext::AwaitingCityForWeather);
        assert_eq!(tracker.current(), PendingContext::Idle);
        assert_eq!(tracker.take(), PendingContext::Idle);
    }

    #[test]
    fn test_single_slot() {
        let mut tracker = ContextTracker::new();
        tracker.await_city_for_weather();
        tracker.await_city_for_weather();
        tracker.take();
        assert_eq!(tracker.current(), PendingContext::Idle);
    }

    #[test]
    fn test_reset() {
        let mut tracker = ContextTracker::new();
        tracker.await_city_for_weather();
        tracker.reset();
        assert_eq!(tracker.current().to_string(), "idle");
    }
}
