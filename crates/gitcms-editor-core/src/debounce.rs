//! Trailing-edge debouncing as a pure state machine.
//!
//! The caller supplies the clock: `schedule` and `poll` take the current
//! `Instant`, so a host event loop (or a test) decides when time passes.

use std::time::Duration;

use web_time::Instant;

/// Quiet period used by the raw editor before emitting a change.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Debouncer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState<T> {
    Idle,
    Pending { deadline: Instant, value: T },
}

impl<T> Default for DebounceState<T> {
    fn default() -> Self {
        DebounceState::Idle
    }
}

/// Holds at most one pending value and releases it once `delay` has passed
/// without a newer `schedule`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    state: DebounceState<T>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> &DebounceState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Pending { deadline, .. } => Some(*deadline),
            DebounceState::Idle => None,
        }
    }

    /// Replace any pending value and restart the quiet period from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.state = DebounceState::Pending {
            deadline: now + self.delay,
            value,
        };
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = matches!(
            &self.state,
            DebounceState::Pending { deadline, .. } if now >= *deadline
        );
        if due { self.flush() } else { None }
    }

    /// Take the pending value regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        match std::mem::take(&mut self.state) {
            DebounceState::Pending { value, .. } => Some(value),
            DebounceState::Idle => None,
        }
    }

    /// Drop the pending value. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.flush().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(150));
        debouncer.schedule("a", start);

        assert_eq!(debouncer.poll(start + ms(149)), None);
        assert_eq!(debouncer.poll(start + ms(150)), Some("a"));
        assert_eq!(debouncer.poll(start + ms(300)), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_reschedule_resets_deadline_and_keeps_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(150));
        debouncer.schedule(1, start);
        debouncer.schedule(2, start + ms(100));
        debouncer.schedule(3, start + ms(200));

        assert_eq!(debouncer.deadline(), Some(start + ms(350)));
        assert_eq!(debouncer.poll(start + ms(300)), None);
        assert_eq!(debouncer.poll(start + ms(350)), Some(3));
    }

    #[test]
    fn test_flush_and_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.delay(), DEFAULT_DEBOUNCE);

        debouncer.schedule("x", start);
        assert_eq!(debouncer.flush(), Some("x"));
        assert_eq!(debouncer.flush(), None);

        debouncer.schedule("y", start);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.poll(start + ms(1000)), None);
        assert_eq!(debouncer.state(), &DebounceState::Idle);
    }
}
