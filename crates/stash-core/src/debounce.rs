//! Trailing-edge debounced values.
//!
//! A [`Debounced`] cell holds the value currently applied and at most one
//! pending value. Scheduling a new value replaces the pending one and restarts
//! the quiet period, so only the last value of a burst is ever applied.
//!
//! The cell owns no timer. Its owner arms a timer for [`Debounced::deadline`]
//! and calls [`Debounced::flush_due`] when it fires; `cancel` discards the
//! pending value on teardown.

use std::time::{Duration, Instant};

/// Default quiet period for search and folder changes.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(750);

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// A value that applies changes only after a quiet period.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    current: T,
    pending: Option<Pending<T>>,
    delay: Duration,
}

impl<T> Debounced<T> {
    /// Create a cell with an initial applied value.
    pub fn new(value: T, delay: Duration) -> Self {
        Self {
            current: value,
            pending: None,
            delay,
        }
    }

    /// The applied value.
    pub fn get(&self) -> &T {
        &self.current
    }

    /// Schedule `value`, replacing any pending value.
    ///
    /// Returns the new deadline.
    pub fn schedule(&mut self, value: T, now: Instant) -> Instant {
        let deadline = now + self.delay;
        self.pending = Some(Pending { value, deadline });
        deadline
    }

    /// When the pending value is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Apply the pending value if its deadline has passed.
    ///
    /// Returns `true` when a value was applied.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if pending.deadline <= now => {
                if let Some(pending) = self.pending.take() {
                    self.current = pending.value;
                }
                true
            }
            _ => false,
        }
    }

    /// Discard the pending value, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_applies_after_delay() {
        let t0 = Instant::now();
        let mut cell = Debounced::new(String::new(), DEFAULT_DELAY);

        cell.schedule("a".to_string(), t0);
        assert!(!cell.flush_due(t0 + ms(749)));
        assert_eq!(cell.get(), "");

        assert!(cell.flush_due(t0 + ms(750)));
        assert_eq!(cell.get(), "a");
        assert!(cell.deadline().is_none());
    }

    #[test]
    fn test_burst_collapses_to_last_value() {
        let t0 = Instant::now();
        let mut cell = Debounced::new(String::new(), DEFAULT_DELAY);

        cell.schedule("f".to_string(), t0);
        cell.schedule("fo".to_string(), t0 + ms(200));
        cell.schedule("foo".to_string(), t0 + ms(400));

        // The first deadline has passed, but the burst restarted the window.
        assert!(!cell.flush_due(t0 + ms(800)));
        assert_eq!(cell.get(), "");

        assert_eq!(cell.deadline(), Some(t0 + ms(1150)));
        assert!(cell.flush_due(t0 + ms(1150)));
        assert_eq!(cell.get(), "foo");
    }

    #[test]
    fn test_cancel_discards_pending() {
        let t0 = Instant::now();
        let mut cell = Debounced::new(Some("A".to_string()), ms(10));

        cell.schedule(None, t0);
        assert_eq!(cell.cancel(), Some(None));
        assert!(!cell.flush_due(t0 + ms(100)));
        assert_eq!(cell.get().as_deref(), Some("A"));
    }
}
