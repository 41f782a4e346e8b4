//! Exponential backoff state machine used by the shipper worker.

use std::time::Duration;

use super::config::BackoffPolicy;

/// Smallest delay ever waited between dials.
pub const MIN_BACKOFF_FLOOR: Duration = Duration::from_millis(10);
/// Largest delay ever waited between dials.
pub const MAX_BACKOFF_CEILING: Duration = Duration::from_secs(24 * 60 * 60);

/// Tracks the reconnect delay between failed dial attempts.
///
/// The delay starts at the policy floor, doubles after every failed dial and
/// is capped at the ceiling. Any successful write puts it back to the floor.
#[derive(Debug)]
pub struct BackoffState {
    floor: Duration,
    ceiling: Duration,
    current: Duration,
}

impl BackoffState {
    /// Create a new state machine from the supplied policy.
    ///
    /// The floor is clamped to `[MIN_BACKOFF_FLOOR, MAX_BACKOFF_CEILING]` and
    /// the ceiling to `[floor, MAX_BACKOFF_CEILING]`.
    pub fn new(policy: BackoffPolicy) -> Self {
        let floor = policy.floor.clamp(MIN_BACKOFF_FLOOR, MAX_BACKOFF_CEILING);
        let ceiling = policy.ceiling.clamp(floor, MAX_BACKOFF_CEILING);
        Self {
            floor,
            ceiling,
            current: floor,
        }
    }

    /// Delay waited after the first failure following a reset.
    pub fn floor(&self) -> Duration {
        self.floor
    }

    /// Delay that will be waited after the next dial failure.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Record a failed dial.
    ///
    /// Returns the delay to wait before the next attempt (the value before
    /// doubling) and grows the stored delay for the attempt after that.
    pub fn on_dial_failure(&mut self) -> Duration {
        let wait = self.current;
        self.current = self.current.saturating_mul(2).clamp(self.floor, self.ceiling);
        wait
    }

    /// Record a successful write, resetting the delay to the floor.
    pub fn on_write_success(&mut self) {
        self.current = self.floor;
    }
}
