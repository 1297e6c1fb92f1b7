//! Injected wall clock.

use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Scheduling logic takes instants as arguments where possible; the run
/// loop gets its "now" through this trait so tests never depend on the
/// wall clock.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_its_instant() {
        let at = Utc::now();
        let clock = FixedClock(at);
        assert_eq!(clock.now_utc(), at);
        assert_eq!(clock.now_utc(), at);
    }
}
