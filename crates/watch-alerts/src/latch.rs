//! Hysteresis alert state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Independent fire/reset knobs for the alert latch.
///
/// The two thresholds default to the same value but may differ to widen
/// the hysteresis band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Fire when the count rises strictly above this value.
    pub fire_above: u32,
    /// Reset when the count returns to or below this value.
    pub reset_at_or_below: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fire_above: 20,
            reset_at_or_below: 20,
        }
    }
}

/// The two latch states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    /// No alert outstanding for the current excursion.
    #[default]
    Normal,
    /// An alert has been delivered and is suppressed until reset.
    Alerted,
}

impl AlertState {
    /// Returns the state as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Alerted => "alerted",
        }
    }
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert that should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// The count that crossed the fire threshold.
    pub count: u32,
    /// When the crossing was observed.
    pub at: DateTime<Utc>,
}

/// Process-lifetime alert latch with hysteresis.
///
/// Transitions happen only on threshold crossings, never merely because an
/// evaluation ran. [`evaluate`](Self::evaluate) returns a fire event
/// without arming the latch; callers arm it with
/// [`confirm`](Self::confirm) once the notification send reports success.
/// A failed delivery therefore leaves the latch ready to retry on the next
/// evaluation.
#[derive(Debug, Clone)]
pub struct AlertLatch {
    thresholds: Thresholds,
    state: AlertState,
}

impl AlertLatch {
    /// Creates a latch in the `Normal` state.
    #[must_use]
    pub const fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            state: AlertState::Normal,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> AlertState {
        self.state
    }

    /// Returns the configured thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Feeds one count through the latch.
    ///
    /// Returns `Some(AlertEvent)` when the count warrants a fresh alert.
    /// The reset transition is silent: returning to or below the reset
    /// threshold re-arms the latch without emitting anything.
    pub fn evaluate(&mut self, count: u32) -> Option<AlertEvent> {
        match self.state {
            AlertState::Alerted => {
                self.check_reset(count);
                None
            }
            AlertState::Normal => {
                if count > self.thresholds.fire_above {
                    debug!(count, fire_above = self.thresholds.fire_above, "alert warranted");
                    Some(AlertEvent {
                        count,
                        at: Utc::now(),
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Performs only the reset transition, never a fire.
    ///
    /// Used for reset-check-only passes, where an alert must not be raised
    /// but a count back at or below the reset threshold still re-arms the
    /// latch.
    pub fn check_reset(&mut self, count: u32) {
        if self.state == AlertState::Alerted && count <= self.thresholds.reset_at_or_below {
            info!(count, "restart count back to normal, resetting alert latch");
            self.state = AlertState::Normal;
        }
    }

    /// Arms the latch after a successful alert delivery.
    pub fn confirm(&mut self) {
        self.state = AlertState::Alerted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn latch() -> AlertLatch {
        AlertLatch::new(Thresholds::default())
    }

    #[test]
    fn starts_normal() {
        assert_eq!(latch().state(), AlertState::Normal);
    }

    #[test_case(0, false; "zero")]
    #[test_case(19, false; "below threshold")]
    #[test_case(20, false; "exactly at threshold")]
    #[test_case(21, true; "just above threshold")]
    #[test_case(50, true; "well above threshold")]
    fn fires_only_strictly_above_threshold(count: u32, fires: bool) {
        let mut l = latch();
        assert_eq!(l.evaluate(count).is_some(), fires);
        assert_eq!(l.state(), AlertState::Normal);
    }

    #[test]
    fn fire_event_carries_the_count() {
        let mut l = latch();
        let event = l.evaluate(21).unwrap();
        assert_eq!(event.count, 21);
    }

    #[test]
    fn unconfirmed_fire_is_retried() {
        let mut l = latch();
        assert!(l.evaluate(25).is_some());
        // Delivery failed: the latch stays normal and the next evaluation
        // warrants the alert again.
        assert_eq!(l.state(), AlertState::Normal);
        assert!(l.evaluate(25).is_some());
    }

    #[test]
    fn confirmed_fire_is_suppressed_until_reset() {
        let mut l = latch();
        assert!(l.evaluate(25).is_some());
        l.confirm();
        assert!(l.evaluate(30).is_none());
        assert!(l.evaluate(21).is_none());
        assert_eq!(l.state(), AlertState::Alerted);
    }

    #[test]
    fn reset_is_silent_and_rearms() {
        let mut l = latch();
        assert!(l.evaluate(25).is_some());
        l.confirm();
        assert!(l.evaluate(20).is_none());
        assert_eq!(l.state(), AlertState::Normal);
        assert!(l.evaluate(22).is_some());
    }

    #[test]
    fn full_fire_reset_fire_cycle() {
        // 18, 22, 25, 19, 23 → none, alert, none, silent reset, alert.
        let mut l = latch();
        assert!(l.evaluate(18).is_none());

        assert!(l.evaluate(22).is_some());
        l.confirm();

        assert!(l.evaluate(25).is_none());
        assert!(l.evaluate(19).is_none());
        assert_eq!(l.state(), AlertState::Normal);

        assert!(l.evaluate(23).is_some());
    }

    #[test]
    fn check_reset_never_fires() {
        let mut l = latch();
        l.check_reset(100);
        assert_eq!(l.state(), AlertState::Normal);

        assert!(l.evaluate(25).is_some());
        l.confirm();
        l.check_reset(25);
        assert_eq!(l.state(), AlertState::Alerted);
        l.check_reset(20);
        assert_eq!(l.state(), AlertState::Normal);
    }

    #[test]
    fn asymmetric_hysteresis_band() {
        let mut l = AlertLatch::new(Thresholds {
            fire_above: 20,
            reset_at_or_below: 10,
        });
        assert!(l.evaluate(21).is_some());
        l.confirm();
        // Inside the band: neither fire nor reset.
        assert!(l.evaluate(15).is_none());
        assert_eq!(l.state(), AlertState::Alerted);
        assert!(l.evaluate(10).is_none());
        assert_eq!(l.state(), AlertState::Normal);
    }

    proptest! {
        // With deliveries always confirmed, no two fires happen without an
        // intervening reset transition.
        #[test]
        fn no_consecutive_fires_without_reset(counts in proptest::collection::vec(0u32..60, 0..64)) {
            let mut l = latch();
            let mut fired_since_reset = false;

            for count in counts {
                let was_alerted = l.state() == AlertState::Alerted;
                let event = l.evaluate(count);
                if event.is_some() {
                    prop_assert!(!fired_since_reset);
                    l.confirm();
                    fired_since_reset = true;
                } else if was_alerted && l.state() == AlertState::Normal {
                    fired_since_reset = false;
                }
            }
        }
    }
}
