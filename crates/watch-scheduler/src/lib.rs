//! Timezone-aware scheduling for restwatch.
//!
//! Drives the two scheduled triggers: a daily batch check at a configured
//! local time in a configured IANA timezone, and a fixed-interval liveness
//! ping. Next-run computation is a pure function of the schedule and a
//! supplied instant, so it tests without wall-clock coupling; the
//! [`Clock`] trait injects the wall clock into the run loop.

#![forbid(unsafe_code)]

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

/// Errors building a schedule from configuration strings.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The time-of-day string did not parse.
    #[error("invalid time of day: {value}")]
    InvalidTime {
        /// The rejected value.
        value: String,
    },

    /// The timezone name is not a known IANA timezone.
    #[error("invalid timezone: {value}")]
    InvalidTimezone {
        /// The rejected value.
        value: String,
    },

    /// The ping interval is zero.
    #[error("ping interval must be non-zero")]
    ZeroPingInterval,
}

/// When the scheduled triggers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Local time of day for the daily check.
    pub daily_at: NaiveTime,
    /// Timezone the daily time is interpreted in.
    pub tz: Tz,
    /// Interval between liveness pings.
    pub ping_every: Duration,
}

impl Schedule {
    /// Creates a schedule.
    #[must_use]
    pub const fn new(daily_at: NaiveTime, tz: Tz, ping_every: Duration) -> Self {
        Self {
            daily_at,
            tz,
            ping_every,
        }
    }

    /// Builds a schedule from configuration strings.
    ///
    /// The time is `HH:MM`, the timezone an IANA name such as
    /// `Europe/London`. Errors are scoped to the offending field.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] when a field does not parse.
    pub fn parse(daily_at: &str, tz: &str, ping_every_secs: u64) -> Result<Self, ScheduleError> {
        let daily_at = NaiveTime::parse_from_str(daily_at, "%H:%M").map_err(|_| {
            ScheduleError::InvalidTime {
                value: daily_at.to_string(),
            }
        })?;
        let tz: Tz = tz.parse().map_err(|_| ScheduleError::InvalidTimezone {
            value: tz.to_string(),
        })?;
        if ping_every_secs == 0 {
            return Err(ScheduleError::ZeroPingInterval);
        }
        Ok(Self::new(daily_at, tz, Duration::from_secs(ping_every_secs)))
    }

    /// Returns the next daily-check instant strictly after `after`.
    ///
    /// Local times skipped by a DST transition resolve to the earliest
    /// valid instant on the following hour; ambiguous times take the
    /// earlier offset.
    #[must_use]
    pub fn next_daily_run(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let mut day = after.with_timezone(&self.tz).date_naive();
        loop {
            if let Some(candidate) = self.resolve_local(day) {
                if candidate > after {
                    return candidate;
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => return DateTime::<Utc>::MAX_UTC,
            }
        }
    }

    fn resolve_local(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        let naive = day.and_time(self.daily_at);
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                // Skipped by DST: fall forward one hour.
                self.tz
                    .from_local_datetime(&(naive + chrono::Duration::hours(1)))
                    .earliest()
            })
            .map(|local| local.with_timezone(&Utc))
    }
}

/// Runs the daily check and liveness ping on their schedules.
///
/// The callbacks are invoked inline on the scheduler task; they are
/// expected to be bounded computations that never panic the loop.
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    schedule: Schedule,
    clock: C,
}

impl Scheduler<SystemClock> {
    /// Creates a scheduler driven by the system clock.
    #[must_use]
    pub const fn new(schedule: Schedule) -> Self {
        Self::with_clock(schedule, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    /// Creates a scheduler with an injected clock.
    #[must_use]
    pub const fn with_clock(schedule: Schedule, clock: C) -> Self {
        Self { schedule, clock }
    }

    /// Returns the schedule.
    #[must_use]
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Runs both triggers forever.
    ///
    /// `daily_check` receives the local calendar date of the tick. The
    /// loop never exits on its own; cancel it by dropping the task.
    pub async fn run<D, P>(&self, mut daily_check: D, mut ping: P)
    where
        D: FnMut(NaiveDate) + Send,
        P: FnMut() + Send,
    {
        let mut ping_timer = tokio::time::interval(self.schedule.ping_every);
        ping_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick fires immediately; swallow it so pings
        // start one interval in.
        ping_timer.tick().await;

        info!(
            daily_at = %self.schedule.daily_at,
            tz = %self.schedule.tz,
            ping_every_secs = self.schedule.ping_every.as_secs(),
            "scheduler running"
        );

        loop {
            let now = self.clock.now_utc();
            let next = self.schedule.next_daily_run(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(next = %next, "next daily check");

            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    let day = next.with_timezone(&self.schedule.tz).date_naive();
                    info!(%day, "daily check tick");
                    daily_check(day);
                }
                _ = ping_timer.tick() => {
                    debug!("liveness ping tick");
                    ping();
                }
            }

            if next == DateTime::<Utc>::MAX_UTC {
                warn!("schedule exhausted, stopping daily checks");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use test_case::test_case;

    fn schedule(daily_at: &str, tz: &str) -> Schedule {
        Schedule::parse(daily_at, tz, 300).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn parse_rejects_bad_time() {
        let err = Schedule::parse("25:99", "UTC", 300).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTime { .. }));
    }

    #[test]
    fn parse_rejects_bad_timezone() {
        let err = Schedule::parse("23:25", "Mars/Olympus", 300).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTimezone { .. }));
    }

    #[test]
    fn parse_rejects_zero_ping_interval() {
        let err = Schedule::parse("23:25", "UTC", 0).unwrap_err();
        assert!(matches!(err, ScheduleError::ZeroPingInterval));
    }

    #[test_case("2026-03-14 10:00", "2026-03-14 23:25"; "same day when before the tick")]
    #[test_case("2026-03-14 23:25", "2026-03-15 23:25"; "next day when exactly at the tick")]
    #[test_case("2026-03-14 23:40", "2026-03-15 23:25"; "next day when after the tick")]
    fn next_daily_run_in_utc(now: &str, expected: &str) {
        let s = schedule("23:25", "UTC");
        assert_eq!(s.next_daily_run(utc(now)), utc(expected));
    }

    #[test]
    fn next_daily_run_honors_timezone_offset() {
        // 09:00 Nairobi is 06:00 UTC.
        let s = schedule("09:00", "Africa/Nairobi");
        assert_eq!(
            s.next_daily_run(utc("2026-03-14 01:00")),
            utc("2026-03-14 06:00")
        );
    }

    #[test]
    fn next_daily_run_is_strictly_after() {
        let s = schedule("00:00", "UTC");
        let at = utc("2026-03-14 00:00");
        assert!(s.next_daily_run(at) > at);
    }

    #[test]
    fn dst_skipped_time_falls_forward() {
        // 2026-03-29 02:30 does not exist in Berlin; the tick resolves to
        // the first valid instant an hour later (03:30 CEST = 01:30 UTC).
        let s = schedule("02:30", "Europe/Berlin");
        assert_eq!(
            s.next_daily_run(utc("2026-03-29 00:00")),
            utc("2026-03-29 01:30")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pings_fire_on_their_interval() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let s = Schedule::parse("23:25", "UTC", 60).unwrap();
        let scheduler = Scheduler::new(s);
        let pings = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pings);

        let task = tokio::spawn(async move {
            scheduler
                .run(|_| {}, move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        });

        tokio::time::sleep(Duration::from_secs(185)).await;
        task.abort();
        assert_eq!(pings.load(Ordering::SeqCst), 3);
    }
}
