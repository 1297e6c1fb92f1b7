//! Restart counting and hysteresis alerting for restwatch.
//!
//! `watch-alerts` owns the back half of the pipeline: it reduces a
//! [`ServiceReport`](watch_classify::ServiceReport) to a single weighted
//! count, decides when that count should raise or silently reset an alert,
//! and delivers notifications through pluggable channels.
//!
//! # Hysteresis
//!
//! The [`AlertLatch`] fires once when the count crosses above
//! `fire_above` and stays suppressed until the count returns to or below
//! `reset_at_or_below`. The latch only arms after the caller confirms the
//! notification was delivered, so a dropped send is retried on the next
//! evaluation instead of silently suppressing the excursion.
//!
//! # Example
//!
//! ```rust
//! use watch_alerts::{AlertLatch, Thresholds};
//!
//! let mut latch = AlertLatch::new(Thresholds::default());
//! assert!(latch.evaluate(18).is_none());
//!
//! let event = latch.evaluate(22).unwrap();
//! assert_eq!(event.count, 22);
//! latch.confirm();
//!
//! // Still above threshold: suppressed until reset.
//! assert!(latch.evaluate(25).is_none());
//! assert!(latch.evaluate(19).is_none()); // silent reset
//! assert!(latch.evaluate(23).is_some()); // fresh excursion
//! ```

#![forbid(unsafe_code)]

pub mod channels;
pub mod error;
pub mod format;
pub mod latch;
pub mod score;

pub use channels::{
    DeliveryReceipt, LogNotifier, MemoryNotifier, MessageBlocks, Notifier, SentMessage,
    WebhookConfig, WebhookNotifier,
};
pub use error::{AlertError, Result};
pub use latch::{AlertEvent, AlertLatch, AlertState, Thresholds};
pub use score::score;
