//! Restart-request classification for chat operations channels.
//!
//! `watch-classify` decides whether a free-text chat message is a restart
//! request and parses qualifying messages into a structured per-service
//! report. It is the front half of the restwatch pipeline:
//!
//! - [`MessageFilter`]: a pure predicate over message text.
//! - [`ServiceExtractor`]: turns restart requests into a [`ServiceReport`]
//!   mapping canonical service names to deduplicated detail tokens.
//! - [`vocab`]: the fixed keyword vocabulary, synonym table, per-service
//!   split rules, and service weights, kept as data so they can be tested
//!   and extended independently of the matching engine.
//!
//! Classification is keyword based, not semantic. All matching is
//! case-insensitive on whole words.
//!
//! # Example
//!
//! ```rust
//! use watch_classify::{FilterConfig, MessageFilter, ServiceExtractor};
//!
//! let filter = MessageFilter::new(FilterConfig::default());
//! let text = "### restart: ecn/mm - BookA, BookB";
//! assert!(filter.classify(text));
//!
//! let extractor = ServiceExtractor::new();
//! let report = extractor.extract([text]);
//! assert_eq!(
//!     report.details("ecn/mm").map(|d| d.len()),
//!     Some(2),
//! );
//! ```

#![forbid(unsafe_code)]

pub mod extract;
pub mod filter;
pub mod types;
pub mod vocab;

pub use extract::ServiceExtractor;
pub use filter::{FilterConfig, MessageFilter};
pub use types::{ChannelId, RawMessage, ServiceReport};
pub use vocab::{canonicalize, weight, RISK_MANAGER, RISK_SENTINEL};
