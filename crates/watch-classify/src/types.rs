//! Core data model shared across the restwatch pipeline.
//!
//! - [`ChannelId`]: opaque chat channel identifier.
//! - [`RawMessage`]: one message as supplied by the message source.
//! - [`ServiceReport`]: canonical service name → ordered set of detail
//!   tokens, accumulated over one evaluation window.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One chat message as delivered by the message source.
///
/// Immutable; the original text is carried unchanged and any normalization
/// happens downstream in the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// The message text.
    pub text: String,
    /// When the message was posted.
    pub ts: DateTime<Utc>,
    /// The channel the message was posted to.
    pub channel: ChannelId,
}

impl RawMessage {
    /// Creates a raw message.
    #[must_use]
    pub fn new(text: impl Into<String>, ts: DateTime<Utc>, channel: ChannelId) -> Self {
        Self {
            text: text.into(),
            ts,
            channel,
        }
    }
}

/// Per-service restart details for one evaluation window.
///
/// Maps canonical service names to the set of distinct, trimmed detail
/// tokens mentioned for that service. Both keys and details are kept in
/// BTree containers, so deduplication and the deterministic lexicographic
/// rendering order are properties of the container rather than of callers.
///
/// Reports are created fresh per evaluation window; detail tokens are
/// deduplicated within one window, never across windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceReport {
    services: BTreeMap<String, BTreeSet<String>>,
}

impl ServiceReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a service occurrence with no details.
    ///
    /// The service key is considered matched even when no details clause
    /// was found for it.
    pub fn touch(&mut self, service: &str) {
        self.services.entry(service.to_string()).or_default();
    }

    /// Adds one detail token to a service, trimming whitespace.
    ///
    /// Empty tokens (after trimming) are discarded.
    pub fn insert_detail(&mut self, service: &str, detail: &str) {
        let detail = detail.trim();
        if detail.is_empty() {
            self.touch(service);
            return;
        }
        self.services
            .entry(service.to_string())
            .or_default()
            .insert(detail.to_string());
    }

    /// Merges another report into this one.
    pub fn merge(&mut self, other: Self) {
        for (service, details) in other.services {
            self.services.entry(service).or_default().extend(details);
        }
    }

    /// Returns the detail set for a service, if the service was matched.
    #[must_use]
    pub fn details(&self, service: &str) -> Option<&BTreeSet<String>> {
        self.services.get(service)
    }

    /// Returns true if no service was matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Number of matched services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Total number of detail tokens across all services.
    #[must_use]
    pub fn total_details(&self) -> usize {
        self.services.values().map(BTreeSet::len).sum()
    }

    /// Iterates over services and their detail sets in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.services.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over matched service names in lexicographic order.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_detail_trims_and_dedups() {
        let mut report = ServiceReport::new();
        report.insert_detail("ecn/mm", "  BookA ");
        report.insert_detail("ecn/mm", "BookA");
        report.insert_detail("ecn/mm", "BookB");

        let details = report.details("ecn/mm").unwrap();
        assert_eq!(details.len(), 2);
        assert!(details.contains("BookA"));
        assert!(details.contains("BookB"));
    }

    #[test]
    fn insert_empty_detail_still_records_service() {
        let mut report = ServiceReport::new();
        report.insert_detail("market-driver", "   ");

        assert_eq!(report.len(), 1);
        assert!(report.details("market-driver").unwrap().is_empty());
    }

    #[test]
    fn touch_records_service_without_details() {
        let mut report = ServiceReport::new();
        report.touch("aggregator");

        assert!(!report.is_empty());
        assert!(report.details("aggregator").unwrap().is_empty());
    }

    #[test]
    fn merge_unions_detail_sets() {
        let mut a = ServiceReport::new();
        a.insert_detail("ecn/mm", "BookA");
        let mut b = ServiceReport::new();
        b.insert_detail("ecn/mm", "BookB");
        b.insert_detail("risk-manager", "1");

        a.merge(b);
        assert_eq!(a.details("ecn/mm").unwrap().len(), 2);
        assert_eq!(a.details("risk-manager").unwrap().len(), 1);
        assert_eq!(a.total_details(), 3);
    }

    #[test]
    fn iteration_is_lexicographic() {
        let mut report = ServiceReport::new();
        report.touch("risk-manager");
        report.touch("ecn/mm");
        report.touch("market-driver");

        let order: Vec<&str> = report.services().collect();
        assert_eq!(order, vec!["ecn/mm", "market-driver", "risk-manager"]);
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut report = ServiceReport::new();
        report.insert_detail("ecn/mm", "BookB");
        report.insert_detail("ecn/mm", "BookA");

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"ecn/mm":["BookA","BookB"]}"#);
    }
}
