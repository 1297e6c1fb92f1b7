//! Real-time message events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use watch_classify::ChannelId;

/// One event from the real-time message feed.
///
/// Feeds deliver loosely-shaped payloads; author and text may be absent
/// (bot posts, deletions, channel joins). An event lacking either required
/// field triggers a reset-check-only pass instead of a full evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Author of the message, if any.
    #[serde(default)]
    pub author: Option<String>,
    /// Message text, if any.
    #[serde(default)]
    pub text: Option<String>,
    /// When the message was posted.
    #[serde(default)]
    pub ts: Option<DateTime<Utc>>,
    /// The channel the event originated from.
    #[serde(default)]
    pub channel: Option<ChannelId>,
}

impl MessageEvent {
    /// Creates a complete event.
    #[must_use]
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            text: Some(text.into()),
            ts: None,
            channel: None,
        }
    }

    /// Returns true if the event carries both required fields.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.author.is_some() && self.text.is_some()
    }

    /// Returns the text, empty when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}
