//! Restart-request message filter.

use serde::{Deserialize, Serialize};

use crate::vocab::{RESTART_PATTERN, SERVICE_PATTERN};

/// Heading markers that open a structured operational request.
///
/// Markdown heading prefixes, optionally wrapped in emphasis markers.
static HEADING_MARKERS: &[&str] = &["*###", "*##", "###", "##"];

/// Configuration for the message filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Require messages to start with a heading marker.
    ///
    /// Enable when the channel convention marks operational requests with
    /// structured headers; disable for free-form channels.
    #[serde(default)]
    pub require_heading: bool,
}

/// Pure predicate deciding whether a message is a restart request.
///
/// A message qualifies iff it contains a restart/reboot keyword and at
/// least one service keyword, both matched as whole words
/// case-insensitively, and (when configured) begins with a heading marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFilter {
    config: FilterConfig,
}

impl MessageFilter {
    /// Creates a filter with the given configuration.
    #[must_use]
    pub const fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Returns the filter configuration.
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns true if the text is a restart request.
    #[must_use]
    pub fn classify(&self, text: &str) -> bool {
        if self.config.require_heading && !starts_with_heading(text) {
            return false;
        }
        RESTART_PATTERN.is_match(text) && SERVICE_PATTERN.is_match(text)
    }
}

fn starts_with_heading(text: &str) -> bool {
    HEADING_MARKERS.iter().any(|m| text.starts_with(m))
}
