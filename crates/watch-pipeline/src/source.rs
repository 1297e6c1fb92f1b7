//! Message source collaborator.

use std::fmt;

use chrono::NaiveDate;
use chrono_tz::Tz;
use parking_lot::Mutex;

use watch_classify::{ChannelId, RawMessage};

use crate::error::SourceError;

/// Trait for retrieving a day's messages from the chat backend.
///
/// `fetch` covers the 24-hour window `[day 00:00, day+1 00:00)` in the
/// source's configured timezone. Implementations own their transport
/// policy (retries, timeouts); the pipeline treats a failure as an empty
/// batch.
pub trait MessageSource: Send + Sync + fmt::Debug {
    /// Fetches all messages for one channel and one calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the backend fetch fails.
    fn fetch(&self, channel: &ChannelId, day: NaiveDate) -> Result<Vec<RawMessage>, SourceError>;
}

/// In-memory message source for tests and offline evaluation.
#[derive(Debug)]
pub struct MemorySource {
    tz: Tz,
    messages: Mutex<Vec<RawMessage>>,
    fail_fetches: Mutex<bool>,
}

impl MemorySource {
    /// Creates an empty source with day windows in the given timezone.
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            messages: Mutex::new(Vec::new()),
            fail_fetches: Mutex::new(false),
        }
    }

    /// Adds a message to the source.
    pub fn push(&self, message: RawMessage) {
        self.messages.lock().push(message);
    }

    /// Makes subsequent fetches fail.
    pub fn fail_fetches(&self, fail: bool) {
        *self.fail_fetches.lock() = fail;
    }
}

impl MessageSource for MemorySource {
    fn fetch(&self, channel: &ChannelId, day: NaiveDate) -> Result<Vec<RawMessage>, SourceError> {
        if *self.fail_fetches.lock() {
            return Err(SourceError::FetchFailed {
                reason: "injected failure".to_string(),
            });
        }

        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| {
                m.channel == *channel && m.ts.with_timezone(&self.tz).date_naive() == day
            })
            .cloned()
            .collect())
    }
}
