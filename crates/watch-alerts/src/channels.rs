//! Notification channels for alert and report delivery.
//!
//! The [`Notifier`] trait is the seam between the evaluation pipeline and
//! whatever chat backend carries the messages. Implementations here cover
//! structured logging, a webhook-shaped chat payload, and an in-memory
//! recorder for tests.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use watch_classify::{ChannelId, ServiceReport};

use crate::error::{AlertError, Result};

/// Structured message blocks rendering a service report.
///
/// Shaped after chat "section" blocks: each block carries a mrkdwn body,
/// and a report renders as one fenced, pretty-printed JSON block mapping
/// canonical services to their sorted detail lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBlocks {
    blocks: Vec<SectionBlock>,
}

/// One section block with a mrkdwn body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBlock {
    /// Block type discriminator, always `"section"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The block body.
    pub text: MrkdwnText,
}

/// A mrkdwn text body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrkdwnText {
    /// Text type discriminator, always `"mrkdwn"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The rendered text.
    pub text: String,
}

impl MessageBlocks {
    /// Renders a service report as one fenced JSON section block.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::SerializationError`] if the report cannot be
    /// serialized.
    pub fn from_report(report: &ServiceReport) -> Result<Self> {
        let rendered = serde_json::to_string_pretty(report)?;
        Ok(Self {
            blocks: vec![SectionBlock {
                kind: "section".to_string(),
                text: MrkdwnText {
                    kind: "mrkdwn".to_string(),
                    text: format!("```{rendered}```"),
                },
            }],
        })
    }

    /// Returns the blocks.
    #[must_use]
    pub fn blocks(&self) -> &[SectionBlock] {
        &self.blocks
    }

    /// Extracts the fenced JSON body, if this is a report block.
    #[must_use]
    pub fn fenced_body(&self) -> Option<&str> {
        self.blocks
            .first()
            .map(|b| b.text.text.trim_matches('`'))
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// The channel implementation that handled the send.
    pub channel: String,
    /// Whether the message was delivered.
    pub delivered: bool,
    /// Optional detail about the attempt.
    pub detail: Option<String>,
}

impl DeliveryReceipt {
    /// Creates a delivered receipt.
    #[must_use]
    pub fn delivered(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            delivered: true,
            detail: None,
        }
    }

    /// Creates a failed receipt.
    #[must_use]
    pub fn failed(channel: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            delivered: false,
            detail: Some(detail.into()),
        }
    }

    /// Attaches detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Trait for message delivery to a chat backend.
///
/// Sends are treated as opaque synchronous operations; retry and timeout
/// policy belong to the transport behind the implementation, not to the
/// pipeline.
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Returns the name of this notifier.
    fn name(&self) -> &str;

    /// Sends a message, optionally with structured blocks.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotificationFailed`] when the transport
    /// rejects the send outright; a transported-but-unacknowledged send is
    /// reported through the receipt instead.
    fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        blocks: Option<&MessageBlocks>,
    ) -> Result<DeliveryReceipt>;

    /// Returns true if this notifier is enabled.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// A notifier that writes messages to the tracing log.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    name: String,
    enabled: bool,
}

impl LogNotifier {
    /// Creates a log notifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }

    /// Sets whether the notifier is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new("log")
    }
}

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        blocks: Option<&MessageBlocks>,
    ) -> Result<DeliveryReceipt> {
        if !self.is_enabled() {
            return Ok(DeliveryReceipt::delivered(self.name()).with_detail("channel disabled"));
        }

        info!(channel = %channel, message = %text, "outbound message");
        if let Some(blocks) = blocks {
            debug!(channel = %channel, blocks = ?blocks, "outbound blocks");
        }
        Ok(DeliveryReceipt::delivered(self.name()).with_detail("logged to tracing"))
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Configuration for a webhook notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// The name of this webhook.
    pub name: String,
    /// The URL to post payloads to.
    pub url: String,
    /// HTTP headers to include with requests.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Whether this notifier is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl WebhookConfig {
    /// Creates a webhook configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotificationFailed`] if the URL is empty.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(AlertError::NotificationFailed {
                reason: "webhook URL cannot be empty".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            url,
            headers: HashMap::new(),
            enabled: true,
        })
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// The payload posted to a chat webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Destination channel id.
    pub channel: String,
    /// Plain-text message body.
    pub text: String,
    /// Structured blocks, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<MessageBlocks>,
}

/// A webhook-shaped chat notifier.
///
/// Builds and logs the JSON payload for a configured URL. The actual HTTP
/// dispatch is the transport collaborator's concern and plugs in behind
/// this type when an async HTTP client is wired up.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    config: WebhookConfig,
}

impl WebhookNotifier {
    /// Creates a webhook notifier.
    #[must_use]
    pub const fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    /// Returns the webhook URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Formats the payload for a send.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::SerializationError`] if serialization fails.
    pub fn format_payload(
        &self,
        channel: &ChannelId,
        text: &str,
        blocks: Option<&MessageBlocks>,
    ) -> Result<String> {
        let payload = WebhookPayload {
            channel: channel.as_str().to_string(),
            text: text.to_string(),
            blocks: blocks.cloned(),
        };
        serde_json::to_string(&payload).map_err(AlertError::from)
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        blocks: Option<&MessageBlocks>,
    ) -> Result<DeliveryReceipt> {
        if !self.is_enabled() {
            debug!(channel = %self.name(), "notifier is disabled, skipping");
            return Ok(DeliveryReceipt::delivered(self.name()).with_detail("channel disabled"));
        }

        let payload = self.format_payload(channel, text, blocks)?;
        info!(
            notifier = %self.name(),
            url = %self.config.url,
            channel = %channel,
            "would post webhook payload"
        );
        debug!(payload = %payload, "webhook payload");

        Ok(DeliveryReceipt::delivered(self.name()).with_detail("payload queued"))
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// One message captured by the in-memory notifier.
#[derive(Debug, Clone)]
pub struct SentMessage {
    /// Destination channel.
    pub channel: ChannelId,
    /// Message text.
    pub text: String,
    /// Structured blocks, when present.
    pub blocks: Option<MessageBlocks>,
}

/// In-memory notifier for tests: records sends, optionally failing them.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<SentMessage>>,
    fail_sends: Mutex<bool>,
}

impl MemoryNotifier {
    /// Creates a recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends report delivery failure.
    pub fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock() = fail;
    }

    /// Returns all captured messages.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Number of captured messages.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Notifier for MemoryNotifier {
    fn name(&self) -> &str {
        "memory"
    }

    fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        blocks: Option<&MessageBlocks>,
    ) -> Result<DeliveryReceipt> {
        if *self.fail_sends.lock() {
            return Ok(DeliveryReceipt::failed(self.name(), "injected failure"));
        }
        self.sent.lock().push(SentMessage {
            channel: channel.clone(),
            text: text.to_string(),
            blocks: blocks.cloned(),
        });
        Ok(DeliveryReceipt::delivered(self.name()))
    }
}
