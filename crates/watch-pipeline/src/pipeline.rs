//! The evaluation pipeline.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use watch_alerts::format;
use watch_alerts::{score, AlertEvent, AlertLatch, MessageBlocks, Notifier, Thresholds};
use watch_classify::vocab::RESTART_PATTERN;
use watch_classify::{ChannelId, FilterConfig, MessageFilter, RawMessage, ServiceExtractor, ServiceReport};

use crate::event::MessageEvent;
use crate::source::MessageSource;

/// Channel routing and evaluation knobs for one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Channel whose messages are classified.
    pub watch_channel: ChannelId,
    /// Channel receiving the daily summary.
    pub summary_channel: ChannelId,
    /// Channel receiving alerts and liveness pings.
    pub alert_channel: ChannelId,
    /// Operator user id mentioned in alert messages.
    pub operator: String,
    /// Alert latch thresholds.
    pub thresholds: Thresholds,
    /// Message filter configuration.
    pub filter: FilterConfig,
}

/// Result of one batch evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Per-service restart details.
    pub report: ServiceReport,
    /// Weighted restart count.
    pub score: u32,
}

/// Result of one evaluation that was fed through the alert latch.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Per-service restart details.
    pub report: ServiceReport,
    /// Weighted restart count.
    pub score: u32,
    /// The alert event, when this evaluation warranted one.
    pub alert: Option<AlertEvent>,
}

/// Composes filter, extractor, counter, and latch over message batches.
///
/// One pipeline instance is shared by both trigger paths (real-time events
/// and the scheduler). The alert latch is handed in by the caller as a
/// shared handle and every access goes through its mutex, which serializes
/// the two paths; everything else in an evaluation is batch-local.
#[derive(Debug)]
pub struct EvaluationPipeline {
    config: PipelineConfig,
    filter: MessageFilter,
    extractor: ServiceExtractor,
    latch: Arc<Mutex<AlertLatch>>,
    source: Arc<dyn MessageSource>,
    notifier: Arc<dyn Notifier>,
}

impl EvaluationPipeline {
    /// Creates a pipeline over the given collaborators.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        latch: Arc<Mutex<AlertLatch>>,
        source: Arc<dyn MessageSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let filter = MessageFilter::new(config.filter);
        Self {
            config,
            filter,
            extractor: ServiceExtractor::new(),
            latch,
            source,
            notifier,
        }
    }

    /// Returns the pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns a handle to the shared alert latch.
    #[must_use]
    pub fn latch(&self) -> Arc<Mutex<AlertLatch>> {
        Arc::clone(&self.latch)
    }

    /// Filters, extracts, and scores one message batch.
    ///
    /// Pure with respect to shared state: the latch is not touched.
    #[must_use]
    pub fn evaluate_batch(&self, messages: &[RawMessage]) -> Evaluation {
        let requests = messages
            .iter()
            .filter(|m| self.filter.classify(&m.text))
            .map(|m| m.text.as_str());
        let report = self.extractor.extract(requests);
        let score = score(&report);
        debug!(
            messages = messages.len(),
            services = report.len(),
            details = report.total_details(),
            score,
            "evaluated batch"
        );
        Evaluation { report, score }
    }

    /// Evaluates a batch and feeds the score through the alert latch.
    ///
    /// When the latch warrants an alert, the alert message and the
    /// structured restart list are sent to the alert channel; the latch is
    /// armed only after the alert message reports delivery.
    #[must_use]
    pub fn evaluate_and_maybe_alert(&self, messages: &[RawMessage]) -> Outcome {
        let Evaluation { report, score } = self.evaluate_batch(messages);

        let mut latch = self.latch.lock();
        let alert = latch.evaluate(score);
        if let Some(event) = alert {
            self.deliver_alert(&mut latch, event, &report);
        }

        Outcome {
            report,
            score,
            alert,
        }
    }

    /// Real-time entry point: one inbound event, evaluated against the
    /// day-so-far window.
    ///
    /// Scoring is a property of the whole day's accumulated messages, so
    /// the triggering event only decides which pass runs: events lacking
    /// required fields, and events without a restart keyword, run a
    /// reset-check-only pass that can never raise an alert.
    #[must_use]
    pub fn handle_event(&self, event: &MessageEvent, day: NaiveDate) -> Outcome {
        let messages = self.fetch_window(day);

        if !event.is_complete() || !RESTART_PATTERN.is_match(event.text()) {
            let Evaluation { report, score } = self.evaluate_batch(&messages);
            self.latch.lock().check_reset(score);
            return Outcome {
                report,
                score,
                alert: None,
            };
        }

        self.evaluate_and_maybe_alert(&messages)
    }

    /// Batch entry point: evaluates a full day and delivers the summary.
    ///
    /// Sends the count line and the structured service table to the
    /// summary channel. Delivery failures are logged and never abort the
    /// evaluation.
    pub fn daily_check(&self, day: NaiveDate) -> Outcome {
        let messages = self.fetch_window(day);
        let outcome = self.evaluate_and_maybe_alert(&messages);

        let summary = format::daily_summary(day, outcome.score);
        self.send_logged(&self.config.summary_channel, &summary, None);

        match MessageBlocks::from_report(&outcome.report) {
            Ok(blocks) => self.send_logged(
                &self.config.summary_channel,
                format::daily_report_title(),
                Some(&blocks),
            ),
            Err(err) => warn!(error = %err, "failed to render daily report block"),
        }

        info!(?day, score = outcome.score, "daily check complete");
        outcome
    }

    /// Sends the liveness ping to the alert channel.
    pub fn ping(&self) {
        self.send_logged(&self.config.alert_channel, format::ping_text(), None);
    }

    /// Fetches the day's window, degrading a fetch failure to an empty
    /// batch.
    #[must_use]
    pub fn fetch_window(&self, day: NaiveDate) -> Vec<RawMessage> {
        match self.source.fetch(&self.config.watch_channel, day) {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, ?day, "message fetch failed, evaluating empty batch");
                Vec::new()
            }
        }
    }

    fn deliver_alert(&self, latch: &mut AlertLatch, event: AlertEvent, report: &ServiceReport) {
        let text = format::alert_text(event.count, &self.config.operator);
        match self.notifier.send(&self.config.alert_channel, &text, None) {
            Ok(receipt) if receipt.delivered => {
                latch.confirm();
                info!(count = event.count, "alert delivered, latch armed");

                // Follow up with the restart list. A failure here is logged
                // but does not unlatch the already-delivered alert.
                match MessageBlocks::from_report(report) {
                    Ok(blocks) => self.send_logged(
                        &self.config.alert_channel,
                        format::alert_report_title(),
                        Some(&blocks),
                    ),
                    Err(err) => warn!(error = %err, "failed to render restart list"),
                }
            }
            Ok(receipt) => {
                warn!(
                    count = event.count,
                    detail = receipt.detail.as_deref().unwrap_or(""),
                    "alert not delivered, will retry on next evaluation"
                );
            }
            Err(err) => {
                warn!(count = event.count, error = %err, "alert send failed, will retry on next evaluation");
            }
        }
    }

    fn send_logged(&self, channel: &ChannelId, text: &str, blocks: Option<&MessageBlocks>) {
        match self.notifier.send(channel, text, blocks) {
            Ok(receipt) if receipt.delivered => {}
            Ok(receipt) => warn!(
                channel = %channel,
                detail = receipt.detail.as_deref().unwrap_or(""),
                "message not delivered"
            ),
            Err(err) => warn!(channel = %channel, error = %err, "message send failed"),
        }
    }
}
