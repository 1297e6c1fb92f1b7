//! Real-time event feed.
//!
//! Reads one JSON-encoded [`MessageEvent`] per line from stdin. Complete
//! events are appended to the in-process message store, then every event
//! is routed through the pipeline's real-time entry point, so the
//! day-so-far window accumulates as events arrive. Malformed lines are
//! logged and skipped; the loop runs until the stream closes.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use watch_classify::{ChannelId, RawMessage};
use watch_pipeline::{EvaluationPipeline, MemorySource, MessageEvent};

/// Runs the feed until stdin closes.
pub async fn run(
    pipeline: Arc<EvaluationPipeline>,
    store: Arc<MemorySource>,
    watch_channel: ChannelId,
    tz: Tz,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<MessageEvent>(line) {
            Ok(event) => {
                if let Some(text) = event.text.as_deref() {
                    if event.is_complete() {
                        let channel = event.channel.clone().unwrap_or_else(|| watch_channel.clone());
                        let ts = event.ts.unwrap_or_else(Utc::now);
                        store.push(RawMessage::new(text, ts, channel));
                    }
                }

                let day = Utc::now().with_timezone(&tz).date_naive();
                let outcome = pipeline.handle_event(&event, day);
                debug!(
                    score = outcome.score,
                    fired = outcome.alert.is_some(),
                    complete = event.is_complete(),
                    "event processed"
                );
            }
            Err(err) => warn!(error = %err, "ignoring malformed event"),
        }
    }

    info!("event feed closed");
    Ok(())
}
