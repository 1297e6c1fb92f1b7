//! Evaluation pipeline for restwatch.
//!
//! `watch-pipeline` composes the classification and alerting stages over a
//! batch of messages. Two entry points share the same stages:
//!
//! - [`EvaluationPipeline::daily_check`]: scheduled batch evaluation of a
//!   full day's window, delivering the human-readable summary.
//! - [`EvaluationPipeline::handle_event`]: real-time evaluation triggered
//!   by one inbound message, using the day-so-far window as context.
//!
//! Both paths feed the same shared [`AlertLatch`](watch_alerts::AlertLatch)
//! behind one mutex, so a fire on one path is visible to the other. The
//! message backend sits behind the [`MessageSource`] trait; a fetch failure
//! degrades to an empty batch and never aborts the evaluation loop.

#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod pipeline;
pub mod source;

pub use error::SourceError;
pub use event::MessageEvent;
pub use pipeline::{Evaluation, EvaluationPipeline, Outcome, PipelineConfig};
pub use source::{MemorySource, MessageSource};
