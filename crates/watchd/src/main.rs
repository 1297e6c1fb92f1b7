//! watchd - restart-request watcher daemon
//!
//! Watches an operations channel for restart requests, keeps a weighted
//! per-service restart count for the running day, and drives a hysteresis
//! alert plus a daily summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use watch_alerts::{AlertLatch, LogNotifier, Notifier, WebhookConfig, WebhookNotifier};
use watch_pipeline::{EvaluationPipeline, MemorySource, MessageSource};
use watch_scheduler::Scheduler;

mod config;
mod feed;

use config::WatchConfig;

#[derive(Parser)]
#[command(name = "watchd")]
#[command(about = "Restart-request watcher daemon")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon: event feed on stdin plus the scheduler
    Run {
        /// Path to config file
        #[arg(short, long, default_value = "/etc/watchd/config.json")]
        config: PathBuf,

        /// Post outbound messages to this chat webhook URL
        #[arg(long)]
        webhook: Option<String>,
    },

    /// One-shot daily evaluation for a given date
    Check {
        /// Path to config file
        #[arg(short, long, default_value = "/etc/watchd/config.json")]
        config: PathBuf,

        /// Date to evaluate (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Generate a sample config file
    InitConfig {
        /// Path to write config
        #[arg(short, long, default_value = "/etc/watchd/config.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("watchd=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, webhook } => run_daemon(&config, webhook).await?,
        Commands::Check { config, date } => run_check(&config, date.as_deref())?,
        Commands::InitConfig { output } => init_config(&output)?,
    }

    Ok(())
}

fn build_pipeline(
    config: &WatchConfig,
    webhook: Option<String>,
) -> anyhow::Result<(Arc<EvaluationPipeline>, Arc<MemorySource>)> {
    let notifier: Arc<dyn Notifier> = match webhook {
        Some(url) => {
            let webhook_config =
                WebhookConfig::new("chat", url).context("invalid webhook configuration")?;
            Arc::new(WebhookNotifier::new(webhook_config))
        }
        None => Arc::new(LogNotifier::default()),
    };

    // The event feed appends inbound messages here, so the day-so-far
    // window accumulates in process. Check runs evaluate whatever the
    // source holds at that point.
    let store = Arc::new(MemorySource::new(config.timezone()?));
    let source: Arc<dyn MessageSource> = Arc::clone(&store) as Arc<dyn MessageSource>;
    let latch = Arc::new(Mutex::new(AlertLatch::new(config.thresholds)));

    let pipeline = Arc::new(EvaluationPipeline::new(
        config.pipeline_config(),
        latch,
        source,
        notifier,
    ));
    Ok((pipeline, store))
}

async fn run_daemon(config_path: &PathBuf, webhook: Option<String>) -> anyhow::Result<()> {
    let config = WatchConfig::from_file(config_path)?;
    let schedule = config.schedule()?;
    let tz = config.timezone()?;
    let (pipeline, store) = build_pipeline(&config, webhook)?;

    info!(
        watch = %config.watch_channel,
        summary = %config.summary_channel,
        alert = %config.alert_channel,
        "watchd starting"
    );

    let scheduler_pipeline = Arc::clone(&pipeline);
    let ping_pipeline = Arc::clone(&pipeline);
    let scheduler = Scheduler::new(schedule);
    let scheduler_task = tokio::spawn(async move {
        scheduler
            .run(
                move |day| {
                    let _ = scheduler_pipeline.daily_check(day);
                },
                move || ping_pipeline.ping(),
            )
            .await;
    });

    let watch_channel = watch_classify::ChannelId::new(&*config.watch_channel);
    let feed_task = tokio::spawn(feed::run(pipeline, store, watch_channel, tz));

    tokio::select! {
        result = scheduler_task => {
            error!(?result, "scheduler task exited");
        }
        result = feed_task => {
            match result {
                Ok(Ok(())) => info!("event feed finished"),
                Ok(Err(err)) => error!(error = %err, "event feed failed"),
                Err(err) => error!(error = %err, "event feed task panicked"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}

fn run_check(config_path: &PathBuf, date: Option<&str>) -> anyhow::Result<()> {
    let config = WatchConfig::from_file(config_path)?;
    let tz = config.timezone()?;
    let day = match date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))?,
        None => Utc::now().with_timezone(&tz).date_naive(),
    };

    let (pipeline, _store) = build_pipeline(&config, None)?;
    let outcome = pipeline.daily_check(day);

    println!("date: {day}");
    println!("restart requests: {}", outcome.score);
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}

fn init_config(output: &PathBuf) -> anyhow::Result<()> {
    let sample = serde_json::to_string_pretty(&WatchConfig::sample())?;
    std::fs::write(output, sample)
        .with_context(|| format!("failed to write config to '{}'", output.display()))?;
    info!(path = %output.display(), "wrote sample config");
    Ok(())
}
