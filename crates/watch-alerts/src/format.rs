//! Message templates for alerts, daily summaries, and liveness pings.

use chrono::NaiveDate;

/// Formats the alert message for a threshold crossing.
///
/// Fixed template: the current count plus an operator mention, destined
/// for the alert channel.
#[must_use]
pub fn alert_text(count: u32, operator: &str) -> String {
    format!(
        ":red_circle: Alert! Restart requests exceeded limit: {count} :red_circle:\n<@{operator}> FYI"
    )
}

/// Title line accompanying the per-service report sent with an alert.
#[must_use]
pub fn alert_report_title() -> &'static str {
    "Restart list"
}

/// Formats the daily summary line.
#[must_use]
pub fn daily_summary(date: NaiveDate, count: u32) -> String {
    format!("Total restart requests on {date}: {count} :alien:")
}

/// Title line accompanying the daily per-service report block.
#[must_use]
pub fn daily_report_title() -> &'static str {
    "Restart is coming soon :alien:"
}

/// Liveness ping message.
#[must_use]
pub fn ping_text() -> &'static str {
    "✅ Bot is alive!"
}
