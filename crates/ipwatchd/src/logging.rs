//! Log line formatting: `[yyyy/mm/dd hh:mm] message`

use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::fmt::format::{DefaultFields, Format, Full, Writer};
use tracing_subscriber::fmt::time::FormatTime;

/// Local wall-clock timestamp with minute resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct MinuteTimestamp;

impl FormatTime for MinuteTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", format_timestamp(&Local::now()))
    }
}

/// `[2026/10/15 09:05]`
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("[%Y/%m/%d %H:%M]").to_string()
}

/// Subscriber settings shared by the daemon and its tests (writes to stdout)
fn builder(
    max_level: Level,
) -> SubscriberBuilder<DefaultFields, Format<Full, MinuteTimestamp>, LevelFilter> {
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_timer(MinuteTimestamp)
        .with_level(false)
        .with_target(false)
        .with_ansi(false)
}

/// Install the global subscriber
pub fn init(max_level: Level) -> anyhow::Result<()> {
    let subscriber = builder(max_level).finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}
