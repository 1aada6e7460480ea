//! Timestamp labels for timeline dividers.

use chrono::{DateTime, Datelike, Days, Local, TimeZone, Utc};
use std::fmt;

/// Formats an epoch-millisecond instant into a divider label.
///
/// Returns `None` when the instant cannot be represented, in which case the
/// caller shows no divider.
pub trait TimeFormatter {
    fn format(&self, epoch_ms: i64) -> Option<String>;
}

impl<F> TimeFormatter for F
where
    F: Fn(i64) -> Option<String>,
{
    fn format(&self, epoch_ms: i64) -> Option<String> {
        self(epoch_ms)
    }
}

/// Formats relative to the local wall clock at call time.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalTimeFormatter;

impl TimeFormatter for LocalTimeFormatter {
    fn format(&self, epoch_ms: i64) -> Option<String> {
        format_time_for_messages(epoch_ms, &Local::now())
    }
}

/// Formats relative to a fixed "now", in that instant's time zone.
#[derive(Clone, Debug)]
pub struct AnchoredTimeFormatter<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl<Tz: TimeZone> AnchoredTimeFormatter<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }
}

impl<Tz> TimeFormatter for AnchoredTimeFormatter<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn format(&self, epoch_ms: i64) -> Option<String> {
        format_time_for_messages(epoch_ms, &self.now)
    }
}

/// Label for a message sent at `epoch_ms`, as seen at `now`.
///
/// - same day: `11:32 PM`
/// - within the last week: `Wed 3:52 PM`
/// - same year: `Jan 5 11:32 PM`
/// - older: `Jan 5 2016 11:32 PM`
pub fn format_time_for_messages<Tz>(epoch_ms: i64, now: &DateTime<Tz>) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let time = DateTime::<Utc>::from_timestamp_millis(epoch_ms)?.with_timezone(&now.timezone());
    let today = now.date_naive();
    let day = time.date_naive();
    let week_ago = today.checked_sub_days(Days::new(7))?;

    let pattern = if day == today {
        "%-I:%M %p"
    } else if day > week_ago {
        "%a %-I:%M %p"
    } else if time.year() == now.year() {
        "%b %-d %-I:%M %p"
    } else {
        "%b %-d %Y %-I:%M %p"
    };

    Some(time.format(pattern).to_string())
}
