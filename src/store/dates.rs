//! Date labels and separators for the message list
//!
//! Everything here compares calendar dates in local time. Two messages sent
//! at 00:01 and 23:59 on the same day belong to the same group; elapsed hours
//! never matter.

use chrono::{DateTime, Local, NaiveDate};

/// Local calendar date of a timestamp (time of day dropped)
pub fn calendar_date(timestamp: &DateTime<Local>) -> NaiveDate {
    timestamp.date_naive()
}

/// Separator label for a timestamp relative to `today`
///
/// "TODAY", "YESTERDAY", or the full date upper-cased ("1 JANUARY 2024").
pub fn date_label(timestamp: &DateTime<Local>, today: NaiveDate) -> String {
    let date = calendar_date(timestamp);

    if date == today {
        "TODAY".to_string()
    } else if today.pred_opt() == Some(date) {
        "YESTERDAY".to_string()
    } else {
        date.format("%-d %B %Y").to_string().to_uppercase()
    }
}

/// [`date_label`] against the current local date
pub fn date_label_now(timestamp: &DateTime<Local>) -> String {
    date_label(timestamp, Local::now().date_naive())
}

/// Whether a separator belongs right before `current`
pub fn needs_date_separator(current: &DateTime<Local>, previous: Option<&DateTime<Local>>) -> bool {
    match previous {
        None => true,
        Some(previous) => calendar_date(current) != calendar_date(previous),
    }
}

/// 12-hour clock time, e.g. "9:05 AM"
pub fn format_time(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%-I:%M %p").to_string()
}
