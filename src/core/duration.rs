//! Duration parsing and display helpers
//!
//! Thresholds in the channel file use the compact `1h30m` syntax; status lines
//! use a fixed `H:MM:SS` clock format and log lines use spelled-out units.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Add `format_clock` for status lines
//! - 1.0.0: Compact duration parsing for channel thresholds

use chrono::Duration;

/// Parse a compact duration string like "30m", "2h", "1d", "1h30m".
///
/// Returns `None` for unknown units, trailing digits without a unit, or a
/// total of zero.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut digits = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        if digits.is_empty() {
            return None;
        }

        let value: i64 = digits.parse().ok()?;
        digits.clear();

        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 60 * 60 * 24,
            'w' => 60 * 60 * 24 * 7,
            _ => return None,
        };
        total_seconds = total_seconds.checked_add(value.checked_mul(unit)?)?;
    }

    if !digits.is_empty() || total_seconds <= 0 {
        return None;
    }

    Some(Duration::seconds(total_seconds))
}

/// Format as `H:MM:SS`, dropping sub-second precision. Hours are not wrapped
/// into days, and negative input renders with a leading `-`.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();

    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Format a duration into a human-readable string for log lines
pub fn format_human(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);

    if seconds < 60 {
        format!("{seconds} second{}", plural(seconds))
    } else if seconds < 3600 {
        let mins = seconds / 60;
        format!("{mins} minute{}", plural(mins))
    } else if seconds < 86400 {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{hours} hour{} {mins} minute{}", plural(hours), plural(mins))
        } else {
            format!("{hours} hour{}", plural(hours))
        }
    } else {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        if hours > 0 {
            format!("{days} day{} {hours} hour{}", plural(days), plural(hours))
        } else {
            format!("{days} day{}", plural(days))
        }
    }
}
