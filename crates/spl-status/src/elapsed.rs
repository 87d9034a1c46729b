// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversions between the accounting command's `elapsed` strings and plain
//! seconds, and between a scheduling timestamp and a human-readable time.

use chrono::{TimeZone, Utc};

/// Render `seconds` (Unix epoch seconds, UTC) as `YYYY-MM-DD HH:MM:SS`.
pub fn seconds_to_time(seconds: f64) -> String {
    let whole = seconds.floor() as i64;
    match Utc.timestamp_opt(whole, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("<invalid timestamp {seconds}>"),
    }
}

/// Convert an `elapsed` string (`SS`, `MM:SS`, `HH:MM:SS`, or
/// `DD-HH:MM:SS`) to a whole number of seconds.
pub fn elapsed_to_seconds(elapsed: &str) -> Option<i64> {
    let (days, hms) = match elapsed.split_once('-') {
        Some((days, rest)) => (days.parse::<i64>().ok()?, rest),
        None => (0, elapsed),
    };

    let fields: Vec<&str> = hms.split(':').collect();
    let (h, m, s) = match fields.as_slice() {
        [s] => (0, 0, s.parse::<i64>().ok()?),
        [m, s] => (0, m.parse::<i64>().ok()?, s.parse::<i64>().ok()?),
        [h, m, s] => (h.parse::<i64>().ok()?, m.parse::<i64>().ok()?, s.parse::<i64>().ok()?),
        _ => return None,
    };

    Some(days * 86_400 + h * 3_600 + m * 60 + s)
}

#[cfg(test)]
#[path = "elapsed_tests.rs"]
mod tests;
