//! Splits a long date range into provider-sized request windows.

use std::num::NonZeroU32;

use chrono::{Days, NaiveDate};

use crate::models::time_range::TimeRange;

/// Plans the ordered windows covering `start..=end`.
///
/// Each window spans at most `max_span_days` days, the first starts at `start`,
/// the last ends at `end`, and every window begins the day after the previous
/// one ended. Returns no windows when `start >= end`.
pub fn plan_windows(start: NaiveDate, end: NaiveDate, max_span_days: NonZeroU32) -> Vec<TimeRange> {
    if start >= end {
        return Vec::new();
    }

    let span = Days::new(u64::from(max_span_days.get()));
    let mut windows = Vec::new();
    let mut cursor = start;

    loop {
        let window_end = cursor
            .checked_add_days(span)
            .map_or(end, |candidate| candidate.min(end));
        let Some(window) = TimeRange::new(cursor, window_end) else {
            break;
        };
        windows.push(window);

        if window_end >= end {
            break;
        }
        match window_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    windows
}

/// [`plan_windows`] over an existing range.
pub fn plan_range(range: &TimeRange, max_span_days: NonZeroU32) -> Vec<TimeRange> {
    plan_windows(range.start(), range.end(), max_span_days)
}

/// Most weekdays, hence most daily bars, a window of `max_span_days` can hold.
///
/// A window covers `max_span_days + 1` calendar days and at most five of any
/// seven consecutive days are weekdays.
pub fn max_weekdays_in_window(max_span_days: NonZeroU32) -> u64 {
    let days = u64::from(max_span_days.get()) + 1;
    5 * (days / 7) + (days % 7).min(5)
}
