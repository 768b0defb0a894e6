//! Time formatting module
//!
//! This module provides the human-friendly relative rendering of task
//! timestamps used by the session views, e.g. "Just now", "5 mins ago" or
//! "Yesterday".

use chrono::{DateTime, Datelike, Utc};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Renders a timestamp relative to `now`.
///
/// Recent times collapse into coarse buckets ("Just now" inside ten seconds,
/// then seconds, minutes, hours, "Yesterday", days, weeks); anything a month
/// or more back falls through to a calendar date, with the year spelled out
/// only when it differs from the current one. Timestamps in the future clamp
/// to "Just now" rather than producing negative counts. `now` is an argument
/// instead of being read from the clock so renders are reproducible.
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_milliseconds().max(0);

    let seconds = diff / MILLIS_PER_SECOND;
    let minutes = diff / MILLIS_PER_MINUTE;
    let hours = diff / MILLIS_PER_HOUR;
    let days = diff / MILLIS_PER_DAY;

    if seconds < 10 {
        return "Just now".to_string();
    }
    if seconds < 60 {
        return format!("{} secs ago", seconds);
    }
    if minutes == 1 {
        return "1 min ago".to_string();
    }
    if minutes < 60 {
        return format!("{} mins ago", minutes);
    }
    if hours == 1 {
        return "1 hour ago".to_string();
    }
    if hours < 24 {
        return format!("{} hours ago", hours);
    }
    if days == 1 {
        return "Yesterday".to_string();
    }
    if days < 7 {
        return format!("{} days ago", days);
    }
    if days < 30 {
        return format!("{} weeks ago", days / 7);
    }

    if timestamp.year() == now.year() {
        timestamp.format("%b %-d").to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn render_secs_ago(now: DateTime<Utc>, secs: i64) -> String {
        format_relative(now - Duration::seconds(secs), now)
    }

    #[test]
    fn test_just_now_inside_ten_seconds() {
        let now = at(2024, 6, 15, 12, 0, 0);
        assert_eq!(render_secs_ago(now, 0), "Just now");
        assert_eq!(render_secs_ago(now, 9), "Just now");
        assert_eq!(render_secs_ago(now, 10), "10 secs ago");
    }

    #[test]
    fn test_seconds_bucket() {
        let now = at(2024, 6, 15, 12, 0, 0);
        assert_eq!(render_secs_ago(now, 42), "42 secs ago");
        assert_eq!(render_secs_ago(now, 59), "59 secs ago");
        assert_eq!(render_secs_ago(now, 60), "1 min ago");
    }

    #[test]
    fn test_minutes_bucket() {
        let now = at(2024, 6, 15, 12, 0, 0);
        // Anything shy of two full minutes still reads as one
        assert_eq!(render_secs_ago(now, 90), "1 min ago");
        assert_eq!(render_secs_ago(now, 119), "1 min ago");
        assert_eq!(render_secs_ago(now, 120), "2 mins ago");
        assert_eq!(render_secs_ago(now, 59 * 60), "59 mins ago");
        assert_eq!(render_secs_ago(now, 60 * 60), "1 hour ago");
    }

    #[test]
    fn test_hours_bucket() {
        let now = at(2024, 6, 15, 12, 0, 0);
        assert_eq!(render_secs_ago(now, 119 * 60), "1 hour ago");
        assert_eq!(render_secs_ago(now, 2 * 3600), "2 hours ago");
        assert_eq!(render_secs_ago(now, 23 * 3600), "23 hours ago");
        assert_eq!(render_secs_ago(now, 24 * 3600), "Yesterday");
    }

    #[test]
    fn test_yesterday_covers_the_whole_second_day() {
        let now = at(2024, 6, 15, 12, 0, 0);
        assert_eq!(render_secs_ago(now, 47 * 3600), "Yesterday");
        assert_eq!(render_secs_ago(now, 48 * 3600), "2 days ago");
    }

    #[test]
    fn test_days_bucket() {
        let now = at(2024, 6, 15, 12, 0, 0);
        assert_eq!(render_secs_ago(now, 6 * 86_400), "6 days ago");
        assert_eq!(render_secs_ago(now, 7 * 86_400), "1 weeks ago");
    }

    #[test]
    fn test_weeks_bucket() {
        let now = at(2024, 6, 15, 12, 0, 0);
        assert_eq!(render_secs_ago(now, 13 * 86_400), "1 weeks ago");
        assert_eq!(render_secs_ago(now, 14 * 86_400), "2 weeks ago");
        assert_eq!(render_secs_ago(now, 29 * 86_400), "4 weeks ago");
    }

    #[test]
    fn test_calendar_date_same_year() {
        let now = at(2024, 6, 15, 12, 0, 0);
        let timestamp = at(2024, 3, 5, 9, 30, 0);
        assert_eq!(format_relative(timestamp, now), "Mar 5");
    }

    #[test]
    fn test_calendar_date_other_year() {
        let now = at(2024, 6, 15, 12, 0, 0);
        let timestamp = at(2023, 11, 5, 9, 30, 0);
        assert_eq!(format_relative(timestamp, now), "Nov 5, 2023");
    }

    #[test]
    fn test_thirty_days_falls_through_to_calendar_date() {
        let now = at(2024, 6, 15, 12, 0, 0);
        assert_eq!(render_secs_ago(now, 30 * 86_400), "May 16");
    }

    #[test]
    fn test_future_timestamps_clamp_to_just_now() {
        let now = at(2024, 6, 15, 12, 0, 0);
        let timestamp = now + Duration::hours(1);
        assert_eq!(format_relative(timestamp, now), "Just now");
    }
}
