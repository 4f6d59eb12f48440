//! Deadline parsing and formatting.
//!
//! Deadlines are UTC timestamps on the wire. User input and AI suggestions are
//! looser, so parsing accepts full timestamps, `datetime-local` style values,
//! plain dates and a handful of natural forms.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse a deadline typed by a user or proposed by the suggestion service.
///
/// Supports:
/// - RFC 3339 timestamps ("2025-03-01T14:30:00Z", "2025-03-01T14:30:00+02:00")
/// - naive datetimes, read as UTC ("2025-03-01T14:30", "2025-03-01 14:30:00")
/// - "YYYY-MM-DD"
/// - "today", "tomorrow"
/// - "in 3d", "in 2w" (non-negative offsets only)
/// - weekday names ("friday", "next monday")
///
/// Date-only forms resolve to the last second of that day. Offsets that run
/// past the representable calendar are rejected.
pub fn parse_deadline_input(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(end_of_day(date));
    }

    parse_relative_date(&s.to_lowercase(), now.date_naive()).map(end_of_day)
}

/// Parse a deadline proposed by the suggestion service. Only RFC 3339
/// timestamps and `YYYY-MM-DD` dates are accepted.
pub fn parse_suggested_deadline(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(end_of_day)
}

fn parse_relative_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    match s {
        "today" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let days = if let Some(nd) = rest.strip_suffix('d') {
            nd.trim().parse::<u64>().ok()?
        } else if let Some(nw) = rest.strip_suffix('w') {
            nw.trim().parse::<u64>().ok()?.checked_mul(7)?
        } else {
            return None;
        };
        return today.checked_add_days(Days::new(days));
    }

    let weekdays: [(&str, u64); 7] = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
    ];
    let (next_week, name) = match s.strip_prefix("next ") {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (_, target) = weekdays.iter().find(|(day, _)| *day == name || day[..3] == *name)?;
    let current = today.weekday().num_days_from_monday() as u64;
    let mut ahead = (target + 7 - current) % 7;
    if next_week {
        ahead += 7;
    }
    today.checked_add_days(Days::new(ahead))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()).and_utc()
}

/// Format a deadline relative to now ("today", "tomorrow", "in 3d", "2d late").
pub fn format_deadline_relative(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match deadline {
        None => "-".into(),
        Some(d) => {
            let days = (d.date_naive() - now.date_naive()).num_days();
            if days == 0 {
                "today".into()
            } else if days == 1 {
                "tomorrow".into()
            } else if days > 1 {
                format!("in {days}d")
            } else {
                format!("{}d late", -days)
            }
        }
    }
}

/// Format a timestamp for tables and detail views.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}
