//! Calendar helpers shared across the sweep.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a portal date. ISO `YYYY-MM-DD` is canonical; the slashed
/// `DD/MM/YYYY` form still appears in older rows.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

/// Parses a submission timestamp: RFC 3339 first, then the portal's
/// space-separated form, then a bare date at midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed);
    }
    parse_date(trimmed).map(|date| date.and_time(NaiveTime::MIN))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_datetime(moment: NaiveDateTime) -> String {
    moment.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Rolls a cleared affiliate's due date forward: a due date in the
/// current year moves to the same day next year, one in an earlier year
/// catches up to the current year, and a future due date stays put.
/// Feb 29 lands on Feb 28 when the target year is not a leap year.
pub fn advance_due_date(due: NaiveDate, current_year: i32) -> NaiveDate {
    if due.year() == current_year {
        rebase(due, current_year + 1)
    } else if due.year() < current_year {
        rebase(due, current_year)
    } else {
        due
    }
}

fn rebase(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or(date)
}
