//! Tolerant parsing of the free-form date, time, duration, and weekday
//! strings that arrive from the sign-up sheets.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p", "%H%M"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    // chrono's %p wants an upper-case, undotted meridiem
    let s = raw
        .trim()
        .to_ascii_uppercase()
        .replace("A.M.", "AM")
        .replace("P.M.", "PM");
    if s.is_empty() {
        return None;
    }
    let s = normalize_bare_hour(s);
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&s, fmt).ok())
}

// chrono refuses to parse a time without a minute field, so "8 AM",
// "8AM", and "11" get an explicit ":00" before the format ladder runs.
fn normalize_bare_hour(s: String) -> String {
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, rest) = s.split_at(split);
    let suffix = rest.trim_start();
    if (1..=2).contains(&digits.len()) && (suffix.is_empty() || suffix == "AM" || suffix == "PM") {
        format!("{}:00{}", digits, rest)
    } else {
        s
    }
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            // fall back to a "<date> <time>" split with the tolerant parsers
            let (date_part, time_part) = s.split_once(' ')?;
            Some(parse_date(date_part)?.and_time(parse_time(time_part)?))
        })
}

/// Combines the separately-declared instructor exam date and time columns.
pub fn parse_instructor_datetime(date_raw: &str, time_raw: &str) -> Option<NaiveDateTime> {
    Some(parse_date(date_raw)?.and_time(parse_time(time_raw)?))
}

/// Duration in minutes from "H:MM", a bare number of minutes, or a
/// decimal-hours string. Blank or unrecognized input is 0 minutes.
pub fn parse_duration_minutes(raw: &str) -> i64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0;
    }
    if let Some((h, m)) = s.split_once(':') {
        return h.trim().parse::<i64>().unwrap_or(0) * 60 + m.trim().parse::<i64>().unwrap_or(0);
    }
    if let Ok(minutes) = s.parse::<i64>() {
        return minutes;
    }
    if let Ok(hours) = s.parse::<f64>() {
        return (hours * 60.0).round() as i64;
    }
    0
}

/// Weekday index (0 = Monday .. 6 = Sunday) from a full name, a
/// three-letter abbreviation, or a single-letter code (M/T/W/R/F/S/U).
pub fn parse_weekday(label: &str) -> Option<u32> {
    let d = label.trim().to_ascii_uppercase();
    match d.as_str() {
        "M" => Some(0),
        "T" => Some(1),
        "W" => Some(2),
        "R" => Some(3),
        "F" => Some(4),
        "S" => Some(5),
        "U" => Some(6),
        _ if d.starts_with("MON") => Some(0),
        _ if d.starts_with("TUE") => Some(1),
        _ if d.starts_with("WED") => Some(2),
        _ if d.starts_with("THU") => Some(3),
        _ if d.starts_with("FRI") => Some(4),
        _ if d.starts_with("SAT") => Some(5),
        _ if d.starts_with("SUN") => Some(6),
        _ => None,
    }
}

/// Match times within a +/- tolerance to absorb differences like
/// "11" vs "11:00 AM".
pub fn times_close(a: NaiveTime, b: NaiveTime, tolerance_minutes: i64) -> bool {
    let delta = if a >= b { a - b } else { b - a };
    delta <= Duration::minutes(tolerance_minutes)
}

/// Half-open interval overlap: [s1, e1) intersects [s2, e2).
pub fn overlaps(s1: NaiveDateTime, e1: NaiveDateTime, s2: NaiveDateTime, e2: NaiveDateTime) -> bool {
    s1 < e2 && s2 < e1
}
