//! Issue date and violation time parsing.
//!
//! Fiscal-year tables give `issue_date` as `YYYY-MM-DDT00:00:00.000` and
//! `violation_time` as `HHMM` plus `A`/`P` (`"0911A"`). The OPACV table
//! gives `MM/DD/YYYY` and `HH:MM` plus `A`/`P` (`"09:11A"`). Both are wall
//! clock times in New York.

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc,
};
use chrono_tz::America::New_York;

use crate::NormalizeError;

/// A violation timestamp in the three forms carried on a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// New York wall clock time.
    pub local: NaiveDateTime,
    /// The same instant with its New York offset.
    pub eastern: DateTime<FixedOffset>,
    /// The same instant in UTC.
    pub utc: DateTime<Utc>,
}

/// Parses an issue date in either table format.
///
/// # Errors
///
/// Returns [`NormalizeError::UnexpectedDateFormat`] if neither format
/// matches.
pub fn parse_issue_date(value: &str) -> Result<NaiveDate, NormalizeError> {
    let trimmed = value.trim();
    let parsed = if trimmed.contains('/') {
        NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok()
    } else {
        trimmed
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    };
    parsed.ok_or_else(|| NormalizeError::UnexpectedDateFormat {
        value: value.to_string(),
    })
}

/// Parses a violation time. An absent or blank time is midnight.
///
/// 12-hour times are converted to 24-hour: `12xxA` is just after
/// midnight, `12xxP` just after noon, other `P` hours gain twelve. Hours
/// already past 12 are taken as 24-hour regardless of suffix.
///
/// # Errors
///
/// Returns [`NormalizeError::UnexpectedTimeFormat`] for anything else,
/// including three-digit times like `"123A"`.
pub fn parse_violation_time(value: Option<&str>) -> Result<NaiveTime, NormalizeError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(NaiveTime::MIN);
    };
    let unexpected = || NormalizeError::UnexpectedTimeFormat {
        value: raw.to_string(),
    };

    if !raw.is_ascii() {
        return Err(unexpected());
    }
    let upper = raw.to_ascii_uppercase();
    let (body, pm) = if let Some(body) = upper.strip_suffix('A') {
        (body, false)
    } else if let Some(body) = upper.strip_suffix('P') {
        (body, true)
    } else {
        return Err(unexpected());
    };

    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) if (1..=2).contains(&h.len()) && m.len() == 2 => (h, m),
        Some(_) => return Err(unexpected()),
        None if body.len() == 4 => body.split_at(2),
        None => return Err(unexpected()),
    };
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(unexpected());
    }
    let hours: u32 = hours.parse().map_err(|_| unexpected())?;
    let minutes: u32 = minutes.parse().map_err(|_| unexpected())?;

    let hours = match (hours, pm) {
        (12, false) => 0,
        (h @ 0..12, true) => h + 12,
        (h, _) => h,
    };

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(unexpected)
}

/// Combines an issue date and violation time into a New York timestamp.
///
/// Wall clock times that are ambiguous at the end of daylight saving take
/// the earlier instant; times skipped at the start of daylight saving are
/// moved forward by an hour.
///
/// # Errors
///
/// Returns [`NormalizeError`] if either part fails to parse.
pub fn parse_timestamp(
    issue_date: &str,
    violation_time: Option<&str>,
) -> Result<ParsedTimestamp, NormalizeError> {
    let local = parse_issue_date(issue_date)?.and_time(parse_violation_time(violation_time)?);

    let eastern = match New_York.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => New_York
            .from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest()
            .ok_or_else(|| NormalizeError::UnexpectedTimeFormat {
                value: format!("{issue_date} {}", violation_time.unwrap_or_default()),
            })?,
    };

    Ok(ParsedTimestamp {
        local,
        eastern: eastern.fixed_offset(),
        utc: eastern.with_timezone(&Utc),
    })
}
