use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Weekday};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::WorklogError;

/// Layout of a time stamp produced by [`tstamp`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TstampStyle {
    /// `20240115_093000`, suitable for file names
    Compact,
    /// `2024/01/15 09:30:00`
    Readable,
}

/// Formats `at` according to `style`, optionally leaving out the time of day
#[must_use]
pub fn tstamp<Tz: TimeZone>(at: &DateTime<Tz>, style: TstampStyle, show_time: bool) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let format = match (style, show_time) {
        (TstampStyle::Compact, true) => "%Y%m%d_%H%M%S",
        (TstampStyle::Compact, false) => "%Y%m%d",
        (TstampStyle::Readable, true) => "%Y/%m/%d %H:%M:%S",
        (TstampStyle::Readable, false) => "%Y/%m/%d",
    };
    at.format(format).to_string()
}

/// The current local time as a compact time stamp, i.e. `20240115_093000`
#[must_use]
pub fn now_tstamp() -> String {
    tstamp(&Local::now(), TstampStyle::Compact, true)
}

/// Parses a date given on the command line, relative to `today`:
/// `2024-01-15`, `today`, `yesterday` or a weekday name such as `mon` or
/// `friday`, which means the latest such day up to and including `today`.
///
/// # Errors
/// `WorklogError::BadInput` if the text is none of the above
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate, WorklogError> {
    lazy_static! {
        static ref DATE_EXPR: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    let s = s.trim();
    if DATE_EXPR.is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| WorklogError::BadInput(format!("{s}: {e}")));
    }
    match s.to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| WorklogError::BadInput(format!("No day before {today}"))),
        other => other
            .parse::<Weekday>()
            .map(|weekday| last_weekday_from(today, weekday))
            .map_err(|_| {
                WorklogError::BadInput(format!(
                    "Unable to make sense of the date '{s}', expected YYYY-MM-DD, today, yesterday or a weekday"
                ))
            }),
    }
}

/// The latest `weekday` on or before `date`
#[must_use]
pub fn last_weekday_from(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = date.weekday().num_days_from_monday();
    let wanted = weekday.num_days_from_monday();
    let back = (7 + current - wanted) % 7;
    date - Days::new(u64::from(back))
}

/// The Monday of the week holding `date`
#[must_use]
pub fn first_date_in_week_for(date: NaiveDate) -> NaiveDate {
    last_weekday_from(date, Weekday::Mon)
}

#[must_use]
pub fn seconds_to_hour_and_min(seconds: i64) -> String {
    let hour = seconds / 3600;
    let min = seconds % 3600 / 60;
    format!("{hour:02}:{min:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Utc};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn tstamp_styles() {
        let at = Utc.from_utc_datetime(
            &NaiveDateTime::parse_from_str("2024-01-15T09:30:05", "%Y-%m-%dT%H:%M:%S").unwrap(),
        );
        assert_eq!(tstamp(&at, TstampStyle::Compact, true), "20240115_093005");
        assert_eq!(tstamp(&at, TstampStyle::Compact, false), "20240115");
        assert_eq!(tstamp(&at, TstampStyle::Readable, true), "2024/01/15 09:30:05");
        assert_eq!(tstamp(&at, TstampStyle::Readable, false), "2024/01/15");
        assert_eq!(now_tstamp().len(), 15);
    }

    #[test]
    fn relative_dates() {
        // a Wednesday
        let today = date("2024-01-17");
        assert_eq!(parse_date("2024-01-02", today).unwrap(), date("2024-01-02"));
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(parse_date("Yesterday", today).unwrap(), date("2024-01-16"));
        assert_eq!(parse_date("mon", today).unwrap(), date("2024-01-15"));
        assert_eq!(parse_date("wednesday", today).unwrap(), today);
        assert_eq!(parse_date("thu", today).unwrap(), date("2024-01-11"));
    }

    #[test]
    fn nonsense_dates_are_rejected() {
        let today = date("2024-01-17");
        assert!(matches!(parse_date("2024-13-40", today), Err(WorklogError::BadInput(_))));
        assert!(matches!(parse_date("someday", today), Err(WorklogError::BadInput(_))));
    }

    #[test]
    fn seconds_as_hours_and_minutes() {
        assert_eq!(seconds_to_hour_and_min(5400), "01:30");
        assert_eq!(seconds_to_hour_and_min(27000), "07:30");
        assert_eq!(seconds_to_hour_and_min(59), "00:00");
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(first_date_in_week_for(date("2024-01-21")), date("2024-01-15"));
        assert_eq!(first_date_in_week_for(date("2024-01-15")), date("2024-01-15"));
    }
}
