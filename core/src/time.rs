use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    Today,
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Valid options are today, week, or month.")]
pub struct InvalidTimeFrame;

impl FromStr for TimeFrame {
    type Err = InvalidTimeFrame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(TimeFrame::Today),
            "week" => Ok(TimeFrame::Week),
            "month" => Ok(TimeFrame::Month),
            _ => Err(InvalidTimeFrame),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DueDateError {
    #[error("Due date is empty")]
    Empty,
    #[error("Due date '{0}' must use the DD/MM/YYYY format")]
    Malformed(String),
}

/// Inclusive `[start, end]` bounds for the window containing `now`.
pub fn resolve_window(frame: TimeFrame, now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let (first, last) = match frame {
        TimeFrame::Today => (today, today),
        TimeFrame::Week => {
            // ISO week: Monday through Sunday
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            (monday, monday + Duration::days(6))
        }
        TimeFrame::Month => {
            let first = today.with_day(1).unwrap_or(today);
            (first, last_day_of_month(first))
        }
    };
    (start_of_day(first), end_of_day(last))
}

pub fn current_window(frame: TimeFrame) -> (DateTime<Utc>, DateTime<Utc>) {
    resolve_window(frame, Local::now())
}

/// Local calendar date of the server, i.e. "today at midnight".
pub fn start_of_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Strict `DD/MM/YYYY`.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, DueDateError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DueDateError::Empty);
    }

    let parts: Vec<&str> = input.split('/').collect();
    let well_formed = parts.len() == 3
        && (1..=2).contains(&parts[0].len())
        && (1..=2).contains(&parts[1].len())
        && parts[2].len() == 4
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()));
    if !well_formed {
        return Err(DueDateError::Malformed(input.to_string()));
    }

    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .map_err(|_| DueDateError::Malformed(input.to_string()))
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next_month.map(|d| d - Duration::days(1)).unwrap_or(first)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    to_utc(date.and_time(chrono::NaiveTime::MIN), true)
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let naive = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
    to_utc(naive, false)
}

// DST gaps and folds: earliest instant for a lower bound, latest for an upper bound.
fn to_utc(naive: NaiveDateTime, lower: bool) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, latest) => {
            if lower {
                earliest.with_timezone(&Utc)
            } else {
                latest.with_timezone(&Utc)
            }
        }
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Weekday};

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local
            .from_local_datetime(&NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 30, 0).unwrap())
            .earliest()
            .unwrap()
    }

    #[test]
    fn test_time_frame_tokens() {
        assert_eq!("today".parse::<TimeFrame>(), Ok(TimeFrame::Today));
        assert_eq!("week".parse::<TimeFrame>(), Ok(TimeFrame::Week));
        assert_eq!("month".parse::<TimeFrame>(), Ok(TimeFrame::Month));
        assert_eq!("year".parse::<TimeFrame>(), Err(InvalidTimeFrame));
        assert_eq!("Today".parse::<TimeFrame>(), Err(InvalidTimeFrame));
        assert_eq!(
            InvalidTimeFrame.to_string(),
            "Valid options are today, week, or month."
        );
    }

    #[test]
    fn test_today_window_contains_now() {
        let now = Local::now();
        let (start, end) = resolve_window(TimeFrame::Today, now);
        let now_utc = now.with_timezone(&Utc);
        assert!(start <= now_utc && now_utc <= end);

        let start_local = start.with_timezone(&Local);
        assert_eq!(start_local.date_naive(), now.date_naive());
        assert_eq!(start_local.hour(), 0);
        let end_local = end.with_timezone(&Local);
        assert_eq!((end_local.hour(), end_local.minute(), end_local.second()), (23, 59, 59));
    }

    #[test]
    fn test_week_window_starts_monday() {
        // every day of the week starting Monday 2024-03-11
        for day in 11..=17 {
            let (start, end) = resolve_window(TimeFrame::Week, local(2024, 3, day, 12));
            let start_local = start.with_timezone(&Local).date_naive();
            let end_local = end.with_timezone(&Local).date_naive();
            assert_eq!(start_local.weekday(), Weekday::Mon);
            assert_eq!(start_local, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
            assert_eq!(end_local, NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());
        }
    }

    #[test]
    fn test_week_window_across_year_boundary() {
        let (start, end) = resolve_window(TimeFrame::Week, local(2025, 1, 1, 9));
        assert_eq!(start.with_timezone(&Local).date_naive(), NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert_eq!(end.with_timezone(&Local).date_naive(), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn test_month_window() {
        let (start, end) = resolve_window(TimeFrame::Month, local(2024, 2, 14, 8));
        assert_eq!(start.with_timezone(&Local).date_naive(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end.with_timezone(&Local).date_naive(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, end) = resolve_window(TimeFrame::Month, local(2023, 12, 31, 20));
        assert_eq!(end.with_timezone(&Local).date_naive(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(parse_due_date("01/03/2024"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(parse_due_date("1/3/2024"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(parse_due_date(" 29/02/2024 "), Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[test]
    fn test_parse_due_date_rejects_malformed() {
        assert_eq!(parse_due_date(""), Err(DueDateError::Empty));
        for bad in ["2024-03-01", "31/02/2024", "29/02/2023", "01/13/2024", "01/03/24", "01/03/2024x", "aa/bb/cccc", "01//2024"] {
            assert!(
                matches!(parse_due_date(bad), Err(DueDateError::Malformed(_))),
                "accepted {bad}"
            );
        }
    }
}
