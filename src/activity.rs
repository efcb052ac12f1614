use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::{error::CalendarError, week_calendar::WeekTable};

/// One row of a module timetable report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub day_of_the_week: String,
    /// e.g. `COMP2181/PRAC/001`.
    pub activity: String,
    /// The module name, e.g. `Programming Paradigms`.
    pub description: String,
    pub module: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub duration: String,
    pub room: String,
    pub staff: String,
    pub dates: Vec<NaiveDate>,
    pub planned_size: String,
}

/// Expands a week list such as `"13-21, 26-35, 41-42"` into the dates on
/// which `weekday_name` falls in each of those weeks.
pub fn expand_weeks(
    weeks_raw: &str,
    weekday_name: &str,
    table: &WeekTable,
) -> Result<Vec<NaiveDate>, CalendarError> {
    let mut dates = Vec::new();
    for value in weeks_raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        match value.split_once('-') {
            Some((lower, upper)) => {
                let parse = |bound: &str| {
                    bound
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| CalendarError::InvalidWeekRange(value.to_string()))
                };
                let (lower, upper) = (parse(lower)?, parse(upper)?);
                if lower > upper {
                    return Err(CalendarError::InvalidWeekRange(value.to_string()));
                }
                for week in lower..=upper {
                    dates.push(table.resolve(&week.to_string(), weekday_name)?);
                }
            }
            None => dates.push(table.resolve(value, weekday_name)?),
        }
    }
    Ok(dates)
}

/// Parses `9:00` or `09:00`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, CalendarError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| CalendarError::InvalidTime(raw.to_string()))
}

/// The report lists end times a quarter of an hour before the session
/// actually finishes. An end that would roll past midnight is rejected.
pub fn corrected_end_time(raw: &str) -> Result<NaiveTime, CalendarError> {
    let end = parse_time_of_day(raw)?;
    match end.overflowing_add_signed(TimeDelta::minutes(15)) {
        (corrected, 0) => Ok(corrected),
        _ => Err(CalendarError::InvalidTime(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expands_single_weeks_and_spans() {
        let table = WeekTable::durham_2022_23();
        let dates = expand_weeks("12-14, 19", "Tuesday", &table).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2022, 10, 4),
                date(2022, 10, 11),
                date(2022, 10, 18),
                date(2022, 11, 22),
            ]
        );
    }

    #[test]
    fn span_with_one_week_is_allowed() {
        let table = WeekTable::durham_2022_23();
        let dates = expand_weeks("42-42", "Friday", &table).unwrap();
        assert_eq!(dates, vec![date(2023, 5, 5)]);
    }

    #[test]
    fn rejects_malformed_ranges() {
        let table = WeekTable::durham_2022_23();
        assert_eq!(
            expand_weeks("14-12", "Monday", &table),
            Err(CalendarError::InvalidWeekRange("14-12".to_string()))
        );
        assert_eq!(
            expand_weeks("a-3", "Monday", &table),
            Err(CalendarError::InvalidWeekRange("a-3".to_string()))
        );
    }

    #[test]
    fn propagates_resolver_errors() {
        let table = WeekTable::durham_2022_23();
        assert_eq!(
            expand_weeks("50-53", "Monday", &table),
            Err(CalendarError::UnknownWeekNumber("53".to_string()))
        );
        assert!(matches!(
            expand_weeks("12", "Someday", &table),
            Err(CalendarError::InvalidWeekday(_))
        ));
    }

    #[test]
    fn parses_unpadded_times() {
        assert_eq!(
            parse_time_of_day("9:00"),
            Ok(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
        assert_eq!(
            parse_time_of_day("13:30"),
            Ok(NaiveTime::from_hms_opt(13, 30, 0).unwrap())
        );
        assert!(parse_time_of_day("noon").is_err());
    }

    #[test]
    fn end_time_gains_a_quarter_hour() {
        assert_eq!(
            corrected_end_time("10:45"),
            Ok(NaiveTime::from_hms_opt(11, 0, 0).unwrap())
        );
    }

    #[test]
    fn end_time_past_midnight_is_rejected() {
        assert_eq!(
            corrected_end_time("23:50"),
            Err(CalendarError::InvalidTime("23:50".to_string()))
        );
        assert_eq!(
            corrected_end_time("23:45"),
            Err(CalendarError::InvalidTime("23:45".to_string()))
        );
        assert_eq!(
            corrected_end_time("23:44"),
            Ok(NaiveTime::from_hms_opt(23, 59, 0).unwrap())
        );
    }
}
