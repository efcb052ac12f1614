use chrono::NaiveDate;

/// Failures from week resolution, date partitioning and the small parsers
/// that feed them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("week number {0:?} is not in the week table")]
    UnknownWeekNumber(String),

    #[error("{0:?} is not a day of the week")]
    InvalidWeekday(String),

    #[error("cannot partition an empty set of dates")]
    EmptyDateSet,

    /// A non-positive gap survived sorting and de-duplication.
    #[error("date set is corrupt: {next} does not come after {previous}")]
    CorruptDateSet { previous: NaiveDate, next: NaiveDate },

    #[error("malformed week range {0:?}")]
    InvalidWeekRange(String),

    #[error("malformed time of day {0:?}")]
    InvalidTime(String),

    #[error("malformed date {0:?}")]
    InvalidDate(String),
}
