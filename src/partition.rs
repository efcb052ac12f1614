//! Compression of an activity's occurrence dates into recurrence rules.
//!
//! Teaching activities usually repeat every 7 days within a term, with a
//! longer gap (35 or 42 days) across a vacation. Run-length encoding the gaps
//! between consecutive dates finds those boundaries without any knowledge of
//! the term calendar.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CalendarError;

/// A maximal run of equally spaced dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrencePartition {
    pub first_date: NaiveDate,
    pub dates: Vec<NaiveDate>,
    /// `None` when the partition holds a single date.
    pub interval_days: Option<i64>,
    pub count: usize,
}

impl RecurrencePartition {
    fn new(dates: &[NaiveDate], interval_days: Option<i64>) -> Self {
        Self {
            first_date: dates[0],
            dates: dates.to_vec(),
            interval_days,
            count: dates.len(),
        }
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }
}

/// Splits `dates` into runs of constant spacing.
///
/// Neighbouring partitions share their boundary date: the last date of one
/// run is the first date of the next. For example
/// `[2022-10-03, 2022-10-10, 2022-10-17, 2022-11-21]` becomes
/// `[10-03, 10-10, 10-17]` every 7 days and `[10-17, 11-21]` every 35 days.
pub fn partition(
    dates: impl IntoIterator<Item = NaiveDate>,
) -> Result<Vec<RecurrencePartition>, CalendarError> {
    let mut sorted: Vec<NaiveDate> = dates.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    if sorted.is_empty() {
        return Err(CalendarError::EmptyDateSet);
    }
    if sorted.len() == 1 {
        return Ok(vec![RecurrencePartition::new(&sorted, None)]);
    }

    let gaps = sorted
        .windows(2)
        .map(|pair| {
            let gap = (pair[1] - pair[0]).num_days();
            if gap <= 0 {
                return Err(CalendarError::CorruptDateSet {
                    previous: pair[0],
                    next: pair[1],
                });
            }
            Ok(gap)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut partitions = Vec::new();
    let mut cursor = 0;
    for (gap, run_length) in run_lengths(&gaps) {
        let next_cursor = cursor + run_length;
        partitions.push(RecurrencePartition::new(
            &sorted[cursor..=next_cursor],
            Some(gap),
        ));
        cursor = next_cursor;
    }

    Ok(partitions)
}

/// `(value, length)` for each maximal run of equal values, left to right.
fn run_lengths(values: &[i64]) -> Vec<(i64, usize)> {
    let mut runs: Vec<(i64, usize)> = Vec::new();
    for &value in values {
        match runs.last_mut() {
            Some((current, length)) if *current == value => *length += 1,
            _ => runs.push((value, 1)),
        }
    }
    runs
}
