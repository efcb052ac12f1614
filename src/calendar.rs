//! Turns partitioned activity dates into calendar events.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    activity::Activity,
    building::{GeoCoordinate, Location},
    error::CalendarError,
    partition::{RecurrencePartition, partition},
    term_dates::TermDates,
};

/// `FREQ=DAILY;INTERVAL=interval_days;COUNT=count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecurrenceRule {
    pub interval_days: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventTime {
    AllDay(NaiveDate),
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDescriptor {
    pub summary: String,
    pub organizer: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub geo: Option<GeoCoordinate>,
    pub time: EventTime,
    pub recurrence: Option<RecurrenceRule>,
    pub excluded_dates: Vec<NaiveDateTime>,
}

/// One event per partition. A partition that starts on the previous
/// partition's last date excludes that date, since the previous event already
/// covers it.
pub fn assemble_events(
    activity: &Activity,
    partitions: &[RecurrencePartition],
    location: Option<&Location>,
) -> Vec<EventDescriptor> {
    let description = format_description(activity);
    let organizer = Some(activity.staff.clone()).filter(|staff| !staff.is_empty());

    let mut previous_last_date: Option<NaiveDate> = None;
    partitions
        .iter()
        .map(|partition| {
            let start = partition.first_date.and_time(activity.start);
            let excluded_dates = match previous_last_date {
                Some(date) if date == partition.first_date => vec![start],
                _ => vec![],
            };
            previous_last_date = Some(partition.last_date());

            EventDescriptor {
                summary: activity.activity.clone(),
                organizer: organizer.clone(),
                description: description.clone(),
                location: location.map(|location| location.url.clone()),
                geo: location.and_then(|location| location.geo),
                time: EventTime::Timed {
                    start,
                    end: partition.first_date.and_time(activity.end),
                },
                recurrence: partition.interval_days.map(|interval_days| RecurrenceRule {
                    interval_days,
                    count: partition.count,
                }),
                excluded_dates,
            }
        })
        .collect()
}

/// Partitions the activity's dates and assembles its events.
pub fn activity_events(
    activity: &Activity,
    location: Option<&Location>,
) -> Result<Vec<EventDescriptor>, CalendarError> {
    let partitions = partition(activity.dates.iter().copied())?;
    Ok(assemble_events(activity, &partitions, location))
}

pub fn format_description(activity: &Activity) -> String {
    let mut dates = activity.dates.clone();
    dates.sort_unstable();
    let dates = dates
        .iter()
        .map(|date| date.format("%d/%m/%Y").to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let staff = if activity.staff.is_empty() {
        "(Info not available)"
    } else {
        activity.staff.as_str()
    };

    [
        "*** Activity ***".to_string(),
        format!("{}\n", activity.activity),
        "*** Module ***".to_string(),
        format!("{} - {}\n", activity.module, activity.description),
        "*** Room ***".to_string(),
        format!("{}\n", activity.room),
        "*** All Event Dates ***".to_string(),
        format!("{dates}\n"),
        "*** Staff ***".to_string(),
        format!("{staff}\n"),
        "*** Planned Size ***".to_string(),
        activity.planned_size.clone(),
    ]
    .join("\n")
}

/// All-day "Beginning of ..." and "End of ..." events for each term.
pub fn term_date_events(terms: &[TermDates]) -> Vec<EventDescriptor> {
    terms
        .iter()
        .flat_map(|term| {
            [
                (format!("Beginning of {}", term.term), term.start),
                (format!("End of {}", term.term), term.end),
            ]
        })
        .map(|(summary, date)| EventDescriptor {
            summary,
            organizer: None,
            description: String::new(),
            location: None,
            geo: None,
            time: EventTime::AllDay(date),
            recurrence: None,
            excluded_dates: vec![],
        })
        .collect()
}
