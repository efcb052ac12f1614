//! RFC 5545 output.
//!
//! Text values are escaped, content lines folded at 75 octets, and every line
//! ends in CRLF. Timed events use floating local times, which is how the
//! timetable publishes them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::calendar::{EventDescriptor, EventTime};

const PRODID: &str = "-//timetable-ical//Teaching Timetable//EN";
const MAX_LINE_OCTETS: usize = 75;

/// Escapes a TEXT value: backslash, semicolon, comma and newline.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Quotes a parameter value when it holds `:`, `;` or `,`. Double quotes
/// cannot appear in parameter values at all and are dropped, and control
/// characters (line breaks from multi-line cells) become spaces.
pub fn escape_param_value(value: &str) -> String {
    let value: String = value
        .chars()
        .filter(|c| *c != '"')
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if value.contains([':', ';', ',']) {
        format!("\"{value}\"")
    } else {
        value
    }
}

/// Folds a content line so no physical line exceeds 75 octets, never
/// splitting a UTF-8 sequence.
pub fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            width = 1;
        }
        folded.push(c);
        width += len;
    }
    folded
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn format_local(date_time: NaiveDateTime) -> String {
    date_time.format("%Y%m%dT%H%M%S").to_string()
}

fn format_utc(date_time: DateTime<Utc>) -> String {
    date_time.format("%Y%m%dT%H%M%SZ").to_string()
}

struct ContentLines {
    buffer: String,
}

impl ContentLines {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    fn push(&mut self, line: &str) {
        self.buffer.push_str(&fold_line(line));
        self.buffer.push_str("\r\n");
    }

    fn property(&mut self, name: &str, value: &str) {
        self.push(&format!("{name}:{value}"));
    }

    fn text(&mut self, name: &str, value: &str) {
        self.property(name, &escape_text(value));
    }
}

fn write_event(lines: &mut ContentLines, index: usize, event: &EventDescriptor, dtstamp: &str) {
    lines.push("BEGIN:VEVENT");

    let start = match &event.time {
        EventTime::AllDay(date) => format_date(*date),
        EventTime::Timed { start, .. } => format_local(*start),
    };
    lines.text("UID", &format!("{index}-{start}-{}@timetable-ical", event.summary));
    lines.property("DTSTAMP", dtstamp);
    lines.text("SUMMARY", &event.summary);
    if let Some(organizer) = &event.organizer {
        lines.push(&format!(
            "ORGANIZER;CN={}:invalid:nomail",
            escape_param_value(organizer)
        ));
    }
    if !event.description.is_empty() {
        lines.text("DESCRIPTION", &event.description);
    }
    if let Some(location) = &event.location {
        lines.text("LOCATION", location);
    }

    match &event.time {
        EventTime::AllDay(date) => {
            lines.property("DTSTART;VALUE=DATE", &format_date(*date));
        }
        EventTime::Timed { start, end } => {
            lines.property("DTSTART", &format_local(*start));
            lines.property("DTEND", &format_local(*end));
        }
    }
    if let Some(geo) = &event.geo {
        lines.property("GEO", &format!("{};{}", geo.latitude, geo.longitude));
    }
    if let Some(rule) = &event.recurrence {
        lines.property(
            "RRULE",
            &format!("FREQ=DAILY;INTERVAL={};COUNT={}", rule.interval_days, rule.count),
        );
    }
    if !event.excluded_dates.is_empty() {
        let dates = event
            .excluded_dates
            .iter()
            .map(|date| format_local(*date))
            .collect::<Vec<_>>()
            .join(",");
        lines.property("EXDATE", &dates);
    }

    lines.push("END:VEVENT");
}

/// Serializes `events` as one VCALENDAR. `dtstamp` is the creation time
/// stamped on every event.
pub fn write_calendar(events: &[EventDescriptor], dtstamp: DateTime<Utc>) -> String {
    let dtstamp = format_utc(dtstamp);
    let mut lines = ContentLines::new();
    lines.push("BEGIN:VCALENDAR");
    lines.property("VERSION", "2.0");
    lines.property("PRODID", PRODID);
    lines.property("CALSCALE", "GREGORIAN");
    for (index, event) in events.iter().enumerate() {
        write_event(&mut lines, index, event, &dtstamp);
    }
    lines.push("END:VCALENDAR");
    lines.buffer
}
