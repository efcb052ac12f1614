use anyhow::Context;
use chrono::NaiveDate;
use log::info;
use scraper::{Html, Selector};

use crate::{
    error::CalendarError,
    text_manipulators::{direct_cells, direct_rows, extract_cell_text},
    week_calendar::{WeekEntry, WeekTable},
};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Extracts `(2022, 2023)` from a heading like `"2022-23 Teaching Timetable"`.
pub fn parse_academic_year(heading: &str) -> anyhow::Result<(i32, i32)> {
    let span = heading
        .split_whitespace()
        .next()
        .with_context(|| format!("no academic year in {heading:?}"))?;
    let (lower, upper) = span
        .split_once('-')
        .with_context(|| format!("no academic year in {heading:?}"))?;
    let lower: i32 = lower.parse()?;
    let upper: i32 = upper.parse()?;
    // "23" is short for 2023.
    let upper = if upper < 100 {
        let upper = lower / 100 * 100 + upper;
        if upper < lower { upper + 100 } else { upper }
    } else {
        upper
    };
    Ok((lower, upper))
}

/// The academic year named in the `.l2sitename` banner that every timetable
/// page carries.
pub fn academic_year_from_page(html: &str) -> anyhow::Result<(i32, i32)> {
    academic_year_of(&Html::parse_document(html))
}

fn academic_year_of(document: &Html) -> anyhow::Result<(i32, i32)> {
    let heading_selector = Selector::parse(".l2sitename").unwrap();
    let heading = document
        .select(&heading_selector)
        .next()
        .map(extract_cell_text)
        .context("page has no academic year heading")?;
    parse_academic_year(&heading)
}

/// Builds a `WeekTable` from the week patterns page.
///
/// The page has two header rows (`Syllabus Weeks | Durham Weeks` and
/// `Week Number | Calendar Date | Term | Teaching Week`) followed by one row
/// per week, e.g. `Week 12 | Mon 03 Oct - Fri 07 Oct | Michaelmas | Teaching week 1`.
/// Dates carry no year: everything before the first January date belongs to
/// the first year of the academic year, the rest to the second.
pub fn parse_week_patterns(html: &str) -> anyhow::Result<WeekTable> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let (first_year, second_year) = academic_year_of(&document)?;

    let table = document
        .select(&table_selector)
        .next()
        .context("week patterns page has no table")?;

    let mut rows = Vec::new();
    for row in direct_rows(table).into_iter().skip(2) {
        let cells: Vec<String> = direct_cells(row).into_iter().map(extract_cell_text).collect();
        let [week, calendar_date, term, teaching_week, ..] = cells.as_slice() else {
            continue;
        };
        let week_number: u32 = week
            .trim_start_matches("Week")
            .trim()
            .parse()
            .with_context(|| format!("bad week number {week:?}"))?;
        let (monday, friday) = calendar_date
            .split_once(" - ")
            .with_context(|| format!("bad calendar date {calendar_date:?}"))?;
        rows.push((
            week_number,
            monday.to_string(),
            friday.to_string(),
            term.clone(),
            teaching_week.clone(),
        ));
    }
    rows.sort_by_key(|row| row.0);

    let mut seen_january = false;
    let mut year_for = |date: &str| -> Result<NaiveDate, CalendarError> {
        let (day, month) = parse_day_and_month(date)?;
        seen_january |= month == 1;
        let year = if seen_january { second_year } else { first_year };
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| CalendarError::InvalidDate(date.to_string()))
    };

    let mut entries = Vec::with_capacity(rows.len());
    for (week_number, monday, friday, term, teaching_week) in rows {
        entries.push(WeekEntry {
            week_number,
            monday: year_for(&monday)?,
            friday: year_for(&friday)?,
            term,
            teaching_week,
        });
    }

    info!(
        "Parsed {} weeks for academic year {}-{}",
        entries.len(),
        first_year,
        second_year
    );
    Ok(WeekTable::from_entries(entries))
}

/// `"Mon 03 Oct"` -> `(3, 10)`.
fn parse_day_and_month(date: &str) -> Result<(u32, u32), CalendarError> {
    let invalid = || CalendarError::InvalidDate(date.to_string());
    let parts: Vec<&str> = date.split_whitespace().collect();
    let [_, day, month] = parts.as_slice() else {
        return Err(invalid());
    };
    let day = day.parse().map_err(|_| invalid())?;
    let month = MONTHS
        .iter()
        .position(|name| name == month)
        .ok_or_else(invalid)?;
    Ok((day, month as u32 + 1))
}
