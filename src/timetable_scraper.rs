use std::collections::HashMap;

use anyhow::Context;
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};

use crate::{
    activity::{Activity, corrected_end_time, expand_weeks, parse_time_of_day},
    text_manipulators::{direct_cells, direct_rows, extract_cell_text},
    week_calendar::{DAYS_OF_THE_WEEK, WeekTable},
};

const COLUMNS: [&str; 10] = [
    "Activity",
    "Description",
    "Module",
    "Start",
    "End",
    "Duration",
    "Room",
    "Staff",
    "Weeks",
    "Planned Size",
];

// Placeholder option on the module selection page.
const EMPTY_OPTION: &str = "...........................................";

/// Report URL listing every activity of `module_codes` across all 52 weeks,
/// every day, 08:00-22:00.
pub fn module_timetable_url(base_url: &str, module_codes: &[String]) -> String {
    let printstyle = "textspreadsheet";
    let object = "module";
    let objectstr = module_codes
        .iter()
        .map(|code| format!("{}%0D%0A", code.trim()))
        .collect::<String>();
    let weeks = (1..=52)
        .map(|week| week.to_string())
        .collect::<Vec<_>>()
        .join(";");
    format!(
        "{}/reporting/{printstyle};{object};name;{objectstr}?days=1-7&weeks={weeks}&periods=1-56&template={object}+{printstyle}&height=100&week=100",
        base_url.trim_end_matches('/'),
    )
}

/// Parses the module timetable report into activities sorted by start time.
///
/// The report is a long run of `<table>`s. Activity tables are the ones whose
/// header row has a "Planned Size" cell, and each is preceded by a
/// `<p><span>Monday</span></p>` style heading naming the day.
pub fn parse_module_timetable(html: &str, table: &WeekTable) -> anyhow::Result<Vec<Activity>> {
    let document = Html::parse_document(html);
    let heading_or_table = Selector::parse("p span, table").unwrap();

    let mut activities = Vec::new();
    let mut day_of_the_week: Option<String> = None;

    for element in document.select(&heading_or_table) {
        if element.value().name() == "span" {
            let text = extract_cell_text(element);
            if DAYS_OF_THE_WEEK.contains(&text.as_str()) {
                day_of_the_week = Some(text);
            }
            continue;
        }

        let rows = direct_rows(element);
        let Some((header, body)) = rows.split_first() else {
            continue;
        };
        let header: Vec<String> = direct_cells(*header)
            .into_iter()
            .map(extract_cell_text)
            .collect();
        if !header.iter().any(|cell| cell == "Planned Size") {
            continue;
        }

        let Some(day) = &day_of_the_week else {
            warn!("Skipping activity table with no day heading before it");
            continue;
        };
        let columns = column_indices(&header)?;
        for row in body {
            let activity = parse_activity_row(*row, &columns, day, table)?;
            debug!("Parsed {} on {}", activity.activity, day);
            activities.push(activity);
        }
    }

    activities.sort_by_key(|activity| activity.start);
    Ok(activities)
}

fn column_indices(header: &[String]) -> anyhow::Result<[usize; COLUMNS.len()]> {
    let mut indices = [0; COLUMNS.len()];
    for (slot, name) in indices.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|cell| cell == name)
            .with_context(|| format!("activity table has no {name:?} column"))?;
    }
    Ok(indices)
}

fn parse_activity_row(
    row: ElementRef,
    columns: &[usize; COLUMNS.len()],
    day: &str,
    table: &WeekTable,
) -> anyhow::Result<Activity> {
    let cells: Vec<String> = direct_cells(row).into_iter().map(extract_cell_text).collect();
    let map: HashMap<&str, &String> = COLUMNS
        .iter()
        .zip(columns)
        .filter_map(|(name, index)| Some((*name, cells.get(*index)?)))
        .collect();
    let cell = |name: &str| -> anyhow::Result<String> {
        map.get(name)
            .map(|text| text.to_string())
            .with_context(|| format!("activity row is missing its {name:?} cell"))
    };

    let activity = cell("Activity")?;
    let start = parse_time_of_day(&cell("Start")?)
        .with_context(|| format!("bad start time for {activity}"))?;
    let end = corrected_end_time(&cell("End")?)
        .with_context(|| format!("bad end time for {activity}"))?;
    let dates = expand_weeks(&cell("Weeks")?, day, table)
        .with_context(|| format!("bad week pattern for {activity}"))?;

    Ok(Activity {
        day_of_the_week: day.to_string(),
        description: cell("Description")?,
        module: cell("Module")?,
        start,
        end,
        duration: cell("Duration")?,
        room: cell("Room")?,
        staff: cell("Staff")?,
        dates,
        planned_size: cell("Planned Size")?,
        activity,
    })
}

/// Module codes offered on the module selection page.
pub fn parse_module_names(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").unwrap();
    let option_selector = Selector::parse("option").unwrap();

    let mut modules = Vec::new();
    for row in document.select(&row_selector) {
        let Some(label) = direct_cells(row).into_iter().next() else {
            continue;
        };
        if !extract_cell_text(label).contains("Module") {
            continue;
        }
        modules.extend(
            row.select(&option_selector)
                .map(extract_cell_text)
                .filter(|text| !text.is_empty() && text != EMPTY_OPTION),
        );
    }
    modules
}
