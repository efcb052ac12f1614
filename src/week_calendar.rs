use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

pub const DAYS_OF_THE_WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Zero-based position of `weekday_name` in the week, Monday first.
pub fn weekday_offset(weekday_name: &str) -> Result<u64, CalendarError> {
    DAYS_OF_THE_WEEK
        .iter()
        .position(|day| *day == weekday_name.trim())
        .map(|index| index as u64)
        .ok_or_else(|| CalendarError::InvalidWeekday(weekday_name.to_string()))
}

/// One row of the academic year's week patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekEntry {
    pub week_number: u32,
    pub monday: NaiveDate,
    pub friday: NaiveDate,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub teaching_week: String,
}

/// Week number to calendar week mapping for one academic year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<WeekEntry>", into = "Vec<WeekEntry>")]
pub struct WeekTable {
    weeks: BTreeMap<u32, WeekEntry>,
}

impl From<Vec<WeekEntry>> for WeekTable {
    fn from(entries: Vec<WeekEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<WeekTable> for Vec<WeekEntry> {
    fn from(table: WeekTable) -> Self {
        table.weeks.into_values().collect()
    }
}

// (term, teaching week) labels for weeks 1..=52 of 2022-23.
const DURHAM_2022_23_LABELS: [(&str, &str); 52] = [
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("Michaelmas", "Induction Week"),
    ("Michaelmas", "Teaching week 1"),
    ("Michaelmas", "Teaching week 2"),
    ("Michaelmas", "Teaching week 3"),
    ("Michaelmas", "Teaching week 4"),
    ("Michaelmas", "Teaching week 5"),
    ("Michaelmas", "Teaching week 6"),
    ("Michaelmas", "Teaching week 7"),
    ("Michaelmas", "Teaching week 8"),
    ("Michaelmas", "Teaching week 9"),
    ("Michaelmas", "Teaching week 10"),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("Epiphany", "Teaching week 11"),
    ("Epiphany", "Teaching week 12"),
    ("Epiphany", "Teaching week 13"),
    ("Epiphany", "Teaching week 14"),
    ("Epiphany", "Teaching week 15"),
    ("Epiphany", "Teaching week 16"),
    ("Epiphany", "Teaching week 17"),
    ("Epiphany", "Teaching week 18"),
    ("Epiphany", "Teaching week 19"),
    ("Epiphany", "Teaching week 20"),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("", ""),
    ("Easter", "Teaching week 21"),
    ("Easter", "Teaching week 22"),
    ("Easter", "Exam period"),
    ("Easter", "Exam period"),
    ("Easter", "Exam period"),
    ("Easter", "Exam period"),
    ("Easter", ""),
    ("Easter", ""),
    ("Easter", ""),
    ("", ""),
    ("", ""),
    ("", ""),
];

impl WeekTable {
    pub fn from_entries(entries: impl IntoIterator<Item = WeekEntry>) -> Self {
        let weeks = entries
            .into_iter()
            .map(|entry| (entry.week_number, entry))
            .collect();
        Self { weeks }
    }

    /// The 2022-23 Durham teaching year. Week 1 starts on Monday 18 July 2022
    /// and the 52 weeks run back to back.
    pub fn durham_2022_23() -> Self {
        let Some(week_one) = NaiveDate::from_ymd_opt(2022, 7, 18) else {
            return Self::default();
        };
        let entries = DURHAM_2022_23_LABELS
            .iter()
            .zip(0u64..)
            .map(|((term, teaching_week), index)| {
                let monday = week_one + Days::new(7 * index);
                WeekEntry {
                    week_number: index as u32 + 1,
                    monday,
                    friday: monday + Days::new(4),
                    term: term.to_string(),
                    teaching_week: teaching_week.to_string(),
                }
            });
        Self::from_entries(entries)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read week table from {}", path.display()))?;
        let table: Self = serde_json::from_str(&contents)
            .with_context(|| format!("{} is not a valid week table", path.display()))?;
        if table.is_empty() {
            anyhow::bail!("week table {} has no weeks", path.display());
        }
        Ok(table)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, week_number: &str) -> Option<&WeekEntry> {
        let week_number = week_number.trim().parse::<u32>().ok()?;
        self.weeks.get(&week_number)
    }

    /// The date on which `weekday_name` falls in week `week_number`.
    pub fn resolve(&self, week_number: &str, weekday_name: &str) -> Result<NaiveDate, CalendarError> {
        let entry = self
            .get(week_number)
            .ok_or_else(|| CalendarError::UnknownWeekNumber(week_number.to_string()))?;
        let offset = weekday_offset(weekday_name)?;
        Ok(entry.monday + Days::new(offset))
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeekEntry> {
        self.weeks.values()
    }
}
