use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::text_manipulators::{direct_cells, direct_rows, extract_cell_text, extract_text};

// Facilities page link text -> building name used by the building codes table.
const LINK_NAME_ALIASES: [(&str, &str); 32] = [
    ("38-39 Old Bailey (Classics)", "38-39 North Bailey (Classics)"),
    ("43 Old Bailey (History)", "43 North Bailey (History)"),
    ("48 Old Elvet", "48 Old Elvet"),
    ("Abbey House (Theology)", "Abbey House (Theology)"),
    ("Al-Qasimi Building", "Al-Qasimi"),
    ("Biological Sciences", "Biological and Biomedical Sciences"),
    ("Burdon House", "Burdon House"),
    ("Business School", "Business School"),
    ("Caedmon Building", "Caedmon Building - School of Education"),
    ("Calman Learning Centre", "Calman Learning Centre"),
    ("Chemistry", "Chemistry (inc. Courtyard)"),
    ("Computing/Maths", "Computing and Maths"),
    ("Courtyard Building", "Dawson"),
    ("Dawson Building", "Divinity House (Music)"),
    ("Dunelm House (Student Union)", "Dunelm House"),
    ("E-Sciences", "E-Science"),
    ("Elvet Hill House", "Elvet Hill House"),
    ("Elvet Riverside 2", "Elvet Riverside 2"),
    ("Elvet Riverside1", "Elvet Riverside 1"),
    ("Engineering", "Engineering"),
    ("Greys College - Holgate", "Grey College Holgate House"),
    ("Hild Bede College", "Hild Bede"),
    ("Maths & Computer Science", "Maths & Computer Science"),
    ("Mountjoy Centre", "Mountjoy Centre"),
    ("Mountjoy Centre - Rowan House", "Rowan House"),
    ("Palatine Centre", "Palatine Centre"),
    ("Physics", "Physics"),
    ("Psychology", "Psychology"),
    ("School of Education", "School of Education"),
    ("Southend House", "Southend House"),
    ("Teaching and Learning Centre", "Teaching and Learning Centre"),
    ("West Building (Geography)", "West (Geography)"),
];

// Buildings missing from the facilities sidebar.
const EXTRA_LINKS: [(&str, &str); 2] = [
    ("Maths & Computer Science", "https://goo.gl/maps/aAMaHNvBYK5SS9q49"),
    ("Old Elvet (Sociology)", "https://goo.gl/maps/NwH8XqjNzso1TW6YA"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub url: String,
    pub geo: Option<GeoCoordinate>,
}

/// Building code -> building name, from the facilities location table.
/// Rows like `ER1, ERA | Elvet Riverside 1` give one entry per code.
pub fn parse_building_codes(html: &str) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("#content263136 table").unwrap();
    let strong_selector = Selector::parse("strong").unwrap();

    let mut codes = BTreeMap::new();
    let Some(table) = document.select(&table_selector).next() else {
        return codes;
    };
    for row in direct_rows(table).into_iter().skip(1) {
        let cells = direct_cells(row);
        let [code_cell, name_cell] = cells.as_slice() else {
            continue;
        };
        let code_text = code_cell
            .select(&strong_selector)
            .next()
            .map(extract_text)
            .unwrap_or_else(|| extract_text(*code_cell));
        let name = extract_cell_text(*name_cell);
        for code in code_text.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            codes.insert(code.to_string(), name.clone());
        }
    }
    codes
}

/// Building name -> map link, from the facilities sidebar. Links whose text
/// has no known building are dropped.
pub fn parse_building_links(html: &str) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("#content257296 a").unwrap();
    let aliases: HashMap<&str, &str> = LINK_NAME_ALIASES.into_iter().collect();

    let mut links: BTreeMap<String, String> = document
        .select(&link_selector)
        .filter_map(|anchor| {
            let text = extract_cell_text(anchor);
            let building = aliases.get(text.as_str())?;
            let href = anchor.value().attr("href")?.trim();
            Some((building.to_string(), href.to_string()))
        })
        .collect();
    for (building, url) in EXTRA_LINKS {
        links.insert(building.to_string(), url.to_string());
    }
    links
}

/// The building code at the start of a room string like `D/TLC033`.
pub fn building_code_from_room<'a>(
    codes: impl IntoIterator<Item = &'a str> + Clone,
    room: &str,
) -> Option<&'a str> {
    let room = room.trim();
    if room.is_empty() {
        return None;
    }
    let room = room.split_once('/').map_or(room, |(_, rest)| rest);

    // Codes like ER1 can't be found by the non-digit prefix below.
    if let Some(code) = codes
        .clone()
        .into_iter()
        .filter(|code| code.chars().any(|c| c.is_ascii_digit()))
        .find(|code| room.contains(code))
    {
        return Some(code);
    }

    let prefix: String = room.chars().take_while(|c| !c.is_ascii_digit()).collect();
    codes.into_iter().find(|code| *code == prefix)
}

/// Extracts the `@54.767954,-1.5728849` part of an expanded Google Maps link.
pub struct GeoExtractor {
    coordinate_regex: Regex,
}

impl GeoExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let coordinate_regex = Regex::new(r"@(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)")?;
        Ok(Self { coordinate_regex })
    }

    pub fn extract(&self, map_url: &str) -> Option<GeoCoordinate> {
        if !map_url.contains("https://www.google.co") {
            return None;
        }
        let caps = self.coordinate_regex.captures(map_url)?;
        Some(GeoCoordinate {
            latitude: caps.get(1)?.as_str().parse().ok()?,
            longitude: caps.get(2)?.as_str().parse().ok()?,
        })
    }
}

/// Everything needed to place a room on a map.
#[derive(Debug, Clone, Default)]
pub struct BuildingDirectory {
    /// Building code -> building name.
    pub codes: BTreeMap<String, String>,
    /// Building name -> map URL.
    pub links: BTreeMap<String, String>,
    /// Building name -> coordinate, when the link is an expanded map URL.
    pub coordinates: BTreeMap<String, GeoCoordinate>,
}

impl BuildingDirectory {
    pub fn new(
        codes: BTreeMap<String, String>,
        links: BTreeMap<String, String>,
        geo_extractor: &GeoExtractor,
    ) -> Self {
        let coordinates = links
            .iter()
            .filter_map(|(building, url)| Some((building.clone(), geo_extractor.extract(url)?)))
            .collect();
        Self {
            codes,
            links,
            coordinates,
        }
    }

    pub fn location_for_room(&self, room: &str) -> Option<Location> {
        let code = building_code_from_room(self.codes.keys().map(String::as_str), room)?;
        let building = self.codes.get(code)?;
        let url = self.links.get(building)?;
        Some(Location {
            url: url.clone(),
            geo: self.coordinates.get(building).copied(),
        })
    }
}
