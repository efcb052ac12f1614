use std::collections::BTreeMap;

use anyhow::Context;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    activity::Activity,
    building::{BuildingDirectory, parse_building_codes, parse_building_links},
    calendar::{EventDescriptor, activity_events, term_date_events},
    ics::write_calendar,
    scraping_context::ScrapingContext,
    term_dates::parse_term_dates,
    timetable_scraper::{module_timetable_url, parse_module_names, parse_module_timetable},
    week_calendar::WeekTable,
    week_patterns::{academic_year_from_page, parse_week_patterns},
};

const SHORT_MAP_LINK: &str = "https://goo.gl/";

/// Events for every activity, in activity order. Activities whose dates
/// can't be partitioned are logged and left out.
pub fn build_events(
    activities: &[Activity],
    directory: Option<&BuildingDirectory>,
) -> Vec<EventDescriptor> {
    let per_activity: Vec<Vec<EventDescriptor>> = activities
        .par_iter()
        .map(|activity| {
            let location = directory.and_then(|directory| directory.location_for_room(&activity.room));
            match activity_events(activity, location.as_ref()) {
                Ok(events) => events,
                Err(err) => {
                    warn!("Skipping {}: {err}", activity.activity);
                    vec![]
                }
            }
        })
        .collect();
    per_activity.into_iter().flatten().collect()
}

/// Scrapes the timetable for a set of modules and renders it as iCalendar.
pub struct ModuleCalendar {
    context: ScrapingContext,
    week_table: WeekTable,
}

impl ModuleCalendar {
    pub fn new(context: ScrapingContext, week_table: WeekTable) -> Self {
        Self {
            context,
            week_table,
        }
    }

    pub async fn fetch_activities(&self, module_codes: &[String]) -> anyhow::Result<Vec<Activity>> {
        let url = module_timetable_url(self.context.scraping_config.base_url(), module_codes);
        let html = self
            .context
            .request_client
            .fetch_url_body(&url)
            .await
            .with_context(|| format!("failed to fetch timetable for {}", module_codes.join(", ")))?;
        let activities = parse_module_timetable(&html, &self.week_table)?;
        info!(
            "Found {} activities for {}",
            activities.len(),
            module_codes.join(", ")
        );
        Ok(activities)
    }

    pub async fn fetch_module_names(&self) -> anyhow::Result<Vec<String>> {
        let url = self.context.scraping_config.module_list_url();
        let html = self.context.request_client.fetch_url_body(&url).await?;
        Ok(parse_module_names(&html))
    }

    /// Fetches the week patterns page. Only works when the server returns the
    /// table without running scripts; otherwise save the page from a browser
    /// and convert it with `parse_week_patterns`.
    pub async fn fetch_week_table(&self) -> anyhow::Result<WeekTable> {
        let url = self.context.scraping_config.week_patterns_url();
        let html = self.context.request_client.fetch_url_body(&url).await?;
        parse_week_patterns(&html)
    }

    /// Building codes and map links from the facilities page, with short map
    /// links expanded so coordinates can be read from them.
    pub async fn fetch_building_directory(&self) -> anyhow::Result<BuildingDirectory> {
        let url = self.context.scraping_config.facilities_url();
        let html = self
            .context
            .request_client
            .fetch_url_body(url)
            .await
            .context("failed to fetch building locations")?;
        let codes = parse_building_codes(&html);
        let mut links = parse_building_links(&html);
        // Only buildings reachable from a room code are ever looked up.
        links.retain(|building, _| codes.values().any(|name| name == building));
        let links = self.expand_map_links(links).await;
        info!("Found {} building codes and {} map links", codes.len(), links.len());
        Ok(BuildingDirectory::new(
            codes,
            links,
            &self.context.geo_extractor,
        ))
    }

    async fn expand_map_links(&self, links: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let request_client = &self.context.request_client;
        let mut expansions: FuturesUnordered<_> = links
            .into_iter()
            .map(|(building, url)| async move {
                if !url.starts_with(SHORT_MAP_LINK) {
                    return (building, url);
                }
                match request_client.expand_url(&url).await {
                    Ok(expanded) => (building, expanded),
                    Err(err) => {
                        warn!("Couldn't expand map link for {building}: {err}");
                        (building, url)
                    }
                }
            })
            .collect();

        let mut expanded = BTreeMap::new();
        while let Some((building, url)) = expansions.next().await {
            expanded.insert(building, url);
        }
        expanded
    }

    pub async fn create_events_from_module_codes(
        &self,
        module_codes: &[String],
        include_locations: bool,
    ) -> anyhow::Result<Vec<EventDescriptor>> {
        let activities = self.fetch_activities(module_codes).await?;
        let directory = if include_locations {
            match self.fetch_building_directory().await {
                Ok(directory) => Some(directory),
                Err(err) => {
                    warn!("Continuing without locations: {err:#}");
                    None
                }
            }
        } else {
            None
        };
        Ok(build_events(&activities, directory.as_ref()))
    }

    pub async fn create_ics_from_module_codes(
        &self,
        module_codes: &[String],
        include_locations: bool,
    ) -> anyhow::Result<String> {
        let events = self
            .create_events_from_module_codes(module_codes, include_locations)
            .await?;
        info!("Writing {} events", events.len());
        Ok(write_calendar(&events, Utc::now()))
    }

    /// All-day events marking the start and end of each term of the current
    /// academic year.
    pub async fn create_term_dates_ics(&self) -> anyhow::Result<String> {
        let config = &self.context.scraping_config;
        let home_page = self
            .context
            .request_client
            .fetch_url_body(&config.home_page_url())
            .await?;
        let (first_year, _) = academic_year_from_page(&home_page)?;

        let html = self
            .context
            .request_client
            .fetch_url_body(config.term_dates_url())
            .await
            .context("failed to fetch term dates")?;
        let terms = parse_term_dates(&html, first_year)?;
        Ok(write_calendar(&term_date_events(&terms), Utc::now()))
    }

    pub async fn credentials_are_valid(&self) -> anyhow::Result<bool> {
        let config = &self.context.scraping_config;
        let credentials = config
            .credentials()
            .context("TIMETABLE_USERNAME and TIMETABLE_PASSWORD must be set")?;
        self.context
            .request_client
            .credentials_are_valid(config.credentials_check_url(), credentials)
            .await
    }
}
