use std::path::PathBuf;

use anyhow::Context;
use log::info;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{requests::Credentials, week_calendar::WeekTable};

fn default_base_url() -> String {
    "https://timetable.dur.ac.uk".to_string()
}

fn default_facilities_url() -> String {
    "https://www.dur.ac.uk/cis/local/facilities/location/?location_id=1".to_string()
}

fn default_term_dates_url() -> String {
    "https://www.dur.ac.uk/dates/".to_string()
}

fn default_credentials_check_url() -> String {
    "https://www.dur.ac.uk/directory/password/".to_string()
}

/// The env config env vars needed for scraping.
#[derive(Debug, Deserialize)]
pub struct ScrapingEnv {
    timetable_username: Option<String>,
    timetable_password: Option<String>,
    #[serde(default = "default_base_url")]
    timetable_base_url: String,
    #[serde(default = "default_facilities_url")]
    timetable_facilities_url: String,
    #[serde(default = "default_term_dates_url")]
    timetable_term_dates_url: String,
    #[serde(default = "default_credentials_check_url")]
    timetable_credentials_check_url: String,
    timetable_week_table: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ScrapingConfig {
    credentials: Option<Credentials>,
    base_url: String,
    facilities_url: String,
    term_dates_url: String,
    credentials_check_url: String,
    week_table_path: Option<PathBuf>,
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_env = ScrapingEnv::load_from_env()?;
        Ok(Self::from_env(scraping_env))
    }

    pub fn from_env(scraping_env: ScrapingEnv) -> Self {
        let credentials = match (scraping_env.timetable_username, scraping_env.timetable_password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };
        Self {
            credentials,
            base_url: scraping_env
                .timetable_base_url
                .trim_end_matches('/')
                .to_string(),
            facilities_url: scraping_env.timetable_facilities_url,
            term_dates_url: scraping_env.timetable_term_dates_url,
            credentials_check_url: scraping_env.timetable_credentials_check_url,
            week_table_path: scraping_env.timetable_week_table,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn home_page_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    pub fn week_patterns_url(&self) -> String {
        format!("{}/week_patterns.htm", self.base_url)
    }

    pub fn module_list_url(&self) -> String {
        format!("{}/module.htm", self.base_url)
    }

    pub fn facilities_url(&self) -> &str {
        &self.facilities_url
    }

    pub fn term_dates_url(&self) -> &str {
        &self.term_dates_url
    }

    pub fn credentials_check_url(&self) -> &str {
        &self.credentials_check_url
    }

    /// The week table from `TIMETABLE_WEEK_TABLE` (or `path_override`), else
    /// the bundled 2022-23 table.
    pub fn load_week_table(&self, path_override: Option<&PathBuf>) -> anyhow::Result<WeekTable> {
        match path_override.or(self.week_table_path.as_ref()) {
            Some(path) => {
                info!("Loading week table from {}", path.display());
                WeekTable::from_json_file(path)
            }
            None => Ok(WeekTable::durham_2022_23()),
        }
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn fills_in_default_urls() {
        let env: ScrapingEnv = envy::from_iter(vars(&[])).unwrap();
        let config = ScrapingConfig::from_env(env);
        assert!(config.credentials().is_none());
        assert_eq!(config.module_list_url(), "https://timetable.dur.ac.uk/module.htm");
        assert_eq!(
            config.week_patterns_url(),
            "https://timetable.dur.ac.uk/week_patterns.htm"
        );
        assert_eq!(config.term_dates_url(), "https://www.dur.ac.uk/dates/");
    }

    #[test]
    fn reads_credentials_and_overrides() {
        let env: ScrapingEnv = envy::from_iter(vars(&[
            ("TIMETABLE_USERNAME", "abcd12"),
            ("TIMETABLE_PASSWORD", "hunter2"),
            ("TIMETABLE_BASE_URL", "http://localhost:8080/"),
        ]))
        .unwrap();
        let config = ScrapingConfig::from_env(env);
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username, "abcd12");
        assert_eq!(credentials.password, "hunter2");
        assert_eq!(config.home_page_url(), "http://localhost:8080/");
    }

    #[test]
    fn username_without_password_is_anonymous() {
        let env: ScrapingEnv = envy::from_iter(vars(&[("TIMETABLE_USERNAME", "abcd12")])).unwrap();
        assert!(ScrapingConfig::from_env(env).credentials().is_none());
    }

    #[test]
    fn week_table_comes_from_file_when_configured() {
        let table = WeekTable::durham_2022_23();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(table.to_json().unwrap().as_bytes()).unwrap();

        let env: ScrapingEnv = envy::from_iter(vars(&[(
            "TIMETABLE_WEEK_TABLE",
            file.path().to_str().unwrap(),
        )]))
        .unwrap();
        let config = ScrapingConfig::from_env(env);
        assert_eq!(config.load_week_table(None).unwrap(), table);

        let bundled: ScrapingEnv = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(
            ScrapingConfig::from_env(bundled).load_week_table(None).unwrap(),
            table
        );
    }
}
