pub mod activity;
pub mod building;
pub mod calendar;
pub mod config;
pub mod error;
pub mod ics;
pub mod module_calendar;
pub mod partition;
pub mod ratelimit;
pub mod requests;
pub mod scraping_context;
pub mod term_dates;
pub mod timetable_scraper;
pub mod week_calendar;
pub mod week_patterns;

mod text_manipulators;

pub use error::CalendarError;
pub use module_calendar::ModuleCalendar;
pub use partition::{RecurrencePartition, partition};
pub use scraping_context::ScrapingContext;
pub use week_calendar::{WeekEntry, WeekTable};
