use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{LevelFilter, error, info, warn};
use timetable_ical::{
    ModuleCalendar, ScrapingContext, config::ScrapingConfig, week_patterns::parse_week_patterns,
};

#[derive(Parser)]
#[command(name = "timetable-ical")]
#[command(about = "Turn a university teaching timetable into an iCalendar file")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a calendar of every activity of the given modules
    Calendar {
        /// Module codes, e.g. COMP2221
        #[arg(required = true)]
        modules: Vec<String>,
        /// Where to write the calendar
        #[arg(long, short, default_value = "calendar.ics")]
        output: PathBuf,
        /// Week table JSON to use instead of TIMETABLE_WEEK_TABLE or the bundled table
        #[arg(long)]
        week_table: Option<PathBuf>,
        /// Don't look up building map links
        #[arg(long)]
        no_locations: bool,
    },
    /// List the module codes on the timetable
    Modules,
    /// Build a calendar of the current academic year's term dates
    Terms {
        #[arg(long, short, default_value = "terms.ics")]
        output: PathBuf,
    },
    /// Convert the week patterns page into a week table JSON file
    WeekTable {
        /// A saved copy of the week patterns page; fetched when omitted
        #[arg(long)]
        html: Option<PathBuf>,
        #[arg(long, short, default_value = "weeks.json")]
        output: PathBuf,
    },
    /// Check the configured username and password
    Validate,
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let scraping_config = ScrapingConfig::new()?;
    if scraping_config.credentials().is_none() {
        warn!("TIMETABLE_USERNAME/TIMETABLE_PASSWORD not set, requests will be anonymous");
    }

    match command {
        Commands::Calendar {
            modules,
            output,
            week_table,
            no_locations,
        } => {
            let week_table = scraping_config.load_week_table(week_table.as_ref())?;
            let context = ScrapingContext::from_config(scraping_config)?;
            let module_calendar = ModuleCalendar::new(context, week_table);
            let ics = module_calendar
                .create_ics_from_module_codes(&modules, !no_locations)
                .await?;
            tokio::fs::write(&output, ics).await?;
            info!("Wrote {}", output.display());
        }
        Commands::Modules => {
            let week_table = scraping_config.load_week_table(None)?;
            let context = ScrapingContext::from_config(scraping_config)?;
            let module_calendar = ModuleCalendar::new(context, week_table);
            for module in module_calendar.fetch_module_names().await? {
                println!("{module}");
            }
        }
        Commands::Terms { output } => {
            let week_table = scraping_config.load_week_table(None)?;
            let context = ScrapingContext::from_config(scraping_config)?;
            let module_calendar = ModuleCalendar::new(context, week_table);
            let ics = module_calendar.create_term_dates_ics().await?;
            tokio::fs::write(&output, ics).await?;
            info!("Wrote {}", output.display());
        }
        Commands::WeekTable { html, output } => {
            let week_table = match html {
                Some(path) => {
                    let html = tokio::fs::read_to_string(&path).await?;
                    parse_week_patterns(&html)?
                }
                None => {
                    let week_table = scraping_config.load_week_table(None)?;
                    let context = ScrapingContext::from_config(scraping_config)?;
                    ModuleCalendar::new(context, week_table)
                        .fetch_week_table()
                        .await?
                }
            };
            tokio::fs::write(&output, week_table.to_json()?).await?;
            info!("Wrote {} weeks to {}", week_table.len(), output.display());
        }
        Commands::Validate => {
            let week_table = scraping_config.load_week_table(None)?;
            let context = ScrapingContext::from_config(scraping_config)?;
            if ModuleCalendar::new(context, week_table)
                .credentials_are_valid()
                .await?
            {
                println!("Credentials accepted");
            } else {
                anyhow::bail!("credentials rejected");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
