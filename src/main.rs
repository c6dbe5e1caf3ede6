use clap::{Parser, Subcommand};
use museum_scraper::config::Config;
use museum_scraper::constants;
use museum_scraper::error::ScraperError;
use museum_scraper::harvest::Orchestrator;
use museum_scraper::logging;
use museum_scraper::sinks::{csv, sqlite};
use museum_scraper::sources::fubon::FubonCrawler;
use museum_scraper::sources::huashan::HuashanCrawler;
use museum_scraper::sources::moca::MocaCrawler;
use museum_scraper::sources::npm::NpmCrawler;
use museum_scraper::sources::ntnu::NtnuCrawler;
use museum_scraper::sources::songshan::SongshanCrawler;
use museum_scraper::sources::tfam::TfamCrawler;
use museum_scraper::types::ExhibitionSource;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "museum_scraper")]
#[command(about = "Exhibition listing scraper for Taipei museums")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest all configured museum sources and export the records
    Harvest {
        /// Specific sources to run (comma-separated).
        /// Available: songshan, npm, moca, huashan, fubon, tfam, ntnu
        #[arg(long)]
        sources: Option<String>,
        /// Directory for the CSV export
        #[arg(long, default_value = "output")]
        out_dir: String,
        /// Also append the records to this SQLite database
        #[arg(long)]
        sqlite: Option<PathBuf>,
    },
}

fn create_source(source_name: &str, config: &Config) -> Option<Box<dyn ExhibitionSource>> {
    match source_name {
        constants::SONGSHAN_SOURCE => Some(Box::new(SongshanCrawler::new(config))),
        constants::NPM_SOURCE => Some(Box::new(NpmCrawler::new(config))),
        constants::MOCA_SOURCE => Some(Box::new(MocaCrawler::new(config))),
        constants::HUASHAN_SOURCE => Some(Box::new(HuashanCrawler::new(config))),
        constants::FUBON_SOURCE => Some(Box::new(FubonCrawler::new(config))),
        constants::TFAM_SOURCE => Some(Box::new(TfamCrawler::new(config))),
        constants::NTNU_SOURCE => Some(Box::new(NtnuCrawler::new(config))),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            sources,
            out_dir,
            sqlite: sqlite_path,
        } => {
            // Invalid configuration is the only fatal error; everything past
            // this point degrades per source instead of aborting.
            let config = Config::load()?;

            let requested: Vec<String> = match sources {
                Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
                None => constants::get_supported_sources()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            };

            let mut crawlers: Vec<Box<dyn ExhibitionSource>> = Vec::new();
            for name in &requested {
                match create_source(name, &config) {
                    Some(crawler) => crawlers.push(crawler),
                    None => {
                        warn!("Unknown source: {}", name);
                        println!("⚠️  Unknown source: {name}");
                    }
                }
            }
            if crawlers.is_empty() {
                return Err(Box::new(ScraperError::Config(
                    "no valid sources selected".to_string(),
                )) as Box<dyn std::error::Error>);
            }

            info!("Starting harvest over {} sources", crawlers.len());
            let run = Orchestrator::run(&crawlers).await;

            println!("\n📊 Harvest results:");
            for outcome in &run.outcomes {
                println!(
                    "   {} ({}): {} discovered, {} harvested, {} skipped",
                    outcome.museum,
                    outcome.source,
                    outcome.attempted,
                    outcome.succeeded,
                    outcome.skipped
                );
            }
            println!("   Total records: {}", run.records.len());

            match csv::write_csv(&run.records, &out_dir) {
                Ok(path) => println!("💾 CSV written to {path}"),
                Err(e) => error!("Failed to write CSV: {}", e),
            }

            if let Some(db_path) = sqlite_path {
                match sqlite::write_sqlite(&run.records, &db_path) {
                    Ok(n) => println!("💾 Appended {n} rows to {}", db_path.display()),
                    Err(e) => error!("Failed to write SQLite: {}", e),
                }
            }
        }
    }

    Ok(())
}
