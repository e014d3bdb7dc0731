use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use hari_penting::types::{Month, Observance};
use hari_penting::utils::{MonthStats, ObservanceFilter};
use hari_penting::{Config, MemoryStore, ObservanceStore, Pipeline, SqliteStore};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "hari-penting")]
#[command(about = "Scraper and search for Indonesian observances (hari penting)", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Path of the SQLite store (overrides HARI_PENTING_DB)"
    )]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape both sources once and upsert the results into the store
    Scrape {
        #[arg(long, help = "Print the scraped records instead of storing them")]
        dry_run: bool,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format for --dry-run"
        )]
        format: OutputFormat,
    },
    /// List stored observances, optionally filtered by keyword or month
    List {
        #[arg(short = 's', long, help = "Case-insensitive keyword to look for in labels")]
        search: Option<String>,

        #[arg(
            short = 'm',
            long,
            value_parser = parse_month,
            help = "Only show this month (1-12 or Indonesian name)"
        )]
        month: Option<Month>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Count stored observances per month
    Stats {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn parse_month(s: &str) -> Result<Month, String> {
    s.parse::<Month>().map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn print_observances(observances: &[Observance]) {
    if observances.is_empty() {
        println!("No entries to display.");
    } else {
        for (i, observance) in observances.iter().enumerate() {
            println!("{:>3}. {}", i + 1, observance);
        }
    }
}

fn open_store(config: &Config) -> Arc<SqliteStore> {
    let store = SqliteStore::open(&config.db_path).unwrap_or_else(|e| {
        log::error!("Error opening store {}: {}", config.db_path.display(), e);
        process::exit(1);
    });
    Arc::new(store)
}

fn load_observances(config: &Config) -> Vec<Observance> {
    open_store(config).all().unwrap_or_else(|e| {
        log::error!("Error reading store: {}", e);
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    });
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Scrape { dry_run, format } => {
            if dry_run {
                let pipeline = Pipeline::from_config(&config, Arc::new(MemoryStore::new()))
                    .unwrap_or_else(|e| {
                        log::error!("Error creating scraper: {}", e);
                        process::exit(1);
                    });

                let harvest = pipeline.collect(Local::now()).await.unwrap_or_else(|e| {
                    log::error!("Error scraping observances: {}", e);
                    process::exit(1);
                });
                let records: Vec<Observance> = harvest.records().cloned().collect();

                match format {
                    OutputFormat::Json => serialize_json(&records),
                    OutputFormat::Text => print_observances(&records),
                }
                return;
            }

            let pipeline = Pipeline::from_config(&config, open_store(&config)).unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let outcome = pipeline.run().await;
            println!("{}", outcome);
            if !outcome.is_success() {
                process::exit(1);
            }
        }

        Commands::List {
            search,
            month,
            format,
        } => {
            let filter = ObservanceFilter {
                keyword: search,
                month,
            };
            let filter = filter.validate().unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let observances = filter.apply(load_observances(&config));

            match format {
                OutputFormat::Json => serialize_json(&observances),
                OutputFormat::Text => print_observances(&observances),
            }
        }

        Commands::Stats { format } => {
            let stats = MonthStats::from_observances(&load_observances(&config));

            match format {
                OutputFormat::Json => serialize_json(&stats),
                OutputFormat::Text => print!("{}", stats),
            }
        }
    }
}
