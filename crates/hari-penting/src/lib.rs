pub mod config;
pub mod parser;
pub mod pipeline;
pub mod schedule;
pub mod scraper;
pub mod store;
pub mod types;
pub mod utils;

pub use crate::config::Config;
pub use crate::pipeline::{CycleOutcome, Pipeline};
pub use crate::scraper::{BrowserScraper, ScraperError, WebScraper};
pub use crate::store::{MemoryStore, ObservanceStore, SqliteStore};
