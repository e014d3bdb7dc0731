use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local};

use crate::config::Config;
use crate::parser::{parse_calendar_text, parse_encyclopedia_html};
use crate::scraper::{BrowserScraper, PageSource, ScraperError, WebScraper};
use crate::store::{ObservanceStore, StoreError};
use crate::types::Observance;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    FetchError(#[from] ScraperError),
    #[error("Store failed: {0}")]
    StoreError(#[from] StoreError),
}

/// Records extracted from one fetch of each source. Cross-source duplicates
/// are kept; the store key collapses them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub calendar: Vec<Observance>,
    pub encyclopedia: Vec<Observance>,
}

impl Harvest {
    pub fn records(&self) -> impl Iterator<Item = &Observance> {
        self.calendar.iter().chain(&self.encyclopedia)
    }

    pub fn len(&self) -> usize {
        self.calendar.len() + self.encyclopedia.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one scheduled cycle. A failed cycle is never retried here.
#[derive(Debug)]
pub enum CycleOutcome {
    Succeeded {
        at: DateTime<Local>,
        calendar: usize,
        encyclopedia: usize,
    },
    Failed {
        at: DateTime<Local>,
        error: PipelineError,
    },
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Succeeded { .. })
    }
}

impl Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleOutcome::Succeeded {
                at,
                calendar,
                encyclopedia,
            } => write!(
                f,
                "[{}] Observances updated ({} from calendar, {} from encyclopedia)",
                at.format("%Y-%m-%d %H:%M:%S"),
                calendar,
                encyclopedia
            ),
            CycleOutcome::Failed { at, error } => write!(
                f,
                "[{}] Scrape cycle failed: {}",
                at.format("%Y-%m-%d %H:%M:%S"),
                error
            ),
        }
    }
}

#[derive(Debug)]
pub struct Pipeline<C, E, S: ?Sized> {
    calendar: C,
    encyclopedia: E,
    store: Arc<S>,
}

impl<C, E, S> Pipeline<C, E, S>
where
    C: PageSource,
    E: PageSource,
    S: ObservanceStore + ?Sized,
{
    pub fn new(calendar: C, encyclopedia: E, store: Arc<S>) -> Self {
        Self {
            calendar,
            encyclopedia,
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn collect(&self, now: DateTime<Local>) -> Result<Harvest, ScraperError> {
        // Both fetches finish before any record leaves this function.
        let text = self.calendar.fetch().await?;
        let calendar = parse_calendar_text(&text, now.year());
        log::info!(
            "Extracted {} observances from the calendar site",
            calendar.len()
        );

        let html = self.encyclopedia.fetch().await?;
        let encyclopedia = parse_encyclopedia_html(&html);
        log::info!(
            "Extracted {} observances from the encyclopedia page",
            encyclopedia.len()
        );

        Ok(Harvest {
            calendar,
            encyclopedia,
        })
    }

    async fn run_cycle(&self, now: DateTime<Local>) -> Result<Harvest, PipelineError> {
        let harvest = self.collect(now).await?;

        for record in harvest.records() {
            self.store.upsert(record)?;
        }
        log::debug!("Upserted {} observances", harvest.len());

        Ok(harvest)
    }

    /// Errors are logged and folded into the outcome, never returned.
    pub async fn run_at(&self, now: DateTime<Local>) -> CycleOutcome {
        let outcome = match self.run_cycle(now).await {
            Ok(harvest) => CycleOutcome::Succeeded {
                at: Local::now(),
                calendar: harvest.calendar.len(),
                encyclopedia: harvest.encyclopedia.len(),
            },
            Err(error) => CycleOutcome::Failed {
                at: Local::now(),
                error,
            },
        };

        if outcome.is_success() {
            log::info!("{}", outcome);
        } else {
            log::error!("{}", outcome);
        }
        outcome
    }

    pub async fn run(&self) -> CycleOutcome {
        self.run_at(Local::now()).await
    }
}

impl<S> Pipeline<BrowserScraper, WebScraper, S>
where
    S: ObservanceStore + ?Sized,
{
    pub fn from_config(config: &Config, store: Arc<S>) -> Result<Self, ScraperError> {
        Ok(Self::new(
            BrowserScraper::new(&config.calendar_url, config.fetch_timeout),
            WebScraper::new(&config.encyclopedia_url, config.fetch_timeout)?,
            store,
        ))
    }
}
