use std::ffi::OsStr;
use std::future::Future;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use reqwest::Client;

pub const SETTLE_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Browser automation failed: {0}")]
    BrowserError(String),
    #[error("Browser task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

pub trait PageSource {
    fn fetch(&self) -> impl Future<Output = Result<String, ScraperError>> + Send;
}

fn browser_err(e: impl std::fmt::Display) -> ScraperError {
    ScraperError::BrowserError(e.to_string())
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    url: String,
}

impl WebScraper {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get_html(&self) -> Result<String, ScraperError> {
        log::info!("Fetching {}...", self.url);
        Ok(self
            .client
            .get(&self.url)
            .send()
            .await
            .inspect_err(|e| log::warn!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::warn!("Decode error: {e:?}"))?)
    }
}

impl PageSource for WebScraper {
    fn fetch(&self) -> impl Future<Output = Result<String, ScraperError>> + Send {
        self.get_html()
    }
}

/// Fetcher for pages that only have content after their scripts run.
///
/// Every fetch launches a headless Chromium, waits [`SETTLE_DELAY`] after
/// navigation and returns the visible text of `<body>`. The browser process
/// is torn down when the fetch returns.
#[derive(Debug, Clone)]
pub struct BrowserScraper {
    url: String,
    timeout: Duration,
    settle: Duration,
}

impl BrowserScraper {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            settle: SETTLE_DELAY,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn render_text(&self) -> Result<String, ScraperError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()
            .map_err(browser_err)?;

        let browser = Browser::new(options).map_err(browser_err)?;
        let tab = browser.new_tab().map_err(browser_err)?;
        tab.set_default_timeout(self.timeout);

        tab.navigate_to(&self.url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(browser_err)?;

        std::thread::sleep(self.settle);

        let text = tab
            .wait_for_element("body")
            .and_then(|body| body.get_inner_text())
            .map_err(browser_err)?;

        log::debug!("Rendered {} bytes of text from {}", text.len(), self.url);
        Ok(text)
    }
}

impl PageSource for BrowserScraper {
    fn fetch(&self) -> impl Future<Output = Result<String, ScraperError>> + Send {
        let scraper = self.clone();
        async move {
            log::info!("Rendering {} in headless browser...", scraper.url);
            tokio::task::spawn_blocking(move || scraper.render_text())
                .await?
                .inspect_err(|e| log::warn!("Browser error: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_scraper_defaults() {
        let scraper = BrowserScraper::new("https://tanggalan.com/", Duration::from_secs(5));
        assert_eq!(scraper.url(), "https://tanggalan.com/");
        assert_eq!(scraper.settle, SETTLE_DELAY);
        assert_eq!(scraper.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_web_scraper_connection_refused() {
        // Port 9 (discard) on localhost is closed in test environments.
        let scraper = WebScraper::new("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        let err = scraper.fetch().await.unwrap_err();
        assert!(matches!(err, ScraperError::HttpError(_)));
    }
}
