use crate::parser::extract_candidates;
use crate::traits::PageSource;
use crate::types::{BrowserConfig, Candidate, Result};
use async_trait::async_trait;
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const PAGE_HEIGHT: &str = "return document.body.scrollHeight;";

/// A result listing rendered in a WebDriver session.
///
/// The session belongs to this value; callers must finish with [`close`]
/// on every path, including after errors.
///
/// [`close`]: WebDriverPageSource::close
pub struct WebDriverPageSource {
    client: Client,
    search_url: String,
    settle_delay: Duration,
    last_height: i64,
}

impl WebDriverPageSource {
    pub async fn open(config: &BrowserConfig, search_url: &str) -> Result<Self> {
        info!("Opening WebDriver session at {} for {}", config.webdriver_url, search_url);

        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(&config.webdriver_url)
            .await?;

        let mut source = Self {
            client,
            search_url: search_url.to_string(),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            last_height: 0,
        };

        let page_load = Duration::from_secs(config.page_load_timeout_seconds);
        if let Err(e) = source.load(page_load).await {
            source.close().await;
            return Err(e);
        }
        Ok(source)
    }

    async fn load(&mut self, page_load: Duration) -> Result<()> {
        self.client
            .update_timeouts(TimeoutConfiguration::new(None, Some(page_load), None))
            .await?;
        self.client.goto(&self.search_url).await?;
        self.client
            .wait()
            .at_most(page_load)
            .for_element(Locator::Css("body"))
            .await?;
        tokio::time::sleep(self.settle_delay).await;
        self.last_height = self.page_height().await?;
        Ok(())
    }

    async fn page_height(&self) -> Result<i64> {
        let value = self.client.execute(PAGE_HEIGHT, vec![]).await?;
        Ok(value.as_i64().unwrap_or(0))
    }

    /// End the WebDriver session. Failures are logged only.
    pub async fn close(self) {
        match self.client.close().await {
            Ok(()) => debug!("Closed WebDriver session for {}", self.search_url),
            Err(e) => warn!("Failed to close WebDriver session for {}: {}", self.search_url, e),
        }
    }
}

fn capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    if config.headless {
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"] }),
        );
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": ["-headless"] }));
    }
    caps
}

#[async_trait]
impl PageSource for WebDriverPageSource {
    fn search_url(&self) -> &str {
        &self.search_url
    }

    async fn fetch_page(&mut self) -> Result<Vec<Candidate>> {
        let html = self.client.source().await?;
        Ok(extract_candidates(&html))
    }

    async fn advance(&mut self) -> Result<bool> {
        self.client.execute(SCROLL_TO_BOTTOM, vec![]).await?;
        tokio::time::sleep(self.settle_delay).await;

        let height = self.page_height().await?;
        let grew = height > self.last_height;
        debug!("Scrolled {}: height {} -> {}", self.search_url, self.last_height, height);
        self.last_height = height;
        Ok(grew)
    }
}
