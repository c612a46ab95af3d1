use crate::parser::html_to_text;
use crate::types::{FetchConfig, GathererError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use url::Url;

/// Body of a successful GET.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
    pub response_time_ms: u64,
}

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    rate_limiter: Arc<RwLock<HashMap<String, Instant>>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            config,
            rate_limiter: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// GET `url` with `query` appended, retrying transport errors and
    /// non-success statuses with exponential backoff.
    pub async fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<FetchedPage> {
        let start_time = Instant::now();
        let full_url = Url::parse_with_params(url, query.iter().map(|(k, v)| (*k, v.as_str())))?;

        debug!("Fetching: {}", full_url);

        self.apply_rate_limit(&full_url).await;

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.send(&full_url).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                info!("Fetched {} ({} bytes)", full_url, body.len());
                                return Ok(FetchedPage {
                                    url: full_url.to_string(),
                                    status: status.as_u16(),
                                    body,
                                    response_time_ms: start_time.elapsed().as_millis() as u64,
                                });
                            }
                            Err(e) => last_error = Some(GathererError::Http(e)),
                        }
                    } else {
                        last_error = Some(GathererError::General(format!(
                            "HTTP {}: {}",
                            status,
                            status.canonical_reason().unwrap_or("Unknown")
                        )));
                    }
                }
                Err(e) => last_error = Some(e),
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, full_url, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            break;
        }

        error!("Failed to fetch {} after {} attempts", full_url, self.config.max_retries + 1);
        Err(last_error.unwrap_or_else(|| GathererError::General("Unknown error".to_string())))
    }

    async fn send(&self, url: &Url) -> Result<Response> {
        let response = self.client.get(url.clone()).send().await?;
        Ok(response)
    }

    async fn apply_rate_limit(&self, url: &Url) {
        let host = url.host_str().unwrap_or("").to_string();
        let min_interval = Duration::from_millis(self.config.min_host_interval_ms);

        let mut rate_limiter = self.rate_limiter.write().await;
        if let Some(last_request) = rate_limiter.get(&host) {
            let elapsed = last_request.elapsed();
            if elapsed < min_interval {
                let wait_time = min_interval - elapsed;
                debug!("Rate limiting {}: waiting {:?}", host, wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
        rate_limiter.insert(host, Instant::now());
    }

    /// Single attempt at a document page, reduced to its visible text.
    pub async fn fetch_full_content(&self, url: &str) -> Result<String> {
        debug!("Fetching full content from: {}", url);

        let parsed = Url::parse(url)?;
        self.apply_rate_limit(&parsed).await;

        let response = self.client.get(parsed).send().await?;

        if !response.status().is_success() {
            return Err(GathererError::General(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let content = response.text().await?;
        Ok(html_to_text(&content))
    }
}
