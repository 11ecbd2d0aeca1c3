use reqwest::{Client, ClientBuilder, Response};

use crate::{ScrapeError, config::ScrapingConfig, ratelimit::RateLimiter};

const USER_AGENT: &str = concat!("parkplatz/", env!("CARGO_PKG_VERSION"));

/// Markup fetched from one URL. Lives only for a single fetch/parse cycle.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub markup: String,
}

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl RequestClient {
    pub fn new(config: &ScrapingConfig) -> Result<Self, ScrapeError> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(ScrapeError::Client)?;
        let rate_limiter = RateLimiter::new(config.requests_per_second);
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    pub async fn fetch_url_response(&self, url: &str) -> Result<Response, ScrapeError> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    pub async fn fetch_page(&self, url: &str) -> Result<RawPage, ScrapeError> {
        let response = self.fetch_url_response(url).await?;
        let markup = response
            .text()
            .await
            .map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })?;
        log::debug!("Fetched {} bytes from {}", markup.len(), url);
        Ok(RawPage {
            url: url.to_string(),
            markup,
        })
    }
}
