// src/services/scraper.rs

//! HTTP fetching of school substitution pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::BotConfig;

/// Source of raw page text for a school URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str, encoding: &str) -> Result<String>;
}

/// Fetches raw page text over HTTP, honoring legacy charsets.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a configured fetcher.
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

}

#[async_trait]
impl PageSource for PageFetcher {
    /// Fetch a page and decode it with the given charset fallback.
    ///
    /// School pages commonly declare no charset and are encoded as
    /// ISO-8859-2; the fallback applies when headers are silent.
    async fn fetch(&self, url: &str, encoding: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text_with_charset(encoding).await?;
        Ok(text)
    }
}
