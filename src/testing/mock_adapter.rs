use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::ScrapeError;
use crate::models::{DetailRecord, ResultItem};
use crate::scraper::PageAdapter;

/// In-memory [`PageAdapter`] that records every fetch.
///
/// Unknown listing pages come back empty, like an out-of-range page on the
/// real site. Unknown detail links fail with a 404.
#[derive(Debug, Default)]
pub struct MockAdapter {
    pages: RwLock<HashMap<(String, u32), Vec<ResultItem>>>,
    details: RwLock<HashMap<String, DetailRecord>>,
    listing_calls: RwLock<Vec<(String, u32)>>,
    detail_calls: RwLock<Vec<String>>,
    fail_listing: RwLock<bool>,
    delay: RwLock<Option<Duration>>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_page(&self, query: &str, page: u32, results: Vec<ResultItem>) {
        self.pages
            .write()
            .await
            .insert((query.to_string(), page), results);
    }

    pub async fn set_detail(&self, link: &str, detail: DetailRecord) {
        self.details.write().await.insert(link.to_string(), detail);
    }

    /// Make every listing fetch fail at the transport level.
    pub async fn fail_listings(&self, fail: bool) {
        *self.fail_listing.write().await = fail;
    }

    /// Delay each fetch, to let concurrent handlers interleave.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn listing_calls(&self) -> Vec<(String, u32)> {
        self.listing_calls.read().await.clone()
    }

    pub async fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.read().await.clone()
    }

    pub async fn total_calls(&self) -> usize {
        self.listing_calls.read().await.len() + self.detail_calls.read().await.len()
    }

    async fn pause(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PageAdapter for MockAdapter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_listing(&self, query: &str, page: u32) -> Result<Vec<ResultItem>, ScrapeError> {
        self.listing_calls
            .write()
            .await
            .push((query.to_string(), page));
        self.pause().await;

        if *self.fail_listing.read().await {
            return Err(ScrapeError::Status {
                url: format!("mock://listing/{}/{}", query, page),
                status: reqwest::StatusCode::BAD_GATEWAY,
            });
        }

        Ok(self
            .pages
            .read()
            .await
            .get(&(query.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_detail(&self, detail_link: &str) -> Result<DetailRecord, ScrapeError> {
        self.detail_calls.write().await.push(detail_link.to_string());
        self.pause().await;

        self.details
            .read()
            .await
            .get(detail_link)
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                url: detail_link.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }
}
