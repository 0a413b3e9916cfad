//! Source-site adapters.
//!
//! The controller only talks to [`PageAdapter`]; everything tied to one
//! site's markup lives in that site's module.

mod audiobookbay;

pub use audiobookbay::{parse_detail, parse_listing, AudiobookBayScraper};

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::models::{DetailRecord, ResultItem};

#[async_trait]
pub trait PageAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch one 1-indexed listing page for a normalized query.
    ///
    /// A non-success status yields an empty list. Only transport failures
    /// are errors.
    async fn fetch_listing(&self, query: &str, page: u32) -> Result<Vec<ResultItem>, ScrapeError>;

    /// Fetch and extract an item's detail page, magnet link included.
    async fn fetch_detail(&self, detail_link: &str) -> Result<DetailRecord, ScrapeError>;
}
