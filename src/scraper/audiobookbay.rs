use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::PageAdapter;
use crate::config::SourceConfig;
use crate::error::ScrapeError;
use crate::magnet;
use crate::models::{DetailRecord, ResultItem, UNAVAILABLE};

lazy_static! {
    static ref POST: Selector = Selector::parse("div.post").unwrap();
    static ref POST_TITLE_LINK: Selector = Selector::parse("div.postTitle h2 a").unwrap();
    static ref POST_IMAGE: Selector = Selector::parse("div.postContent img").unwrap();
    static ref POST_SIZE: Selector =
        Selector::parse("div.postContent p[style*='text-align:center;']").unwrap();
    static ref HEADING: Selector = Selector::parse("h1").unwrap();
    static ref COVER_IMAGE: Selector = Selector::parse("img[itemprop='image']").unwrap();
    static ref ANY_IMAGE: Selector = Selector::parse("img").unwrap();
    static ref DESCRIPTION: Selector = Selector::parse(".desc").unwrap();
    static ref ROW: Selector = Selector::parse("tr").unwrap();
    static ref CELL: Selector = Selector::parse("td").unwrap();
    static ref MEDIA_IMAGE: Regex =
        Regex::new(r"m\.media-amazon\.com|\.(?:jpg|jpeg|png)$").unwrap();
}

const TRACKER_SCHEMES: [&str; 3] = ["udp://", "http://", "https://"];

/// Scraper for AudiobookBay listing and detail pages.
pub struct AudiobookBayScraper {
    client: reqwest::Client,
    base_url: String,
    category: String,
}

impl AudiobookBayScraper {
    pub fn new(config: &SourceConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        let language = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| ScrapeError::Client(format!("invalid Accept-Language: {}", e)))?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| ScrapeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category.clone(),
        })
    }

    fn listing_url(&self, query: &str, page: u32) -> String {
        format!(
            "{}/page/{}/?s={}&cat={}",
            self.base_url,
            page,
            urlencoding::encode(query),
            self.category
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ScrapeError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Request {
                url: url.to_string(),
                source,
            })
    }

    async fn body(url: &str, response: reqwest::Response) -> Result<String, ScrapeError> {
        let html = response.text().await.map_err(|source| ScrapeError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!(url, bytes = html.len(), "Fetched page");
        Ok(html)
    }
}

#[async_trait]
impl PageAdapter for AudiobookBayScraper {
    fn name(&self) -> &str {
        "audiobookbay"
    }

    async fn fetch_listing(&self, query: &str, page: u32) -> Result<Vec<ResultItem>, ScrapeError> {
        let url = self.listing_url(query, page);
        info!("Searching: {}", url);

        let response = self.get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %url, "Listing fetch failed, treating as no results");
            return Ok(Vec::new());
        }

        let html = Self::body(&url, response).await?;
        let results = parse_listing(&html, &self.base_url);
        info!("Found {} results", results.len());
        Ok(results)
    }

    async fn fetch_detail(&self, detail_link: &str) -> Result<DetailRecord, ScrapeError> {
        info!("Fetching details: {}", detail_link);

        let response = self.get(detail_link).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: detail_link.to_string(),
                status,
            });
        }

        let html = Self::body(detail_link, response).await?;
        Ok(parse_detail(&html))
    }
}

/// Extract result tiles from a listing page, in document order.
///
/// Tiles without a title or link are skipped.
pub fn parse_listing(html: &str, base_url: &str) -> Vec<ResultItem> {
    let document = Html::parse_document(html);
    let posts: Vec<_> = document.select(&POST).collect();
    debug!(posts = posts.len(), "Parsing listing page");

    let mut results = Vec::new();
    for post in posts {
        let Some(link) = post.select(&POST_TITLE_LINK).next() else {
            continue;
        };

        let title = link.text().collect::<String>().trim().to_string();
        let href = link.value().attr("href").unwrap_or("").trim();
        if title.is_empty() || href.is_empty() {
            continue;
        }

        let image_url = post
            .select(&POST_IMAGE)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        let size_info = post
            .select(&POST_SIZE)
            .next()
            .map(|p| p.text().collect::<String>().trim().replace('\n', " "))
            .unwrap_or_else(|| "Unknown size".to_string());

        let Some(detail_link) = absolute_link(base_url, href) else {
            warn!(href, "Skipping post with unresolvable link");
            continue;
        };

        results.push(ResultItem {
            title,
            detail_link,
            image_url,
            size_info,
        });
    }

    results
}

/// Extract an item's metadata from its detail page and derive the magnet.
///
/// Missing pieces fall back to [`UNAVAILABLE`] or `None`; this never fails.
pub fn parse_detail(html: &str) -> DetailRecord {
    let document = Html::parse_document(html);

    let title = document
        .select(&HEADING)
        .next()
        .map(stripped_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNAVAILABLE.to_string());

    let image_url = document
        .select(&COVER_IMAGE)
        .find_map(|img| img.value().attr("src"))
        .or_else(|| {
            document
                .select(&ANY_IMAGE)
                .filter_map(|img| img.value().attr("src"))
                .find(|src| MEDIA_IMAGE.is_match(src))
        })
        .map(str::to_string);

    let description = document
        .select(&DESCRIPTION)
        .next()
        .map(|d| {
            d.text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| UNAVAILABLE.to_string());

    let mut info_hash = None;
    let mut trackers = Vec::new();
    for row in document.select(&ROW) {
        let cells: Vec<_> = row.select(&CELL).collect();
        if cells.len() != 2 {
            continue;
        }

        let key = stripped_text(cells[0]);
        let value = stripped_text(cells[1]);
        if key.contains("Info Hash") {
            // Last row wins.
            info_hash = Some(value).filter(|v| !v.is_empty());
        } else if key.contains("Tracker") || TRACKER_SCHEMES.iter().any(|s| value.starts_with(s)) {
            trackers.push(value);
        }
    }

    let magnet = magnet::synthesize(&title, info_hash.as_deref(), &trackers);

    DetailRecord {
        title,
        description,
        image_url,
        info_hash,
        trackers,
        magnet,
    }
}

fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Resolves a listing href against the site root the way a browser would.
fn absolute_link(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(String::from)
        .ok()
}
