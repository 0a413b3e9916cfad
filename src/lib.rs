//! Audiobook search sessions over a torrent-indexing site.
//!
//! A user searches by title, pages through scraped listings, opens an item
//! and gets its magnet link. The chat platform and the link store are
//! reached through traits so the engine can run behind any front-end.

pub mod bot;
pub mod caption;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod magnet;
pub mod models;
pub mod scraper;
pub mod session;
pub mod store;
pub mod testing;
pub mod transport;

pub use bot::Bot;
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use controller::{Controller, Event, Response};
pub use error::{ScrapeError, TransportError};
pub use models::{DetailRecord, MagnetLink, ResultItem, SearchQuery, UNAVAILABLE};
pub use scraper::{AudiobookBayScraper, PageAdapter};
pub use session::{SessionState, SessionStore, UserId};
pub use store::{LinkStore, StaticLinkStore};
pub use transport::{Keyboard, Transport, Update};
