//! Pagination and selection state machine.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::caption::format_caption;
use crate::models::{DetailRecord, MagnetLink, ResultItem, SearchQuery};
use crate::scraper::PageAdapter;
use crate::session::{SessionState, SessionStore, UserId};

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    NewQuery(String),
    Next,
    Prev,
    Select(usize),
    RevealMagnet,
}

/// What should be shown in reply to an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A listing page, possibly empty.
    Results {
        query: String,
        page: u32,
        items: Vec<ResultItem>,
    },
    /// First page of a new search came back empty.
    NoResults { query: String },
    /// The event had no effect.
    Unchanged,
    Item {
        detail: DetailRecord,
        caption: String,
    },
    Magnet { uri: String },
    NoMagnet,
    InvalidSelection { index: usize, available: usize },
    Expired,
    FetchFailed { reason: String },
}

pub struct Controller {
    adapter: Arc<dyn PageAdapter>,
    sessions: Arc<SessionStore>,
    caption_limit: usize,
}

impl Controller {
    pub fn new(
        adapter: Arc<dyn PageAdapter>,
        sessions: Arc<SessionStore>,
        caption_limit: usize,
    ) -> Self {
        Self {
            adapter,
            sessions,
            caption_limit,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub async fn handle(&self, user: UserId, event: Event) -> Response {
        debug!(user, ?event, adapter = self.adapter.name(), "Handling event");
        match event {
            Event::NewQuery(text) => self.new_query(user, &text).await,
            other => self.continue_session(user, other).await,
        }
    }

    async fn new_query(&self, user: UserId, text: &str) -> Response {
        let query = SearchQuery::normalize(text);
        let mut slot = self.sessions.lock(user).await;

        let results = match self.adapter.fetch_listing(query.normalized(), 1).await {
            Ok(results) => results,
            Err(e) => {
                warn!(user, error = %e, "Search failed");
                return Response::FetchFailed {
                    reason: e.to_string(),
                };
            }
        };

        info!(user, query = query.normalized(), results = results.len(), "New search");
        let shown = query.raw().trim().to_string();
        let empty = results.is_empty();
        *slot = Some(SessionState::new(query, results.clone()));

        if empty {
            Response::NoResults { query: shown }
        } else {
            Response::Results {
                query: shown,
                page: 1,
                items: results,
            }
        }
    }

    async fn continue_session(&self, user: UserId, event: Event) -> Response {
        let Some(mut slot) = self.sessions.lock_existing(user).await else {
            return Response::Expired;
        };
        let Some(session) = slot.as_mut() else {
            return Response::Expired;
        };

        let page = session.page();
        debug!(user, page, phase = ?session.phase(), "Session found");
        match event {
            Event::Next => self.turn_page(session, page.saturating_add(1)).await,
            Event::Prev if page > 1 => self.turn_page(session, page - 1).await,
            Event::Prev => Response::Unchanged,
            Event::Select(index) => self.select(session, index).await,
            Event::RevealMagnet => reveal(session),
            Event::NewQuery(_) => Response::Unchanged,
        }
    }

    async fn turn_page(&self, session: &mut SessionState, page: u32) -> Response {
        match self
            .adapter
            .fetch_listing(session.query.normalized(), page)
            .await
        {
            Ok(results) => {
                session.show_page(page, results);
                Response::Results {
                    query: session.query.raw().trim().to_string(),
                    page: session.page(),
                    items: session.results.clone(),
                }
            }
            Err(e) => {
                warn!(page, error = %e, "Page fetch failed");
                Response::FetchFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn select(&self, session: &mut SessionState, index: usize) -> Response {
        let Some(item) = session.results.get(index) else {
            return Response::InvalidSelection {
                index,
                available: session.results.len(),
            };
        };

        let link = item.detail_link.clone();
        match self.adapter.fetch_detail(&link).await {
            Ok(detail) => {
                let caption = format_caption(&detail.title, &detail.description, self.caption_limit);
                session.selected = Some(detail.clone());
                Response::Item { detail, caption }
            }
            Err(e) => {
                warn!(link = %link, error = %e, "Detail fetch failed");
                Response::FetchFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn reveal(session: &SessionState) -> Response {
    match session.selected.as_ref().map(|d| &d.magnet) {
        Some(MagnetLink::Available(uri)) => Response::Magnet { uri: uri.clone() },
        _ => Response::NoMagnet,
    }
}
