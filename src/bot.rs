//! Chat front-end: turns inbound updates into controller events and
//! controller responses into transport calls.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::controller::{Controller, Event, Response};
use crate::error::TransportError;
use crate::models::ResultItem;
use crate::store::LinkStore;
use crate::transport::{Button, ChatId, Keyboard, MessageId, Transport, Update};

pub const CALLBACK_NEXT: &str = "next";
pub const CALLBACK_PREV: &str = "prev";
pub const CALLBACK_MAGNET: &str = "get_magnet";
const CALLBACK_SELECT_PREFIX: &str = "select|";

const WELCOME: &str = "👋 Welcome to AudiobookBay Search Bot!\n\n\
    🔍 Just send me the name of an audiobook, and I'll fetch results for you.\n\
    ➡️ Use the 'Next' and 'Previous' buttons to navigate pages.\n\
    🎧 Click on a title to get full details.";
const HELP: &str = "🤖 User Commands:\n\n\
    /start - Show welcome message\n\
    Type a book name to search audiobooks";
const NOT_ALLOWED: &str = "⛔ You are not allowed to use this bot.";
const NO_RESULTS: &str = "No results found.";
const EXPIRED: &str = "Session expired. Please search again.";
const NO_MAGNET: &str = "No magnet found.";
const INVALID_SELECTION: &str = "That result is no longer on this page.";
const FETCH_FAILED: &str = "⚠️ Could not reach the search site. Please try again later.";

/// Decode a button's callback data into an event.
pub fn parse_callback(data: &str) -> Option<Event> {
    match data {
        CALLBACK_NEXT => Some(Event::Next),
        CALLBACK_PREV => Some(Event::Prev),
        CALLBACK_MAGNET => Some(Event::RevealMagnet),
        _ => data
            .strip_prefix(CALLBACK_SELECT_PREFIX)
            .and_then(|index| index.parse().ok())
            .map(Event::Select),
    }
}

pub fn select_callback(index: usize) -> String {
    format!("{}{}", CALLBACK_SELECT_PREFIX, index)
}

pub fn results_header(query: &str, page: u32) -> String {
    format!("🔍 Search Results for '{}' (Page {}):", query, page)
}

/// One button per result, then the navigation row.
pub fn results_keyboard(items: &[ResultItem], page: u32) -> Keyboard {
    let mut keyboard = Keyboard::default();
    for (i, item) in items.iter().enumerate() {
        keyboard.push_row(vec![Button::callback(&item.title, select_callback(i))]);
    }

    let mut nav = Vec::new();
    if page > 1 {
        nav.push(Button::callback("⬅️ Previous", CALLBACK_PREV));
    }
    nav.push(Button::callback("➡️ Next", CALLBACK_NEXT));
    keyboard.push_row(nav);
    keyboard
}

pub struct Bot {
    controller: Controller,
    transport: Arc<dyn Transport>,
    links: Arc<dyn LinkStore>,
    config: BotConfig,
}

impl Bot {
    pub fn new(
        controller: Controller,
        transport: Arc<dyn Transport>,
        links: Arc<dyn LinkStore>,
        config: BotConfig,
    ) -> Self {
        Self {
            controller,
            transport,
            links,
            config,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Handle one inbound update. Failures are reported to the user or
    /// logged; nothing here propagates out to the dispatch loop.
    pub async fn handle_update(&self, update: Update) {
        let user = update.user();
        if !self.config.is_allowed(user) {
            warn!(user, "Rejected update from user outside the allow-list");
            match &update {
                Update::Message { chat, .. } => {
                    report(self.transport.send_text(*chat, NOT_ALLOWED, None).await);
                }
                Update::Callback { id, .. } => {
                    report(self.transport.answer_callback(id, Some(NOT_ALLOWED)).await);
                }
            }
            return;
        }

        match update {
            Update::Message { user, chat, text } => self.on_message(user, chat, &text).await,
            Update::Callback {
                id,
                user,
                chat,
                message,
                data,
            } => self.on_callback(&id, user, chat, message, &data).await,
        }
    }

    async fn on_message(&self, user: i64, chat: ChatId, text: &str) {
        let text = text.trim();
        let command = text.split_whitespace().next().unwrap_or("");
        match command {
            "/start" => {
                report(self.transport.send_text(chat, WELCOME, None).await);
                return;
            }
            c if c.starts_with('/') => {
                report(self.transport.send_text(chat, HELP, None).await);
                return;
            }
            _ => {}
        }

        info!(user, query = text, "Search");
        let response = self
            .controller
            .handle(user, Event::NewQuery(text.to_string()))
            .await;

        let result = match response {
            Response::Results { query, page, items } => self
                .transport
                .send_text(
                    chat,
                    &results_header(&query, page),
                    Some(&results_keyboard(&items, page)),
                )
                .await
                .map(|_| ()),
            Response::NoResults { .. } => {
                self.transport.send_text(chat, NO_RESULTS, None).await.map(|_| ())
            }
            Response::FetchFailed { .. } => {
                self.transport.send_text(chat, FETCH_FAILED, None).await.map(|_| ())
            }
            other => {
                warn!(?other, "Unexpected response to a new search");
                Ok(())
            }
        };
        report(result);
    }

    async fn on_callback(&self, id: &str, user: i64, chat: ChatId, message: MessageId, data: &str) {
        let Some(event) = parse_callback(data) else {
            warn!(user, data, "Unknown callback data");
            report(self.transport.answer_callback(id, None).await);
            return;
        };

        let response = self.controller.handle(user, event).await;
        let mut alert = None;
        let result = match response {
            Response::Results { query, page, items } => {
                self.transport
                    .edit_text(
                        chat,
                        message,
                        &results_header(&query, page),
                        Some(&results_keyboard(&items, page)),
                    )
                    .await
            }
            Response::Item { detail, caption } => {
                let mut keyboard = Keyboard::default();
                keyboard.push_row(vec![Button::callback("🔗 Get Magnet Link", CALLBACK_MAGNET)]);
                match detail.image_url.as_deref() {
                    Some(photo) => self
                        .transport
                        .send_photo(chat, photo, &caption, Some(&keyboard))
                        .await
                        .map(|_| ()),
                    None => self
                        .transport
                        .send_text(chat, &caption, Some(&keyboard))
                        .await
                        .map(|_| ()),
                }
            }
            Response::Magnet { uri } => {
                let keyboard = self.magnet_keyboard(&uri).await;
                self.transport
                    .send_text(chat, &format!("🔗 Magnet Link:\n{}", uri), Some(&keyboard))
                    .await
                    .map(|_| ())
            }
            Response::Expired => self.transport.send_text(chat, EXPIRED, None).await.map(|_| ()),
            Response::FetchFailed { .. } => {
                self.transport.send_text(chat, FETCH_FAILED, None).await.map(|_| ())
            }
            Response::NoMagnet => {
                alert = Some(NO_MAGNET);
                Ok(())
            }
            Response::InvalidSelection { .. } => {
                alert = Some(INVALID_SELECTION);
                Ok(())
            }
            Response::Unchanged | Response::NoResults { .. } => Ok(()),
        };
        report(result);
        report(self.transport.answer_callback(id, alert).await);
    }

    async fn magnet_keyboard(&self, uri: &str) -> Keyboard {
        let mut keyboard = Keyboard::default();
        let stream = format!("{}{}", self.config.stream_base_url, urlencoding::encode(uri));
        keyboard.push_row(vec![Button::url("▶️ Stream on Webtor", stream)]);

        if let Some(extra) = self.links.latest_extra_link().await {
            if extra.url.starts_with("http://") || extra.url.starts_with("https://") {
                keyboard.push_row(vec![Button::url(extra.text, extra.url)]);
            }
        }
        keyboard
    }
}

fn report<T>(result: Result<T, TransportError>) {
    if let Err(e) = result {
        warn!(error = %e, "Transport call failed");
    }
}
