//! Messaging transport seam.
//!
//! The bot renders everything through [`Transport`]; a chat-platform client
//! or the console front-end sits behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::session::UserId;

pub type ChatId = i64;
pub type MessageId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Data sent back in a callback when pressed.
    Callback(String),
    /// Link opened by the client.
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Inline keyboard, one `Vec` per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn push_row(&mut self, row: Vec<Button>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// Inbound chat activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Message {
        user: UserId,
        chat: ChatId,
        text: String,
    },
    Callback {
        id: String,
        user: UserId,
        chat: ChatId,
        message: MessageId,
        data: String,
    },
}

impl Update {
    pub fn user(&self) -> UserId {
        match self {
            Update::Message { user, .. } | Update::Callback { user, .. } => *user,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError>;

    async fn send_photo(
        &self,
        chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError>;

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Acknowledge a button press, optionally showing an alert.
    async fn answer_callback(
        &self,
        callback_id: &str,
        alert: Option<&str>,
    ) -> Result<(), TransportError>;
}
