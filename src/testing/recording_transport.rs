use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::TransportError;
use crate::transport::{ChatId, Keyboard, MessageId, Transport};

/// A transport call captured for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Text {
        chat: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photo {
        chat: ChatId,
        photo_url: String,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    Edit {
        chat: ChatId,
        message: MessageId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Answer {
        callback_id: String,
        alert: Option<String>,
    },
}

/// [`Transport`] that stores every call instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: RwLock<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn clear(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedCall) -> MessageId {
        let mut calls = self.calls.write().await;
        calls.push(call);
        calls.len() as MessageId
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        Ok(self
            .record(RecordedCall::Text {
                chat,
                text: text.to_string(),
                keyboard: keyboard.cloned(),
            })
            .await)
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        Ok(self
            .record(RecordedCall::Photo {
                chat,
                photo_url: photo_url.to_string(),
                caption: caption.to_string(),
                keyboard: keyboard.cloned(),
            })
            .await)
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.record(RecordedCall::Edit {
            chat,
            message,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        })
        .await;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        alert: Option<&str>,
    ) -> Result<(), TransportError> {
        self.record(RecordedCall::Answer {
            callback_id: callback_id.to_string(),
            alert: alert.map(str::to_string),
        })
        .await;
        Ok(())
    }
}
