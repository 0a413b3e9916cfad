//! Terminal front-end for trying the bot without a chat platform.

use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::bot::{parse_callback, select_callback, CALLBACK_MAGNET, CALLBACK_NEXT, CALLBACK_PREV};
use crate::error::TransportError;
use crate::session::UserId;
use crate::transport::{ButtonAction, ChatId, Keyboard, MessageId, Transport, Update};

/// Transport that prints every message to a writer (stdout by default).
pub struct ConsoleTransport {
    out: Mutex<Box<dyn Write + Send>>,
    next_id: AtomicI64,
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl ConsoleTransport {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            next_id: AtomicI64::new(1),
        }
    }

    /// Id of the most recently sent message.
    pub fn last_message(&self) -> MessageId {
        self.next_id.load(Ordering::SeqCst) - 1
    }

    fn print(&self, text: &str) -> Result<(), TransportError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| TransportError::Unavailable("console writer poisoned".to_string()))?;
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }
}

fn render_keyboard(keyboard: &Keyboard) -> String {
    let mut lines = Vec::new();
    for row in &keyboard.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|button| match &button.action {
                ButtonAction::Callback(data) => match parse_callback(data) {
                    Some(crate::controller::Event::Select(i)) => {
                        format!("{:>3}. {}", i + 1, button.label)
                    }
                    _ => format!("[{}]", button.label),
                },
                ButtonAction::Url(url) => format!("{}: {}", button.label, url),
            })
            .collect();
        lines.push(cells.join("  "));
    }
    lines.join("\n")
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_text(
        &self,
        _chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.print(&format!("{:-<80}\n{}", "", text))?;
        if let Some(keyboard) = keyboard {
            self.print(&render_keyboard(keyboard))?;
        }
        Ok(id)
    }

    async fn send_photo(
        &self,
        _chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.print(&format!("{:-<80}\n🖼  {}\n{}", "", photo_url, caption))?;
        if let Some(keyboard) = keyboard {
            self.print(&render_keyboard(keyboard))?;
        }
        Ok(id)
    }

    async fn edit_text(
        &self,
        _chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.print(&format!("{:-<80}\n(message #{} updated)\n{}", "", message, text))?;
        if let Some(keyboard) = keyboard {
            self.print(&render_keyboard(keyboard))?;
        }
        Ok(())
    }

    async fn answer_callback(
        &self,
        _callback_id: &str,
        alert: Option<&str>,
    ) -> Result<(), TransportError> {
        match alert {
            Some(alert) => self.print(&format!("⚠️  {}", alert)),
            None => Ok(()),
        }
    }
}

/// What a line typed at the console means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Update(Update),
    Quit,
    Ignore,
}

/// Map a console line onto the update a chat client would have sent.
///
/// `/select N` uses the 1-based numbers printed next to each result.
pub fn parse_line(line: &str, user: UserId, message: MessageId) -> ConsoleInput {
    static CALLBACK_SEQ: AtomicU64 = AtomicU64::new(1);

    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Ignore;
    }

    let mut parts = line.split_whitespace();
    let data = match parts.next() {
        Some("/quit") | Some("/exit") => return ConsoleInput::Quit,
        Some("/next") => CALLBACK_NEXT.to_string(),
        Some("/prev") => CALLBACK_PREV.to_string(),
        Some("/magnet") => CALLBACK_MAGNET.to_string(),
        Some("/select") => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => select_callback(n - 1),
            _ => return ConsoleInput::Ignore,
        },
        _ => {
            return ConsoleInput::Update(Update::Message {
                user,
                chat: user,
                text: line.to_string(),
            })
        }
    };

    ConsoleInput::Update(Update::Callback {
        id: CALLBACK_SEQ.fetch_add(1, Ordering::Relaxed).to_string(),
        user,
        chat: user,
        message,
        data,
    })
}
