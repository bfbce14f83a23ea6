// Chat transport: Bot API wire types, the transport seam and its HTTP client.

pub mod client;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::TelegramClient;
pub use types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, Update};

/// Errors raised by a transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// An outgoing text message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(ParseMode::Html),
            keyboard: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(ParseMode::Markdown),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// A file fetched from the chat platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadedFile {
    pub bytes: Vec<u8>,
    /// Server-side path, used to recover the file extension.
    pub path: Option<String>,
}

/// Everything the dispatcher needs from the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &[u8],
        caption: Option<&str>,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError>;

    /// Replace the text (and keyboard) of a message the bot sent earlier.
    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        reply: &Reply,
    ) -> Result<(), TransportError>;

    /// Remove the inline keyboard from an earlier message.
    async fn clear_keyboard(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError>;

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError>;

    async fn download_file(&self, file_id: &str) -> Result<DownloadedFile, TransportError>;

    /// Point the platform at `url` for future updates.
    async fn set_webhook(&self, url: &str) -> Result<bool, TransportError>;
}
