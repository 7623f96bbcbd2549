//! Chat addressing and outbound payloads.

use std::fmt;

use crate::error::{ClientError, Result};
use crate::media::MediaAttachment;

/// Address of a chat on the messaging network, e.g. `15551234567@c.us`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatId(String);

impl ChatId {
    /// Domain suffix for one-to-one chats.
    pub const USER_SUFFIX: &'static str = "@c.us";

    /// Builds a chat id from a phone number.
    ///
    /// Separators (`+`, spaces, dashes, dots, parentheses) are dropped and
    /// the suffix is appended. Values that already contain `@` are taken as
    /// complete chat ids.
    pub fn from_phone(phone: &str) -> Result<Self> {
        let trimmed = phone.trim();
        if trimmed.is_empty() {
            return Err(ClientError::InvalidTarget("phone number is empty".into()));
        }

        if trimmed.contains('@') {
            return Ok(Self(trimmed.to_string()));
        }

        let digits: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'))
            .collect();

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ClientError::InvalidTarget(format!(
                "not a phone number: {}",
                trimmed
            )));
        }

        Ok(Self(format!("{}{}", digits, Self::USER_SUFFIX)))
    }

    /// Returns the chat id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content of an outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    /// Plain text.
    Text(String),
    /// Media attachment with an optional caption.
    Media {
        /// The attachment.
        media: MediaAttachment,
        /// Text shown under the attachment.
        caption: Option<String>,
    },
}

impl MessagePayload {
    /// Plain text payload.
    pub fn text(body: impl Into<String>) -> Self {
        MessagePayload::Text(body.into())
    }

    /// Media payload with a caption.
    pub fn media_with_caption(media: MediaAttachment, caption: impl Into<String>) -> Self {
        MessagePayload::Media {
            media,
            caption: Some(caption.into()),
        }
    }

    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MessagePayload::Text(_) => "text",
            MessagePayload::Media { .. } => "media",
        }
    }
}
