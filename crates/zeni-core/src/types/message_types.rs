//! Conversation message types

use serde::{Deserialize, Serialize};

/// Prefix that marks an assistant-origin message as a transport failure.
pub const ERROR_PREFIX: &str = "⚠️ Error: ";

/// Who produced a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

impl Origin {
    pub fn is_user(self) -> bool {
        matches!(self, Origin::User)
    }
}

/// A single exchanged message. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    text: String,
    origin: Origin,
    sent_at: chrono::DateTime<chrono::Utc>,
}

impl Message {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            text: text.into(),
            origin,
            sent_at: chrono::Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Assistant)
    }

    /// Assistant-origin message carrying a failure description.
    pub fn error(reason: impl std::fmt::Display) -> Self {
        Self::new(format!("{}{}", ERROR_PREFIX, reason), Origin::Assistant)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn sent_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.sent_at
    }

    pub fn is_error(&self) -> bool {
        self.origin == Origin::Assistant && self.text.starts_with(ERROR_PREFIX)
    }

    /// Renderer-ready markup of the text (see [`crate::format::to_markup`]).
    pub fn markup(&self) -> String {
        match self.origin {
            Origin::Assistant if !self.is_error() => crate::format::to_markup(&self.text),
            _ => self.text.clone(),
        }
    }
}
