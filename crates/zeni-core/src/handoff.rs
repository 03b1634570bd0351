//! Conversation hand-off to the host application
//!
//! The host receives three parallel sequences by value and renders them in
//! its own chat screen. There is no channel back into the overlay's store.

use crate::error::PlatformError;
use crate::types::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandoffPayload {
    #[serde(rename = "chat_messages")]
    pub messages: Vec<String>,
    pub is_user: Vec<bool>,
    pub timestamps: Vec<chrono::DateTime<chrono::Utc>>,
}

impl HandoffPayload {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut payload = Self {
            messages: Vec::with_capacity(messages.len()),
            is_user: Vec::with_capacity(messages.len()),
            timestamps: Vec::with_capacity(messages.len()),
        };
        for message in messages {
            payload.messages.push(message.text().to_string());
            payload.is_user.push(message.origin().is_user());
            payload.timestamps.push(message.sent_at());
        }
        payload
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Entry point of the host application's in-app chat screen
#[cfg_attr(test, mockall::automock)]
pub trait HostApp {
    fn open_conversation(&mut self, payload: HandoffPayload) -> Result<(), PlatformError>;
}
