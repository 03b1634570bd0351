//! In-memory conversation log
//!
//! Messages are kept in arrival order and never reordered or edited. The
//! store only empties on an explicit close; minimize, restore and hand-off
//! all leave it untouched.

use crate::handoff::HandoffPayload;
use crate::types::Message;
use tracing::debug;

/// Generation counter, bumped every time the store is cleared.
///
/// Requests remember the epoch they were submitted in, so a reply that lands
/// after a close can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(pub u64);

#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    epoch: Epoch,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its index.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Drop every message and start a new epoch.
    pub fn clear(&mut self) {
        debug!(
            "Clearing conversation ({} messages, epoch {})",
            self.messages.len(),
            self.epoch.0
        );
        self.messages.clear();
        self.epoch = Epoch(self.epoch.0 + 1);
    }

    /// Snapshot the conversation for the host application.
    pub fn export(&self) -> HandoffPayload {
        HandoffPayload::from_messages(&self.messages)
    }
}
