//! Request dispatch
//!
//! ```text
//!   UI thread                      runtime
//!   ─────────                      ───────
//!   send(text) ──► job queue ──► worker ──► ChatBackend
//!        ▲                                     │
//!        └──── UiInbox ◄── UiPoster ◄── Pending┘
//! ```

mod backend;
mod dispatcher;
mod protocol;
mod ui_channel;

pub use backend::{ChatBackend, HttpBackend};
#[cfg(test)]
pub use backend::MockChatBackend;
pub use dispatcher::RequestDispatcher;
pub use protocol::{ChatRequest, ChatResponse, ClearRequest, HealthResponse};
pub use ui_channel::{ui_channel, Pending, UiInbox, UiPoster};
