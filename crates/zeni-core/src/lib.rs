//! Zeni Core Library
//!
//! Headless core of the Zeni floating assistant overlay:
//! - Gesture recognition for the trigger, panel header and resize handle
//! - Overlay window controller and its lifecycle state machine
//! - Conversation store and host hand-off
//! - Sequential request dispatch to the conversational backend
//! - Deterministic animation timers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        zeni-core                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  overlay/      - Controller, state machine, compositor seam │
//! │  gesture/      - Tap/drag tracker                           │
//! │  dispatch/     - Backend client, worker, UI hand-back       │
//! │  animation/    - Timer queue, transitions, typing dots      │
//! │  store/        - Conversation log                           │
//! │  platform/     - Permissions, widget registry               │
//! │  types/        - Shared type definitions                    │
//! │  config.rs     - Widget configuration                       │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod animation;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod gesture;
pub mod handoff;
pub mod overlay;
pub mod platform;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;

pub use config::{CallBudget, LayoutConfig, TapHidePolicy, WidgetConfig};
pub use dispatch::{ChatBackend, HttpBackend, Pending, RequestDispatcher};
pub use gesture::{GestureBinding, GestureResult, GestureTracker};
pub use handoff::{HandoffPayload, HostApp};
pub use overlay::{Compositor, OverlayController};
pub use platform::{OverlayPermissions, WidgetHandle, WidgetRegistry};
pub use store::ConversationStore;
