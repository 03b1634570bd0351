//! Overlay window management
//!
//! Two topmost surfaces: the trigger, which lives for the whole widget
//! lifetime, and the chat panel, which is attached and detached by the
//! lifecycle state machine.

pub(crate) mod compositor;
mod controller;
mod layout;
mod state;

pub use compositor::Compositor;
#[cfg(test)]
pub use compositor::MockCompositor;
pub use controller::{
    Completion, OverlayController, NOTICE_EMPTY_INPUT, NOTICE_HANDOFF, NOTICE_HANDOFF_FAILED,
    NOTICE_MINIMIZED, TRIGGER_DRAGGING_ALPHA, TRIGGER_IDLE_ALPHA, TRIGGER_PRESSED_ALPHA,
};
pub use layout::{PanelGeometry, ResizeBounds};
pub use state::{HideKind, LifecycleEvent, Step, WidgetMachine};
