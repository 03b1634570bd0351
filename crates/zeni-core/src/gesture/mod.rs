//! Pointer gesture recognition
//!
//! A single tracker type turns raw pointer-down/move/up streams into either a
//! tap or a drag. The same recognizer is bound to three affordances: the
//! trigger (move), the panel header (move) and the resize handle (resize).

mod tracker;

pub use tracker::{DragUpdate, GestureResult, GestureTracker};

/// Default drag threshold in device pixels.
pub const DRAG_THRESHOLD: f32 = 10.0;

/// Which affordance a tracker is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureBinding {
    /// Trigger surface, position only
    TriggerMove,
    /// Panel header, position only
    HeaderMove,
    /// Panel resize handle, size only
    PanelResize,
}
