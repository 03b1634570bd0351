//! Tap/drag state machine

use super::GestureBinding;
use crate::types::{Delta, Frame, Point, PointerPos, Size};
use tracing::trace;

/// Ephemeral record of one pointer-down .. pointer-up sequence
#[derive(Debug, Clone, Copy)]
struct GestureSession {
    anchor_pointer: PointerPos,
    anchor_frame: Frame,
    dragging: bool,
}

/// Emitted for every move once the threshold has been crossed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragUpdate {
    /// Cumulative movement since pointer-down
    pub delta: Delta,
    /// Surface frame captured at pointer-down
    pub anchor: Frame,
    /// True only for the move that crossed the threshold
    pub started: bool,
}

impl DragUpdate {
    /// Anchor origin shifted by the delta (unclamped).
    pub fn moved_origin(&self) -> Point {
        self.anchor.origin.offset(self.delta)
    }

    /// Anchor size grown by the delta (unclamped).
    pub fn resized(&self) -> Size {
        Size {
            width: self.anchor.size.width + self.delta.dx as i32,
            height: self.anchor.size.height + self.delta.dy as i32,
        }
    }
}

/// Outcome of a completed pointer sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureResult {
    Tap,
    DragEnd(Delta),
}

#[derive(Debug)]
pub struct GestureTracker {
    binding: GestureBinding,
    threshold: f32,
    session: Option<GestureSession>,
}

impl GestureTracker {
    pub fn new(binding: GestureBinding, threshold: f32) -> Self {
        Self {
            binding,
            threshold,
            session: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.map(|s| s.dragging).unwrap_or(false)
    }

    /// Start a new session, replacing any session whose pointer-up was lost.
    pub fn on_pointer_down(&mut self, pos: PointerPos, anchor_frame: Frame) {
        if self.session.is_some() {
            trace!("{:?}: replacing unfinished gesture session", self.binding);
        }
        self.session = Some(GestureSession {
            anchor_pointer: pos,
            anchor_frame,
            dragging: false,
        });
    }

    pub fn on_pointer_move(&mut self, pos: PointerPos) -> Option<DragUpdate> {
        let threshold = self.threshold;
        let session = self.session.as_mut()?;
        let delta = Delta::between(session.anchor_pointer, pos);

        let mut started = false;
        if !session.dragging && delta.max_axis() > threshold {
            session.dragging = true;
            started = true;
        }

        session.dragging.then_some(DragUpdate {
            delta,
            anchor: session.anchor_frame,
            started,
        })
    }

    /// Close the session. Returns `None` when no pointer-down was seen.
    pub fn on_pointer_up(&mut self, pos: PointerPos) -> Option<GestureResult> {
        let session = self.session.take()?;
        if session.dragging {
            Some(GestureResult::DragEnd(Delta::between(
                session.anchor_pointer,
                pos,
            )))
        } else {
            Some(GestureResult::Tap)
        }
    }

    /// Abandon the current session without producing a result.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}
