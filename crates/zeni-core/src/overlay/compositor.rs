//! Window-system seam

use crate::error::SurfaceError;
use crate::types::{Frame, SurfaceKind};

/// The platform's system-level window service.
///
/// The controller calls this from the UI thread only. Appearance (alpha and
/// scale) is not pushed; after `invalidate` the renderer reads it back from
/// the controller for the current frame.
#[cfg_attr(test, mockall::automock)]
pub trait Compositor {
    /// Add a topmost surface at `frame`.
    fn attach(&mut self, surface: SurfaceKind, frame: Frame) -> Result<(), SurfaceError>;

    /// Move or resize an attached surface.
    fn update_layout(&mut self, surface: SurfaceKind, frame: Frame) -> Result<(), SurfaceError>;

    fn detach(&mut self, surface: SurfaceKind) -> Result<(), SurfaceError>;

    /// Request a repaint of `surface`.
    fn invalidate(&mut self, surface: SurfaceKind);

    /// Focus or release the panel's text input (and soft keyboard).
    fn set_input_focus(&mut self, focused: bool);

    /// Scroll the conversation list so `index` is visible.
    fn scroll_to_latest(&mut self, index: usize);

    /// Short transient notice (toast).
    fn show_notice(&mut self, text: &str);
}
