//! Terminal stand-ins for the platform collaborators

use std::collections::HashMap;
use tracing::{debug, info};
use zeni_core::error::{PlatformError, SurfaceError};
use zeni_core::types::{Frame, SurfaceKind};
use zeni_core::{Compositor, HandoffPayload, HostApp, OverlayPermissions};

/// Compositor that logs surface operations instead of drawing.
#[derive(Debug, Default)]
pub struct LogCompositor {
    attached: HashMap<SurfaceKind, Frame>,
}

impl LogCompositor {
    pub fn frame(&self, surface: SurfaceKind) -> Option<Frame> {
        self.attached.get(&surface).copied()
    }
}

fn describe(frame: &Frame) -> String {
    format!(
        "{}x{} at ({}, {})",
        frame.size.width, frame.size.height, frame.origin.x, frame.origin.y
    )
}

impl Compositor for LogCompositor {
    fn attach(&mut self, surface: SurfaceKind, frame: Frame) -> Result<(), SurfaceError> {
        if self.attached.contains_key(&surface) {
            return Err(SurfaceError::AttachRejected(format!("{} already attached", surface)));
        }
        info!("attach {} {}", surface, describe(&frame));
        self.attached.insert(surface, frame);
        Ok(())
    }

    fn update_layout(&mut self, surface: SurfaceKind, frame: Frame) -> Result<(), SurfaceError> {
        let slot = self
            .attached
            .get_mut(&surface)
            .ok_or_else(|| SurfaceError::NotAttached(surface.to_string()))?;
        *slot = frame;
        debug!("layout {} {}", surface, describe(&frame));
        Ok(())
    }

    fn detach(&mut self, surface: SurfaceKind) -> Result<(), SurfaceError> {
        self.attached
            .remove(&surface)
            .ok_or_else(|| SurfaceError::NotAttached(surface.to_string()))?;
        info!("detach {}", surface);
        Ok(())
    }

    fn invalidate(&mut self, _surface: SurfaceKind) {}

    fn set_input_focus(&mut self, focused: bool) {
        debug!("input focus {}", focused);
    }

    fn scroll_to_latest(&mut self, index: usize) {
        debug!("scroll to message {}", index);
    }

    fn show_notice(&mut self, text: &str) {
        println!("[{}]", text);
    }
}

/// Host app that prints the hand-off payload as JSON.
#[derive(Debug, Default)]
pub struct StdoutHost;

impl HostApp for StdoutHost {
    fn open_conversation(&mut self, payload: HandoffPayload) -> Result<(), PlatformError> {
        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| PlatformError::HandoffFailed(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }
}

/// Desktop terminals can always draw.
#[derive(Debug, Default)]
pub struct DesktopPermissions;

impl OverlayPermissions for DesktopPermissions {
    fn can_draw_overlays(&self) -> bool {
        true
    }

    fn request_overlay_permission(&mut self) -> Result<bool, PlatformError> {
        Ok(true)
    }
}
