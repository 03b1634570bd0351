//! Surface geometry and resize limits

use crate::config::LayoutConfig;
use crate::types::{clamp_axis, Frame, Point, ScreenMetrics, Size};

/// Resize limits in device pixels, derived from the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeBounds {
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
}

impl ResizeBounds {
    pub fn new(screen: &ScreenMetrics, layout: &LayoutConfig) -> Self {
        Self {
            min_width: screen.dp(layout.min_width_dp),
            max_width: screen.width_fraction(layout.max_width_fraction),
            min_height: screen.dp(layout.min_height_dp),
            max_height: screen.height_fraction(layout.max_height_fraction),
        }
    }

    pub fn clamp_width(&self, width: i32) -> i32 {
        clamp_axis(width, self.min_width, self.max_width)
    }

    pub fn clamp_height(&self, height: i32) -> i32 {
        clamp_axis(height, self.min_height, self.max_height)
    }
}

/// Current placement of the panel.
///
/// The panel is a fixed chrome (header, input row, resize handle) plus the
/// conversation list, which only takes space once expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub origin: Point,
    pub width: i32,
    pub list_height: i32,
    pub chrome_height: i32,
}

impl PanelGeometry {
    pub fn from_layout(screen: &ScreenMetrics, layout: &LayoutConfig) -> Self {
        Self {
            origin: layout.panel_origin,
            width: screen.dp(layout.panel_width_dp),
            list_height: screen.dp(layout.list_height_dp),
            chrome_height: screen.dp(layout.panel_chrome_height_dp),
        }
    }

    pub fn frame(&self, expanded: bool) -> Frame {
        let height = if expanded {
            self.chrome_height + self.list_height
        } else {
            self.chrome_height
        };
        Frame::new(self.origin, Size::new(self.width, height))
    }

    /// Frame captured when a resize gesture starts: width and list height.
    pub fn resize_anchor(&self) -> Frame {
        Frame::new(self.origin, Size::new(self.width, self.list_height))
    }
}
