//! Surface and widget state types

use serde::{Deserialize, Serialize};

/// The two system-level windows the widget owns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Small collapsed button that opens/closes the panel
    Trigger,
    /// Expandable chat surface
    Panel,
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceKind::Trigger => write!(f, "trigger"),
            SurfaceKind::Panel => write!(f, "panel"),
        }
    }
}

/// Visibility/expansion state of the widget
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    /// Only the trigger is attached; no conversation is retained
    Collapsed,
    /// Panel detached by minimize, conversation and expansion retained
    PanelHidden,
    /// Panel attached, no message sent yet
    PanelVisibleCompact,
    /// Panel attached with the conversation list showing
    PanelVisibleExpanded,
}

impl WidgetState {
    pub fn is_panel_visible(self) -> bool {
        matches!(
            self,
            WidgetState::PanelVisibleCompact | WidgetState::PanelVisibleExpanded
        )
    }
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::Collapsed
    }
}

/// Render-time visual properties of a surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    pub alpha: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Appearance {
    pub const OPAQUE: Appearance = Appearance {
        alpha: 1.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn new(alpha: f32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            alpha,
            scale_x,
            scale_y,
        }
    }

    pub fn faded(alpha: f32) -> Self {
        Self::new(alpha, 1.0, 1.0)
    }

    /// Linear interpolation towards `to`, `t` in `[0, 1]`.
    pub fn lerp(self, to: Appearance, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            alpha: self.alpha + (to.alpha - self.alpha) * t,
            scale_x: self.scale_x + (to.scale_x - self.scale_x) * t,
            scale_y: self.scale_y + (to.scale_y - self.scale_y) * t,
        }
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self::OPAQUE
    }
}
