//! Screen geometry in device pixels

use serde::{Deserialize, Serialize};

/// Raw pointer position as delivered by the platform (sub-pixel precision)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Surface origin (top-left) in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a pointer delta, truncating the fractional part.
    pub fn offset(self, delta: Delta) -> Self {
        Self {
            x: self.x + delta.dx as i32,
            y: self.y + delta.dy as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn square(side: i32) -> Self {
        Self::new(side, side)
    }
}

/// Position plus size of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Point,
    pub size: Size,
}

impl Frame {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Return the frame moved so that it lies fully on `screen`.
    ///
    /// When the frame is larger than the screen the origin pins to 0.
    pub fn clamped_to(self, screen: &ScreenMetrics) -> Self {
        Self {
            origin: Point {
                x: clamp_axis(self.origin.x, 0, screen.width - self.size.width),
                y: clamp_axis(self.origin.y, 0, screen.height - self.size.height),
            },
            size: self.size,
        }
    }
}

/// Cumulative pointer movement since the gesture anchor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub dx: f32,
    pub dy: f32,
}

impl Delta {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn between(from: PointerPos, to: PointerPos) -> Self {
        Self {
            dx: to.x - from.x,
            dy: to.y - from.y,
        }
    }

    /// Chebyshev length, the metric the drag threshold is measured in.
    pub fn max_axis(&self) -> f32 {
        self.dx.abs().max(self.dy.abs())
    }
}

/// Clamp with the lower bound winning when `min > max`.
pub fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    value.min(max).max(min)
}

/// Display dimensions and density used to turn dp values into pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenMetrics {
    pub width: i32,
    pub height: i32,
    pub density: f32,
}

impl ScreenMetrics {
    pub fn new(width: i32, height: i32, density: f32) -> Self {
        Self {
            width,
            height,
            density,
        }
    }

    /// Convert density-independent pixels to device pixels.
    pub fn dp(&self, value: f32) -> i32 {
        (value * self.density) as i32
    }

    /// Fraction of the screen width, in device pixels.
    pub fn width_fraction(&self, fraction: f32) -> i32 {
        (self.width as f32 * fraction) as i32
    }

    pub fn height_fraction(&self, fraction: f32) -> i32 {
        (self.height as f32 * fraction) as i32
    }
}

impl Default for ScreenMetrics {
    fn default() -> Self {
        Self::new(1080, 2340, 2.75)
    }
}
