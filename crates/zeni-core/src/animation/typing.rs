//! Three-dot typing indicator

use super::transition::Transition;
use crate::types::Appearance;
use std::time::{Duration, Instant};
use tracing::trace;

pub const DOT_COUNT: usize = 3;
/// Interval between pulse starts
pub const PULSE_PERIOD: Duration = Duration::from_millis(1200);
/// Offset of the bright phase within a pulse
pub const BRIGHT_PHASE_OFFSET: Duration = Duration::from_millis(600);
pub const DOT_STAGGER: Duration = Duration::from_millis(100);
pub const DOT_FADE: Duration = Duration::from_millis(300);
pub const DIM_ALPHA: f32 = 0.3;
pub const CONTAINER_FADE: Duration = Duration::from_millis(200);

/// Visual state of the typing indicator.
///
/// The indicator does not own a timer. Its owner schedules
/// [`on_pulse`](Self::on_pulse) every [`PULSE_PERIOD`] and
/// [`on_bright`](Self::on_bright) [`BRIGHT_PHASE_OFFSET`] into each pulse,
/// and stops rescheduling once `on_pulse` returns false.
#[derive(Debug, Clone)]
pub struct TypingIndicator {
    visible: bool,
    container: Transition,
    dots: [Transition; DOT_COUNT],
    pulses: u32,
}

impl TypingIndicator {
    pub fn new(now: Instant) -> Self {
        let hidden = Appearance::faded(0.0);
        Self {
            visible: false,
            container: Transition::settled(hidden, now),
            dots: [Transition::settled(Appearance::OPAQUE, now); DOT_COUNT],
            pulses: 0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Fade in. Returns false if already visible.
    pub fn show(&mut self, now: Instant) -> bool {
        if self.visible {
            return false;
        }
        self.visible = true;
        self.pulses = 0;
        self.container = Transition::new(
            Appearance::faded(0.0),
            Appearance::OPAQUE,
            now,
            CONTAINER_FADE,
        );
        self.dots = [Transition::settled(Appearance::OPAQUE, now); DOT_COUNT];
        true
    }

    /// Fade out. Visibility flips immediately so a pending pulse will stop.
    pub fn hide(&mut self, now: Instant) -> bool {
        if !self.visible {
            return false;
        }
        self.visible = false;
        self.container = Transition::new(
            self.container.sample(now),
            Appearance::faded(0.0),
            now,
            CONTAINER_FADE,
        );
        true
    }

    /// Hide without a fade, used when the panel is torn down.
    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    /// Dim phase of one pulse. Returns whether the pulse should repeat.
    pub fn on_pulse(&mut self, now: Instant) -> bool {
        if !self.visible {
            trace!("Typing indicator hidden, pulse stops");
            return false;
        }
        self.pulses += 1;
        self.animate_dots(now, Appearance::faded(DIM_ALPHA));
        true
    }

    /// Bright phase of the current pulse.
    pub fn on_bright(&mut self, now: Instant) {
        if self.visible {
            self.animate_dots(now, Appearance::OPAQUE);
        }
    }

    fn animate_dots(&mut self, now: Instant, to: Appearance) {
        for (i, dot) in self.dots.iter_mut().enumerate() {
            *dot = Transition::new(dot.sample(now), to, now, DOT_FADE)
                .with_delay(DOT_STAGGER * i as u32);
        }
    }

    pub fn pulse_count(&self) -> u32 {
        self.pulses
    }

    pub fn container_alpha(&self, now: Instant) -> f32 {
        self.container.sample(now).alpha
    }

    pub fn dot_alphas(&self, now: Instant) -> [f32; DOT_COUNT] {
        let mut out = [0.0; DOT_COUNT];
        for (slot, dot) in out.iter_mut().zip(self.dots.iter()) {
            *slot = dot.sample(now).alpha;
        }
        out
    }
}
