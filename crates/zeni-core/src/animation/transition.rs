use crate::types::Appearance;
use std::f32::consts::PI;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Slow start and end, the platform default for view animations
    AccelerateDecelerate,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
        }
    }
}

/// A timed interpolation between two appearances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Appearance,
    pub to: Appearance,
    pub started: Instant,
    pub delay: Duration,
    pub duration: Duration,
    pub easing: Easing,
}

impl Transition {
    pub fn new(from: Appearance, to: Appearance, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            delay: Duration::ZERO,
            duration,
            easing: Easing::AccelerateDecelerate,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// A transition that is already at `to`.
    pub fn settled(to: Appearance, now: Instant) -> Self {
        Self::new(to, to, now, Duration::ZERO)
    }

    pub fn ends_at(&self) -> Instant {
        self.started + self.delay + self.duration
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now >= self.ends_at()
    }

    pub fn sample(&self, now: Instant) -> Appearance {
        let begin = self.started + self.delay;
        if now <= begin {
            return self.from;
        }
        if self.duration.is_zero() || now >= self.ends_at() {
            return self.to;
        }
        let t = (now - begin).as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(self.to, self.easing.apply(t))
    }
}
