//! Timers and visual transitions
//!
//! Everything here is driven by an explicit `now`; there are no threads and
//! no sleeps. The overlay controller owns one scheduler and feeds it from
//! its `pump`.

mod scheduler;
mod transition;
pub mod typing;

pub use scheduler::{AnimationScheduler, TaskId};
pub use transition::{Easing, Transition};
pub use typing::TypingIndicator;
