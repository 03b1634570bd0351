//! Visibility/expansion state machine
//!
//! Pure transitions only. The controller decides what a [`Step`] means for
//! surfaces and animations, and commits the new machine only after the
//! compositor side of the step succeeded.
//!
//! ```text
//!                 tap                      submit
//!   Collapsed ─────────► VisibleCompact ─────────► VisibleExpanded
//!       ▲                    │      ▲                   │
//!       │ close              │ min  │ tap               │ min
//!       │                    ▼      │                   ▼
//!       └──────────────── PanelHidden ◄─────────────────┘
//! ```

use crate::config::TapHidePolicy;
use crate::types::WidgetState;

/// User-level lifecycle requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    TriggerTap,
    Submit,
    Minimize,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideKind {
    /// Conversation and expansion are kept
    Minimize,
    /// Conversation is dropped and expansion reset
    Close,
}

/// What the controller must do for an accepted event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Event not meaningful in the current state
    Ignored,
    /// Accepted, nothing to animate
    Stay,
    /// Attach the panel and play the show animation
    Show { expanded: bool },
    /// Reveal the conversation list
    Expand,
    /// Play the tear-down animation and detach the panel
    Hide(HideKind),
    /// Panel already detached; drop the retained conversation
    Discard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetMachine {
    state: WidgetState,
    expanded: bool,
}

impl WidgetMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn apply(&mut self, event: LifecycleEvent, policy: TapHidePolicy) -> Step {
        use LifecycleEvent::*;
        use WidgetState::*;

        match (self.state, event) {
            (Collapsed, TriggerTap) | (PanelHidden, TriggerTap) => {
                self.state = self.visible_state();
                Step::Show {
                    expanded: self.expanded,
                }
            }
            (PanelVisibleCompact | PanelVisibleExpanded, TriggerTap) => match policy {
                TapHidePolicy::Close => self.hide(HideKind::Close),
                TapHidePolicy::Minimize => self.hide(HideKind::Minimize),
            },

            (PanelVisibleCompact, Submit) => {
                self.expanded = true;
                self.state = PanelVisibleExpanded;
                Step::Expand
            }
            (PanelVisibleExpanded, Submit) => Step::Stay,

            (PanelVisibleCompact | PanelVisibleExpanded, Minimize) => self.hide(HideKind::Minimize),
            (PanelVisibleCompact | PanelVisibleExpanded, Close) => self.hide(HideKind::Close),
            (PanelHidden, Close) => {
                self.reset();
                Step::Discard
            }

            (Collapsed | PanelHidden, Submit | Minimize) | (Collapsed, Close) => Step::Ignored,
        }
    }

    fn visible_state(&self) -> WidgetState {
        if self.expanded {
            WidgetState::PanelVisibleExpanded
        } else {
            WidgetState::PanelVisibleCompact
        }
    }

    fn hide(&mut self, kind: HideKind) -> Step {
        match kind {
            HideKind::Minimize => self.state = WidgetState::PanelHidden,
            HideKind::Close => self.reset(),
        }
        Step::Hide(kind)
    }

    fn reset(&mut self) {
        self.state = WidgetState::Collapsed;
        self.expanded = false;
    }
}
