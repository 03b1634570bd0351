//! Overlay window controller
//!
//! Owns the trigger and panel surfaces, routes pointer gestures to them,
//! drives the lifecycle state machine and orchestrates chat requests. All
//! methods run on the UI thread and take the current instant explicitly;
//! the host calls [`OverlayController::pump`] regularly to deliver network
//! completions and fire due timers.

use super::compositor::Compositor;
use super::layout::{PanelGeometry, ResizeBounds};
use super::state::{HideKind, LifecycleEvent, Step, WidgetMachine};
use crate::animation::typing::{BRIGHT_PHASE_OFFSET, PULSE_PERIOD};
use crate::animation::{AnimationScheduler, Easing, Transition, TypingIndicator};
use crate::config::WidgetConfig;
use crate::dispatch::{ui_channel, ChatBackend, RequestDispatcher, UiInbox, UiPoster};
use crate::error::{Result, SurfaceError, TransportError};
use crate::gesture::{DragUpdate, GestureBinding, GestureResult, GestureTracker};
use crate::handoff::HostApp;
use crate::platform::{WidgetHandle, WidgetToken};
use crate::store::{ConversationStore, Epoch};
use crate::types::{
    Appearance, Frame, Message, PointerPos, ScreenMetrics, SessionId, Size, SurfaceKind,
    WidgetState,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, error, info, trace, warn};

pub const TRIGGER_IDLE_ALPHA: f32 = 0.15;
pub const TRIGGER_PRESSED_ALPHA: f32 = 0.5;
pub const TRIGGER_DRAGGING_ALPHA: f32 = 0.7;
const TRIGGER_PRESS_FADE: Duration = Duration::from_millis(150);
const TRIGGER_RELEASE_FADE: Duration = Duration::from_millis(300);

const SHOW_DURATION: Duration = Duration::from_millis(250);
const TEARDOWN_DURATION: Duration = Duration::from_millis(200);
const EXPAND_DURATION: Duration = Duration::from_millis(250);
const FOCUS_DELAY: Duration = Duration::from_millis(200);
const SCROLL_DELAY: Duration = Duration::from_millis(100);

pub const NOTICE_MINIMIZED: &str = "Chat minimized";
pub const NOTICE_HANDOFF: &str = "Opening in app...";
pub const NOTICE_HANDOFF_FAILED: &str = "Error opening app";
pub const NOTICE_EMPTY_INPUT: &str = "Type something first";

/// Results posted back from the dispatcher worker
#[derive(Debug)]
pub enum Completion {
    Reply {
        epoch: Epoch,
        result: std::result::Result<String, TransportError>,
    },
    Probe(std::result::Result<String, TransportError>),
    RemoteCleared(std::result::Result<(), TransportError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerTask {
    TypingPulse,
    TypingBright,
    FocusInput,
    ScrollToLatest,
    FinishShow,
    FinishTeardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelPhase {
    Showing,
    TearingDown(HideKind),
}

fn panel_hidden_look() -> Appearance {
    Appearance::new(0.0, 0.9, 0.9)
}

fn list_collapsed_look() -> Appearance {
    Appearance::new(0.0, 1.0, 0.8)
}

struct TriggerSurface {
    frame: Frame,
    attached: bool,
    look: Transition,
}

struct PanelSurface {
    geometry: PanelGeometry,
    attached: bool,
    look: Transition,
    list_look: Transition,
    phase: Option<PanelPhase>,
}

pub struct OverlayController<C: Compositor, H: HostApp> {
    config: WidgetConfig,
    screen: ScreenMetrics,
    bounds: ResizeBounds,
    compositor: C,
    host: H,
    dispatcher: RequestDispatcher,
    poster: UiPoster<Completion>,
    inbox: UiInbox<Completion>,
    machine: WidgetMachine,
    store: ConversationStore,
    trigger: TriggerSurface,
    panel: PanelSurface,
    trigger_gesture: GestureTracker,
    header_gesture: GestureTracker,
    resize_gesture: GestureTracker,
    timers: AnimationScheduler<TimerTask>,
    typing: TypingIndicator,
    in_flight: usize,
    input: String,
    token: Option<Arc<WidgetToken>>,
}

impl<C: Compositor, H: HostApp> OverlayController<C, H> {
    /// Build a controller. Nothing is attached until [`start`](Self::start).
    pub fn new(
        config: WidgetConfig,
        backend: Arc<dyn ChatBackend>,
        compositor: C,
        host: H,
        runtime: Handle,
        now: Instant,
    ) -> Self {
        let dispatcher = RequestDispatcher::spawn(
            backend,
            config.chat_budget,
            config.probe_budget,
            runtime,
        );
        Self::with_dispatcher(config, dispatcher, compositor, host, now)
    }

    pub fn with_dispatcher(
        config: WidgetConfig,
        dispatcher: RequestDispatcher,
        compositor: C,
        host: H,
        now: Instant,
    ) -> Self {
        let screen = config.screen;
        let layout = &config.layout;
        let trigger_frame = Frame::new(
            layout.trigger_origin,
            Size::square(screen.dp(layout.trigger_size_dp)),
        )
        .clamped_to(&screen);
        let bounds = ResizeBounds::new(&screen, layout);
        let geometry = PanelGeometry::from_layout(&screen, layout);
        let threshold = config.drag_threshold;
        let (poster, inbox) = ui_channel();
        let token = Arc::new(WidgetToken::new(dispatcher.session_id().clone()));

        Self {
            bounds,
            trigger: TriggerSurface {
                frame: trigger_frame,
                attached: false,
                look: Transition::settled(Appearance::faded(TRIGGER_IDLE_ALPHA), now),
            },
            panel: PanelSurface {
                geometry,
                attached: false,
                look: Transition::settled(panel_hidden_look(), now),
                list_look: Transition::settled(list_collapsed_look(), now),
                phase: None,
            },
            trigger_gesture: GestureTracker::new(GestureBinding::TriggerMove, threshold),
            header_gesture: GestureTracker::new(GestureBinding::HeaderMove, threshold),
            resize_gesture: GestureTracker::new(GestureBinding::PanelResize, threshold),
            screen,
            config,
            compositor,
            host,
            dispatcher,
            poster,
            inbox,
            machine: WidgetMachine::new(),
            store: ConversationStore::new(),
            timers: AnimationScheduler::new(),
            typing: TypingIndicator::new(now),
            in_flight: 0,
            input: String::new(),
            token: Some(token),
        }
    }

    /// Attach the trigger and probe the backend.
    pub fn start(&mut self, now: Instant) -> Result<()> {
        if self.trigger.attached {
            return Ok(());
        }
        self.compositor
            .attach(SurfaceKind::Trigger, self.trigger.frame)
            .map_err(|e| {
                error!("Failed to attach trigger: {}", e);
                e
            })?;
        self.trigger.attached = true;
        self.trigger.look = Transition::settled(Appearance::faded(TRIGGER_IDLE_ALPHA), now);
        info!(
            "Overlay started, session {}, trigger at ({}, {})",
            self.dispatcher.session_id(),
            self.trigger.frame.origin.x,
            self.trigger.frame.origin.y
        );

        self.dispatcher.ping().deliver_to(
            self.dispatcher.runtime(),
            self.poster.clone(),
            Completion::Probe,
        );
        Ok(())
    }

    /// Tear everything down without animation.
    pub fn shutdown(&mut self, now: Instant) {
        if self.token.is_none() {
            return;
        }
        info!("Overlay stopping");
        self.timers.cancel_all();
        self.typing.reset(now);
        for tracker in [
            &mut self.trigger_gesture,
            &mut self.header_gesture,
            &mut self.resize_gesture,
        ] {
            tracker.cancel();
        }

        if self.panel.attached {
            self.compositor.set_input_focus(false);
            if let Err(e) = self.compositor.detach(SurfaceKind::Panel) {
                warn!("Failed to detach panel: {}", e);
            }
            self.panel.attached = false;
            self.panel.phase = None;
        }
        if self.trigger.attached {
            if let Err(e) = self.compositor.detach(SurfaceKind::Trigger) {
                warn!("Failed to detach trigger: {}", e);
            }
            self.trigger.attached = false;
        }

        self.dispatcher.shutdown();
        self.inbox.close();
        self.machine = WidgetMachine::new();
        self.in_flight = 0;
        self.token = None;
    }

    /// Deliver finished requests, then run due timers.
    pub fn pump(&mut self, now: Instant) {
        for completion in self.inbox.drain() {
            self.on_completion(completion, now);
        }
        self.catch_up(now);
    }

    /// Run timers that are already due, so input handled at `now` sees
    /// finished transitions as finished even if `pump` lagged behind.
    fn catch_up(&mut self, now: Instant) {
        for task in self.timers.take_due(now) {
            self.run_timer(task, now);
        }
    }

    /// Earliest instant at which [`pump`](Self::pump) has timer work.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    /// Update display metrics, e.g. after rotation. Surfaces are re-clamped.
    pub fn set_screen(&mut self, screen: ScreenMetrics) {
        self.screen = screen;
        self.bounds = ResizeBounds::new(&screen, &self.config.layout);
        self.panel.geometry.width = self.bounds.clamp_width(self.panel.geometry.width);

        let trigger = self.trigger.frame.clamped_to(&screen);
        if trigger != self.trigger.frame {
            self.trigger.frame = trigger;
            self.push_layout(SurfaceKind::Trigger, trigger);
        }
        let panel = self.panel_frame_now().clamped_to(&screen);
        self.panel.geometry.origin = panel.origin;
        if self.panel.attached {
            self.push_layout(SurfaceKind::Panel, panel);
        }
    }

    // -- pointer input ----------------------------------------------------

    pub fn pointer_down(&mut self, binding: GestureBinding, pos: PointerPos, now: Instant) {
        self.catch_up(now);
        let Some(anchor) = self.gesture_anchor(binding) else {
            trace!("{:?} pointer-down on detached surface, dropped", binding);
            return;
        };
        if binding == GestureBinding::TriggerMove {
            self.fade_trigger(TRIGGER_PRESSED_ALPHA, TRIGGER_PRESS_FADE, now);
        }
        self.tracker_mut(binding).on_pointer_down(pos, anchor);
    }

    pub fn pointer_move(&mut self, binding: GestureBinding, pos: PointerPos, now: Instant) {
        let Some(update) = self.tracker_mut(binding).on_pointer_move(pos) else {
            return;
        };
        match binding {
            GestureBinding::TriggerMove => self.drag_trigger(update, now),
            GestureBinding::HeaderMove => self.drag_panel(update),
            GestureBinding::PanelResize => self.resize_panel(update),
        }
    }

    pub fn pointer_up(&mut self, binding: GestureBinding, pos: PointerPos, now: Instant) {
        let Some(result) = self.tracker_mut(binding).on_pointer_up(pos) else {
            return;
        };
        if binding != GestureBinding::TriggerMove {
            return;
        }
        self.fade_trigger(TRIGGER_IDLE_ALPHA, TRIGGER_RELEASE_FADE, now);
        match result {
            GestureResult::Tap => {
                self.toggle(now);
            }
            GestureResult::DragEnd(delta) => {
                debug!("Trigger drag ended ({:.0}, {:.0})", delta.dx, delta.dy);
            }
        }
    }

    fn tracker_mut(&mut self, binding: GestureBinding) -> &mut GestureTracker {
        match binding {
            GestureBinding::TriggerMove => &mut self.trigger_gesture,
            GestureBinding::HeaderMove => &mut self.header_gesture,
            GestureBinding::PanelResize => &mut self.resize_gesture,
        }
    }

    fn gesture_anchor(&self, binding: GestureBinding) -> Option<Frame> {
        match binding {
            GestureBinding::TriggerMove => self.trigger.attached.then_some(self.trigger.frame),
            GestureBinding::HeaderMove => self.panel_interactive().then(|| self.panel_frame_now()),
            GestureBinding::PanelResize => self
                .panel_interactive()
                .then(|| self.panel.geometry.resize_anchor()),
        }
    }

    fn drag_trigger(&mut self, update: DragUpdate, now: Instant) {
        if !self.trigger.attached {
            return;
        }
        if update.started {
            self.trigger.look =
                Transition::settled(Appearance::faded(TRIGGER_DRAGGING_ALPHA), now);
        }
        let frame =
            Frame::new(update.moved_origin(), self.trigger.frame.size).clamped_to(&self.screen);
        self.trigger.frame = frame;
        self.push_layout(SurfaceKind::Trigger, frame);
    }

    fn drag_panel(&mut self, update: DragUpdate) {
        if !self.panel_interactive() {
            trace!("Header drag on detached panel, dropped");
            return;
        }
        let size = self.panel_frame_now().size;
        let frame = Frame::new(update.moved_origin(), size).clamped_to(&self.screen);
        self.panel.geometry.origin = frame.origin;
        self.push_layout(SurfaceKind::Panel, frame);
    }

    fn resize_panel(&mut self, update: DragUpdate) {
        if !self.panel_interactive() {
            trace!("Resize on detached panel, dropped");
            return;
        }
        let wanted = update.resized();
        self.panel.geometry.width = self.bounds.clamp_width(wanted.width);
        if self.machine.is_expanded() {
            self.panel.geometry.list_height = self.bounds.clamp_height(wanted.height);
        }
        let frame = self.panel_frame_now().clamped_to(&self.screen);
        self.panel.geometry.origin = frame.origin;
        self.push_layout(SurfaceKind::Panel, frame);
    }

    fn fade_trigger(&mut self, alpha: f32, duration: Duration, now: Instant) {
        let from = self.trigger.look.sample(now);
        self.trigger.look = Transition::new(from, Appearance::faded(alpha), now, duration)
            .with_easing(Easing::Linear);
        self.compositor.invalidate(SurfaceKind::Trigger);
    }

    /// Gesture deltas for a surface that went away are dropped, not raised.
    fn push_layout(&mut self, surface: SurfaceKind, frame: Frame) {
        if let Err(e) = self.compositor.update_layout(surface, frame) {
            warn!("Layout update for {} dropped: {}", surface, e);
        }
    }

    // -- lifecycle --------------------------------------------------------

    /// Trigger tap: show the panel, or hide it per the tap policy.
    pub fn toggle(&mut self, now: Instant) -> bool {
        self.lifecycle(LifecycleEvent::TriggerTap, now)
    }

    pub fn minimize(&mut self, now: Instant) -> bool {
        self.lifecycle(LifecycleEvent::Minimize, now)
    }

    pub fn close(&mut self, now: Instant) -> bool {
        self.lifecycle(LifecycleEvent::Close, now)
    }

    /// Give the conversation to the host app, then minimize.
    pub fn hand_off(&mut self, now: Instant) -> bool {
        self.catch_up(now);
        if self.panel.phase.is_some() || !self.machine.state().is_panel_visible() {
            return false;
        }
        let payload = self.store.export();
        let count = payload.len();
        match self.host.open_conversation(payload) {
            Ok(()) => {
                info!("Handed {} messages to host app", count);
                self.lifecycle(LifecycleEvent::Minimize, now);
                self.compositor.show_notice(NOTICE_HANDOFF);
                true
            }
            Err(e) => {
                error!("Hand-off failed: {}", e);
                self.compositor.show_notice(NOTICE_HANDOFF_FAILED);
                false
            }
        }
    }

    fn lifecycle(&mut self, event: LifecycleEvent, now: Instant) -> bool {
        self.catch_up(now);
        if let Some(phase) = self.panel.phase {
            debug!("{:?} ignored, panel transition {:?} in flight", event, phase);
            return false;
        }
        if self.token.is_none() {
            return false;
        }

        let mut next = self.machine;
        let step = next.apply(event, self.config.tap_hide_policy);
        trace!("{:?} in {:?} -> {:?}", event, self.machine.state(), step);
        match step {
            Step::Ignored => return false,
            Step::Stay => {}
            Step::Show { expanded } => {
                if let Err(e) = self.begin_show(expanded, now) {
                    error!("Failed to show panel: {}", e);
                    return false;
                }
            }
            Step::Expand => self.begin_expand(now),
            Step::Hide(kind) => self.begin_teardown(kind, now),
            Step::Discard => self.discard_conversation(),
        }
        self.machine = next;
        true
    }

    fn begin_show(
        &mut self,
        expanded: bool,
        now: Instant,
    ) -> std::result::Result<(), SurfaceError> {
        let frame = self.panel.geometry.frame(expanded).clamped_to(&self.screen);
        self.compositor.attach(SurfaceKind::Panel, frame)?;
        self.panel.geometry.origin = frame.origin;
        self.panel.attached = true;
        self.panel.phase = Some(PanelPhase::Showing);
        self.panel.look =
            Transition::new(panel_hidden_look(), Appearance::OPAQUE, now, SHOW_DURATION);
        self.panel.list_look = if expanded {
            Transition::settled(Appearance::OPAQUE, now)
        } else {
            Transition::settled(list_collapsed_look(), now)
        };
        self.timers.schedule_after(now, SHOW_DURATION, TimerTask::FinishShow);
        self.timers.schedule_after(now, FOCUS_DELAY, TimerTask::FocusInput);

        if self.in_flight > 0 {
            self.start_typing(now);
        }
        self.compositor.invalidate(SurfaceKind::Panel);
        debug!("Panel shown at ({}, {})", frame.origin.x, frame.origin.y);
        Ok(())
    }

    fn begin_expand(&mut self, now: Instant) {
        self.panel.list_look = Transition::new(
            list_collapsed_look(),
            Appearance::OPAQUE,
            now,
            EXPAND_DURATION,
        );
        let frame = self.panel.geometry.frame(true).clamped_to(&self.screen);
        self.panel.geometry.origin = frame.origin;
        self.push_layout(SurfaceKind::Panel, frame);
        self.compositor.invalidate(SurfaceKind::Panel);
    }

    fn begin_teardown(&mut self, kind: HideKind, now: Instant) {
        // Everything pending belongs to the visible panel.
        self.timers.cancel_all();
        self.typing.reset(now);
        self.header_gesture.cancel();
        self.resize_gesture.cancel();
        self.compositor.set_input_focus(false);

        let from = self.panel.look.sample(now);
        self.panel.look = Transition::new(from, panel_hidden_look(), now, TEARDOWN_DURATION);
        self.panel.phase = Some(PanelPhase::TearingDown(kind));
        self.timers.schedule_after(now, TEARDOWN_DURATION, TimerTask::FinishTeardown);

        match kind {
            HideKind::Minimize => self.compositor.show_notice(NOTICE_MINIMIZED),
            HideKind::Close => {
                self.in_flight = 0;
                self.clear_remote();
            }
        }
        self.compositor.invalidate(SurfaceKind::Panel);
    }

    fn finish_teardown(&mut self, kind: HideKind) {
        if let Err(e) = self.compositor.detach(SurfaceKind::Panel) {
            warn!("Failed to detach panel: {}", e);
        }
        self.panel.attached = false;
        self.panel.phase = None;
        self.input.clear();
        if kind == HideKind::Close {
            self.store.clear();
        }
        debug!("Panel torn down ({:?})", kind);
    }

    fn discard_conversation(&mut self) {
        self.in_flight = 0;
        self.clear_remote();
        self.store.clear();
        self.input.clear();
    }

    fn clear_remote(&mut self) {
        if !self.config.clear_remote_on_close || self.store.is_empty() {
            return;
        }
        self.dispatcher.clear_remote().deliver_to(
            self.dispatcher.runtime(),
            self.poster.clone(),
            Completion::RemoteCleared,
        );
    }

    // -- conversation -----------------------------------------------------

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Submit the input field. Whitespace-only input only raises a notice.
    pub fn submit(&mut self, now: Instant) -> bool {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            self.compositor.show_notice(NOTICE_EMPTY_INPUT);
            return false;
        }
        let sent = self.send_message(&text, now);
        if sent {
            self.input.clear();
        }
        sent
    }

    /// Append `text` as a user message and dispatch it.
    ///
    /// Never blocked by an earlier request; replies land in completion order.
    pub fn send_message(&mut self, text: &str, now: Instant) -> bool {
        self.catch_up(now);
        if matches!(self.panel.phase, Some(PanelPhase::TearingDown(_))) {
            return false;
        }
        if !self.lifecycle_submit(now) {
            debug!("Submit ignored in {:?}", self.machine.state());
            return false;
        }

        self.append(Message::user(text), now);
        self.in_flight += 1;
        self.start_typing(now);

        let epoch = self.store.epoch();
        self.dispatcher.send(text).deliver_to(
            self.dispatcher.runtime(),
            self.poster.clone(),
            move |result| Completion::Reply { epoch, result },
        );
        true
    }

    fn lifecycle_submit(&mut self, now: Instant) -> bool {
        // Submit is accepted during the show animation.
        let mut next = self.machine;
        match next.apply(LifecycleEvent::Submit, self.config.tap_hide_policy) {
            Step::Expand => self.begin_expand(now),
            Step::Stay => {}
            _ => return false,
        }
        self.machine = next;
        true
    }

    fn append(&mut self, message: Message, now: Instant) {
        self.store.append(message);
        let closing = self.panel.phase == Some(PanelPhase::TearingDown(HideKind::Close));
        if self.panel.attached && !closing {
            self.timers.schedule_after(now, SCROLL_DELAY, TimerTask::ScrollToLatest);
            self.compositor.invalidate(SurfaceKind::Panel);
        }
    }

    fn start_typing(&mut self, now: Instant) {
        if self.typing.show(now) {
            // A hide does not dequeue the previous loop's ticks.
            self.timers.cancel_where(|task| {
                matches!(task, TimerTask::TypingPulse | TimerTask::TypingBright)
            });
            self.on_typing_pulse(now);
        }
    }

    fn on_typing_pulse(&mut self, now: Instant) {
        if self.typing.on_pulse(now) {
            self.timers.schedule_after(now, BRIGHT_PHASE_OFFSET, TimerTask::TypingBright);
            self.timers.schedule_after(now, PULSE_PERIOD, TimerTask::TypingPulse);
            self.compositor.invalidate(SurfaceKind::Panel);
        }
    }

    fn on_completion(&mut self, completion: Completion, now: Instant) {
        match completion {
            Completion::Reply { epoch, result } => {
                if epoch != self.store.epoch() {
                    debug!(
                        "Dropping reply from epoch {} (now {})",
                        epoch.0,
                        self.store.epoch().0
                    );
                    return;
                }
                self.in_flight = self.in_flight.saturating_sub(1);
                let message = match result {
                    Ok(reply) => Message::assistant(reply),
                    Err(e) => Message::error(&e),
                };
                self.append(message, now);
                if self.in_flight == 0 && self.typing.hide(now) {
                    self.compositor.invalidate(SurfaceKind::Panel);
                }
            }
            Completion::Probe(Ok(status)) => info!("Backend reachable, status {}", status),
            Completion::Probe(Err(e)) => warn!("Backend unreachable: {}", e),
            Completion::RemoteCleared(Ok(())) => debug!("Remote session history cleared"),
            Completion::RemoteCleared(Err(e)) => warn!("Failed to clear remote history: {}", e),
        }
    }

    fn run_timer(&mut self, task: TimerTask, now: Instant) {
        match task {
            TimerTask::TypingPulse => self.on_typing_pulse(now),
            TimerTask::TypingBright => {
                self.typing.on_bright(now);
                self.compositor.invalidate(SurfaceKind::Panel);
            }
            TimerTask::FocusInput => {
                if self.panel_interactive() {
                    self.compositor.set_input_focus(true);
                }
            }
            TimerTask::ScrollToLatest => {
                if self.panel.attached && !self.store.is_empty() {
                    self.compositor.scroll_to_latest(self.store.len() - 1);
                }
            }
            TimerTask::FinishShow => {
                if self.panel.phase == Some(PanelPhase::Showing) {
                    self.panel.phase = None;
                }
            }
            TimerTask::FinishTeardown => {
                if let Some(PanelPhase::TearingDown(kind)) = self.panel.phase {
                    self.finish_teardown(kind);
                }
            }
        }
    }

    // -- queries ----------------------------------------------------------

    fn panel_interactive(&self) -> bool {
        self.panel.attached && !matches!(self.panel.phase, Some(PanelPhase::TearingDown(_)))
    }

    fn panel_frame_now(&self) -> Frame {
        self.panel.geometry.frame(self.machine.is_expanded())
    }

    pub fn state(&self) -> WidgetState {
        self.machine.state()
    }

    pub fn is_expanded(&self) -> bool {
        self.machine.is_expanded()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Requests whose reply has not been appended yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_transitioning(&self) -> bool {
        self.panel.phase.is_some()
    }

    pub fn trigger_frame(&self) -> Option<Frame> {
        self.trigger.attached.then_some(self.trigger.frame)
    }

    pub fn panel_frame(&self) -> Option<Frame> {
        self.panel.attached.then(|| self.panel_frame_now())
    }

    /// Alpha/scale of `surface` at `now`, `None` while detached.
    pub fn appearance(&self, surface: SurfaceKind, now: Instant) -> Option<Appearance> {
        match surface {
            SurfaceKind::Trigger => self.trigger.attached.then(|| self.trigger.look.sample(now)),
            SurfaceKind::Panel => self.panel.attached.then(|| self.panel.look.sample(now)),
        }
    }

    /// Appearance of the conversation list inside the panel.
    pub fn list_appearance(&self, now: Instant) -> Appearance {
        self.panel.list_look.sample(now)
    }

    pub fn typing(&self) -> &TypingIndicator {
        &self.typing
    }

    pub fn session_id(&self) -> &SessionId {
        self.dispatcher.session_id()
    }

    pub fn handle(&self) -> WidgetHandle {
        match &self.token {
            Some(token) => WidgetHandle::new(token),
            None => WidgetHandle::dead(),
        }
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TapHidePolicy;
    use crate::error::PlatformError;
    use crate::handoff::{HandoffPayload, MockHostApp};
    use crate::overlay::compositor::recording::{CompositorCall, RecordingCompositor};
    use crate::overlay::MockCompositor;
    use crate::types::{Origin, Point};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that answers from a script, echoing when the script is empty
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<std::result::Result<String, TransportError>>>,
        delay_ms: u64,
        clears: AtomicUsize,
    }

    impl ScriptedBackend {
        fn replying(replies: Vec<std::result::Result<String, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            })
        }

        fn slow(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                delay_ms,
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send_message(
            &self,
            _session: &SessionId,
            text: &str,
        ) -> std::result::Result<String, TransportError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            let scripted = self.replies.lock().pop_front();
            scripted.unwrap_or_else(|| Ok(format!("echo: {}", text)))
        }

        async fn ping(&self) -> std::result::Result<String, TransportError> {
            Ok("ok".into())
        }

        async fn clear(&self, _session: &SessionId) -> std::result::Result<(), TransportError> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        payloads: Vec<HandoffPayload>,
    }

    impl HostApp for RecordingHost {
        fn open_conversation(&mut self, payload: HandoffPayload) -> std::result::Result<(), PlatformError> {
            self.payloads.push(payload);
            Ok(())
        }
    }

    type TestController<H = RecordingHost> = OverlayController<RecordingCompositor, H>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn config(screen: ScreenMetrics) -> WidgetConfig {
        WidgetConfig {
            screen,
            ..Default::default()
        }
    }

    fn controller_with<H: HostApp>(
        config: WidgetConfig,
        backend: Arc<dyn ChatBackend>,
        host: H,
        t0: Instant,
    ) -> OverlayController<RecordingCompositor, H> {
        let mut ctl = OverlayController::new(
            config,
            backend,
            RecordingCompositor::default(),
            host,
            Handle::current(),
            t0,
        );
        ctl.start(t0).unwrap();
        ctl
    }

    fn controller(backend: Arc<dyn ChatBackend>, t0: Instant) -> TestController {
        controller_with(
            config(ScreenMetrics::new(1080, 2340, 2.75)),
            backend,
            RecordingHost::default(),
            t0,
        )
    }

    fn tap_trigger<H: HostApp>(ctl: &mut TestController<H>, now: Instant) {
        let frame = ctl.trigger_frame().expect("trigger attached");
        let pos = PointerPos::new(frame.origin.x as f32 + 5.0, frame.origin.y as f32 + 5.0);
        ctl.pointer_down(GestureBinding::TriggerMove, pos, now);
        ctl.pointer_up(GestureBinding::TriggerMove, pos, now);
    }

    /// Pump with real delays until `done` holds, so worker results can land.
    async fn pump_until<H: HostApp>(
        ctl: &mut TestController<H>,
        now: Instant,
        done: impl Fn(&TestController<H>) -> bool,
    ) {
        for _ in 0..200 {
            ctl.pump(now);
            if done(ctl) {
                return;
            }
            tokio::time::sleep(ms(5)).await;
        }
        panic!("condition not reached");
    }

    fn texts<H: HostApp>(ctl: &TestController<H>) -> Vec<String> {
        ctl.store()
            .messages()
            .iter()
            .map(|m| m.text().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_start_attaches_trigger_at_initial_position() {
        let t0 = Instant::now();
        let ctl = controller(ScriptedBackend::slow(0), t0);

        let frame = ctl.trigger_frame().unwrap();
        assert_eq!(frame.origin, Point::new(50, 400));
        assert_eq!(frame.size, Size::square(110));
        assert_eq!(ctl.state(), WidgetState::Collapsed);
        assert_eq!(
            ctl.appearance(SurfaceKind::Trigger, t0).map(|a| a.alpha),
            Some(TRIGGER_IDLE_ALPHA)
        );
        assert_eq!(ctl.appearance(SurfaceKind::Panel, t0), None);
        assert!(ctl.session_id().as_str().starts_with("overlay_"));
    }

    #[tokio::test]
    async fn test_start_fails_when_trigger_is_rejected() {
        let mut compositor = MockCompositor::new();
        compositor
            .expect_attach()
            .withf(|surface, _| *surface == SurfaceKind::Trigger)
            .times(1)
            .returning(|surface, _| Err(SurfaceError::AttachRejected(surface.to_string())));

        let t0 = Instant::now();
        let mut ctl = OverlayController::new(
            WidgetConfig::default(),
            ScriptedBackend::slow(0),
            compositor,
            RecordingHost::default(),
            Handle::current(),
            t0,
        );
        let err = ctl.start(t0).unwrap_err();
        assert!(matches!(err, crate::Error::Surface(SurfaceError::AttachRejected(_))));
        assert_eq!(ctl.trigger_frame(), None);
    }

    #[tokio::test]
    async fn test_hello_gets_reply() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::replying(vec![Ok("Hi there".into())]), t0);

        tap_trigger(&mut ctl, t0);
        assert_eq!(ctl.state(), WidgetState::PanelVisibleCompact);
        assert!(ctl.compositor().is_attached(SurfaceKind::Panel));

        ctl.set_input("  Hello ");
        assert!(ctl.submit(t0 + ms(300)));
        assert_eq!(ctl.input(), "");
        assert_eq!(ctl.state(), WidgetState::PanelVisibleExpanded);
        assert!(ctl.typing().is_visible());
        assert_eq!(texts(&ctl), vec!["Hello"]);

        pump_until(&mut ctl, t0 + ms(300), |c| c.store().len() == 2).await;

        assert_eq!(texts(&ctl), vec!["Hello", "Hi there"]);
        let origins: Vec<_> = ctl.store().messages().iter().map(|m| m.origin()).collect();
        assert_eq!(origins, vec![Origin::User, Origin::Assistant]);
        assert!(!ctl.typing().is_visible());
        assert_eq!(ctl.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_offline_backend_appends_inline_error() {
        let t0 = Instant::now();
        let backend = ScriptedBackend::replying(vec![Err(TransportError::ConnectionFailed(
            "connection refused".into(),
        ))]);
        let mut ctl = controller(backend, t0);

        tap_trigger(&mut ctl, t0);
        ctl.set_input("Hello");
        ctl.submit(t0);
        pump_until(&mut ctl, t0, |c| c.store().len() == 2).await;

        let reply = ctl.store().last().unwrap();
        assert_eq!(reply.origin(), Origin::Assistant);
        assert_eq!(reply.text(), "⚠️ Error: Connection failed: connection refused");
        assert!(!ctl.typing().is_visible());
    }

    #[tokio::test]
    async fn test_trigger_drag_is_clamped_to_screen() {
        let t0 = Instant::now();
        let mut ctl = controller_with(
            config(ScreenMetrics::new(360, 640, 1.0)),
            ScriptedBackend::slow(0),
            RecordingHost::default(),
            t0,
        );
        assert_eq!(ctl.trigger_frame().unwrap().size, Size::square(40));

        let start = PointerPos::new(60.0, 410.0);
        ctl.pointer_down(GestureBinding::TriggerMove, start, t0);
        ctl.pointer_move(GestureBinding::TriggerMove, PointerPos::new(560.0, 410.0), t0 + ms(10));
        assert_eq!(
            ctl.appearance(SurfaceKind::Trigger, t0 + ms(10)).map(|a| a.alpha),
            Some(TRIGGER_DRAGGING_ALPHA)
        );
        ctl.pointer_up(GestureBinding::TriggerMove, PointerPos::new(560.0, 410.0), t0 + ms(20));

        assert_eq!(ctl.trigger_frame().unwrap().origin, Point::new(320, 400));
        assert_eq!(
            ctl.compositor().frame(SurfaceKind::Trigger).unwrap().origin,
            Point::new(320, 400)
        );
        // A drag never toggles the panel.
        assert_eq!(ctl.state(), WidgetState::Collapsed);
        assert_eq!(
            ctl.appearance(SurfaceKind::Trigger, t0 + ms(400)).map(|a| a.alpha),
            Some(TRIGGER_IDLE_ALPHA)
        );
    }

    #[tokio::test]
    async fn test_move_within_threshold_is_still_a_tap() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        let frame = ctl.trigger_frame().unwrap();
        let down = PointerPos::new(frame.origin.x as f32 + 5.0, frame.origin.y as f32 + 5.0);
        let edge = PointerPos::new(down.x + 10.0, down.y - 10.0);

        ctl.pointer_down(GestureBinding::TriggerMove, down, t0);
        ctl.pointer_move(GestureBinding::TriggerMove, edge, t0);
        ctl.pointer_up(GestureBinding::TriggerMove, edge, t0);

        assert_eq!(ctl.trigger_frame().unwrap(), frame);
        assert_eq!(ctl.state(), WidgetState::PanelVisibleCompact);
        assert_eq!(
            ctl.compositor()
                .count(|c| matches!(c, CompositorCall::Layout(SurfaceKind::Trigger, _))),
            0
        );
    }

    #[tokio::test]
    async fn test_header_drag_keeps_panel_on_screen() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);

        let down = PointerPos::new(100.0, 200.0);
        ctl.pointer_down(GestureBinding::HeaderMove, down, t0);
        ctl.pointer_move(GestureBinding::HeaderMove, PointerPos::new(-900.0, -900.0), t0);
        assert_eq!(ctl.panel_frame().unwrap().origin, Point::new(0, 0));

        ctl.pointer_move(GestureBinding::HeaderMove, PointerPos::new(5000.0, 9000.0), t0);
        let frame = ctl.panel_frame().unwrap();
        assert_eq!(frame.origin.x, 1080 - frame.size.width);
        assert_eq!(frame.origin.y, 2340 - frame.size.height);
        ctl.pointer_up(GestureBinding::HeaderMove, PointerPos::new(5000.0, 9000.0), t0);
        assert_eq!(ctl.compositor().frame(SurfaceKind::Panel), Some(frame));
    }

    #[tokio::test]
    async fn test_resize_clamps_width_and_expanded_height() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);
        let compact = ctl.panel_frame().unwrap();

        let down = PointerPos::new(900.0, 900.0);
        ctl.pointer_down(GestureBinding::PanelResize, down, t0);
        ctl.pointer_move(GestureBinding::PanelResize, PointerPos::new(-2000.0, 5000.0), t0);
        let frame = ctl.panel_frame().unwrap();
        assert_eq!(frame.size.width, 770);
        // Compact height is not resizable.
        assert_eq!(frame.size.height, compact.size.height);
        ctl.pointer_up(GestureBinding::PanelResize, PointerPos::new(-2000.0, 5000.0), t0);

        ctl.send_message("Hello", t0);
        let chrome = compact.size.height;
        ctl.pointer_down(GestureBinding::PanelResize, down, t0);
        ctl.pointer_move(GestureBinding::PanelResize, PointerPos::new(5000.0, 9000.0), t0);
        let frame = ctl.panel_frame().unwrap();
        assert_eq!(frame.size.width, 1026);
        assert_eq!(frame.size.height, chrome + 1989);

        ctl.pointer_move(GestureBinding::PanelResize, PointerPos::new(900.0, -5000.0), t0);
        assert_eq!(ctl.panel_frame().unwrap().size.height, chrome + 550);
    }

    #[tokio::test]
    async fn test_widening_at_right_edge_stays_on_screen() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);

        ctl.pointer_down(GestureBinding::HeaderMove, PointerPos::new(100.0, 200.0), t0);
        ctl.pointer_move(GestureBinding::HeaderMove, PointerPos::new(5000.0, 200.0), t0);
        ctl.pointer_up(GestureBinding::HeaderMove, PointerPos::new(5000.0, 200.0), t0);
        let docked = ctl.panel_frame().unwrap();
        assert_eq!(docked.origin.x + docked.size.width, 1080);

        let down = PointerPos::new(1000.0, 900.0);
        ctl.pointer_down(GestureBinding::PanelResize, down, t0);
        ctl.pointer_move(GestureBinding::PanelResize, PointerPos::new(3000.0, 900.0), t0);
        let frame = ctl.panel_frame().unwrap();
        assert_eq!(frame.size.width, 1026);
        assert_eq!(frame.origin, Point::new(54, docked.origin.y));
        assert_eq!(ctl.compositor().frame(SurfaceKind::Panel), Some(frame));
    }

    #[tokio::test]
    async fn test_screen_rotation_reclamps_surfaces() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        let trigger = ctl.trigger_frame().unwrap();
        let pos = PointerPos::new(trigger.origin.x as f32 + 5.0, trigger.origin.y as f32 + 5.0);
        ctl.pointer_down(GestureBinding::TriggerMove, pos, t0);
        ctl.pointer_move(GestureBinding::TriggerMove, PointerPos::new(pos.x, 9000.0), t0);
        ctl.pointer_up(GestureBinding::TriggerMove, PointerPos::new(pos.x, 9000.0), t0);
        assert_eq!(ctl.trigger_frame().unwrap().origin.y, 2340 - 110);

        tap_trigger(&mut ctl, t0 + ms(10));
        ctl.set_screen(ScreenMetrics::new(2340, 1080, 2.75));

        let trigger = ctl.trigger_frame().unwrap();
        assert_eq!(trigger.origin.y, 1080 - 110);
        assert_eq!(ctl.compositor().frame(SurfaceKind::Trigger), Some(trigger));

        let panel = ctl.panel_frame().unwrap();
        assert!(panel.origin.y + panel.size.height <= 1080);
        assert!(panel.size.width <= (2340.0 * 0.95) as i32);
        assert_eq!(ctl.compositor().frame(SurfaceKind::Panel), Some(panel));
    }

    #[tokio::test]
    async fn test_first_submit_grows_conversation_list() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);
        assert_eq!(ctl.list_appearance(t0).alpha, 0.0);

        let t1 = t0 + ms(300);
        ctl.send_message("Hello", t1);
        assert_eq!(ctl.list_appearance(t1).scale_y, 0.8);
        let mid = ctl.list_appearance(t1 + ms(125));
        assert!(mid.alpha > 0.0 && mid.alpha < 1.0);
        assert_eq!(ctl.list_appearance(t1 + EXPAND_DURATION), Appearance::OPAQUE);

        // Restoring an expanded panel shows the list at once.
        ctl.minimize(t1 + ms(500));
        ctl.pump(t1 + ms(700));
        tap_trigger(&mut ctl, t1 + ms(800));
        assert_eq!(ctl.list_appearance(t1 + ms(800)), Appearance::OPAQUE);
    }

    #[tokio::test]
    async fn test_trigger_press_fades_linearly() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        let frame = ctl.trigger_frame().unwrap();
        let pos = PointerPos::new(frame.origin.x as f32 + 5.0, frame.origin.y as f32 + 5.0);
        ctl.pointer_down(GestureBinding::TriggerMove, pos, t0);

        let half = ctl.appearance(SurfaceKind::Trigger, t0 + ms(75)).unwrap().alpha;
        assert!((half - 0.325).abs() < 1e-3);
        assert_eq!(
            ctl.appearance(SurfaceKind::Trigger, t0 + ms(150)).map(|a| a.alpha),
            Some(TRIGGER_PRESSED_ALPHA)
        );
    }

    #[tokio::test]
    async fn test_minimize_keeps_conversation_and_expansion() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);
        ctl.send_message("Hello", t0);
        pump_until(&mut ctl, t0, |c| c.store().len() == 2).await;
        let before = texts(&ctl);

        let t1 = t0 + ms(1000);
        ctl.set_input("draft");
        assert!(ctl.minimize(t1));
        assert_eq!(ctl.state(), WidgetState::PanelHidden);
        assert!(ctl.compositor().is_attached(SurfaceKind::Panel));

        ctl.pump(t1 + TEARDOWN_DURATION);
        assert!(!ctl.compositor().is_attached(SurfaceKind::Panel));
        assert_eq!(texts(&ctl), before);
        assert!(ctl.is_expanded());
        assert_eq!(ctl.input(), "");
        assert_eq!(ctl.compositor().notices(), vec![NOTICE_MINIMIZED]);

        let t2 = t1 + ms(1000);
        tap_trigger(&mut ctl, t2);
        assert_eq!(ctl.state(), WidgetState::PanelVisibleExpanded);
        assert_eq!(texts(&ctl), before);
    }

    #[tokio::test]
    async fn test_close_clears_conversation() {
        let t0 = Instant::now();
        let backend = ScriptedBackend::slow(0);
        let mut ctl = controller(backend.clone(), t0);
        tap_trigger(&mut ctl, t0);
        ctl.send_message("Hello", t0);
        pump_until(&mut ctl, t0, |c| c.store().len() == 2).await;

        let t1 = t0 + ms(1000);
        assert!(ctl.close(t1));
        ctl.pump(t1 + TEARDOWN_DURATION);

        assert_eq!(ctl.state(), WidgetState::Collapsed);
        assert!(ctl.store().is_empty());
        assert!(!ctl.is_expanded());
        assert!(!ctl.compositor().is_attached(SurfaceKind::Panel));
        assert!(ctl.compositor().is_attached(SurfaceKind::Trigger));

        // Remote history is dropped too.
        for _ in 0..100 {
            if backend.clears.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(ms(5)).await;
        }
        assert_eq!(backend.clears.load(Ordering::SeqCst), 1);

        tap_trigger(&mut ctl, t1 + ms(500));
        assert_eq!(ctl.state(), WidgetState::PanelVisibleCompact);
    }

    #[tokio::test]
    async fn test_trigger_tap_policy() {
        let t0 = Instant::now();
        let mut ctl = controller_with(
            WidgetConfig {
                tap_hide_policy: TapHidePolicy::Minimize,
                ..config(ScreenMetrics::default())
            },
            ScriptedBackend::slow(0),
            RecordingHost::default(),
            t0,
        );
        tap_trigger(&mut ctl, t0);
        ctl.send_message("Hello", t0);
        tap_trigger(&mut ctl, t0 + ms(500));
        assert_eq!(ctl.state(), WidgetState::PanelHidden);
        assert!(!ctl.store().is_empty());

        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);
        ctl.send_message("Hello", t0);
        tap_trigger(&mut ctl, t0 + ms(500));
        ctl.pump(t0 + ms(700));
        assert_eq!(ctl.state(), WidgetState::Collapsed);
        assert!(ctl.store().is_empty());
    }

    #[tokio::test]
    async fn test_reply_after_close_is_dropped() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(40), t0);
        tap_trigger(&mut ctl, t0);
        ctl.send_message("Hello", t0 + ms(300));
        assert_eq!(ctl.in_flight(), 1);

        ctl.close(t0 + ms(400));
        ctl.pump(t0 + ms(600));
        assert!(ctl.store().is_empty());

        // Let the stale reply arrive, then deliver it.
        tokio::time::sleep(ms(100)).await;
        ctl.pump(t0 + ms(700));
        assert!(ctl.store().is_empty());
        assert_eq!(ctl.in_flight(), 0);
        assert!(!ctl.typing().is_visible());
    }

    #[tokio::test]
    async fn test_lifecycle_requests_ignored_during_transition() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);
        assert!(ctl.is_transitioning());

        assert!(!ctl.toggle(t0 + ms(100)));
        assert!(!ctl.minimize(t0 + ms(100)));
        assert_eq!(ctl.state(), WidgetState::PanelVisibleCompact);

        ctl.pump(t0 + SHOW_DURATION);
        assert!(!ctl.is_transitioning());
        assert!(ctl.minimize(t0 + ms(300)));
        assert!(!ctl.toggle(t0 + ms(350)));
        assert_eq!(
            ctl.compositor()
                .count(|c| matches!(c, CompositorCall::Attach(SurfaceKind::Panel, _))),
            1
        );
    }

    #[tokio::test]
    async fn test_attach_failure_leaves_state_unchanged() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        ctl.compositor_mut().reject_attach = true;

        tap_trigger(&mut ctl, t0);
        assert_eq!(ctl.state(), WidgetState::Collapsed);
        assert_eq!(ctl.panel_frame(), None);

        ctl.compositor_mut().reject_attach = false;
        tap_trigger(&mut ctl, t0 + ms(50));
        assert_eq!(ctl.state(), WidgetState::PanelVisibleCompact);
    }

    #[tokio::test]
    async fn test_gestures_on_detached_panel_are_dropped() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        let pos = PointerPos::new(10.0, 10.0);
        ctl.pointer_down(GestureBinding::HeaderMove, pos, t0);
        ctl.pointer_move(GestureBinding::HeaderMove, PointerPos::new(300.0, 300.0), t0);
        ctl.pointer_up(GestureBinding::HeaderMove, PointerPos::new(300.0, 300.0), t0);
        assert_eq!(
            ctl.compositor()
                .count(|c| matches!(c, CompositorCall::Layout(SurfaceKind::Panel, _))),
            0
        );
    }

    #[tokio::test]
    async fn test_empty_submit_shows_notice() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);
        ctl.set_input("   ");
        assert!(!ctl.submit(t0));
        assert!(ctl.store().is_empty());
        assert_eq!(ctl.state(), WidgetState::PanelVisibleCompact);
        assert_eq!(ctl.compositor().notices(), vec![NOTICE_EMPTY_INPUT]);
    }

    #[tokio::test]
    async fn test_focus_and_scroll_timers() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);

        ctl.pump(t0 + ms(199));
        assert_eq!(ctl.compositor().count(|c| *c == CompositorCall::Focus(true)), 0);
        ctl.pump(t0 + FOCUS_DELAY);
        assert_eq!(ctl.compositor().count(|c| *c == CompositorCall::Focus(true)), 1);

        ctl.send_message("Hello", t0 + ms(300));
        ctl.pump(t0 + ms(399));
        assert_eq!(ctl.compositor().count(|c| *c == CompositorCall::Scroll(0)), 0);
        ctl.pump(t0 + ms(400));
        assert_eq!(ctl.compositor().count(|c| *c == CompositorCall::Scroll(0)), 1);
    }

    #[tokio::test]
    async fn test_typing_pulse_repeats_while_waiting() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(10_000), t0);
        tap_trigger(&mut ctl, t0);
        ctl.send_message("Hello", t0);
        assert_eq!(ctl.typing().pulse_count(), 1);

        ctl.pump(t0 + PULSE_PERIOD);
        ctl.pump(t0 + PULSE_PERIOD * 2);
        assert_eq!(ctl.typing().pulse_count(), 3);

        // Tear-down stops the pulse.
        ctl.minimize(t0 + ms(2500));
        ctl.pump(t0 + ms(5000));
        assert!(!ctl.typing().is_visible());
        assert!(ctl.next_deadline().is_none());
    }

    #[tokio::test]
    async fn test_typing_pulse_keeps_one_period_after_quick_replies() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);

        let mut now = t0 + ms(300);
        for round in 1..=3 {
            ctl.send_message("Hello", now);
            assert!(ctl.typing().is_visible());
            pump_until(&mut ctl, now, |c| c.store().len() == round * 2).await;
            assert!(!ctl.typing().is_visible());
            now += ms(100);
        }

        // No await below, so this reply stays with the worker.
        ctl.send_message("Hello", now);
        let shown = now;
        while now < shown + PULSE_PERIOD * 2 {
            now += ms(10);
            ctl.pump(now);
        }
        assert_eq!(ctl.in_flight(), 1);
        // Pulses at show, +1200 and +2400 only.
        assert_eq!(ctl.typing().pulse_count(), 3);
    }

    #[tokio::test]
    async fn test_hand_off_passes_conversation_and_minimizes() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::replying(vec![Ok("Hi there".into())]), t0);
        tap_trigger(&mut ctl, t0);
        ctl.send_message("Hello", t0);
        pump_until(&mut ctl, t0, |c| c.store().len() == 2).await;

        assert!(ctl.hand_off(t0 + ms(500)));
        let payload = &ctl.host().payloads[0];
        assert_eq!(payload.messages, vec!["Hello", "Hi there"]);
        assert_eq!(payload.is_user, vec![true, false]);
        assert_eq!(ctl.state(), WidgetState::PanelHidden);
        assert_eq!(ctl.store().len(), 2);
        assert_eq!(
            ctl.compositor().notices(),
            vec![NOTICE_MINIMIZED, NOTICE_HANDOFF]
        );
    }

    #[tokio::test]
    async fn test_rejected_hand_off_keeps_panel() {
        let t0 = Instant::now();
        let mut host = MockHostApp::new();
        host.expect_open_conversation()
            .times(1)
            .returning(|_| Err(PlatformError::HandoffFailed("no activity".into())));

        let mut ctl = controller_with(
            config(ScreenMetrics::default()),
            ScriptedBackend::slow(0),
            host,
            t0,
        );
        tap_trigger(&mut ctl, t0);
        ctl.pump(t0 + SHOW_DURATION);

        assert!(!ctl.hand_off(t0 + ms(300)));
        assert_eq!(ctl.state(), WidgetState::PanelVisibleCompact);
        assert_eq!(ctl.compositor().notices(), vec![NOTICE_HANDOFF_FAILED]);
    }

    #[tokio::test]
    async fn test_shutdown_detaches_and_invalidates_handle() {
        let t0 = Instant::now();
        let mut ctl = controller(ScriptedBackend::slow(0), t0);
        tap_trigger(&mut ctl, t0);
        let handle = ctl.handle();
        assert!(handle.is_alive());

        ctl.shutdown(t0 + ms(10));
        assert!(!handle.is_alive());
        assert!(ctl.compositor().attached.is_empty());
        assert!(!ctl.toggle(t0 + ms(20)));
    }
}
