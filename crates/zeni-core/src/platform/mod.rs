//! Platform collaborators and widget lifecycle
//!
//! A process runs at most one widget. The [`WidgetRegistry`] enforces that
//! and hands out [`WidgetHandle`]s, which are weak: they go dead the moment
//! the widget is stopped or its controller is dropped, and every use must
//! check liveness first.

use crate::config::WidgetConfig;
use crate::dispatch::ChatBackend;
use crate::error::{PlatformError, Result};
use crate::handoff::HostApp;
use crate::overlay::{Compositor, OverlayController};
use crate::types::SessionId;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Permission to draw above other applications
#[cfg_attr(test, mockall::automock)]
pub trait OverlayPermissions {
    fn can_draw_overlays(&self) -> bool;

    /// Ask the user for permission. Returns whether it is now granted.
    fn request_overlay_permission(&mut self) -> std::result::Result<bool, PlatformError>;
}

/// Liveness anchor owned by a running controller
#[derive(Debug)]
pub struct WidgetToken {
    session_id: SessionId,
}

impl WidgetToken {
    pub(crate) fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WidgetHandle {
    token: Weak<WidgetToken>,
}

impl WidgetHandle {
    pub(crate) fn new(token: &Arc<WidgetToken>) -> Self {
        Self {
            token: Arc::downgrade(token),
        }
    }

    /// A handle that was never alive.
    pub fn dead() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.token.strong_count() > 0
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.token.upgrade().map(|t| t.session_id.clone())
    }
}

#[derive(Debug, Default)]
pub struct WidgetRegistry {
    current: Mutex<WidgetHandle>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the overlay permission, asking for it once if missing.
    pub fn ensure_permission(
        permissions: &mut impl OverlayPermissions,
    ) -> std::result::Result<(), PlatformError> {
        if permissions.can_draw_overlays() {
            return Ok(());
        }
        info!("Overlay permission missing, requesting");
        if permissions.request_overlay_permission()? {
            Ok(())
        } else {
            warn!("Overlay permission refused");
            Err(PlatformError::PermissionDenied)
        }
    }

    /// Start the widget: check permission, build the controller and attach
    /// the trigger.
    #[allow(clippy::too_many_arguments)]
    pub fn start<C, H, P>(
        &self,
        permissions: &mut P,
        config: WidgetConfig,
        backend: Arc<dyn ChatBackend>,
        compositor: C,
        host: H,
        runtime: Handle,
        now: Instant,
    ) -> Result<OverlayController<C, H>>
    where
        C: Compositor,
        H: HostApp,
        P: OverlayPermissions,
    {
        let mut current = self.current.lock();
        if current.is_alive() {
            return Err(PlatformError::AlreadyRunning.into());
        }
        Self::ensure_permission(permissions)?;

        let mut controller =
            OverlayController::new(config, backend, compositor, host, runtime, now);
        controller.start(now)?;
        *current = controller.handle();
        Ok(controller)
    }

    pub fn stop<C: Compositor, H: HostApp>(
        &self,
        controller: &mut OverlayController<C, H>,
        now: Instant,
    ) {
        controller.shutdown(now);
        *self.current.lock() = WidgetHandle::dead();
    }

    pub fn is_running(&self) -> bool {
        self.current.lock().is_alive()
    }

    /// Handle to the running widget, if any.
    pub fn handle(&self) -> Option<WidgetHandle> {
        let current = self.current.lock();
        current.is_alive().then(|| current.clone())
    }
}
