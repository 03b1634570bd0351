//! Widget configuration
//!
//! Loaded from `<config_dir>/zeni/overlay.json`. Every field has a default so
//! a missing file, or a file that only sets a few keys, is fine.

use crate::error::{ConfigError, Result};
use crate::types::{Point, ScreenMetrics};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BACKEND_URL: &str = "https://zeni-backend.up.railway.app";
pub const BACKEND_URL_ENV: &str = "ZENI_BACKEND_URL";

/// Connect/read budget for one backend exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBudget {
    pub connect_ms: u64,
    pub read_ms: u64,
}

impl CallBudget {
    pub const fn new(connect_ms: u64, read_ms: u64) -> Self {
        Self {
            connect_ms,
            read_ms,
        }
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    /// Upper bound for a whole exchange.
    pub fn total(&self) -> Duration {
        self.connect() + self.read()
    }
}

/// Which lifecycle action a trigger tap performs on a visible panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapHidePolicy {
    /// Tear down and forget the conversation
    Close,
    /// Tear down and keep the conversation
    Minimize,
}

impl Default for TapHidePolicy {
    fn default() -> Self {
        Self::Close
    }
}

/// Panel and trigger geometry, in dp unless noted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub trigger_size_dp: f32,
    /// Initial trigger origin, device pixels
    pub trigger_origin: Point,
    /// Initial panel origin, device pixels
    pub panel_origin: Point,
    pub panel_width_dp: f32,
    /// Header, input row and resize handle together
    pub panel_chrome_height_dp: f32,
    pub list_height_dp: f32,
    pub min_width_dp: f32,
    pub max_width_fraction: f32,
    pub min_height_dp: f32,
    pub max_height_fraction: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            trigger_size_dp: 40.0,
            trigger_origin: Point::new(50, 400),
            panel_origin: Point::new(30, 150),
            panel_width_dp: 340.0,
            panel_chrome_height_dp: 150.0,
            list_height_dp: 250.0,
            min_width_dp: 280.0,
            max_width_fraction: 0.95,
            min_height_dp: 200.0,
            max_height_fraction: 0.85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub backend_url: String,
    pub chat_budget: CallBudget,
    pub probe_budget: CallBudget,
    /// Drag threshold in device pixels
    pub drag_threshold: f32,
    /// Fallback metrics for hosts that cannot query the display
    pub screen: ScreenMetrics,
    pub layout: LayoutConfig,
    pub tap_hide_policy: TapHidePolicy,
    /// Clear the backend session history when the panel is closed
    pub clear_remote_on_close: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            chat_budget: CallBudget::new(10_000, 30_000),
            probe_budget: CallBudget::new(5_000, 5_000),
            drag_threshold: crate::gesture::DRAG_THRESHOLD,
            screen: ScreenMetrics::default(),
            layout: LayoutConfig::default(),
            tap_hide_policy: TapHidePolicy::default(),
            clear_remote_on_close: true,
        }
    }
}

impl WidgetConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("zeni").join("overlay.json"))
    }

    /// Load from the default path, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        info!("Loaded widget config from {:?}", path);
        Ok(config)
    }

    /// Apply `ZENI_BACKEND_URL` if set, then re-validate.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_backend_override(std::env::var(BACKEND_URL_ENV).ok())
    }

    fn with_backend_override(mut self, url: Option<String>) -> Result<Self> {
        if let Some(url) = url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            debug!("Backend URL overridden from environment");
            self.backend_url = url.to_string();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "backendUrl must be http(s): {}",
                self.backend_url
            ))
            .into());
        }
        if self.drag_threshold < 0.0 {
            return Err(ConfigError::Invalid("dragThreshold must not be negative".into()).into());
        }
        if self.screen.density <= 0.0 {
            return Err(ConfigError::Invalid("screen.density must be positive".into()).into());
        }
        Ok(())
    }
}
