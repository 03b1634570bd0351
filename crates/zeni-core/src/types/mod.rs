//! Core type definitions for Zeni
//!
//! Shared geometry, message and surface types used across the overlay.

mod geometry;
mod message_types;
mod surface_types;

pub use geometry::*;
pub use message_types::*;
pub use surface_types::*;

use serde::{Deserialize, Serialize};

/// Opaque per-widget-instance token correlating requests at the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh process-lifetime session id.
    pub fn generate() -> Self {
        Self(format!("overlay_{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
