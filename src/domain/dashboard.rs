// Dashboard domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardId(String);

impl DashboardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DashboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fallback size for widgets added without explicit width/height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetSize {
    pub width: u32,
    pub height: u32,
}

impl WidgetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
