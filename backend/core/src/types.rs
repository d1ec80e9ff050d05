use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Attributes that can be assigned to a logger in bulk.
///
/// Absent fields leave the logger untouched. When deserialized from a map,
/// keys that name no attribute are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracing: Option<bool>,
}

impl LoggerAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn tracing(mut self, tracing: bool) -> Self {
        self.tracing = Some(tracing);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.tracing.is_none()
    }
}
