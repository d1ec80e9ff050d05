//! Lineage configuration schema.
//!
//! Typed for serde YAML/TOML/JSON deserialization. Every field is optional;
//! defaults are filled in by [`apply_all_defaults`](crate::apply_all_defaults).

use lineage_core::LoggerAttributes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration.
///
/// ```yaml
/// namespace: lineage
/// output:
///   level: info
///   dir: /var/log/app
/// loggers:
///   "app::db":
///     level: debug
///     tracing: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageConfig {
    /// Tag prefixed to every sink name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Subscriber output settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,

    /// Per-logger attributes keyed by logical name (`""` is the root)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub loggers: BTreeMap<String, LoggerAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for the NDJSON rolling file; no file output when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<bool>,
}
