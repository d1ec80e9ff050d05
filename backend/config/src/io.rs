//! Config file read/write.

use crate::schema::LineageConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "lineage.yaml";

/// Resolve the Lineage config directory.
/// Priority: `LINEAGE_CONFIG_DIR` env > `~/.lineage/` > `./.lineage`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LINEAGE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".lineage"),
        None => PathBuf::from(".lineage"),
    }
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read a config file into an untyped value tree.
///
/// `.toml` files are parsed as TOML, everything else as YAML (which also
/// covers JSON). A missing file yields an empty object.
pub fn load_value(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let value: Value = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config TOML at: {}", path.display()))?
    } else {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?
    };

    // A document holding only comments parses as null.
    Ok(match value {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    })
}

/// Load and parse the config from disk, without env substitution.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<LineageConfig> {
    let value = load_value(path)?;
    let config = serde_json::from_value(value)
        .with_context(|| format!("Invalid config at: {}", path.display()))?;
    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config to disk as YAML (write to temp file, rename).
pub fn write_config(config: &LineageConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}
