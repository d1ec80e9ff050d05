//! `lineage-config`: configuration for the Lineage logger facade.
//!
//! Provides:
//! - Typed config schema (namespace, subscriber output, per-logger attributes)
//! - YAML/TOML read and YAML write
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with path-qualified messages

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    contains_env_var_reference, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, load_value, write_config};
pub use schema::{LineageConfig, OutputConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::path::Path;

/// Load a config file, substitute env vars, apply defaults, and validate.
///
/// Validation problems are logged; only I/O, parse and env substitution
/// failures are returned as errors.
pub fn load_and_prepare(path: &Path) -> Result<LineageConfig> {
    let value = load_value(path)?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: LineageConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config at: {}", path.display()))?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}
