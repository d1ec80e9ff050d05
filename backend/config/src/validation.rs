//! Config validation with path-qualified messages.

use std::collections::HashMap;

use lineage_core::{canonicalize, SEPARATOR};
use thiserror::Error;

use crate::schema::LineageConfig;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &LineageConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_namespace(config, &mut report);
    validate_output(config, &mut report);
    validate_loggers(config, &mut report);
    report
}

fn validate_namespace(config: &LineageConfig, report: &mut ValidationReport) {
    let Some(namespace) = &config.namespace else { return };
    if namespace.trim().is_empty() {
        report.error("namespace", "Namespace cannot be empty");
    } else if namespace.contains(SEPARATOR) || namespace.chars().any(char::is_whitespace) {
        report.error(
            "namespace",
            format!("Namespace {namespace:?} must not contain '::' or whitespace"),
        );
    }
}

fn validate_output(config: &LineageConfig, report: &mut ValidationReport) {
    let Some(output) = &config.output else { return };
    if output.level.as_deref().is_some_and(|level| level.trim().is_empty()) {
        report.warn("output.level", "Empty filter; RUST_LOG or the default will apply");
    }
    if let Some(dir) = &output.dir {
        if dir.is_file() {
            report.error("output.dir", format!("{} is a file, not a directory", dir.display()));
        }
    }
    if output.file.as_deref().is_some_and(|file| file.contains(|c: char| c == '/' || c == '\\')) {
        report.error("output.file", "File name must not contain path separators");
    }
}

/// Logger keys are canonicalized by the registry, so keys that collapse onto
/// the same logger would silently override each other.
fn validate_loggers(config: &LineageConfig, report: &mut ValidationReport) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for (name, attributes) in &config.loggers {
        let path = format!("loggers.{name:?}");
        let canonical = canonicalize(name);
        if canonical != *name {
            report.warn(&path, format!("Logger name is applied as {canonical:?}"));
        }
        if let Some(previous) = seen.insert(canonical.clone(), name) {
            report.error(
                &path,
                format!("Logger {canonical:?} is also configured as {previous:?}"),
            );
        }
        if attributes.is_empty() {
            report.warn(&path, "Logger entry sets no attributes");
        }
    }
}
