//! Config defaults: applies default values to a parsed config.

use crate::schema::{LineageConfig, OutputConfig};

pub use lineage_core::DEFAULT_NAMESPACE;

/// Subscriber filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_OUTPUT_LEVEL: &str = "info";

/// File name prefix for the rolling NDJSON log.
pub const DEFAULT_LOG_FILE: &str = "lineage.log";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: LineageConfig) -> LineageConfig {
    let config = apply_namespace_default(config);
    apply_output_defaults(config)
}

fn apply_namespace_default(mut config: LineageConfig) -> LineageConfig {
    if config.namespace.is_none() {
        config.namespace = Some(DEFAULT_NAMESPACE.to_string());
    }
    config
}

fn apply_output_defaults(mut config: LineageConfig) -> LineageConfig {
    let output = config.output.get_or_insert_with(OutputConfig::default);
    if output.level.is_none() {
        output.level = Some(DEFAULT_OUTPUT_LEVEL.to_string());
    }
    if output.file.is_none() {
        output.file = Some(DEFAULT_LOG_FILE.to_string());
    }
    if output.console.is_none() {
        output.console = Some(true);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing() {
        let config = apply_all_defaults(LineageConfig::default());
        assert_eq!(config.namespace.as_deref(), Some("lineage"));
        let output = config.output.unwrap();
        assert_eq!(output.level.as_deref(), Some("info"));
        assert_eq!(output.file.as_deref(), Some("lineage.log"));
        assert_eq!(output.console, Some(true));
        assert!(output.dir.is_none());
    }

    #[test]
    fn test_defaults_keep_explicit_values() {
        let config = LineageConfig {
            namespace: Some("jruby".into()),
            output: Some(OutputConfig {
                level: Some("warn".into()),
                console: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = apply_all_defaults(config);
        assert_eq!(config.namespace.as_deref(), Some("jruby"));
        let output = config.output.unwrap();
        assert_eq!(output.level.as_deref(), Some("warn"));
        assert_eq!(output.console, Some(false));
    }
}
