//! Mapping between logical logger names and backing-engine sink names.
//!
//! Logical names are `::`-separated paths (`app::db::pool`). Sinks live under
//! a fixed namespace with dot separators (`lineage.app.db.pool`). The root
//! logger has the empty logical name and maps to the bare namespace.

/// Separator between segments of a logical name.
pub const SEPARATOR: &str = "::";

/// Separator between segments of a sink name.
pub const SINK_SEPARATOR: char = '.';

/// Namespace tag prefixed to every sink name unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "lineage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMapper {
    namespace: String,
}

impl NameMapper {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `A::B::C` becomes `<namespace>.A.B.C`; the root maps to `<namespace>`.
    pub fn to_sink_name(&self, identifier: &str) -> String {
        if identifier.is_empty() {
            return self.namespace.clone();
        }
        let dotted = identifier.replace(SEPARATOR, ".");
        format!("{}{}{}", self.namespace, SINK_SEPARATOR, dotted)
    }
}

impl Default for NameMapper {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// The identifier with its last segment removed, or `None` for a top-level
/// (or root) name.
pub fn parent_of(identifier: &str) -> Option<String> {
    identifier
        .rfind(SEPARATOR)
        .map(|idx| identifier[..idx].to_string())
}

/// Normalize an identifier into the registry key.
///
/// Generic argument lists are dropped (`Cache<K, V>` is `Cache`), segments
/// are trimmed and empty segments removed, so `::a::::b::` is `a::b`.
pub fn canonicalize(identifier: &str) -> String {
    let mut stripped = String::with_capacity(identifier.len());
    let mut depth = 0usize;
    for ch in identifier.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(ch),
            _ => {}
        }
    }

    stripped
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
