//! Call-site metadata and its scoped injection into the engine context.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::path::Path;

use lineage_core::{keys, ContextStore};

/// Where a log call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    /// Enclosing function name; empty when the caller could not be named.
    pub method: &'static str,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, method: &'static str) -> Self {
        Self { file, line, method }
    }

    /// The location of the code that called into the facade.
    ///
    /// `#[track_caller]` only carries file and line, so `method` is left
    /// empty; [`method_name`](Self::method_name) recovers it from the stack.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), "")
    }

    /// The enclosing function name.
    ///
    /// Uses `method` when the macros supplied it. Otherwise walks the current
    /// stack for the frame executing this file and line and names it from
    /// the frame's symbol. Empty when no frame matches, e.g. without debug
    /// info.
    pub fn method_name(&self) -> Cow<'static, str> {
        if !self.method.is_empty() {
            return Cow::Borrowed(self.method);
        }
        Cow::Owned(self.frame_function().unwrap_or_default())
    }

    fn frame_function(&self) -> Option<String> {
        let file = Path::new(self.file);
        let mut found = None;
        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                if found.is_some() || symbol.lineno() != Some(self.line) {
                    return;
                }
                if !symbol.filename().is_some_and(|path| path.ends_with(file)) {
                    return;
                }
                found = symbol
                    .name()
                    .map(|name| format!("{name:#}"))
                    .and_then(|path| function_segment(&path).map(str::to_string));
            });
            found.is_none()
        });
        found
    }
}

/// Last path segment naming a real function: skips closures, generic
/// arguments and legacy symbol hashes.
fn function_segment(path: &str) -> Option<&str> {
    path.rsplit("::").find(|segment| {
        !segment.is_empty()
            && !segment.starts_with('{')
            && !segment.starts_with('<')
            && !is_symbol_hash(segment)
    })
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if !self.method.is_empty() {
            write!(f, " in `{}`", self.method)?;
        }
        Ok(())
    }
}

/// Writes caller metadata into a [`ContextStore`] and puts the previous
/// values back when dropped.
///
/// Restoration runs on every exit path, including `?` returns and panics
/// unwinding through the log call.
pub struct ContextScope<'a> {
    store: &'a dyn ContextStore,
    saved: [(&'static str, Option<String>); 3],
}

impl<'a> ContextScope<'a> {
    /// Inject the real call site, resolving the function name if the site
    /// does not carry one.
    pub fn caller(store: &'a dyn ContextStore, site: &CallSite) -> Self {
        let line = site.line.to_string();
        let method = site.method_name();
        Self::enter(store, [site.file, line.as_str(), method.as_ref()])
    }

    /// Inject empty placeholders so values from an enclosing scope do not
    /// leak into this call.
    pub fn blank(store: &'a dyn ContextStore) -> Self {
        Self::enter(store, ["", "", ""])
    }

    fn enter(store: &'a dyn ContextStore, values: [&str; 3]) -> Self {
        let saved = keys::ALL.map(|key| (key, store.get(key)));
        for (key, value) in keys::ALL.iter().zip(values) {
            store.put(key, value);
        }
        Self { store, saved }
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        for (key, previous) in &self.saved {
            match previous {
                Some(value) => self.store.put(key, value),
                None => self.store.remove(key),
            }
        }
    }
}
