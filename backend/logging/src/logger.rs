//! The logger facade.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use lineage_core::{Engine, EngineError, Level, LoggerAttributes, Sink, Throwable};

use crate::context::{CallSite, ContextScope};
use crate::normalize::{normalize, LogArg, Normalized};

const UNSET: u8 = 0;
const TRACING_OFF: u8 = 1;
const TRACING_ON: u8 = 2;

/// A named logger backed by one engine sink.
///
/// Level and tracing are inherited from the parent logger unless set
/// explicitly. Loggers are owned by a [`LoggerRegistry`](crate::LoggerRegistry);
/// the parent link is non-owning.
pub struct Logger {
    name: String,
    sink: Arc<dyn Sink>,
    engine: Arc<dyn Engine>,
    level: AtomicU8,
    tracing: AtomicU8,
    parent: Option<Weak<Logger>>,
}

macro_rules! severity_methods {
    ($($level:ident => $log:ident, $log_with:ident, $enabled:ident;)*) => {$(
        #[doc = concat!("Log `arg` at `", stringify!($level), "`.")]
        #[track_caller]
        pub fn $log(&self, arg: impl Into<LogArg>) -> Result<(), EngineError> {
            self.log_at(Level::$level, CallSite::caller(), move || arg)
        }

        #[doc = concat!(
            "Log the value produced by `make` at `",
            stringify!($level),
            "`; `make` only runs when enabled."
        )]
        #[track_caller]
        pub fn $log_with<F, A>(&self, make: F) -> Result<(), EngineError>
        where
            F: FnOnce() -> A,
            A: Into<LogArg>,
        {
            self.log_at(Level::$level, CallSite::caller(), make)
        }

        pub fn $enabled(&self) -> Result<bool, EngineError> {
            self.is_enabled(Level::$level)
        }
    )*};
}

impl Logger {
    pub(crate) fn new(
        name: String,
        engine: Arc<dyn Engine>,
        sink: Arc<dyn Sink>,
        parent: Option<&Arc<Logger>>,
    ) -> Self {
        Self {
            name,
            sink,
            engine,
            level: AtomicU8::new(UNSET),
            tracing: AtomicU8::new(UNSET),
            parent: parent.map(Arc::downgrade),
        }
    }

    /// Canonical logical name; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<Arc<Logger>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// The backing engine sink.
    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// Effective level: the explicit level of the nearest logger on the path
    /// to the root, or [`Level::BASELINE`].
    pub fn level(&self) -> Level {
        self.resolve(Logger::explicit_level, Level::BASELINE)
    }

    pub fn explicit_level(&self) -> Option<Level> {
        Level::from_code(self.level.load(Ordering::Relaxed))
    }

    /// Set or clear (`None`) the explicit level. The backing sink threshold
    /// follows.
    pub fn set_level(&self, level: Option<Level>) {
        self.level
            .store(level.map_or(UNSET, Level::to_code), Ordering::Relaxed);
        self.sink.set_threshold(level);
    }

    /// Effective tracing flag; `false` when unset all the way to the root.
    pub fn is_tracing(&self) -> bool {
        self.resolve(Logger::explicit_tracing, false)
    }

    pub fn explicit_tracing(&self) -> Option<bool> {
        match self.tracing.load(Ordering::Relaxed) {
            TRACING_ON => Some(true),
            TRACING_OFF => Some(false),
            _ => None,
        }
    }

    pub fn set_tracing(&self, tracing: Option<bool>) {
        let code = match tracing {
            Some(true) => TRACING_ON,
            Some(false) => TRACING_OFF,
            None => UNSET,
        };
        self.tracing.store(code, Ordering::Relaxed);
    }

    /// Assign every attribute present in `attributes`. `None` does nothing.
    pub fn set_attributes(&self, attributes: Option<&LoggerAttributes>) {
        let Some(attributes) = attributes else { return };
        if let Some(level) = attributes.level {
            self.set_level(Some(level));
        }
        if let Some(tracing) = attributes.tracing {
            self.set_tracing(Some(tracing));
        }
    }

    fn resolve<T>(&self, pick: impl Fn(&Logger) -> Option<T>, root_default: T) -> T {
        if let Some(value) = pick(self) {
            return value;
        }
        let mut next = self.parent();
        while let Some(logger) = next {
            if let Some(value) = pick(&logger) {
                return value;
            }
            next = logger.parent();
        }
        root_default
    }

    // -----------------------------------------------------------------------
    // Logging
    // -----------------------------------------------------------------------

    /// Whether a message at `level` would reach the engine.
    pub fn is_enabled(&self, level: Level) -> Result<bool, EngineError> {
        if level < self.level() {
            return Ok(false);
        }
        self.sink.is_enabled(level)
    }

    severity_methods! {
        Trace => trace, trace_with, trace_enabled;
        Debug => debug, debug_with, debug_enabled;
        Info => info, info_with, info_enabled;
        Warn => warn, warn_with, warn_enabled;
        Error => error, error_with, error_enabled;
        Fatal => fatal, fatal_with, fatal_enabled;
    }

    #[track_caller]
    pub fn log(&self, level: Level, arg: impl Into<LogArg>) -> Result<(), EngineError> {
        self.log_at(level, CallSite::caller(), move || arg)
    }

    #[track_caller]
    pub fn log_with<F, A>(&self, level: Level, make: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> A,
        A: Into<LogArg>,
    {
        self.log_at(level, CallSite::caller(), make)
    }

    /// Log with an explicit call site. `make` is evaluated only if `level`
    /// is enabled.
    pub fn log_at<F, A>(&self, level: Level, site: CallSite, make: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> A,
        A: Into<LogArg>,
    {
        if !self.is_enabled(level)? {
            return Ok(());
        }
        let arg = make().into();
        let _scope = self.enter_context(&site);
        let Normalized { message, cause } = normalize(arg, &site);
        self.sink.emit(level, &message, cause.as_ref())
    }

    /// Forward `message` and `throwable` to the sink at `error` as-is.
    #[track_caller]
    pub fn log_error(&self, message: &str, throwable: &Throwable) -> Result<(), EngineError> {
        self.emit_raw(Level::Error, CallSite::caller(), message, throwable)
    }

    /// Forward `message` and `throwable` to the sink at `fatal` as-is.
    #[track_caller]
    pub fn log_fatal(&self, message: &str, throwable: &Throwable) -> Result<(), EngineError> {
        self.emit_raw(Level::Fatal, CallSite::caller(), message, throwable)
    }

    fn emit_raw(
        &self,
        level: Level,
        site: CallSite,
        message: &str,
        throwable: &Throwable,
    ) -> Result<(), EngineError> {
        if !self.is_enabled(level)? {
            return Ok(());
        }
        let _scope = self.enter_context(&site);
        self.sink.emit(level, message, Some(throwable))
    }

    fn enter_context(&self, site: &CallSite) -> ContextScope<'_> {
        let store = self.engine.context();
        if self.is_tracing() {
            ContextScope::caller(store, site)
        } else {
            ContextScope::blank(store)
        }
    }

    /// Present for drop-in compatibility with loggers that buffer; the
    /// engine owns all output, so there is nothing to flush here.
    pub fn flush(&self) {}
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("sink", &self.sink.name())
            .field("level", &self.explicit_level())
            .field("tracing", &self.explicit_tracing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;

    fn standalone(
        engine: &Arc<MemoryEngine>,
        name: &str,
        parent: Option<&Arc<Logger>>,
    ) -> Arc<Logger> {
        let sink = engine.sink(&format!("lineage.{name}"));
        Arc::new(Logger::new(name.to_string(), engine.clone(), sink, parent))
    }

    #[test]
    fn test_root_defaults() {
        let engine = Arc::new(MemoryEngine::new());
        let root = standalone(&engine, "", None);
        assert!(root.is_root());
        assert_eq!(root.level(), Level::BASELINE);
        assert!(!root.is_tracing());
    }

    #[test]
    fn test_resolution_walks_parents() {
        let engine = Arc::new(MemoryEngine::new());
        let root = standalone(&engine, "", None);
        let a = standalone(&engine, "A", Some(&root));
        let b = standalone(&engine, "A::B", Some(&a));

        root.set_level(Some(Level::Info));
        assert_eq!(b.level(), Level::Info);

        a.set_level(Some(Level::Debug));
        assert_eq!(b.level(), Level::Debug);

        b.set_level(Some(Level::Fatal));
        assert_eq!(b.level(), Level::Fatal);

        b.set_level(None);
        a.set_level(None);
        assert_eq!(b.level(), Level::Info);
    }

    #[test]
    fn test_set_level_mirrors_sink_threshold() {
        let engine = Arc::new(MemoryEngine::new());
        let logger = standalone(&engine, "X", None);
        logger.set_level(Some(Level::Warn));
        assert_eq!(logger.sink().threshold(), Some(Level::Warn));
        logger.set_level(None);
        assert_eq!(logger.sink().threshold(), None);
    }

    #[test]
    fn test_dropped_parent_falls_back_to_defaults() {
        let engine = Arc::new(MemoryEngine::new());
        let child = {
            let root = standalone(&engine, "", None);
            root.set_tracing(Some(true));
            standalone(&engine, "A", Some(&root))
        };
        assert!(child.parent().is_none());
        assert!(!child.is_tracing());
    }

    #[test]
    fn test_tracing_tristate() {
        let engine = Arc::new(MemoryEngine::new());
        let logger = standalone(&engine, "T", None);
        assert_eq!(logger.explicit_tracing(), None);
        logger.set_tracing(Some(false));
        assert_eq!(logger.explicit_tracing(), Some(false));
        logger.set_tracing(Some(true));
        assert_eq!(logger.explicit_tracing(), Some(true));
        logger.set_tracing(None);
        assert_eq!(logger.explicit_tracing(), None);
    }

    #[test]
    fn test_debug_impl_names_sink() {
        let engine = Arc::new(MemoryEngine::new());
        let logger = standalone(&engine, "Dbg", None);
        assert!(format!("{logger:?}").contains("lineage.Dbg"));
    }
}
