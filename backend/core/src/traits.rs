use std::sync::Arc;

use crate::error::{EngineError, Throwable};
use crate::level::Level;

/// A backing structured-logging engine.
///
/// The facade only asks an engine for named sinks and for the per-thread
/// context store. Everything about formatting and output stays inside the
/// engine.
pub trait Engine: Send + Sync {
    /// Create the sink with the given engine name, or return the existing one.
    fn sink(&self, name: &str) -> Arc<dyn Sink>;

    /// The thread-local context store the engine reads while formatting.
    fn context(&self) -> &dyn ContextStore;
}

/// A named destination inside the backing engine.
pub trait Sink: Send + Sync {
    /// Engine-side name (e.g. `lineage.A.B`).
    fn name(&self) -> &str;

    /// Whether the engine would currently accept a message at `level`.
    fn is_enabled(&self, level: Level) -> Result<bool, EngineError>;

    /// The threshold explicitly configured on this sink, if any.
    fn threshold(&self) -> Option<Level>;

    fn set_threshold(&self, level: Option<Level>);

    /// Write one message with an optional cause.
    fn emit(&self, level: Level, message: &str, cause: Option<&Throwable>)
        -> Result<(), EngineError>;

    fn flush(&self) {}
}

/// Per-thread key/value map shared between the facade and the engine.
///
/// Implementations must keep values local to the calling thread; callers
/// never share an entry across threads.
pub trait ContextStore: Send + Sync {
    fn put(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn get(&self, key: &str) -> Option<String>;
}

/// Context keys written while a log call is in flight.
pub mod keys {
    pub const FILE_NAME: &str = "fileName";
    pub const LINE_NUMBER: &str = "lineNumber";
    pub const METHOD_NAME: &str = "methodName";

    pub const ALL: [&str; 3] = [FILE_NAME, LINE_NUMBER, METHOD_NAME];
}
