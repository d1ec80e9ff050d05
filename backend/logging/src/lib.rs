//! Hierarchical logger facade for Lineage.
//!
//! Loggers are named with `::` paths and owned by a [`LoggerRegistry`].
//! Level and tracing settings cascade from ancestors unless overridden. When
//! tracing is on, each log call writes its file, line and function into the
//! engine's thread-local context for the duration of the call.
//!
//! ```
//! use std::sync::Arc;
//! use lineage_logging::{Level, LoggerAttributes, LoggerRegistry, MemoryEngine};
//!
//! let engine = Arc::new(MemoryEngine::new());
//! let registry = LoggerRegistry::new(engine.clone());
//!
//! registry.get_with("app", Some(&LoggerAttributes::new().level(Level::Debug)));
//! let db = registry.get("app::db");
//! assert_eq!(db.level(), Level::Debug);
//!
//! db.debug("connected").unwrap();
//! assert_eq!(engine.records()[0].sink, "lineage.app.db");
//! ```

pub mod context;
pub mod enable;
pub mod engine;
pub mod logger;
mod macros;
pub mod normalize;
pub mod registry;
pub mod subscriber;

pub use context::{CallSite, ContextScope};
pub use enable::EnableLogger;
pub use engine::{Emitted, MemoryEngine, ThreadContext, TracingEngine};
pub use logger::Logger;
pub use normalize::{normalize, LogArg, Normalized};
pub use registry::LoggerRegistry;
pub use subscriber::init_logger;

pub use lineage_core::{
    keys, ContextStore, Engine, EngineError, ForeignException, Level, LoggerAttributes,
    NameMapper, Sink, Throwable,
};
