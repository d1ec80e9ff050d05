use std::sync::Arc;

use lineage_core::canonicalize;

use crate::logger::Logger;
use crate::registry::LoggerRegistry;

/// Gives a type a logger named after its Rust path.
///
/// `app::db::Pool` logs through the `app::db::Pool` logger, which inherits
/// from `app::db`, `app` and the root.
///
/// ```
/// use std::sync::Arc;
/// use lineage_logging::{EnableLogger, LoggerRegistry, MemoryEngine};
///
/// struct Pool;
/// impl EnableLogger for Pool {}
///
/// let registry = LoggerRegistry::new(Arc::new(MemoryEngine::new()));
/// assert!(Pool::logger_name().ends_with("Pool"));
/// assert!(Arc::ptr_eq(&Pool::class_logger(&registry), &Pool.logger(&registry)));
/// ```
pub trait EnableLogger {
    fn logger_name() -> String {
        canonicalize(std::any::type_name::<Self>())
    }

    /// The type's logger, reachable without an instance.
    fn class_logger(registry: &LoggerRegistry) -> Arc<Logger> {
        registry.get(&Self::logger_name())
    }

    fn logger(&self, registry: &LoggerRegistry) -> Arc<Logger>
    where
        Self: Sized,
    {
        Self::class_logger(registry)
    }
}
