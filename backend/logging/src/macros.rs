//! Logging macros that capture the full call site.
//!
//! The macros name the enclosing function at compile time, so tracing
//! loggers skip the stack walk the `Logger` methods need. Format arguments
//! are only evaluated when the level is enabled.
//!
//! ```
//! use std::sync::Arc;
//! use lineage_logging::{log_debug, LoggerRegistry, MemoryEngine};
//!
//! let registry = LoggerRegistry::new(Arc::new(MemoryEngine::new()));
//! let logger = registry.get("app::worker");
//! log_debug!(logger, "processed {} jobs", 3).unwrap();
//! ```

/// Name of the function the macro is expanded in.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        name.rsplit("::")
            .find(|segment| *segment != "{{closure}}")
            .unwrap_or(name)
    }};
}

/// The [`CallSite`](crate::CallSite) of the macro invocation.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), $crate::__function_name!())
    };
}

#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at($level, $crate::call_site!(), || ::std::format!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::Level::Fatal, $($arg)+)
    };
}
