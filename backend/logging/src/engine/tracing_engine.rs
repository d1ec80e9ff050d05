//! Engine adapter over the `tracing` crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use lineage_core::{keys, ContextStore, Engine, EngineError, Level, Sink, Throwable};

use super::thread_context::ThreadContext;

/// Engine whose sinks emit `tracing` events.
///
/// Each event carries the sink name as `logger`, the call-site context as
/// `file`, `line` and `method`, and the cause (if any) as `cause`. `fatal`
/// is emitted at `ERROR` with `fatal = true`.
///
/// Output, formatting and global filtering are whatever the installed
/// subscriber does; see [`init_logger`](crate::init_logger).
#[derive(Default)]
pub struct TracingEngine {
    sinks: RwLock<HashMap<String, Arc<TracingSink>>>,
    context: ThreadContext,
}

impl TracingEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for TracingEngine {
    fn sink(&self, name: &str) -> Arc<dyn Sink> {
        if let Some(sink) = self
            .sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return sink.clone();
        }
        let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);
        sinks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(TracingSink::new(name)))
            .clone()
    }

    fn context(&self) -> &dyn ContextStore {
        &self.context
    }
}

/// A named `tracing` destination with its own optional threshold.
#[derive(Debug)]
pub struct TracingSink {
    name: String,
    threshold: AtomicU8,
}

impl TracingSink {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            threshold: AtomicU8::new(0),
        }
    }
}

struct EventContext {
    file: String,
    line: String,
    method: String,
}

macro_rules! event_at {
    ($level:expr, $sink:ident, $ctx:ident, $fatal:expr, $cause:ident, $message:ident) => {
        tracing::event!(
            $level,
            logger = %$sink,
            file = %$ctx.file,
            line = %$ctx.line,
            method = %$ctx.method,
            fatal = $fatal,
            cause = $cause,
            "{}",
            $message
        )
    };
}

impl Sink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self, level: Level) -> Result<bool, EngineError> {
        if self.threshold().is_some_and(|threshold| level < threshold) {
            return Ok(false);
        }
        let enabled = match level {
            Level::Trace => tracing::enabled!(tracing::Level::TRACE),
            Level::Debug => tracing::enabled!(tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(tracing::Level::INFO),
            Level::Warn => tracing::enabled!(tracing::Level::WARN),
            Level::Error | Level::Fatal => tracing::enabled!(tracing::Level::ERROR),
        };
        Ok(enabled)
    }

    fn threshold(&self) -> Option<Level> {
        Level::from_code(self.threshold.load(Ordering::Relaxed))
    }

    fn set_threshold(&self, level: Option<Level>) {
        self.threshold
            .store(level.map_or(0, Level::to_code), Ordering::Relaxed);
    }

    fn emit(
        &self,
        level: Level,
        message: &str,
        cause: Option<&Throwable>,
    ) -> Result<(), EngineError> {
        let store = ThreadContext;
        let ctx = EventContext {
            file: store.get(keys::FILE_NAME).unwrap_or_default(),
            line: store.get(keys::LINE_NUMBER).unwrap_or_default(),
            method: store.get(keys::METHOD_NAME).unwrap_or_default(),
        };
        let cause = cause.map(|cause| cause.to_string());
        let cause = cause.as_deref();
        let sink = self.name.as_str();

        match level {
            Level::Trace => event_at!(tracing::Level::TRACE, sink, ctx, false, cause, message),
            Level::Debug => event_at!(tracing::Level::DEBUG, sink, ctx, false, cause, message),
            Level::Info => event_at!(tracing::Level::INFO, sink, ctx, false, cause, message),
            Level::Warn => event_at!(tracing::Level::WARN, sink, ctx, false, cause, message),
            Level::Error => event_at!(tracing::Level::ERROR, sink, ctx, false, cause, message),
            Level::Fatal => event_at!(tracing::Level::ERROR, sink, ctx, true, cause, message),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::Mutex;

    use lineage_core::{ForeignException, LoggerAttributes};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use crate::{log_warn, LoggerRegistry};

    type Captured = (tracing::Level, Vec<(String, String)>);

    /// Layer that keeps every event's level and fields as strings.
    #[derive(Clone, Default)]
    struct CaptureLayer(Arc<Mutex<Vec<Captured>>>);

    #[derive(Default)]
    struct Fields(Vec<(String, String)>);

    impl Visit for Fields {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::default();
            event.record(&mut fields);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), fields.0));
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Captured> {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, f);
        let events = layer.0.lock().unwrap().clone();
        events
    }

    fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn traced_logger(registry: &LoggerRegistry) -> Arc<crate::Logger> {
        let attrs = LoggerAttributes::new().level(Level::Trace).tracing(true);
        registry.get_with("A::B", Some(&attrs))
    }

    #[test]
    fn test_tracing_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingEngine>();
        assert_send_sync::<TracingSink>();
    }

    #[test]
    fn test_sink_reused_per_name() {
        let engine = TracingEngine::new();
        let a = engine.sink("lineage.A");
        let b = engine.sink("lineage.A");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "lineage.A");
    }

    #[test]
    fn test_threshold_filters_before_subscriber() {
        let engine = TracingEngine::new();
        let sink = engine.sink("lineage.Quiet");
        sink.set_threshold(Some(Level::Error));
        assert_eq!(sink.threshold(), Some(Level::Error));
        assert!(!sink.is_enabled(Level::Info).unwrap());
        sink.set_threshold(None);
        assert_eq!(sink.threshold(), None);
    }

    #[test]
    fn test_emit_without_subscriber_succeeds() {
        let engine = TracingEngine::new();
        let sink = engine.sink("lineage.Emit");
        assert!(sink.emit(Level::Fatal, "going down", None).is_ok());
    }

    #[test]
    fn test_info_event_carries_call_site_fields() {
        let registry = LoggerRegistry::new(Arc::new(TracingEngine::new()));
        let logger = traced_logger(&registry);
        let mut line = 0;
        let events = capture(|| {
            line = line!() + 1;
            logger.info("hello").unwrap();
        });

        assert_eq!(events.len(), 1);
        let (level, fields) = &events[0];
        assert_eq!(*level, tracing::Level::INFO);
        assert_eq!(field(fields, "message"), Some("hello"));
        assert_eq!(field(fields, "logger"), Some("lineage.A.B"));
        assert_eq!(field(fields, "file"), Some(file!()));
        assert_eq!(field(fields, "line"), Some(line.to_string().as_str()));
        assert_eq!(
            field(fields, "method"),
            Some("test_info_event_carries_call_site_fields")
        );
        assert_eq!(field(fields, "fatal"), Some("false"));
        assert_eq!(field(fields, "cause"), None);
    }

    #[test]
    fn test_fatal_maps_to_error_with_cause() {
        let registry = LoggerRegistry::new(Arc::new(TracingEngine::new()));
        let logger = traced_logger(&registry);
        let cause: Throwable = Arc::new(std::io::Error::other("inner"));
        let events = capture(|| {
            logger
                .fatal(ForeignException::new("Wrap", cause.clone()))
                .unwrap();
        });

        assert_eq!(events.len(), 1);
        let (level, fields) = &events[0];
        assert_eq!(*level, tracing::Level::ERROR);
        assert_eq!(field(fields, "fatal"), Some("true"));
        assert_eq!(field(fields, "cause"), Some("inner"));
        assert!(field(fields, "message").is_some_and(|m| m.starts_with("Wrap")));
    }

    #[test]
    fn test_macro_event_names_function() {
        let registry = LoggerRegistry::new(Arc::new(TracingEngine::new()));
        let logger = traced_logger(&registry);
        let events = capture(|| {
            log_warn!(logger, "retry {}", 3).unwrap();
        });

        let (level, fields) = &events[0];
        assert_eq!(*level, tracing::Level::WARN);
        assert_eq!(field(fields, "message"), Some("retry 3"));
        assert_eq!(field(fields, "method"), Some("test_macro_event_names_function"));
    }

    #[test]
    fn test_tracing_off_emits_blank_fields() {
        let registry = LoggerRegistry::new(Arc::new(TracingEngine::new()));
        let logger = traced_logger(&registry);
        logger.set_tracing(Some(false));
        let events = capture(|| logger.debug("quiet").unwrap());

        let (_, fields) = &events[0];
        assert_eq!(field(fields, "file"), Some(""));
        assert_eq!(field(fields, "line"), Some(""));
        assert_eq!(field(fields, "method"), Some(""));
    }

    #[test]
    fn test_threshold_filters_under_subscriber() {
        let engine = TracingEngine::new();
        let sink = engine.sink("lineage.Gate");
        sink.set_threshold(Some(Level::Warn));
        let events = capture(|| {
            assert!(!sink.is_enabled(Level::Info).unwrap());
            assert!(sink.is_enabled(Level::Warn).unwrap());
            assert!(sink.is_enabled(Level::Fatal).unwrap());
        });
        assert!(events.is_empty());

        let registry = LoggerRegistry::new(Arc::new(TracingEngine::new()));
        let logger = traced_logger(&registry);
        logger.set_level(Some(Level::Error));
        assert!(capture(|| logger.warn("dropped").unwrap()).is_empty());
    }
}
