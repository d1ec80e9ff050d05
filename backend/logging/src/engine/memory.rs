//! In-memory engine that records every emit.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use lineage_core::{keys, ContextStore, Engine, EngineError, Level, Sink, Throwable};
use serde::Serialize;

use super::thread_context::ThreadContext;

/// One recorded emit.
#[derive(Debug, Clone, Serialize)]
pub struct Emitted {
    pub sink: String,
    pub level: Level,
    pub message: String,
    #[serde(skip)]
    pub cause: Option<Throwable>,
    /// Caller-context entries as seen by the engine during the emit.
    pub context: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl Emitted {
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }
}

const NO_OVERRIDE: u8 = 0;
const FORCE_OFF: u8 = 1;
const FORCE_ON: u8 = 2;

#[derive(Default)]
struct Shared {
    records: Mutex<Vec<Emitted>>,
    enabled_override: AtomicU8,
    fail_emit: AtomicBool,
    fail_enabled: AtomicBool,
    context: CountingContext,
}

impl Shared {
    fn records(&self) -> MutexGuard<'_, Vec<Emitted>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Thread-local context that also counts writes made through this engine.
#[derive(Default)]
struct CountingContext {
    inner: ThreadContext,
    writes: AtomicUsize,
}

impl ContextStore for CountingContext {
    fn put(&self, key: &str, value: &str) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.inner.put(key, value);
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }
}

/// Engine that keeps emitted messages in memory.
///
/// Besides recording, it can pretend every severity is enabled or disabled
/// and can fail `emit` or `is_enabled` on demand.
#[derive(Default)]
pub struct MemoryEngine {
    shared: Arc<Shared>,
    sinks: Mutex<HashMap<String, Arc<MemorySink>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every emit so far, oldest first.
    pub fn records(&self) -> Vec<Emitted> {
        self.shared.records().clone()
    }

    /// Drain the recorded emits.
    pub fn take(&self) -> Vec<Emitted> {
        std::mem::take(&mut *self.shared.records())
    }

    pub fn clear(&self) {
        self.shared.records().clear();
    }

    /// `Some(flag)` makes every sink answer `is_enabled` with `flag`;
    /// `None` restores threshold-based answers.
    pub fn force_enabled(&self, enabled: Option<bool>) {
        let code = match enabled {
            Some(true) => FORCE_ON,
            Some(false) => FORCE_OFF,
            None => NO_OVERRIDE,
        };
        self.shared.enabled_override.store(code, Ordering::Relaxed);
    }

    /// Make `emit` record the message and then return an error.
    pub fn fail_emits(&self, fail: bool) {
        self.shared.fail_emit.store(fail, Ordering::Relaxed);
    }

    /// Make `is_enabled` return an error.
    pub fn fail_enabled_checks(&self, fail: bool) {
        self.shared.fail_enabled.store(fail, Ordering::Relaxed);
    }

    /// Number of context writes made through this engine.
    pub fn context_writes(&self) -> usize {
        self.shared.context.writes.load(Ordering::Relaxed)
    }
}

impl Engine for MemoryEngine {
    fn sink(&self, name: &str) -> Arc<dyn Sink> {
        let mut sinks = self.sinks.lock().unwrap_or_else(PoisonError::into_inner);
        sinks
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(MemorySink {
                    name: name.to_string(),
                    threshold: AtomicU8::new(0),
                    shared: self.shared.clone(),
                })
            })
            .clone()
    }

    fn context(&self) -> &dyn ContextStore {
        &self.shared.context
    }
}

struct MemorySink {
    name: String,
    threshold: AtomicU8,
    shared: Arc<Shared>,
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self, level: Level) -> Result<bool, EngineError> {
        if self.shared.fail_enabled.load(Ordering::Relaxed) {
            return Err(EngineError::UnsupportedLevel {
                sink: self.name.clone(),
                level,
            });
        }
        match self.shared.enabled_override.load(Ordering::Relaxed) {
            FORCE_ON => Ok(true),
            FORCE_OFF => Ok(false),
            _ => Ok(self.threshold().map_or(true, |threshold| level >= threshold)),
        }
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
        let context = self
            .shared
            .context
            .inner
            .snapshot()
            .into_iter()
            .filter(|(key, _)| keys::ALL.contains(&key.as_str()))
            .collect();
        self.shared.records().push(Emitted {
            sink: self.name.clone(),
            level,
            message: message.to_string(),
            cause: cause.cloned(),
            context,
            timestamp: Utc::now(),
        });

        if self.shared.fail_emit.load(Ordering::Relaxed) {
            return Err(EngineError::Emit {
                sink: self.name.clone(),
                message: "emit failure requested".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let engine = MemoryEngine::new();
        let sink = engine.sink("lineage.M");
        sink.emit(Level::Info, "first", None).unwrap();
        sink.emit(Level::Warn, "second", None).unwrap();
        let records = engine.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].level, Level::Warn);
        assert!(engine.records().is_empty());
    }

    #[test]
    fn test_emit_snapshots_context() {
        let engine = MemoryEngine::new();
        engine.context().put(keys::FILE_NAME, "lib.rs");
        engine.sink("lineage.M").emit(Level::Info, "x", None).unwrap();
        engine.context().remove(keys::FILE_NAME);
        let record = &engine.records()[0];
        assert_eq!(record.context_value(keys::FILE_NAME), Some("lib.rs"));
        assert_eq!(record.context_value(keys::LINE_NUMBER), None);
        assert_eq!(engine.context_writes(), 1);
    }

    #[test]
    fn test_record_serializes_without_cause() {
        let engine = MemoryEngine::new();
        let cause: Throwable = Arc::new(std::fmt::Error);
        engine.sink("lineage.J").emit(Level::Fatal, "down", Some(&cause)).unwrap();
        let json = serde_json::to_value(&engine.records()[0]).unwrap();
        assert_eq!(json["level"], "fatal");
        assert_eq!(json["message"], "down");
        assert!(json.get("cause").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_failure_injection() {
        let engine = MemoryEngine::new();
        let sink = engine.sink("lineage.F");
        engine.fail_emits(true);
        assert!(matches!(
            sink.emit(Level::Error, "x", None),
            Err(EngineError::Emit { .. })
        ));
        assert_eq!(engine.records().len(), 1);

        engine.fail_enabled_checks(true);
        assert!(sink.is_enabled(Level::Info).is_err());
    }

    #[test]
    fn test_force_enabled_overrides_threshold() {
        let engine = MemoryEngine::new();
        let sink = engine.sink("lineage.T");
        sink.set_threshold(Some(Level::Fatal));
        assert!(!sink.is_enabled(Level::Debug).unwrap());
        engine.force_enabled(Some(true));
        assert!(sink.is_enabled(Level::Debug).unwrap());
        engine.force_enabled(Some(false));
        assert!(!sink.is_enabled(Level::Fatal).unwrap());
    }
}
