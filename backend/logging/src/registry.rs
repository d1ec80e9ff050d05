//! Registry owning every logger, one per canonical name.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lineage_config::LineageConfig;
use lineage_core::{canonicalize, parent_of, Engine, LoggerAttributes, NameMapper};
use tracing::{debug, info};

use crate::logger::Logger;

/// Owns all loggers created against one backing engine.
///
/// Loggers are created on first request and never removed or replaced, so
/// every lookup of a name yields the same `Arc`. Share the registry itself
/// as `Arc<LoggerRegistry>` with whatever needs to create loggers.
pub struct LoggerRegistry {
    engine: Arc<dyn Engine>,
    mapper: NameMapper,
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    /// Registry using the default sink namespace.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_mapper(engine, NameMapper::default())
    }

    pub fn with_mapper(engine: Arc<dyn Engine>, mapper: NameMapper) -> Self {
        Self {
            engine,
            mapper,
            loggers: RwLock::new(HashMap::new()),
        }
    }

    /// Registry using the configured namespace, with every configured
    /// logger's attributes applied.
    pub fn from_config(engine: Arc<dyn Engine>, config: &LineageConfig) -> Self {
        let mapper = config
            .namespace
            .as_deref()
            .map(NameMapper::new)
            .unwrap_or_default();
        let registry = Self::with_mapper(engine, mapper);
        registry.configure(config);
        registry
    }

    pub fn mapper(&self) -> &NameMapper {
        &self.mapper
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// The logger for `identifier`, created on first use.
    pub fn get(&self, identifier: &str) -> Arc<Logger> {
        self.get_with(identifier, None)
    }

    /// Like [`get`](Self::get), applying `attributes` when the logger is
    /// created by this call. On a cache hit the attributes are ignored.
    pub fn get_with(&self, identifier: &str, attributes: Option<&LoggerAttributes>) -> Arc<Logger> {
        let name = canonicalize(identifier);
        if let Some(existing) = self.read().get(&name) {
            return existing.clone();
        }

        // Ancestors are created before taking the write lock.
        let parent = if name.is_empty() {
            None
        } else {
            Some(match parent_of(&name) {
                Some(parent_name) => self.get(&parent_name),
                None => self.root(),
            })
        };

        let mut loggers = self.write();
        loggers
            .entry(name)
            .or_insert_with_key(|name| {
                let sink = self.engine.sink(&self.mapper.to_sink_name(name));
                let logger = Arc::new(Logger::new(
                    name.clone(),
                    self.engine.clone(),
                    sink,
                    parent.as_ref(),
                ));
                logger.set_attributes(attributes);
                debug!(logger = %name, sink = %logger.sink_name(), "Logger created");
                logger
            })
            .clone()
    }

    pub fn root(&self) -> Arc<Logger> {
        self.get("")
    }

    /// Same identity as [`get`](Self::get) for a name already in use.
    pub fn lookup(&self, identifier: &str) -> Arc<Logger> {
        self.get(identifier)
    }

    /// Whether a logger exists for `identifier` without creating one.
    pub fn contains(&self, identifier: &str) -> bool {
        self.read().contains_key(&canonicalize(identifier))
    }

    /// Canonical names of every logger created so far, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Assign each configured logger's attributes, creating loggers as
    /// needed. Unlike `get_with`, existing loggers are updated too.
    pub fn configure(&self, config: &LineageConfig) {
        for (name, attributes) in &config.loggers {
            self.get(name).set_attributes(Some(attributes));
        }
        info!(loggers = config.loggers.len(), "Applied logger configuration");
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Logger>>> {
        self.loggers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Logger>>> {
        self.loggers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("namespace", &self.mapper.namespace())
            .field("loggers", &self.len())
            .finish()
    }
}
