use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::level::Level;

/// A cause object the backing engine knows how to render on its own.
///
/// Engines receive it next to the message so they can print the underlying
/// failure with their native formatting.
pub type Throwable = Arc<dyn StdError + Send + Sync + 'static>;

/// Failures raised by a backing engine.
///
/// The facade never wraps these: whatever a sink returns from `is_enabled`
/// or `emit` reaches the caller of the logging method unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sink {sink} cannot evaluate severity {level}")]
    UnsupportedLevel { sink: String, level: Level },

    #[error("sink {sink} failed to emit: {message}")]
    Emit { sink: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A native error that carries an underlying foreign throwable.
///
/// Logging one of these renders the wrapper into the message and hands the
/// inner throwable to the engine separately. A wrapper whose throwable is
/// missing is logged as an ordinary error.
#[derive(Clone)]
pub struct ForeignException {
    description: String,
    throwable: Option<Throwable>,
}

impl ForeignException {
    pub fn new(description: impl Into<String>, throwable: Throwable) -> Self {
        Self {
            description: description.into(),
            throwable: Some(throwable),
        }
    }

    /// Wrap any error value as the foreign cause, using its display text as
    /// the wrapper description.
    pub fn wrap<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let description = format!("{}: {}", short_type_name::<E>(), error);
        Self::new(description, Arc::new(error))
    }

    /// A wrapper whose cause could not be recovered.
    pub fn detached(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            throwable: None,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The underlying throwable, if the wrapper still holds one.
    pub fn throwable(&self) -> Option<&Throwable> {
        self.throwable.as_ref()
    }
}

impl fmt::Display for ForeignException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl fmt::Debug for ForeignException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignException")
            .field("description", &self.description)
            .field("has_throwable", &self.throwable.is_some())
            .finish()
    }
}

impl StdError for ForeignException {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.throwable
            .as_ref()
            .map(|t| t.as_ref() as &(dyn StdError + 'static))
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
