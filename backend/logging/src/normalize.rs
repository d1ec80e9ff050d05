//! Turns heterogeneous log arguments into a `(message, cause)` pair.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

use lineage_core::{ForeignException, Throwable};

use crate::context::CallSite;

/// A single argument to a logging call.
///
/// Display values, `anyhow::Error`, [`ForeignException`] and boxed
/// `dyn Error` convert with `into()`; other error types go through
/// [`LogArg::error`].
pub enum LogArg {
    /// Anything that is logged by its display text.
    Value(String),
    /// An error value; rendered with its source chain and location.
    Error(anyhow::Error),
}

impl LogArg {
    pub fn value(value: impl fmt::Display) -> Self {
        LogArg::Value(value.to_string())
    }

    pub fn error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        LogArg::Error(anyhow::Error::new(error))
    }
}

impl fmt::Debug for LogArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            LogArg::Error(error) => f.debug_tuple("Error").field(&error.to_string()).finish(),
        }
    }
}

macro_rules! display_args {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for LogArg {
            fn from(value: $ty) -> Self {
                LogArg::Value(value.to_string())
            }
        }
    )*};
}

display_args!(
    &str, &String, char, bool,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

impl From<String> for LogArg {
    fn from(value: String) -> Self {
        LogArg::Value(value)
    }
}

impl From<Cow<'_, str>> for LogArg {
    fn from(value: Cow<'_, str>) -> Self {
        LogArg::Value(value.into_owned())
    }
}

impl From<fmt::Arguments<'_>> for LogArg {
    fn from(value: fmt::Arguments<'_>) -> Self {
        LogArg::Value(value.to_string())
    }
}

impl From<anyhow::Error> for LogArg {
    fn from(error: anyhow::Error) -> Self {
        LogArg::Error(error)
    }
}

impl From<ForeignException> for LogArg {
    fn from(error: ForeignException) -> Self {
        LogArg::Error(anyhow::Error::new(error))
    }
}

impl From<Box<dyn StdError + Send + Sync>> for LogArg {
    fn from(error: Box<dyn StdError + Send + Sync>) -> Self {
        LogArg::Error(anyhow::anyhow!(error))
    }
}

/// Result of normalizing a [`LogArg`].
#[derive(Debug, Clone)]
pub struct Normalized {
    pub message: String,
    pub cause: Option<Throwable>,
}

/// Produce the message and cause handed to the sink.
///
/// Errors always carry the call site in their rendering. Only a
/// [`ForeignException`] that still holds its throwable yields a cause.
pub fn normalize(arg: LogArg, site: &CallSite) -> Normalized {
    match arg {
        LogArg::Value(message) => Normalized {
            message,
            cause: None,
        },
        LogArg::Error(error) => {
            let foreign = error
                .downcast_ref::<ForeignException>()
                .and_then(ForeignException::throwable)
                .cloned();
            match foreign {
                Some(cause) => Normalized {
                    message: render(format!("{error:#}"), site),
                    cause: Some(cause),
                },
                None => Normalized {
                    message: render(format!("{error:?}"), site),
                    cause: None,
                },
            }
        }
    }
}

fn render(mut text: String, site: &CallSite) -> String {
    let _ = write!(text, "\n    at {site}");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_plain_value_is_stringified() {
        let normalized = normalize(7_i32.into(), &CallSite::caller());
        assert_eq!(normalized.message, "7");
        assert!(normalized.cause.is_none());
    }

    #[test]
    fn test_native_error_renders_chain_and_location() {
        let error = anyhow::anyhow!("some error").context("while loading");
        let normalized = normalize(error.into(), &CallSite::caller());
        assert!(normalized.message.starts_with("while loading"));
        assert!(normalized.message.contains("some error"));
        assert!(normalized.message.contains(file!()));
        assert!(normalized.cause.is_none());
    }

    #[test]
    fn test_foreign_exception_passes_cause_through() {
        let inner: Throwable = Arc::new("nan".parse::<i64>().unwrap_err());
        let wrapped = ForeignException::new("NumberFormatException: not a number", inner.clone());
        let normalized = normalize(wrapped.into(), &CallSite::caller());
        assert!(normalized.message.contains("not a number"));
        assert!(normalized.message.contains(file!()));
        assert!(Arc::ptr_eq(normalized.cause.as_ref().unwrap(), &inner));
    }

    #[test]
    fn test_detached_foreign_exception_is_native() {
        let wrapped = ForeignException::detached("lost its cause");
        let normalized = normalize(wrapped.into(), &CallSite::caller());
        assert!(normalized.message.contains("lost its cause"));
        assert!(normalized.cause.is_none());
    }

    #[test]
    fn test_boxed_error_is_native() {
        let boxed: Box<dyn StdError + Send + Sync> = "x1".parse::<u8>().unwrap_err().into();
        let arg = LogArg::from(boxed);
        assert!(matches!(arg, LogArg::Error(_)));
        let normalized = normalize(arg, &CallSite::caller());
        assert!(normalized.message.contains("invalid digit"));
        assert!(normalized.message.contains(file!()));
        assert!(normalized.cause.is_none());
    }

    #[test]
    fn test_foreign_exception_behind_context_still_unwraps() {
        let inner: Throwable = Arc::new(std::io::Error::other("socket closed"));
        let error = anyhow::Error::new(ForeignException::new("IOException", inner.clone()))
            .context("sending batch");
        let normalized = normalize(error.into(), &CallSite::caller());
        assert!(normalized.message.starts_with("sending batch"));
        assert!(Arc::ptr_eq(normalized.cause.as_ref().unwrap(), &inner));
    }
}
