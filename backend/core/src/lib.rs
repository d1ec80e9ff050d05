//! `lineage-core`: shared types for the Lineage logger facade.
//!
//! Holds the severity type, the bulk attribute set, logical-name mapping,
//! and the traits a backing logging engine implements.

pub mod error;
pub mod level;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{EngineError, ForeignException, Throwable};
pub use level::{Level, ParseLevelError};
pub use names::{canonicalize, parent_of, NameMapper, DEFAULT_NAMESPACE, SEPARATOR};
pub use traits::{keys, ContextStore, Engine, Sink};
pub use types::LoggerAttributes;
