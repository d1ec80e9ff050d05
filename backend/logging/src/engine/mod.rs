//! Backing engines.
//!
//! - `TracingEngine`: production engine that turns every emit into a
//!   `tracing` event
//! - `MemoryEngine`: records emits in memory, for tests and diagnostics

mod memory;
mod thread_context;
mod tracing_engine;

pub use memory::{Emitted, MemoryEngine};
pub use thread_context::ThreadContext;
pub use tracing_engine::{TracingEngine, TracingSink};
