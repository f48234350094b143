//! Testing utilities for stream writers
//!
//! This module provides collaborators for exercising a writer without a real
//! dataset:
//!
//! - **Cursors**: in-memory elements, injected read failures, and a gated
//!   cursor that parks the writer at a known point
//! - **Sinks**: a sink factory that fails chunk creation, appends or close
//!
//! # Example
//!
//! ```ignore
//! use snapstream_durability::testing::{FailingCursor, VecCursor};
//!
//! // Fail on the second pull
//! let cursor = FailingCursor::new(VecCursor::with_sizes(&[400, 400]), 1);
//! ```

mod cursors;
mod sinks;

pub use cursors::{CursorGate, FailingCursor, GatedCursor, VecCursor};
pub use sinks::{FailingSinkFactory, SinkFailure};
