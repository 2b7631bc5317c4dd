//! Core handler infrastructure.
//!
//! This module contains the handler trait, the per-command context, and the
//! registry that dispatches parsed lines to handlers.

pub mod context;
pub mod registry;

pub use context::{Context, Handler};
pub use registry::Registry;
