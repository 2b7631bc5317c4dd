//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ListenConfig)
//! - [`limits`]: Line length, send queue, flood and timeout limits (LimitsConfig)
//! - [`policy`]: Channel policy switches (PolicyConfig)
//! - [`debug`]: Per-subsystem debug logging switches (DebugConfig)
//! - [`oper`]: Operator blocks (OperBlock)
//! - [`validation`]: Startup checks

mod debug;
mod limits;
mod oper;
mod policy;
mod types;
mod validation;

pub use debug::DebugConfig;
pub use limits::LimitsConfig;
pub use oper::OperBlock;
pub use policy::PolicyConfig;
pub use types::{Config, ConfigError, DatabaseConfig, ListenConfig, ServerConfig};
pub use validation::{ValidationError, validate};
