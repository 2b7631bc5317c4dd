//! IRC command handlers.
//!
//! This module contains the Handler trait and command registry for dispatching
//! incoming IRC messages to appropriate handlers.
//!
//! Handlers receive `MessageRef<'_>` which borrows from the decoded line. Use
//! `msg.arg(n)` to access arguments as `&str` slices. Replies for the issuing
//! client go through `ctx.reply`; anything for other clients is delivered
//! through `Matrix::deliver`.

mod channel;
mod connection;
mod core;
mod messaging;
mod mode;
mod oper;
pub mod replies;

pub use self::core::{Context, Handler, Registry};

pub use crate::error::{HandlerError, HandlerResult};
