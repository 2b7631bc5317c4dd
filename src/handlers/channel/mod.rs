//! Channel command handlers.
//!
//! Handles JOIN, PART, INVITE, TOPIC, NAMES commands.
//!
//! Every handler here locks the channel before any client record, and a
//! channel found with `destroyed` set is treated as absent.

mod common;
mod invite;
mod join;
mod names;
mod part;
mod topic;

pub use invite::InviteHandler;
pub use join::JoinHandler;
pub use names::NamesHandler;
pub use part::PartHandler;
pub use topic::TopicHandler;
