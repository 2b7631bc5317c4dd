//! Server state.
//!
//! - [`Matrix`]: the shared registries (clients, channels, nicks, outbound queues)
//! - [`Client`]: per-connection identity, registration stage and memberships
//! - [`Channel`]: membership, topic, admission modes and invitations

mod channel;
mod client;
mod matrix;
mod uid;

pub use channel::{Channel, MemberModes, Topic};
pub use client::{Client, Stage};
pub use matrix::{CHANNEL_MODES, Matrix, MatrixConfig, NickInUse, ServerInfo, USER_MODES, VERSION};
pub use uid::{Uid, UidGenerator};

#[cfg(test)]
pub(crate) use matrix::test_support;
