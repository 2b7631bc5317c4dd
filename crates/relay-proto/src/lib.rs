//! # relay-proto
//!
//! Wire-level building blocks for the relayd chat protocol, an IRC-family
//! line protocol.
//!
//! ## Features
//!
//! - Line parsing into a borrowed [`MessageRef`] (prefix, verb, up to 15 arguments)
//! - RFC 1459 case mapping for nick and channel keys
//! - Nickname and channel-name validation
//! - Numeric reply codes ([`Response`])
//! - [`Reply`] values and their rendering against a recipient
//! - Optional Tokio [`LineCodec`] for framed transports
//!
//! ## Quick Start
//!
//! ```rust
//! use relay_proto::{Identifier, MessageRef, Reply, Response};
//!
//! struct Server;
//! impl Identifier for Server {
//!     fn id(&self) -> String {
//!         "chat.local".to_string()
//!     }
//! }
//!
//! let msg = MessageRef::parse("PING :token").expect("valid line");
//! assert_eq!(msg.command_name(), "PING");
//!
//! let reply = Reply::direct(&Server, Response::RPL_YOUREOPER, ":You are now an IRC operator");
//! assert_eq!(
//!     reply.render("alice"),
//!     ":chat.local 381 alice :You are now an IRC operator\r\n"
//! );
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod nick;
pub mod reply;
pub mod response;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::error::{ProtocolError, Result};
#[cfg(feature = "tokio")]
pub use self::line::{DecodedLine, LineCodec};
pub use self::message::{MessageRef, MAX_PARAMS};
pub use self::nick::{NickExt, DEFAULT_NICK_MAX_LEN};
pub use self::reply::{Code, Identifier, Reply, ReplyTarget};
pub use self::response::Response;
