//! Per-connection client state.

use super::Uid;
use relay_proto::Identifier;
use std::collections::HashSet;

/// Registration progress of a connection.
///
/// `Connecting` → `Identified` (NICK seen) or `UserSent` (USER seen) →
/// `Registered` → `Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connecting,
    Identified,
    UserSent,
    Registered,
    Closed,
}

/// User modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserModes {
    /// +i
    pub invisible: bool,
    /// +o, only granted by OPER.
    pub operator: bool,
}

impl UserModes {
    /// Mode string such as `+io`, or `+` when nothing is set.
    pub fn as_mode_string(&self) -> String {
        let mut s = String::from("+");
        if self.invisible {
            s.push('i');
        }
        if self.operator {
            s.push('o');
        }
        s
    }
}

/// A connected client.
#[derive(Debug)]
pub struct Client {
    pub uid: Uid,
    pub nick: Option<String>,
    pub user: Option<String>,
    pub realname: Option<String>,
    pub host: String,
    pub modes: UserModes,
    pub stage: Stage,
    /// Case-folded names of joined channels.
    pub channels: HashSet<String>,
    /// Unix timestamp of the accept.
    pub connected_at: i64,
}

impl Client {
    pub fn new(uid: Uid, host: String) -> Self {
        Self {
            uid,
            nick: None,
            user: None,
            realname: None,
            host,
            modes: UserModes::default(),
            stage: Stage::Connecting,
            channels: HashSet::new(),
            connected_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Nick, or `*` before one is chosen.
    pub fn nick_or_star(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }

    /// `nick!user@host`.
    pub fn mask(&self) -> String {
        format!(
            "{}!{}@{}",
            self.nick_or_star(),
            self.user.as_deref().unwrap_or("*"),
            self.host
        )
    }

    pub fn is_registered(&self) -> bool {
        self.stage == Stage::Registered
    }

    pub fn is_closed(&self) -> bool {
        self.stage == Stage::Closed
    }

    /// Recompute the stage after NICK or USER.
    ///
    /// Returns `true` exactly once: on the transition into `Registered`.
    pub fn refresh_stage(&mut self) -> bool {
        if matches!(self.stage, Stage::Registered | Stage::Closed) {
            return false;
        }
        self.stage = match (self.nick.is_some(), self.user.is_some()) {
            (true, true) => Stage::Registered,
            (true, false) => Stage::Identified,
            (false, true) => Stage::UserSent,
            (false, false) => Stage::Connecting,
        };
        self.stage == Stage::Registered
    }
}

impl Identifier for Client {
    fn id(&self) -> String {
        self.mask()
    }
}
