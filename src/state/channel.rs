//! Channel state: membership, topic, admission modes and pending invitations.

use super::Uid;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;

/// Maximum pending invitations kept per channel; the oldest is dropped first.
pub const MAX_INVITES_PER_CHANNEL: usize = 100;

/// Per-member role flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberModes {
    pub op: bool,
    pub voice: bool,
}

impl MemberModes {
    /// NAMES prefix for the highest role held.
    pub fn prefix_char(&self) -> Option<char> {
        if self.op {
            Some('@')
        } else if self.voice {
            Some('+')
        } else {
            None
        }
    }
}

/// Admission modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelModes {
    /// +i
    pub invite_only: bool,
    /// +k
    pub key: Option<String>,
}

impl ChannelModes {
    pub fn is_empty(&self) -> bool {
        !self.invite_only && self.key.is_none()
    }

    /// Mode string with parameters, e.g. `+ik secret`.
    pub fn as_mode_string(&self) -> String {
        let mut s = String::from("+");
        if self.invite_only {
            s.push('i');
        }
        if let Some(key) = &self.key {
            s.push('k');
            s.push(' ');
            s.push_str(key);
        }
        s
    }

    /// Mode letters without the key, for viewers outside the channel.
    pub fn letters(&self) -> String {
        let mut s = String::from("+");
        if self.invite_only {
            s.push('i');
        }
        if self.key.is_some() {
            s.push('k');
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub text: String,
    pub set_by: String,
    pub set_at: i64,
}

#[derive(Debug, Clone)]
pub struct InviteEntry {
    pub uid: Uid,
    pub set_at: Instant,
}

/// A channel. Lives in `Matrix::channels` behind an `RwLock`.
#[derive(Debug)]
pub struct Channel {
    /// Display name as given by the creator.
    pub name: String,
    pub topic: Option<Topic>,
    pub modes: ChannelModes,
    pub members: HashMap<Uid, MemberModes>,
    pub invites: VecDeque<InviteEntry>,
    /// Set when the last member leaves, just before removal from the registry.
    /// A joiner that finds this flag must look the channel up again.
    pub destroyed: bool,
}

impl Channel {
    pub fn new(name: String) -> Self {
        Self {
            name,
            topic: None,
            modes: ChannelModes::default(),
            members: HashMap::new(),
            invites: VecDeque::new(),
            destroyed: false,
        }
    }

    pub fn is_member(&self, uid: &str) -> bool {
        self.members.contains_key(uid)
    }

    pub fn is_operator(&self, uid: &str) -> bool {
        self.members.get(uid).is_some_and(|m| m.op)
    }

    /// Compare a supplied key against `+k` in constant time.
    /// A channel without a key accepts anything.
    pub fn key_matches(&self, supplied: Option<&str>) -> bool {
        match (&self.modes.key, supplied) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(key), Some(given)) => key.as_bytes().ct_eq(given.as_bytes()).into(),
        }
    }

    fn prune_invites(&mut self, now: Instant, ttl: Duration) {
        while let Some(front) = self.invites.front() {
            if now.saturating_duration_since(front.set_at) > ttl {
                self.invites.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record an invitation, refreshing an existing one for the same client.
    pub fn add_invite(&mut self, uid: Uid, now: Instant, ttl: Duration) {
        self.prune_invites(now, ttl);
        self.invites.retain(|entry| entry.uid != uid);
        self.invites.push_back(InviteEntry { uid, set_at: now });

        while self.invites.len() > MAX_INVITES_PER_CHANNEL {
            self.invites.pop_front();
        }
    }

    pub fn is_invited(&mut self, uid: &str, now: Instant, ttl: Duration) -> bool {
        self.prune_invites(now, ttl);
        self.invites.iter().any(|entry| entry.uid == uid)
    }

    /// Consume the invitation for `uid`. Returns whether one was pending.
    pub fn take_invite(&mut self, uid: &str) -> bool {
        let before = self.invites.len();
        self.invites.retain(|entry| entry.uid != uid);
        self.invites.len() != before
    }
}
