//! The Matrix - Central shared state for the chat server.
//!
//! The Matrix holds all clients, channels, and server state in concurrent
//! data structures accessible from any connection task.
//!
//! Lock order: a channel lock is always taken before a client lock. No
//! `DashMap` guard is held across an `.await`; entries are cloned out first.

use crate::config::{Config, DebugConfig, LimitsConfig, OperBlock, PolicyConfig};
use crate::db::ChannelStore;
use crate::security::RateLimitManager;
use crate::state::{Channel, Client, UidGenerator};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use relay_proto::{Identifier, Reply, irc_to_lower};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use super::Uid;

/// Version string advertised in RPL_YOURHOST and RPL_MYINFO.
pub const VERSION: &str = concat!("relayd-", env!("CARGO_PKG_VERSION"));

/// User modes advertised in RPL_MYINFO.
pub const USER_MODES: &str = "io";

/// Channel modes advertised in RPL_MYINFO.
pub const CHANNEL_MODES: &str = "ik";

/// The Matrix - Central shared state container.
pub struct Matrix {
    /// All connected clients, indexed by UID.
    pub users: DashMap<Uid, Arc<RwLock<Client>>>,

    /// All channels, indexed by case-folded name.
    pub channels: DashMap<String, Arc<RwLock<Channel>>>,

    /// Case-folded nick to UID.
    pub nicks: DashMap<String, Uid>,

    /// UID to outbound queue.
    pub senders: DashMap<Uid, mpsc::Sender<Arc<Reply>>>,

    /// This server's identity.
    pub server_info: ServerInfo,

    /// UID generator for new connections.
    pub uid_gen: UidGenerator,

    /// Configuration for handlers.
    pub config: MatrixConfig,

    /// Inbound flood protection.
    pub rate_limiter: RateLimitManager,

    /// Topic persistence.
    pub store: Arc<dyn ChannelStore>,
}

/// Configuration accessible to handlers via Matrix.
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    pub oper_blocks: Vec<OperBlock>,
    pub limits: LimitsConfig,
    pub policy: PolicyConfig,
    pub debug: DebugConfig,
}

impl MatrixConfig {
    pub fn invite_ttl(&self) -> Duration {
        Duration::from_secs(self.policy.invite_ttl_secs)
    }
}

/// This server's identity information.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    /// Identifier used as the source of server replies.
    pub name: String,
    /// Host name shown in RPL_YOURHOST.
    pub hostname: String,
    pub created: DateTime<Utc>,
}

impl ServerInfo {
    /// Creation time in RFC 1123 form, e.g. `Mon, 02 Jan 2006 15:04:05 UTC`.
    pub fn created_rfc1123(&self) -> String {
        self.created.format("%a, %d %b %Y %H:%M:%S %Z").to_string()
    }
}

impl Identifier for ServerInfo {
    fn id(&self) -> String {
        self.name.clone()
    }
}

/// The requested nick belongs to another client.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("nickname in use: {0}")]
pub struct NickInUse(pub String);

impl Matrix {
    /// Create a new Matrix from configuration.
    pub fn new(config: &Config, store: Arc<dyn ChannelStore>) -> Self {
        Self {
            users: DashMap::new(),
            channels: DashMap::new(),
            nicks: DashMap::new(),
            senders: DashMap::new(),
            server_info: ServerInfo {
                name: config.server.name.clone(),
                hostname: config.server.hostname().to_string(),
                created: Utc::now(),
            },
            uid_gen: UidGenerator::new(config.server.sid.clone()),
            config: MatrixConfig {
                oper_blocks: config.oper.clone(),
                limits: config.limits.clone(),
                policy: config.policy.clone(),
                debug: config.debug,
            },
            rate_limiter: RateLimitManager::new(&config.limits),
            store,
        }
    }

    /// Register a freshly accepted connection.
    ///
    /// Returns the new UID and the receiving end of its outbound queue.
    /// Ids wrap after 36^6 connections; one still held by a live client is
    /// skipped.
    pub fn add_connection(&self, addr: SocketAddr) -> (Uid, mpsc::Receiver<Arc<Reply>>) {
        let uid = loop {
            let uid = self.uid_gen.next();
            match self.users.entry(uid.clone()) {
                Entry::Occupied(_) => {
                    warn!(uid = %uid, "UID still in use, skipping");
                }
                Entry::Vacant(v) => {
                    let client = Client::new(uid.clone(), addr.ip().to_string());
                    v.insert(Arc::new(RwLock::new(client)));
                    break uid;
                }
            }
        };
        let (tx, rx) = mpsc::channel(self.config.limits.sendq_lines);
        self.senders.insert(uid.clone(), tx);
        (uid, rx)
    }

    pub fn client(&self, uid: &str) -> Option<Arc<RwLock<Client>>> {
        self.users.get(uid).map(|c| Arc::clone(c.value()))
    }

    /// Look up a channel by name (any case).
    pub fn channel(&self, name: &str) -> Option<Arc<RwLock<Channel>>> {
        self.channels
            .get(&irc_to_lower(name))
            .map(|c| Arc::clone(c.value()))
    }

    /// Look up a client by nick (any case).
    pub fn uid_for_nick(&self, nick: &str) -> Option<Uid> {
        self.nicks.get(&irc_to_lower(nick)).map(|u| u.value().clone())
    }

    /// Queue a reply for a connection without blocking.
    ///
    /// A full queue disconnects the recipient: its sender is dropped, which
    /// ends the connection's read loop with "SendQ exceeded".
    pub fn deliver(&self, uid: &str, reply: Arc<Reply>) -> bool {
        let Some(sender) = self.senders.get(uid).map(|s| s.value().clone()) else {
            return false;
        };
        match sender.try_send(reply) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(uid = %uid, "SendQ exceeded, dropping client");
                self.senders.remove(uid);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Queue the same reply for several connections.
    pub fn deliver_all<'a, I>(&self, uids: I, reply: &Arc<Reply>)
    where
        I: IntoIterator<Item = &'a Uid>,
    {
        for uid in uids {
            self.deliver(uid, Arc::clone(reply));
        }
    }

    /// Give `client` the nick `new_nick`.
    ///
    /// The registry entry for the new nick is claimed before the old one is
    /// released, so no other client can slip in between. A case variant of the
    /// client's own nick is always allowed. Returns the previous nick.
    pub fn claim_nick(
        &self,
        client: &mut Client,
        new_nick: &str,
    ) -> Result<Option<String>, NickInUse> {
        let new_key = irc_to_lower(new_nick);
        let old_key = client.nick.as_deref().map(irc_to_lower);

        match self.nicks.entry(new_key.clone()) {
            Entry::Occupied(e) if e.get() != &client.uid => {
                return Err(NickInUse(new_nick.to_string()));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(v) => {
                v.insert(client.uid.clone());
            }
        }

        if let Some(old_key) = old_key
            && old_key != new_key
        {
            self.nicks.remove_if(&old_key, |_, owner| owner == &client.uid);
        }

        Ok(client.nick.replace(new_nick.to_string()))
    }

    /// Distinct members of the given channels, excluding `exclude`.
    pub async fn channel_peers(&self, channel_keys: &[String], exclude: &str) -> Vec<Uid> {
        let mut seen = HashSet::new();
        for key in channel_keys {
            let Some(chan) = self.channels.get(key).map(|c| Arc::clone(c.value())) else {
                continue;
            };
            let chan = chan.read().await;
            for uid in chan.members.keys() {
                if uid != exclude {
                    seen.insert(uid.clone());
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Flag an empty channel destroyed and drop it from the registry.
    ///
    /// Must be called with the channel's write lock held. The registry entry
    /// is only removed if it still refers to this exact channel.
    pub fn destroy_if_empty(&self, key: &str, arc: &Arc<RwLock<Channel>>, chan: &mut Channel) {
        if !chan.members.is_empty() || chan.destroyed {
            return;
        }
        chan.destroyed = true;
        self.channels.remove_if(key, |_, v| Arc::ptr_eq(v, arc));
        if self.config.debug.channel {
            debug!(channel = %chan.name, "Channel destroyed");
        }
    }

    /// Tear down a connection: leave every channel, free the nick, drop the
    /// client and its queue. Safe to call more than once.
    pub async fn disconnect(&self, uid: &str, reason: &str) {
        let Some(client_arc) = self.client(uid) else {
            self.senders.remove(uid);
            self.rate_limiter.remove_client(uid);
            return;
        };

        // Closed first: a concurrent JOIN checks this under the client lock.
        let (mask, nick, channels, connected_at) = {
            let mut client = client_arc.write().await;
            client.stage = crate::state::Stage::Closed;
            (
                client.mask(),
                client.nick.clone(),
                client.channels.iter().cloned().collect::<Vec<_>>(),
                client.connected_at,
            )
        };

        for key in channels {
            let Some(chan_arc) = self.channels.get(&key).map(|c| Arc::clone(c.value())) else {
                continue;
            };
            let mut chan = chan_arc.write().await;
            if chan.members.remove(uid).is_none() {
                continue;
            }
            client_arc.write().await.channels.remove(&key);

            let part = Arc::new(Reply::group(
                &mask,
                "PART",
                &chan.name,
                format!(":{reason}"),
            ));
            self.deliver_all(chan.members.keys(), &part);
            if self.config.debug.channel {
                debug!(channel = %chan.name, uid = %uid, "Member left on disconnect");
            }
            self.destroy_if_empty(&key, &chan_arc, &mut chan);
        }

        if let Some(nick) = &nick {
            self.nicks.remove_if(&irc_to_lower(nick), |_, owner| owner == uid);
        }
        self.users.remove(uid);
        self.senders.remove(uid);
        self.rate_limiter.remove_client(uid);

        info!(
            uid = %uid,
            nick = nick.as_deref().unwrap_or("*"),
            reason = %reason,
            online_secs = Utc::now().timestamp() - connected_at,
            "Client disconnected"
        );
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::test_matrix;
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn nick_claims_are_exclusive_and_case_insensitive() {
        let matrix = test_matrix();
        let (a, _rx_a) = matrix.add_connection(addr());
        let (b, _rx_b) = matrix.add_connection(addr());
        let a_arc = matrix.client(&a).unwrap();
        let b_arc = matrix.client(&b).unwrap();

        assert_eq!(matrix.claim_nick(&mut *a_arc.write().await, "Alice"), Ok(None));
        assert_eq!(
            matrix.claim_nick(&mut *b_arc.write().await, "ALICE"),
            Err(NickInUse("ALICE".into()))
        );
        assert_eq!(b_arc.read().await.nick, None);
        assert_eq!(matrix.uid_for_nick("alice"), Some(a.clone()));

        // Case variant of one's own nick.
        assert_eq!(
            matrix.claim_nick(&mut *a_arc.write().await, "alice"),
            Ok(Some("Alice".into()))
        );
        assert_eq!(matrix.nicks.len(), 1);

        // Rename frees the old key.
        matrix.claim_nick(&mut *a_arc.write().await, "alicia").unwrap();
        assert_eq!(matrix.uid_for_nick("alice"), None);
        assert_eq!(matrix.claim_nick(&mut *b_arc.write().await, "alice"), Ok(None));
    }

    #[tokio::test]
    async fn reissued_uid_never_replaces_a_live_client() {
        let config = super::test_support::test_config();
        let mut matrix = Matrix::new(&config, Arc::new(crate::db::NoopStore));
        let (first, _rx1) = matrix.add_connection(addr());
        let original = matrix.client(&first).unwrap();

        // A fresh generator hands out the same ids again, as after a wrap.
        matrix.uid_gen = UidGenerator::new(config.server.sid.clone());
        let (second, _rx2) = matrix.add_connection(addr());

        assert_ne!(first, second);
        assert_eq!(matrix.users.len(), 2);
        assert!(Arc::ptr_eq(&matrix.client(&first).unwrap(), &original));
        assert!(matrix.senders.contains_key(&second));
    }

    #[tokio::test]
    async fn full_queue_drops_the_sender() {
        let matrix = test_matrix();
        let (uid, mut rx) = matrix.add_connection(addr());
        let reply = Arc::new(Reply::direct(&matrix.server_info, "PONG", "chat.local"));

        for _ in 0..matrix.config.limits.sendq_lines {
            assert!(matrix.deliver(&uid, Arc::clone(&reply)));
        }
        assert!(!matrix.deliver(&uid, Arc::clone(&reply)));
        assert!(matrix.senders.get(&uid).is_none());

        let mut drained = 0;
        while rx.recv().await.is_some() {
            drained += 1;
        }
        assert_eq!(drained, matrix.config.limits.sendq_lines);
    }

    #[tokio::test]
    async fn disconnect_cleans_every_registry() {
        let matrix = test_matrix();
        let (a, _rx_a) = matrix.add_connection(addr());
        let (b, mut rx_b) = matrix.add_connection(addr());

        for (uid, nick) in [(&a, "alice"), (&b, "bob")] {
            let arc = matrix.client(uid).unwrap();
            let mut c = arc.write().await;
            matrix.claim_nick(&mut c, nick).unwrap();
            c.user = Some(nick.into());
            c.refresh_stage();
        }

        // Both in #rust, only alice in #solo.
        for (key, members) in [("#rust", vec![&a, &b]), ("#solo", vec![&a])] {
            let mut chan = Channel::new(key.to_string());
            for uid in members {
                chan.members.insert(uid.clone(), Default::default());
                matrix.client(uid).unwrap().write().await.channels.insert(key.to_string());
            }
            matrix.channels.insert(key.to_string(), Arc::new(RwLock::new(chan)));
        }

        matrix.disconnect(&a, "Client Quit").await;

        assert!(matrix.client(&a).is_none());
        assert!(matrix.uid_for_nick("alice").is_none());
        assert!(matrix.senders.get(&a).is_none());
        assert!(matrix.channel("#solo").is_none());

        let rust = matrix.channel("#rust").unwrap();
        assert!(!rust.read().await.is_member(&a));
        assert!(rust.read().await.is_member(&b));

        let part = rx_b.recv().await.unwrap();
        assert_eq!(
            part.render("bob"),
            ":alice!alice@127.0.0.1 PART #rust :Client Quit\r\n"
        );

        // Second call is a no-op.
        matrix.disconnect(&a, "again").await;
        assert!(matrix.channel("#rust").is_some());
    }

    #[test]
    fn created_time_is_rfc1123() {
        let info = ServerInfo {
            name: "chat.local".into(),
            hostname: "chat.local".into(),
            created: DateTime::parse_from_rfc3339("2006-01-02T15:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        assert_eq!(info.created_rfc1123(), "Mon, 02 Jan 2006 15:04:05 UTC");
        assert_eq!(info.id(), "chat.local");
    }
}
