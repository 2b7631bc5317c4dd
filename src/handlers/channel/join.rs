//! JOIN command handler.
//!
//! ```text
//! JOIN <channels> [<keys>]
//! JOIN 0  ; Leave all channels
//! ```
//!
//! A missing channel is created with the joiner as its first member. The
//! creator holds the new channel's write lock before the channel becomes
//! visible in the registry, so no other joiner ever sees it empty.

use super::super::{Context, Handler, HandlerResult, replies};
use super::common::{is_join_zero, names_replies, parse_channel_list, parse_key_list};
use super::part::leave_channel;
use crate::state::{Channel, Matrix, MemberModes, Topic};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use relay_proto::{ChannelExt, MessageRef, irc_to_lower};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, warn};

pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // JOIN <channels> [keys]
        let channels_str = msg.arg(0).unwrap_or_default();
        let (nick, mask) = ctx.identity().await?;

        if is_join_zero(channels_str) {
            let joined: Vec<String> = {
                let client = ctx.client()?;
                let client = client.read().await;
                client.channels.iter().cloned().collect()
            };
            for key in joined {
                leave_channel(ctx, &key, &mask, &nick).await?;
            }
            return Ok(());
        }

        let channels = parse_channel_list(channels_str);
        let keys = parse_key_list(msg.arg(1), channels.len());

        for (name, key) in channels.into_iter().zip(keys) {
            if !name.is_channel_name() {
                ctx.reply(replies::no_such_channel(&ctx.matrix.server_info, name));
                continue;
            }
            join_channel(ctx, name, key, &nick, &mask).await?;
        }

        Ok(())
    }

    fn min_params(&self) -> usize {
        1
    }
}

/// Lock the channel registered under `key`, creating it if absent.
///
/// Returns the channel, its write guard and whether this call created it.
/// A guard on a destroyed channel is never returned.
async fn lock_or_create(
    matrix: &Matrix,
    key: &str,
    name: &str,
) -> (Arc<RwLock<Channel>>, OwnedRwLockWriteGuard<Channel>, bool) {
    loop {
        let existing = matrix.channels.get(key).map(|c| Arc::clone(c.value()));
        let existing = match existing {
            Some(arc) => arc,
            None => {
                let fresh = Arc::new(RwLock::new(Channel::new(name.to_string())));
                let guard = Arc::clone(&fresh).write_owned().await;
                let raced = match matrix.channels.entry(key.to_string()) {
                    Entry::Occupied(e) => Some(Arc::clone(e.get())),
                    Entry::Vacant(v) => {
                        v.insert(Arc::clone(&fresh));
                        None
                    }
                };
                match raced {
                    None => return (fresh, guard, true),
                    Some(arc) => arc,
                }
            }
        };

        let guard = Arc::clone(&existing).write_owned().await;
        if !guard.destroyed {
            return (existing, guard, false);
        }
        // Emptied and unregistered while we waited; look again.
    }
}

async fn join_channel(
    ctx: &mut Context<'_>,
    name: &str,
    key: Option<&str>,
    nick: &str,
    mask: &str,
) -> HandlerResult {
    let matrix = Arc::clone(ctx.matrix);
    let server = &matrix.server_info;
    let channel_key = irc_to_lower(name);
    let (chan_arc, mut chan, created) = lock_or_create(&matrix, &channel_key, name).await;

    if created {
        match matrix.store.load_topic(&channel_key).await {
            Ok(Some(record)) if !record.text.is_empty() => {
                chan.topic = Some(Topic {
                    text: record.text,
                    set_by: record.set_by,
                    set_at: record.set_at,
                });
            }
            Ok(_) => {}
            Err(e) => warn!(channel = %name, error = %e, "Failed to load topic"),
        }
    } else {
        if chan.is_member(ctx.uid) {
            ctx.reply(replies::user_on_channel(server, nick, &chan.name));
            return Ok(());
        }
        if chan.modes.invite_only
            && !chan.is_invited(ctx.uid, Instant::now(), matrix.config.invite_ttl())
        {
            ctx.reply(replies::invite_only_chan(server, &chan.name));
            return Ok(());
        }
        if !chan.key_matches(key) {
            ctx.reply(replies::bad_channel_key(server, &chan.name));
            return Ok(());
        }
    }

    // Both sides of the membership change under the channel lock.
    {
        let client_arc = ctx.client()?;
        let mut client = client_arc.write().await;
        if client.is_closed() {
            drop(client);
            matrix.destroy_if_empty(&channel_key, &chan_arc, &mut chan);
            return Ok(());
        }
        chan.take_invite(ctx.uid);
        chan.members.insert(
            ctx.uid.to_string(),
            MemberModes {
                op: created && matrix.config.policy.creator_is_operator,
                voice: false,
            },
        );
        client.channels.insert(channel_key.clone());
    }

    let join = replies::join(mask, &chan.name);
    let others: Vec<String> = chan
        .members
        .keys()
        .filter(|uid| uid.as_str() != ctx.uid)
        .cloned()
        .collect();
    matrix.deliver_all(&others, &Arc::new(join.clone()));
    ctx.reply(join);

    match &chan.topic {
        Some(topic) => ctx.reply(replies::topic(server, &chan.name, &topic.text)),
        None => ctx.reply(replies::no_topic(server, &chan.name)),
    }
    for reply in names_replies(&matrix, &chan, ctx.uid).await {
        ctx.reply(reply);
    }

    if matrix.config.debug.channel {
        debug!(channel = %chan.name, uid = %ctx.uid, created, members = chan.members.len(), "Joined");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::Harness;

    #[tokio::test]
    async fn creator_gets_join_topic_and_names() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let out = h.send(&alice, "JOIN #rust").await;
        assert_eq!(
            out,
            vec![
                ":alice!alice@127.0.0.1 JOIN #rust\r\n",
                ":chat.local 331 alice #rust :No topic is set\r\n",
                ":chat.local 353 alice = #rust :@alice\r\n",
                ":chat.local 366 alice :End of NAMES list\r\n",
            ]
        );
        let chan = h.matrix.channel("#RUST").unwrap();
        assert!(chan.read().await.is_operator(&alice));
    }

    #[tokio::test]
    async fn second_join_is_refused_without_change() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        h.send(&alice, "JOIN #rust").await;
        let out = h.send(&alice, "JOIN #rust").await;
        assert_eq!(
            out,
            vec![":chat.local 443 alice alice #rust :is already on channel\r\n"]
        );
        let chan = h.matrix.channel("#rust").unwrap();
        assert_eq!(chan.read().await.members.len(), 1);
    }

    #[tokio::test]
    async fn join_is_broadcast_to_existing_members() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let bob = h.register("bob").await;
        h.send(&alice, "JOIN #rust").await;

        let out = h.send(&bob, "JOIN #Rust").await;
        assert_eq!(out[0], ":bob!bob@127.0.0.1 JOIN #rust\r\n");
        assert_eq!(out[2], ":chat.local 353 bob = #rust :@alice bob\r\n");
        assert_eq!(h.drain(&alice).await, vec![":bob!bob@127.0.0.1 JOIN #rust\r\n"]);

        let client = h.matrix.client(&bob).unwrap();
        assert!(client.read().await.channels.contains("#rust"));
    }

    #[tokio::test]
    async fn creator_op_follows_policy() {
        let mut config = crate::state::test_support::test_config();
        config.policy.creator_is_operator = false;
        let matrix = std::sync::Arc::new(crate::state::Matrix::new(
            &config,
            std::sync::Arc::new(crate::db::NoopStore),
        ));
        let mut h = Harness::with_matrix(matrix);
        let alice = h.register("alice").await;
        let out = h.send(&alice, "JOIN #rust").await;
        assert_eq!(out[2], ":chat.local 353 alice = #rust :alice\r\n");
    }

    #[tokio::test]
    async fn bad_names_and_keys() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let bob = h.register("bob").await;

        let out = h.send(&alice, "JOIN rust").await;
        assert_eq!(out, vec![":chat.local 403 alice rust :No such channel\r\n"]);

        h.send(&alice, "JOIN #vault").await;
        h.send(&alice, "MODE #vault +k sesame").await;
        let out = h.send(&bob, "JOIN #vault wrong").await;
        assert_eq!(out, vec![":chat.local 475 bob #vault :Cannot join channel (+k)\r\n"]);
        let out = h.send(&bob, "JOIN #vault").await;
        assert_eq!(out, vec![":chat.local 475 bob #vault :Cannot join channel (+k)\r\n"]);
        let out = h.send(&bob, "JOIN #vault sesame").await;
        assert_eq!(out[0], ":bob!bob@127.0.0.1 JOIN #vault\r\n");
    }

    #[tokio::test]
    async fn invite_only_needs_a_pending_invite() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let bob = h.register("bob").await;
        h.send(&alice, "JOIN #club").await;
        h.send(&alice, "MODE #club +i").await;

        let out = h.send(&bob, "JOIN #club").await;
        assert_eq!(out, vec![":chat.local 473 bob #club :Cannot join channel (+i)\r\n"]);

        h.send(&alice, "INVITE bob #club").await;
        assert_eq!(
            h.drain(&bob).await,
            vec![":alice!alice@127.0.0.1 INVITE bob #club\r\n"]
        );
        let out = h.send(&bob, "JOIN #club").await;
        assert_eq!(out[0], ":bob!bob@127.0.0.1 JOIN #club\r\n");

        // The invitation was used up.
        h.send(&bob, "PART #club").await;
        let out = h.send(&bob, "JOIN #club").await;
        assert_eq!(out, vec![":chat.local 473 bob #club :Cannot join channel (+i)\r\n"]);
    }

    #[tokio::test]
    async fn join_zero_leaves_everything() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        h.send(&alice, "JOIN #a,#b").await;
        let out = h.send(&alice, "JOIN 0").await;
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|l| l.contains(" PART #") && l.ends_with(":alice\r\n")));
        assert!(h.matrix.channels.is_empty());
        let client = h.matrix.client(&alice).unwrap();
        assert!(client.read().await.channels.is_empty());
    }

    #[tokio::test]
    async fn concurrent_joins_never_duplicate_a_channel() {
        let mut h = Harness::new();
        let mut uids = Vec::new();
        for i in 0..8 {
            uids.push(h.register(&format!("user{i}")).await);
        }

        let mut tasks = Vec::new();
        for uid in uids.clone() {
            let matrix = std::sync::Arc::clone(&h.matrix);
            tasks.push(tokio::spawn(async move {
                let registry = crate::handlers::Registry::new();
                let msg = relay_proto::MessageRef::parse("JOIN #busy").unwrap();
                let addr = "127.0.0.1:1".parse().unwrap();
                let mut ctx = crate::handlers::Context::new(&uid, &matrix, addr);
                registry.dispatch(&mut ctx, &msg).await.unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        assert_eq!(h.matrix.channels.len(), 1);
        let chan = h.matrix.channel("#busy").unwrap();
        let chan = chan.read().await;
        assert_eq!(chan.members.len(), 8);
        assert_eq!(chan.members.values().filter(|m| m.op).count(), 1);
        for uid in &uids {
            let client = h.matrix.client(uid).unwrap();
            assert!(client.read().await.channels.contains("#busy"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn joins_racing_parts_never_see_a_dead_channel() {
        let mut h = Harness::new();
        let mut uids = Vec::new();
        for i in 0..6 {
            uids.push(h.register(&format!("churn{i}")).await);
        }

        let mut tasks = Vec::new();
        for uid in uids.clone() {
            let matrix = std::sync::Arc::clone(&h.matrix);
            tasks.push(tokio::spawn(async move {
                let registry = crate::handlers::Registry::new();
                let addr = "127.0.0.1:1".parse().unwrap();
                for _ in 0..25 {
                    for line in ["JOIN #churn", "PART #churn"] {
                        let msg = relay_proto::MessageRef::parse(line).unwrap();
                        let mut ctx = crate::handlers::Context::new(&uid, &matrix, addr);
                        registry.dispatch(&mut ctx, &msg).await.unwrap();
                        let replies = ctx.take_replies();
                        let first = replies[0].render_for(None);
                        assert!(
                            first.contains(&format!(" {} #churn", &line[..4])),
                            "{line} answered with {first:?}"
                        );
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        assert!(h.matrix.channel("#churn").is_none());
        assert!(h.matrix.channels.is_empty());
        for uid in &uids {
            let client = h.matrix.client(uid).unwrap();
            assert!(client.read().await.channels.is_empty());
        }
    }
}
