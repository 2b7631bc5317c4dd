//! INVITE command handler
//!
//! `INVITE <nickname> <channel>`
//!
//! Records a pending invitation that lets the invitee past `+i` once. The
//! invitation is single-use and expires after `policy.invite_ttl_secs`.

use super::super::{Context, Handler, HandlerResult, replies};
use async_trait::async_trait;
use relay_proto::MessageRef;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Handler for INVITE command.
pub struct InviteHandler;

#[async_trait]
impl Handler for InviteHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let target_nick = msg.arg(0).unwrap_or_default();
        let channel_name = msg.arg(1).unwrap_or_default();
        let matrix = Arc::clone(ctx.matrix);
        let server = &matrix.server_info;

        let Some(target_uid) = matrix.uid_for_nick(target_nick) else {
            ctx.reply(replies::no_such_nick(server, target_nick));
            return Ok(());
        };
        let Some(chan_arc) = matrix.channel(channel_name) else {
            ctx.reply(replies::no_such_channel(server, channel_name));
            return Ok(());
        };
        let mask = ctx.mask().await?;

        let mut chan = chan_arc.write().await;
        if chan.destroyed {
            ctx.reply(replies::no_such_channel(server, channel_name));
            return Ok(());
        }
        if !chan.is_member(ctx.uid) {
            ctx.reply(replies::not_on_channel(server, &chan.name));
            return Ok(());
        }

        // Current spelling of the invitee's nick, read under the channel lock.
        let Some(target) = matrix.client(&target_uid) else {
            ctx.reply(replies::no_such_nick(server, target_nick));
            return Ok(());
        };
        let invitee = target.read().await.nick_or_star().to_string();

        if chan.is_member(&target_uid) {
            ctx.reply(replies::user_on_channel(server, &invitee, &chan.name));
            return Ok(());
        }
        if chan.modes.invite_only && !chan.is_operator(ctx.uid) {
            ctx.reply(replies::chanop_privs_needed(server, &chan.name));
            return Ok(());
        }

        chan.add_invite(target_uid.clone(), Instant::now(), matrix.config.invite_ttl());

        matrix.deliver(&target_uid, Arc::new(replies::invite(&mask, &chan.name)));
        ctx.reply(replies::inviting(server, &chan.name, &invitee));

        if matrix.config.debug.channel {
            debug!(channel = %chan.name, from = %ctx.uid, to = %target_uid, "Invitation recorded");
        }
        Ok(())
    }

    fn min_params(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::Harness;

    #[tokio::test]
    async fn invite_acknowledges_and_notifies() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let bob = h.register("bob").await;
        h.send(&alice, "JOIN #rust").await;

        let out = h.send(&alice, "INVITE BOB #rust").await;
        assert_eq!(out, vec![":chat.local 341 alice #rust bob\r\n"]);
        assert_eq!(
            h.drain(&bob).await,
            vec![":alice!alice@127.0.0.1 INVITE bob #rust\r\n"]
        );

        // No membership granted.
        let chan = h.matrix.channel("#rust").unwrap();
        assert!(!chan.read().await.is_member(&bob));
    }

    #[tokio::test]
    async fn invite_error_order() {
        let mut h = Harness::new();
        let alice = h.register("alice").await;
        let bob = h.register("bob").await;
        let carol = h.register("carol").await;

        let out = h.send(&alice, "INVITE nobody #rust").await;
        assert_eq!(out, vec![":chat.local 401 alice nobody :No such nick/channel\r\n"]);

        let out = h.send(&alice, "INVITE bob #rust").await;
        assert_eq!(out, vec![":chat.local 403 alice #rust :No such channel\r\n"]);

        h.send(&bob, "JOIN #rust").await;
        let out = h.send(&alice, "INVITE carol #rust").await;
        assert_eq!(out, vec![":chat.local 442 alice #rust :You're not on that channel\r\n"]);

        let out = h.send(&bob, "INVITE bob #rust").await;
        assert_eq!(out, vec![":chat.local 443 bob bob #rust :is already on channel\r\n"]);

        // Only operators may invite into +i.
        h.send(&bob, "MODE #rust +i").await;
        h.send(&bob, "INVITE carol #rust").await;
        h.send(&carol, "JOIN #rust").await;
        let out = h.send(&carol, "INVITE alice #rust").await;
        assert_eq!(out, vec![":chat.local 482 carol #rust :You're not channel operator\r\n"]);
    }
}
