//! PART command handler.
//!
//! ```text
//! PART <channels> [<reason>]
//! ```
//!
//! The PART notice goes to every member including the leaver; a channel left
//! empty is destroyed.

use super::super::{Context, Handler, HandlerResult, replies};
use super::common::{parse_channel_list, parse_reason};
use async_trait::async_trait;
use relay_proto::{MessageRef, irc_to_lower};
use std::sync::Arc;
use tracing::debug;

pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // PART <channels> [reason]
        let channels_str = msg.arg(0).unwrap_or_default();
        let (nick, mask) = ctx.identity().await?;
        let reason = parse_reason(msg.arg(1)).unwrap_or(&nick).to_string();

        for name in parse_channel_list(channels_str) {
            leave_channel(ctx, name, &mask, &reason).await?;
        }

        Ok(())
    }

    fn min_params(&self) -> usize {
        1
    }
}

/// Remove the issuing client from `name`, replying 403/442 when it can't.
pub(super) async fn leave_channel(
    ctx: &mut Context<'_>,
    name: &str,
    mask: &str,
    reason: &str,
) -> HandlerResult {
    let matrix = Arc::clone(ctx.matrix);
    let server = &matrix.server_info;
    let key = irc_to_lower(name);

    let Some(chan_arc) = matrix.channel(&key) else {
        ctx.reply(replies::no_such_channel(server, name));
        return Ok(());
    };
    let mut chan = chan_arc.write().await;
    if chan.destroyed {
        ctx.reply(replies::no_such_channel(server, name));
        return Ok(());
    }
    if !chan.is_member(ctx.uid) {
        ctx.reply(replies::not_on_channel(server, &chan.name));
        return Ok(());
    }

    chan.members.remove(ctx.uid);
    if let Some(client) = matrix.client(ctx.uid) {
        client.write().await.channels.remove(&key);
    }

    let part = replies::part(mask, &chan.name, reason);
    matrix.deliver_all(chan.members.keys(), &Arc::new(part.clone()));
    ctx.reply(part);

    if matrix.config.debug.channel {
        debug!(channel = %chan.name, uid = %ctx.uid, remaining = chan.members.len(), "Parted");
    }
    matrix.destroy_if_empty(&key, &chan_arc, &mut chan);
    Ok(())
}
