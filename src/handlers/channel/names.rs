//! NAMES command handler.

use super::super::{Context, Handler, HandlerResult, replies};
use super::common::{names_replies, parse_channel_list};
use async_trait::async_trait;
use relay_proto::MessageRef;
use std::sync::Arc;

/// `NAMES [<channels>]`: 353 and 366 for each existing channel, 366 alone
/// otherwise.
pub struct NamesHandler;

#[async_trait]
impl Handler for NamesHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let matrix = Arc::clone(ctx.matrix);
        let channels = msg.arg(0).map(parse_channel_list).unwrap_or_default();

        if channels.is_empty() {
            ctx.reply(replies::end_of_names(&matrix.server_info));
            return Ok(());
        }

        for name in channels {
            let Some(chan_arc) = matrix.channel(name) else {
                ctx.reply(replies::end_of_names(&matrix.server_info));
                continue;
            };
            let chan = chan_arc.read().await;
            if chan.destroyed {
                ctx.reply(replies::end_of_names(&matrix.server_info));
                continue;
            }
            for reply in names_replies(&matrix, &chan, ctx.uid).await {
                ctx.reply(reply);
            }
        }
        Ok(())
    }
}
