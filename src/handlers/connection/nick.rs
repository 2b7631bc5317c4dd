//! NICK command handler for connection registration and renames.

use super::super::{Context, Handler, HandlerError, HandlerResult, replies};
use super::welcome::send_welcome_burst;
use crate::state::NickInUse;
use async_trait::async_trait;
use relay_proto::{MessageRef, NickExt};
use std::sync::Arc;
use tracing::debug;

/// Handler for NICK command.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // NICK <nickname>
        let nick = msg.arg(0).unwrap_or_default();
        if nick.is_empty() {
            return Err(HandlerError::NeedMoreParams);
        }

        let server = &ctx.matrix.server_info;
        if !nick.is_valid_nick_len(ctx.matrix.config.limits.nick_max_len) {
            ctx.reply(replies::erroneous_nickname(server, nick));
            return Ok(());
        }

        let client_arc = ctx.client()?;
        let (old_mask, was_registered, channels) = {
            let mut client = client_arc.write().await;
            if client.is_closed() || client.nick.as_deref() == Some(nick) {
                return Ok(());
            }
            let old_mask = client.mask();
            let was_registered = client.is_registered();

            if let Err(NickInUse(taken)) = ctx.matrix.claim_nick(&mut client, nick) {
                ctx.reply(replies::nickname_in_use(server, &taken));
                return Ok(());
            }

            if client.refresh_stage() {
                send_welcome_burst(ctx, &client);
            }
            let channels: Vec<String> = if was_registered {
                client.channels.iter().cloned().collect()
            } else {
                Vec::new()
            };
            (old_mask, was_registered, channels)
        };

        if ctx.matrix.config.debug.client {
            debug!(uid = %ctx.uid, from = %old_mask, nick = %nick, "Nick set");
        }

        if was_registered {
            let notice = replies::nick(&old_mask, nick);
            let peers = ctx.matrix.channel_peers(&channels, ctx.uid).await;
            ctx.matrix.deliver_all(&peers, &Arc::new(notice.clone()));
            ctx.reply(notice);
        }

        Ok(())
    }

    fn min_params(&self) -> usize {
        1
    }

    fn allowed_before_registration(&self) -> bool {
        true
    }
}
