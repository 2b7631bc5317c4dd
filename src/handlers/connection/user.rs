//! USER command handler for connection registration.

use super::super::{Context, Handler, HandlerError, HandlerResult, replies};
use super::welcome::send_welcome_burst;
use async_trait::async_trait;
use relay_proto::MessageRef;
use tracing::debug;

/// Handler for USER command.
pub struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // USER <username> <mode> <unused> <realname>
        let username = msg.arg(0).unwrap_or_default();
        let realname = msg.arg(3).unwrap_or_default();
        if username.is_empty() {
            return Err(HandlerError::NeedMoreParams);
        }

        let client_arc = ctx.client()?;
        {
            let mut client = client_arc.write().await;
            if client.is_closed() {
                return Ok(());
            }
            if client.is_registered() {
                ctx.reply(replies::already_registered(&ctx.matrix.server_info));
                return Ok(());
            }

            client.user = Some(username.to_string());
            client.realname = Some(realname.to_string());
            if ctx.matrix.config.debug.client {
                debug!(user = %username, realname = %realname, uid = %ctx.uid, "User set");
            }
            if client.refresh_stage() {
                send_welcome_burst(ctx, &client);
            }
        }

        Ok(())
    }

    fn min_params(&self) -> usize {
        4
    }

    fn allowed_before_registration(&self) -> bool {
        true
    }
}
