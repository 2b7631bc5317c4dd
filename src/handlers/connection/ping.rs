//! PING and PONG handlers.

use super::super::{Context, Handler, HandlerResult, replies};
use async_trait::async_trait;
use relay_proto::MessageRef;

/// Handler for PING command.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _msg: &MessageRef<'_>) -> HandlerResult {
        // PING <token>; answered through the reply batch so it is written
        // before anything already queued for this connection.
        ctx.reply(replies::pong(&ctx.matrix.server_info));
        Ok(())
    }

    fn allowed_before_registration(&self) -> bool {
        true
    }
}

/// Handler for PONG command.
pub struct PongHandler;

#[async_trait]
impl Handler for PongHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, _msg: &MessageRef<'_>) -> HandlerResult {
        Ok(())
    }

    fn allowed_before_registration(&self) -> bool {
        true
    }
}
