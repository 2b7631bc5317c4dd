//! OPER command handler.
//!
//! `OPER <name> <password>`
//!
//! Checks the password against the matching `[[oper]]` block's stored hash.
//! Unknown names and wrong passwords get the same 464. There is no lockout.

use super::{Context, Handler, HandlerError, HandlerResult, replies};
use async_trait::async_trait;
use relay_proto::MessageRef;
use tracing::{info, warn};

/// Handler for OPER command.
pub struct OperHandler;

#[async_trait]
impl Handler for OperHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let name = msg.arg(0).unwrap_or_default();
        let password = msg.arg(1).unwrap_or_default();
        let server = &ctx.matrix.server_info;

        let block = ctx
            .matrix
            .config
            .oper_blocks
            .iter()
            .find(|b| b.name == name)
            .cloned();

        let verified = match block {
            Some(block) => {
                // Hash verification is CPU-bound.
                let candidate = password.to_string();
                tokio::task::spawn_blocking(move || block.verify_password(&candidate))
                    .await
                    .map_err(|e| HandlerError::Internal(format!("password check failed: {e}")))?
            }
            None => false,
        };

        if !verified {
            warn!(uid = %ctx.uid, oper_name = %name, "OPER failed");
            ctx.reply(replies::passwd_mismatch(server));
            return Ok(());
        }

        let (mask, modes) = {
            let client = ctx.client()?;
            let mut client = client.write().await;
            client.modes.operator = true;
            (client.mask(), client.modes.as_mode_string())
        };

        info!(uid = %ctx.uid, mask = %mask, oper_name = %name, "Client is now an operator");
        ctx.reply(replies::youre_oper(server));
        ctx.reply(replies::umode_is(server, &modes));
        Ok(())
    }

    fn min_params(&self) -> usize {
        2
    }
}
