//! MODE command handler.
//!
//! - User modes: `MODE nick [+/-modes]`
//! - Channel modes: `MODE channel [+/-modes [args...]]`

mod channel;
mod common;
mod user;

use super::{Context, Handler, HandlerResult};
use async_trait::async_trait;
use relay_proto::MessageRef;

/// Handler for MODE command.
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // MODE <target> [modes [params]]
        let target = msg.arg(0).unwrap_or_default();
        let changes = msg.arg(1);
        let mode_args: Vec<&str> = msg.args().iter().skip(2).copied().collect();

        if common::is_channel_target(target) {
            channel::handle_channel_mode(ctx, target, changes, &mode_args).await
        } else {
            user::handle_user_mode(ctx, target, changes).await
        }
    }

    fn min_params(&self) -> usize {
        1
    }
}
