//! User mode handling.
//!
//! Handles MODE commands for users: `MODE <nick> [+/-modes]`
//! Users can only query/change their own modes. `+o` is only granted by OPER.

use super::super::{Context, HandlerResult, replies};
use super::common::parse_flags;
use relay_proto::irc_eq;
use tracing::debug;

/// Handle user mode query/change.
pub async fn handle_user_mode(
    ctx: &mut Context<'_>,
    target: &str,
    changes: Option<&str>,
) -> HandlerResult {
    let client_arc = ctx.client()?;
    let mut client = client_arc.write().await;
    let server = &ctx.matrix.server_info;

    // Can only query/change your own modes
    if !irc_eq(target, client.nick_or_star()) {
        drop(client);
        ctx.reply(replies::users_dont_match(server));
        return Ok(());
    }

    let mut unknown = false;
    for flag in changes.map(parse_flags).unwrap_or_default() {
        match (flag.letter, flag.adding) {
            ('i', adding) => client.modes.invisible = adding,
            ('o', false) => client.modes.operator = false,
            ('o', true) => {}
            _ => unknown = true,
        }
    }

    let modes = client.modes.as_mode_string();
    drop(client);

    if unknown {
        ctx.reply(replies::umode_unknown_flag(server));
    }
    if changes.is_some() && ctx.matrix.config.debug.client {
        debug!(uid = %ctx.uid, modes = %modes, "User modes changed");
    }
    ctx.reply(replies::umode_is(server, &modes));
    Ok(())
}
