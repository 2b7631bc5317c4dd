//! Welcome burst sent once registration completes.

use super::super::{Context, replies};
use crate::state::Client;
use tracing::info;

/// Queue 001 through 004 and the current user modes.
///
/// Called with the client lock that completed registration still held.
pub fn send_welcome_burst(ctx: &mut Context<'_>, client: &Client) {
    let server = &ctx.matrix.server_info;
    let mask = client.mask();
    let burst = [
        replies::welcome(server, &mask),
        replies::your_host(server),
        replies::created(server),
        replies::my_info(server),
        replies::umode_is(server, &client.modes.as_mode_string()),
    ];
    for reply in burst {
        ctx.reply(reply);
    }

    info!(
        uid = %ctx.uid,
        mask = %mask,
        realname = client.realname.as_deref().unwrap_or(""),
        addr = %ctx.remote_addr,
        "Client registered"
    );
}
