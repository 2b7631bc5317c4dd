//! Channel mode handling: `+i` (invite-only) and `+k <key>`.

use super::super::{Context, HandlerResult, replies};
use super::common::{AppliedModes, parse_flags};
use std::sync::Arc;
use tracing::info;

/// Handle channel mode query/change.
pub async fn handle_channel_mode(
    ctx: &mut Context<'_>,
    target: &str,
    changes: Option<&str>,
    mode_args: &[&str],
) -> HandlerResult {
    let matrix = Arc::clone(ctx.matrix);
    let server = &matrix.server_info;

    let Some(chan_arc) = matrix.channel(target) else {
        ctx.reply(replies::no_such_channel(server, target));
        return Ok(());
    };

    let Some(changes) = changes else {
        let chan = chan_arc.read().await;
        if chan.destroyed {
            ctx.reply(replies::no_such_channel(server, target));
        } else if chan.modes.is_empty() {
            ctx.reply(replies::no_chan_modes(server, &chan.name));
        } else {
            let modes = if chan.is_member(ctx.uid) {
                chan.modes.as_mode_string()
            } else {
                chan.modes.letters()
            };
            ctx.reply(replies::channel_mode_is(server, &chan.name, &modes));
        }
        return Ok(());
    };

    let mask = ctx.mask().await?;
    let mut chan = chan_arc.write().await;
    if chan.destroyed {
        ctx.reply(replies::no_such_channel(server, target));
        return Ok(());
    }
    if !chan.is_operator(ctx.uid) {
        ctx.reply(replies::chanop_privs_needed(server, &chan.name));
        return Ok(());
    }

    let mut args = mode_args.iter().copied();
    let mut applied = AppliedModes::default();

    for flag in parse_flags(changes) {
        match (flag.letter, flag.adding) {
            ('i', adding) => {
                if chan.modes.invite_only != adding {
                    chan.modes.invite_only = adding;
                    applied.push(adding, 'i', None);
                }
            }
            ('k', true) => match args.next().filter(|k| !k.is_empty()) {
                Some(key) => {
                    if chan.modes.key.as_deref() != Some(key) {
                        chan.modes.key = Some(key.to_string());
                        applied.push(true, 'k', Some(key));
                    }
                }
                None => ctx.reply(replies::need_more_params(server, "MODE")),
            },
            ('k', false) => {
                // The old key may be given; it is not checked.
                args.next();
                if chan.modes.key.take().is_some() {
                    applied.push(false, 'k', Some("*"));
                }
            }
            _ => ctx.reply(replies::no_chan_modes(server, &chan.name)),
        }
    }

    if applied.is_empty() {
        return Ok(());
    }

    let change = replies::mode_change(&mask, &chan.name, &applied.render());
    let others: Vec<String> = chan
        .members
        .keys()
        .filter(|uid| uid.as_str() != ctx.uid)
        .cloned()
        .collect();
    matrix.deliver_all(&others, &Arc::new(change.clone()));
    ctx.reply(change);

    info!(channel = %chan.name, by = %mask, modes = %applied.render(), "Channel modes changed");
    Ok(())
}
