//! PRIVMSG and NOTICE handlers.
//!
//! A nick target gets a direct reply; a channel target gets a group reply
//! delivered to every member except the sender. NOTICE never answers with
//! an error.

use super::{Context, Handler, HandlerResult, replies};
use async_trait::async_trait;
use relay_proto::{MessageRef, Reply};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Privmsg,
    Notice,
}

impl Kind {
    fn direct(self, mask: &str, text: &str) -> Reply {
        match self {
            Kind::Privmsg => replies::privmsg(mask, text),
            Kind::Notice => replies::notice(mask, text),
        }
    }

    fn group(self, mask: &str, channel: &str, text: &str) -> Reply {
        match self {
            Kind::Privmsg => replies::privmsg_channel(mask, channel, text),
            Kind::Notice => replies::notice_channel(mask, channel, text),
        }
    }
}

/// Handler for PRIVMSG command.
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        route(ctx, msg, Kind::Privmsg).await
    }

    fn min_params(&self) -> usize {
        2
    }
}

/// Handler for NOTICE command.
pub struct NoticeHandler;

#[async_trait]
impl Handler for NoticeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        // No arity check: a short NOTICE is dropped silently.
        if msg.args().len() < 2 {
            return Ok(());
        }
        route(ctx, msg, Kind::Notice).await
    }
}

async fn route(ctx: &mut Context<'_>, msg: &MessageRef<'_>, kind: Kind) -> HandlerResult {
    let targets = msg.arg(0).unwrap_or_default();
    let text = msg.arg(1).unwrap_or_default();
    let matrix = Arc::clone(ctx.matrix);
    let server = &matrix.server_info;
    let mask = ctx.mask().await?;
    let report = kind == Kind::Privmsg;

    for target in targets.split(',').filter(|t| !t.is_empty()) {
        if target.starts_with(['#', '&']) {
            let Some(chan_arc) = matrix.channel(target) else {
                if report {
                    ctx.reply(replies::no_such_channel(server, target));
                }
                continue;
            };
            let chan = chan_arc.read().await;
            if chan.destroyed {
                if report {
                    ctx.reply(replies::no_such_channel(server, target));
                }
                continue;
            }
            if !chan.is_member(ctx.uid) {
                if report {
                    ctx.reply(replies::not_on_channel(server, &chan.name));
                }
                continue;
            }
            let reply = Arc::new(kind.group(&mask, &chan.name, text));
            let recipients = chan.members.keys().filter(|uid| uid.as_str() != ctx.uid);
            matrix.deliver_all(recipients, &reply);
        } else {
            let Some(uid) = matrix.uid_for_nick(target) else {
                if report {
                    ctx.reply(replies::no_such_nick(server, target));
                }
                continue;
            };
            matrix.deliver(&uid, Arc::new(kind.direct(&mask, text)));
        }

        if matrix.config.debug.server {
            debug!(uid = %ctx.uid, target = %target, "Message routed");
        }
    }
    Ok(())
}
