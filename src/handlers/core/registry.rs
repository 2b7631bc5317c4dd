//! Command handler registry and dispatch.
//!
//! `dispatch` applies the checks every command shares before its handler
//! runs: unknown verbs get 421, commands that need registration get 451 on an
//! unregistered connection, and short argument lists get 461.

use super::context::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{
    channel::{InviteHandler, JoinHandler, NamesHandler, PartHandler, TopicHandler},
    connection::{NickHandler, PingHandler, PongHandler, QuitHandler, UserHandler},
    messaging::{NoticeHandler, PrivmsgHandler},
    mode::ModeHandler,
    oper::OperHandler,
    replies,
};
use relay_proto::MessageRef;
use std::collections::HashMap;
use tracing::{Instrument, Level, debug, span};

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection/registration handlers
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("USER", Box::new(UserHandler));
        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("PONG", Box::new(PongHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));

        // Channel handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("INVITE", Box::new(InviteHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("NAMES", Box::new(NamesHandler));
        handlers.insert("MODE", Box::new(ModeHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));
        handlers.insert("NOTICE", Box::new(NoticeHandler));

        // Operator handlers
        handlers.insert("OPER", Box::new(OperHandler));

        Self { handlers }
    }

    /// Dispatch a message to the appropriate handler.
    ///
    /// Replies for the issuing client land in `ctx`; the caller flushes them.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let cmd_name = msg.command_name().to_ascii_uppercase();
        let server = &ctx.matrix.server_info;
        let trace = ctx.matrix.config.debug.server;

        let Some(handler) = self.handlers.get(cmd_name.as_str()) else {
            if trace {
                debug!(uid = %ctx.uid, command = %cmd_name, "Unknown command");
            }
            ctx.reply(replies::unknown_command(server, &cmd_name));
            return Ok(());
        };

        if !handler.allowed_before_registration() && !ctx.is_registered().await {
            if trace {
                debug!(uid = %ctx.uid, command = %cmd_name, "Rejected before registration");
            }
            ctx.reply(replies::not_registered(server));
            return Ok(());
        }

        if msg.args().len() < handler.min_params() {
            ctx.reply(replies::need_more_params(server, &cmd_name));
            return Ok(());
        }

        let channel = msg
            .arg(0)
            .filter(|a| a.starts_with('#') || a.starts_with('&'));
        let irc_span = span!(
            Level::DEBUG,
            "irc.command",
            command = %cmd_name,
            uid = %ctx.uid,
            channel = channel,
            remote_addr = %ctx.remote_addr,
        );

        let result = handler.handle(ctx, msg).instrument(irc_span).await;

        match result {
            Err(HandlerError::NeedMoreParams) => {
                let server = &ctx.matrix.server_info;
                ctx.reply(replies::need_more_params(server, &cmd_name));
                Ok(())
            }
            Err(ref e) => {
                if trace || !matches!(e, HandlerError::Quit(_)) {
                    debug!(command = %cmd_name, error = %e, code = e.error_code(), "Command error");
                }
                result
            }
            Ok(()) => {
                if trace {
                    debug!(uid = %ctx.uid, command = %cmd_name, "Command handled");
                }
                Ok(())
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
