//! TOPIC command handler.
//!
//! ```text
//! TOPIC <channel>            ; query
//! TOPIC <channel> :<topic>   ; set (empty clears)
//! ```

use super::super::{Context, Handler, HandlerResult, replies};
use crate::db::TopicRecord;
use crate::state::Topic;
use async_trait::async_trait;
use relay_proto::{MessageRef, irc_to_lower};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let channel_name = msg.arg(0).unwrap_or_default();
        let new_topic = msg.arg(1);
        let matrix = Arc::clone(ctx.matrix);
        let server = &matrix.server_info;

        let Some(chan_arc) = matrix.channel(channel_name) else {
            ctx.reply(replies::no_such_channel(server, channel_name));
            return Ok(());
        };
        let (nick, mask) = ctx.identity().await?;

        let mut chan = chan_arc.write().await;
        if chan.destroyed {
            ctx.reply(replies::no_such_channel(server, channel_name));
            return Ok(());
        }
        if !chan.is_member(ctx.uid) {
            ctx.reply(replies::not_on_channel(server, &chan.name));
            return Ok(());
        }

        let Some(text) = new_topic else {
            match &chan.topic {
                Some(topic) => {
                    if matrix.config.debug.channel {
                        debug!(channel = %chan.name, set_by = %topic.set_by, set_at = topic.set_at, "Topic query");
                    }
                    ctx.reply(replies::topic(server, &chan.name, &topic.text));
                }
                None => ctx.reply(replies::no_topic(server, &chan.name)),
            }
            return Ok(());
        };

        if matrix.config.policy.topic_requires_operator && !chan.is_operator(ctx.uid) {
            ctx.reply(replies::chanop_privs_needed(server, &chan.name));
            return Ok(());
        }

        let record = TopicRecord {
            text: text.to_string(),
            set_by: nick,
            set_at: chrono::Utc::now().timestamp(),
        };
        chan.topic = (!text.is_empty()).then(|| Topic {
            text: record.text.clone(),
            set_by: record.set_by.clone(),
            set_at: record.set_at,
        });

        // Saved under the write lock so racing sets persist in apply order.
        let key = irc_to_lower(channel_name);
        if let Err(e) = matrix.store.save_topic(&key, &record).await {
            warn!(channel = %chan.name, error = %e, "Failed to persist topic");
        }

        let change = replies::topic_change(&mask, &chan.name, text);
        let others: Vec<String> = chan
            .members
            .keys()
            .filter(|uid| uid.as_str() != ctx.uid)
            .cloned()
            .collect();
        matrix.deliver_all(&others, &Arc::new(change.clone()));
        ctx.reply(change);

        if matrix.config.debug.channel {
            debug!(channel = %chan.name, set_by = %record.set_by, "Topic changed");
        }
        Ok(())
    }

    fn min_params(&self) -> usize {
        1
    }
}
