//! Helpers shared by the channel command handlers.

use crate::state::{Channel, Matrix};
use relay_proto::Reply;

use super::super::replies;

/// Split a comma-separated list of channel names, dropping empty entries.
pub fn parse_channel_list(channels_str: &str) -> Vec<&str> {
    channels_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a comma-separated key list and pad it to `channel_count` entries.
/// Empty keys become `None`.
pub fn parse_key_list(keys_str: Option<&str>, channel_count: usize) -> Vec<Option<&str>> {
    let mut keys: Vec<Option<&str>> = keys_str
        .map(|keys| {
            keys.split(',')
                .map(|k| Some(k.trim()).filter(|k| !k.is_empty()))
                .collect()
        })
        .unwrap_or_default();
    keys.resize(channel_count, None);
    keys
}

/// A part message, or `None` when blank.
pub fn parse_reason(reason: Option<&str>) -> Option<&str> {
    reason.map(str::trim).filter(|r| !r.is_empty())
}

/// `JOIN 0` leaves every channel.
#[inline]
pub fn is_join_zero(channels_str: &str) -> bool {
    channels_str == "0"
}

/// Prefixed nicks of `chan`'s members as `viewer` may see them.
///
/// Invisible members are hidden from viewers outside the channel. Sorted by
/// nick. Takes client read locks, so the caller may hold the channel lock but
/// must not hold any client lock.
pub async fn member_names(matrix: &Matrix, chan: &Channel, viewer: &str) -> Vec<String> {
    let viewer_is_member = chan.is_member(viewer);
    let mut names: Vec<(String, Option<char>)> = Vec::with_capacity(chan.members.len());

    for (uid, modes) in &chan.members {
        let Some(client) = matrix.client(uid) else {
            continue;
        };
        let client = client.read().await;
        if client.modes.invisible && !viewer_is_member {
            continue;
        }
        if let Some(nick) = &client.nick {
            names.push((nick.clone(), modes.prefix_char()));
        }
    }

    names.sort_by_key(|(nick, _)| relay_proto::irc_to_lower(nick));
    names
        .into_iter()
        .map(|(nick, prefix)| match prefix {
            Some(p) => format!("{p}{nick}"),
            None => nick,
        })
        .collect()
}

/// 353 (when anyone is visible) followed by 366.
pub async fn names_replies(matrix: &Matrix, chan: &Channel, viewer: &str) -> Vec<Reply> {
    let server = &matrix.server_info;
    let names = member_names(matrix, chan, viewer).await;
    let mut out = Vec::with_capacity(2);
    if !names.is_empty() {
        out.push(replies::nam_reply(server, &chan.name, &names));
    }
    out.push(replies::end_of_names(server));
    out
}
