//! Reply constructors, one per situation.
//!
//! Each function binds a fixed code and builds its body from the values passed
//! in, so the text reflects state at the moment of the call. Server-sourced
//! replies take the [`ServerInfo`]; client-sourced ones take the client's
//! `nick!user@host` mask.

use crate::state::{CHANNEL_MODES, ServerInfo, USER_MODES, VERSION};
use relay_proto::{Reply, Response};

// Registration burst

pub fn welcome(server: &ServerInfo, mask: &str) -> Reply {
    Reply::direct(
        server,
        Response::RPL_WELCOME,
        format!("Welcome to the Internet Relay Network {mask}"),
    )
}

pub fn your_host(server: &ServerInfo) -> Reply {
    Reply::direct(
        server,
        Response::RPL_YOURHOST,
        format!("Your host is {}, running version {VERSION}", server.hostname),
    )
}

pub fn created(server: &ServerInfo) -> Reply {
    Reply::direct(
        server,
        Response::RPL_CREATED,
        format!("This server was created {}", server.created_rfc1123()),
    )
}

pub fn my_info(server: &ServerInfo) -> Reply {
    Reply::direct(
        server,
        Response::RPL_MYINFO,
        format!("{} {VERSION} {USER_MODES} {CHANNEL_MODES}", server.name),
    )
}

pub fn umode_is(server: &ServerInfo, modes: &str) -> Reply {
    Reply::direct(server, Response::RPL_UMODEIS, modes)
}

// Channel state

pub fn channel_mode_is(server: &ServerInfo, channel: &str, modes: &str) -> Reply {
    Reply::direct(server, Response::RPL_CHANNELMODEIS, format!("{channel} {modes}"))
}

pub fn no_topic(server: &ServerInfo, channel: &str) -> Reply {
    Reply::direct(server, Response::RPL_NOTOPIC, format!("{channel} :No topic is set"))
}

pub fn topic(server: &ServerInfo, channel: &str, topic: &str) -> Reply {
    Reply::direct(server, Response::RPL_TOPIC, format!("{channel} :{topic}"))
}

pub fn inviting(server: &ServerInfo, channel: &str, invitee: &str) -> Reply {
    Reply::direct(server, Response::RPL_INVITING, format!("{channel} {invitee}"))
}

/// `names` are already prefixed with `@`/`+` where applicable.
pub fn nam_reply(server: &ServerInfo, channel: &str, names: &[String]) -> Reply {
    Reply::direct(
        server,
        Response::RPL_NAMREPLY,
        format!("= {channel} :{}", names.join(" ")),
    )
}

pub fn end_of_names(server: &ServerInfo) -> Reply {
    Reply::direct(server, Response::RPL_ENDOFNAMES, ":End of NAMES list")
}

pub fn youre_oper(server: &ServerInfo) -> Reply {
    Reply::direct(server, Response::RPL_YOUREOPER, ":You are now an IRC operator")
}

pub fn pong(server: &ServerInfo) -> Reply {
    Reply::direct(server, "PONG", server.name.as_str())
}

pub fn flood_warning(server: &ServerInfo, strikes: u8, max: u8) -> Reply {
    Reply::direct(
        server,
        "NOTICE",
        format!(
            ":*** Warning: Flooding detected ({strikes}/{max} strikes). Slow down or you will be disconnected."
        ),
    )
}

// Errors

pub fn no_such_nick(server: &ServerInfo, nick: &str) -> Reply {
    Reply::direct(server, Response::ERR_NOSUCHNICK, format!("{nick} :No such nick/channel"))
}

pub fn no_such_channel(server: &ServerInfo, channel: &str) -> Reply {
    Reply::direct(server, Response::ERR_NOSUCHCHANNEL, format!("{channel} :No such channel"))
}

pub fn unknown_command(server: &ServerInfo, verb: &str) -> Reply {
    Reply::direct(server, Response::ERR_UNKNOWNCOMMAND, format!("{verb} :Unknown command"))
}

pub fn erroneous_nickname(server: &ServerInfo, nick: &str) -> Reply {
    Reply::direct(server, Response::ERR_ERRONEUSNICKNAME, format!("{nick} :Erroneous nickname"))
}

pub fn nickname_in_use(server: &ServerInfo, nick: &str) -> Reply {
    Reply::direct(
        server,
        Response::ERR_NICKNAMEINUSE,
        format!("{nick} :Nickname is already in use"),
    )
}

pub fn not_on_channel(server: &ServerInfo, channel: &str) -> Reply {
    Reply::direct(
        server,
        Response::ERR_NOTONCHANNEL,
        format!("{channel} :You're not on that channel"),
    )
}

pub fn user_on_channel(server: &ServerInfo, nick: &str, channel: &str) -> Reply {
    Reply::direct(
        server,
        Response::ERR_USERONCHANNEL,
        format!("{nick} {channel} :is already on channel"),
    )
}

pub fn not_registered(server: &ServerInfo) -> Reply {
    Reply::direct(server, Response::ERR_NOTREGISTERED, ":You have not registered")
}

pub fn need_more_params(server: &ServerInfo, verb: &str) -> Reply {
    Reply::direct(server, Response::ERR_NEEDMOREPARAMS, format!("{verb} :Not enough parameters"))
}

pub fn already_registered(server: &ServerInfo) -> Reply {
    Reply::direct(server, Response::ERR_ALREADYREGISTRED, ":You may not reregister")
}

pub fn passwd_mismatch(server: &ServerInfo) -> Reply {
    Reply::direct(server, Response::ERR_PASSWDMISMATCH, ":Password incorrect")
}

pub fn invite_only_chan(server: &ServerInfo, channel: &str) -> Reply {
    Reply::direct(
        server,
        Response::ERR_INVITEONLYCHAN,
        format!("{channel} :Cannot join channel (+i)"),
    )
}

pub fn bad_channel_key(server: &ServerInfo, channel: &str) -> Reply {
    Reply::direct(
        server,
        Response::ERR_BADCHANNELKEY,
        format!("{channel} :Cannot join channel (+k)"),
    )
}

pub fn no_chan_modes(server: &ServerInfo, channel: &str) -> Reply {
    Reply::direct(
        server,
        Response::ERR_NOCHANMODES,
        format!("{channel} :Channel doesn't support modes"),
    )
}

pub fn chanop_privs_needed(server: &ServerInfo, channel: &str) -> Reply {
    Reply::direct(
        server,
        Response::ERR_CHANOPRIVSNEEDED,
        format!("{channel} :You're not channel operator"),
    )
}

pub fn umode_unknown_flag(server: &ServerInfo) -> Reply {
    Reply::direct(server, Response::ERR_UMODEUNKNOWNFLAG, ":Unknown MODE flag")
}

pub fn users_dont_match(server: &ServerInfo) -> Reply {
    Reply::direct(
        server,
        Response::ERR_USERSDONTMATCH,
        ":Cannot change mode for other users",
    )
}

// Client-sourced events

pub fn privmsg(mask: &str, text: &str) -> Reply {
    Reply::direct(mask, "PRIVMSG", format!(":{text}"))
}

pub fn privmsg_channel(mask: &str, channel: &str, text: &str) -> Reply {
    Reply::group(mask, "PRIVMSG", channel, format!(":{text}"))
}

pub fn notice(mask: &str, text: &str) -> Reply {
    Reply::direct(mask, "NOTICE", format!(":{text}"))
}

pub fn notice_channel(mask: &str, channel: &str, text: &str) -> Reply {
    Reply::group(mask, "NOTICE", channel, format!(":{text}"))
}

/// Source is the identity from before the change.
pub fn nick(old_mask: &str, new_nick: &str) -> Reply {
    Reply::direct(old_mask, "NICK", format!(":{new_nick}"))
}

pub fn invite(inviter_mask: &str, channel: &str) -> Reply {
    Reply::direct(inviter_mask, "INVITE", channel)
}

pub fn join(mask: &str, channel: &str) -> Reply {
    Reply::group(mask, "JOIN", channel, "")
}

pub fn part(mask: &str, channel: &str, message: &str) -> Reply {
    Reply::group(mask, "PART", channel, format!(":{message}"))
}

pub fn topic_change(mask: &str, channel: &str, topic: &str) -> Reply {
    Reply::group(mask, "TOPIC", channel, format!(":{topic}"))
}

pub fn mode_change(mask: &str, channel: &str, changes: &str) -> Reply {
    Reply::group(mask, "MODE", channel, changes)
}
