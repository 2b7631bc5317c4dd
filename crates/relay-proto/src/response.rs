//! Numeric reply codes (RFC 1459 / RFC 2812) used by the server.
//!
//! Only the numerics the daemon actually emits are listed.

#![allow(non_camel_case_types)]

use std::fmt;

/// Server numeric.
///
/// `Display` renders the zero-padded three-digit form used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    // === Connection Registration ===
    /// 001
    RPL_WELCOME = 1,
    /// 002
    RPL_YOURHOST = 2,
    /// 003
    RPL_CREATED = 3,
    /// 004
    RPL_MYINFO = 4,

    // === Command Responses ===
    /// 221 - Current user mode string
    RPL_UMODEIS = 221,
    /// 324 - Current channel mode string
    RPL_CHANNELMODEIS = 324,
    /// 331
    RPL_NOTOPIC = 331,
    /// 332
    RPL_TOPIC = 332,
    /// 341 - Invitation was passed on
    RPL_INVITING = 341,
    /// 353
    RPL_NAMREPLY = 353,
    /// 366
    RPL_ENDOFNAMES = 366,
    /// 381
    RPL_YOUREOPER = 381,

    // === Errors ===
    /// 401
    ERR_NOSUCHNICK = 401,
    /// 403
    ERR_NOSUCHCHANNEL = 403,
    /// 421
    ERR_UNKNOWNCOMMAND = 421,
    /// 432
    ERR_ERRONEUSNICKNAME = 432,
    /// 433
    ERR_NICKNAMEINUSE = 433,
    /// 442
    ERR_NOTONCHANNEL = 442,
    /// 443
    ERR_USERONCHANNEL = 443,
    /// 451
    ERR_NOTREGISTERED = 451,
    /// 461
    ERR_NEEDMOREPARAMS = 461,
    /// 462
    ERR_ALREADYREGISTRED = 462,
    /// 464
    ERR_PASSWDMISMATCH = 464,
    /// 473
    ERR_INVITEONLYCHAN = 473,
    /// 475
    ERR_BADCHANNELKEY = 475,
    /// 477
    ERR_NOCHANMODES = 477,
    /// 482
    ERR_CHANOPRIVSNEEDED = 482,
    /// 501
    ERR_UMODEUNKNOWNFLAG = 501,
    /// 502
    ERR_USERSDONTMATCH = 502,
}

impl Response {
    /// Numeric value.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Whether this is an error numeric (400-599).
    #[inline]
    pub fn is_error(self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}
