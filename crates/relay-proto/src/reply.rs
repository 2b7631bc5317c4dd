//! Reply values and their wire rendering.
//!
//! A [`Reply`] is built once, at the moment something happens, and captures
//! everything it needs as plain strings: the source identity, the code and the
//! body. Rendering is a pure function of the reply and the recipient, so the
//! same value can be delivered to any number of connections.
//!
//! ```text
//! :<source> <code> <target> <body>\r\n
//! ```
//!
//! `<target>` is the recipient's nick for [`ReplyTarget::Direct`] replies and
//! the channel name for [`ReplyTarget::Group`] replies. When the body is empty
//! the line ends right after the target.

use crate::response::Response;
use std::fmt;

/// Something that can be the source of a reply: the server itself, or a
/// client identified by `nick!user@host`.
pub trait Identifier {
    /// The identifier placed after the leading `:` of a rendered line.
    fn id(&self) -> String;
}

impl Identifier for str {
    fn id(&self) -> String {
        self.to_string()
    }
}

impl Identifier for String {
    fn id(&self) -> String {
        self.clone()
    }
}

/// The second field of a rendered line: a numeric or a verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    /// Three-digit numeric.
    Numeric(Response),
    /// Command verb such as `PRIVMSG` or `JOIN`.
    Verb(&'static str),
}

impl From<Response> for Code {
    fn from(r: Response) -> Self {
        Code::Numeric(r)
    }
}

impl From<&'static str> for Code {
    fn from(v: &'static str) -> Self {
        Code::Verb(v)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Numeric(r) => write!(f, "{r}"),
            Code::Verb(v) => f.write_str(v),
        }
    }
}

/// How a reply is addressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Addressed by each recipient's own nick.
    Direct,
    /// Addressed by the channel name, identical for every member.
    Group(String),
}

/// A protocol event ready to be rendered for one or more recipients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    source: String,
    code: Code,
    target: ReplyTarget,
    body: String,
}

/// Nick shown for a recipient that has not chosen one yet.
pub const UNNAMED: &str = "*";

impl Reply {
    /// A reply addressed to the recipient's nick.
    pub fn direct<S, C, B>(source: &S, code: C, body: B) -> Self
    where
        S: Identifier + ?Sized,
        C: Into<Code>,
        B: Into<String>,
    {
        Self {
            source: source.id(),
            code: code.into(),
            target: ReplyTarget::Direct,
            body: body.into(),
        }
    }

    /// A reply addressed to a channel.
    pub fn group<S, C, B>(source: &S, code: C, channel: &str, body: B) -> Self
    where
        S: Identifier + ?Sized,
        C: Into<Code>,
        B: Into<String>,
    {
        Self {
            source: source.id(),
            code: code.into(),
            target: ReplyTarget::Group(channel.to_string()),
            body: body.into(),
        }
    }

    /// Source identity captured at construction.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Numeric or verb.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Addressing variant.
    pub fn target(&self) -> &ReplyTarget {
        &self.target
    }

    /// Body text after the target.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Render for a recipient whose nick is `recipient`.
    ///
    /// Group replies ignore `recipient`. An empty nick renders as `*`.
    pub fn render(&self, recipient: &str) -> String {
        let target = match &self.target {
            ReplyTarget::Direct if recipient.is_empty() => UNNAMED,
            ReplyTarget::Direct => recipient,
            ReplyTarget::Group(channel) => channel.as_str(),
        };

        let mut line = String::with_capacity(
            self.source.len() + target.len() + self.body.len() + 12,
        );
        line.push(':');
        line.push_str(&self.source);
        line.push(' ');
        line.push_str(&self.code.to_string());
        line.push(' ');
        line.push_str(target);
        if !self.body.is_empty() {
            line.push(' ');
            line.push_str(&self.body);
        }
        line.push_str("\r\n");
        line
    }

    /// Render for a recipient that may not have a nick yet.
    pub fn render_for(&self, recipient: Option<&str>) -> String {
        self.render(recipient.unwrap_or(UNNAMED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Server;

    impl Identifier for Server {
        fn id(&self) -> String {
            "chat.local".to_string()
        }
    }

    #[test]
    fn direct_numeric_uses_recipient_nick() {
        let reply = Reply::direct(&Server, Response::ERR_NICKNAMEINUSE, "bob :Nickname is already in use");
        assert_eq!(
            reply.render("alice"),
            ":chat.local 433 alice bob :Nickname is already in use\r\n"
        );
        assert_eq!(
            reply.render_for(None),
            ":chat.local 433 * bob :Nickname is already in use\r\n"
        );
    }

    #[test]
    fn group_reply_is_identical_for_every_recipient() {
        let reply = Reply::group("alice!a@example.com", "PRIVMSG", "#rust", ":hi all");
        let a = reply.render("bob");
        let b = reply.render("carol");
        assert_eq!(a, b);
        assert_eq!(a, ":alice!a@example.com PRIVMSG #rust :hi all\r\n");
    }

    #[test]
    fn empty_body_has_no_trailing_space() {
        let reply = Reply::group("alice!a@example.com", "JOIN", "#rust", "");
        assert_eq!(reply.render("alice"), ":alice!a@example.com JOIN #rust\r\n");
    }

    #[test]
    fn source_is_captured_at_construction() {
        let mut mask = String::from("alice!a@h");
        let reply = Reply::direct(&mask, "NICK", ":bob");
        mask.clear();
        assert_eq!(reply.source(), "alice!a@h");
        assert_eq!(reply.render("carol"), ":alice!a@h NICK carol :bob\r\n");
    }
}
