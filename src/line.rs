use derive_more::{Display, From};

/// A single fully-formed outbound protocol line.
///
/// A `Line` carries no terminator; the transport appends one at write time.
/// The text must not contain `\r` or `\n`.
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
pub struct Line(String);

impl Line {
    /// Creates a line which is sent verbatim, e.g. `JOIN #somechannel`.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Creates a chat message line addressed to `channel`.
    pub fn privmsg(channel: &str, text: &str) -> Self {
        let channel = channel.strip_prefix('#').unwrap_or(channel);
        Self(format!("PRIVMSG #{channel} :{text}"))
    }

    /// Creates a keepalive line for `host`.
    pub fn ping(host: &str) -> Self {
        Self(format!("PING :{host}"))
    }

    /// Creates a keepalive reply line for `host`.
    pub fn pong(host: &str) -> Self {
        Self(format!("PONG :{host}"))
    }

    /// The line's text, without a terminator.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}
