//! STOMP frame model.
//!
//! A [`Frame`] is a command line, an ordered list of `key:value` headers, a
//! blank line and an opaque body. Header order is preserved exactly as
//! supplied (or as received) so that re-encoding is deterministic and
//! repeated keys resolve to their first occurrence, as STOMP 1.2 requires.
//!
//! The constructors on [`Frame`] build the client-side frames used by
//! [`crate::client::StompClient`]: `CONNECT`, `SUBSCRIBE`, `SEND` and
//! `DISCONNECT`.

use std::{borrow::Cow, fmt};

use bytes::Bytes;

mod heartbeat;

pub use heartbeat::{HeartBeat, HeartBeatParseError, negotiate_heartbeats};

/// Header carrying the protocol versions the client accepts.
pub const ACCEPT_VERSION: &str = "accept-version";
/// Header carrying the exact body length in bytes.
pub const CONTENT_LENGTH: &str = "content-length";
/// Header carrying the MIME type of the body.
pub const CONTENT_TYPE: &str = "content-type";
/// Header naming the broker destination of a `SEND` or `SUBSCRIBE`.
pub const DESTINATION: &str = "destination";
/// Header carrying heart-beat intervals in milliseconds.
pub const HEART_BEAT: &str = "heart-beat";

/// Versions offered in the `CONNECT` frame.
pub const DEFAULT_ACCEPT_VERSION: &str = "1.0,1.1,1.2";

/// Frame commands understood by the client.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Client handshake request.
    Connect,
    /// Broker handshake acknowledgement.
    Connected,
    /// Client subscription request.
    Subscribe,
    /// Client publish.
    Send,
    /// Broker delivery for a subscription.
    Message,
    /// Broker-reported failure.
    Error,
    /// Client shutdown request.
    Disconnect,
    /// Broker acknowledgement of a `receipt` header.
    Receipt,
    /// Any command the client does not recognise.
    Other(String),
}

impl Command {
    /// Wire representation of the command.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Send => "SEND",
            Self::Message => "MESSAGE",
            Self::Error => "ERROR",
            Self::Disconnect => "DISCONNECT",
            Self::Receipt => "RECEIPT",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for Command {
    fn from(value: &str) -> Self {
        match value.trim() {
            "CONNECT" => Self::Connect,
            "CONNECTED" => Self::Connected,
            "SUBSCRIBE" => Self::Subscribe,
            "SEND" => Self::Send,
            "MESSAGE" => Self::Message,
            "ERROR" => Self::Error,
            "DISCONNECT" => Self::Disconnect,
            "RECEIPT" => Self::Receipt,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Ordered frame headers.
///
/// Lookups return the first entry for a key; later duplicates are kept for
/// re-encoding but otherwise ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Create an empty header list.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a header, keeping any existing entry with the same key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Value of the first header named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of header entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether the frame carries no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A single STOMP frame.
///
/// # Examples
///
/// ```
/// use stompframe::frame::{Command, Frame};
///
/// let frame = Frame::new("SEND")
///     .with_header("destination", "/exchange/chat.exchange/chat.message")
///     .with_body("hello");
/// assert_eq!(frame.kind(), Command::Send);
/// assert_eq!(
///     frame.header("destination"),
///     Some("/exchange/chat.exchange/chat.message")
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    command: String,
    headers: Headers,
    body: Bytes,
}

impl Frame {
    /// Create a frame with no headers and an empty body.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Assemble a frame from already-parsed parts.
    #[must_use]
    pub fn from_parts(command: impl Into<String>, headers: Headers, body: Bytes) -> Self {
        Self {
            command: command.into(),
            headers,
            body,
        }
    }

    /// Append a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(key, value);
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Raw command line as received or supplied.
    #[must_use]
    pub fn command(&self) -> &str { &self.command }

    /// Classified command.
    #[must_use]
    pub fn kind(&self) -> Command { Command::from(self.command.as_str()) }

    /// Frame headers in wire order.
    #[must_use]
    pub fn headers(&self) -> &Headers { &self.headers }

    /// Value of the first header named `key`.
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&str> { self.headers.get(key) }

    /// Body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes { &self.body }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> { String::from_utf8_lossy(&self.body) }

    /// Parsed `content-length` header, if present and numeric.
    #[must_use]
    pub fn content_length(&self) -> Option<usize> {
        self.header(CONTENT_LENGTH)
            .and_then(|value| value.trim().parse().ok())
    }

    /// Build the handshake frame.
    ///
    /// Header order matches what brokers log: versions, credentials, virtual
    /// host and the heart-beat offer.
    #[must_use]
    pub fn connect(login: &str, passcode: &str, vhost: &str, heart_beat: HeartBeat) -> Self {
        Self::new(Command::Connect.as_str())
            .with_header(ACCEPT_VERSION, DEFAULT_ACCEPT_VERSION)
            .with_header("login", login)
            .with_header("passcode", passcode)
            .with_header("host", vhost)
            .with_header(HEART_BEAT, heart_beat.to_string())
    }

    /// Build an auto-acknowledged subscription frame.
    #[must_use]
    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(Command::Subscribe.as_str())
            .with_header("id", id)
            .with_header(DESTINATION, destination)
            .with_header("ack", "auto")
    }

    /// Build a `SEND` frame carrying a JSON document.
    ///
    /// `content-length` counts UTF-8 bytes, not characters.
    #[must_use]
    pub fn send_json(destination: &str, json: String) -> Self {
        let length = json.len();
        Self::new(Command::Send.as_str())
            .with_header(DESTINATION, destination)
            .with_header(CONTENT_TYPE, "application/json")
            .with_header(CONTENT_LENGTH, length.to_string())
            .with_body(json)
    }

    /// Build the shutdown frame.
    #[must_use]
    pub fn disconnect() -> Self { Self::new(Command::Disconnect.as_str()) }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} headers, {} body bytes)",
            self.command,
            self.headers.len(),
            self.body.len()
        )
    }
}

#[cfg(test)]
mod tests;
