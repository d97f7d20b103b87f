//! Classification of inbound frames.
//!
//! [`classify`] maps each decoded [`Frame`] to a [`Dispatch`] describing what
//! the session should do with it. Classification never fails: a `MESSAGE`
//! whose body is not a valid chat message becomes a diagnostic, and unknown
//! commands are reported rather than rejected.
//!
//! | Command     | Outcome                                   |
//! |-------------|-------------------------------------------|
//! | `CONNECTED` | [`Dispatch::Connected`]                   |
//! | `MESSAGE`   | [`Dispatch::Message`] or a diagnostic     |
//! | `ERROR`     | [`Dispatch::Error`] with a composed text  |
//! | anything    | [`Dispatch::Unrecognised`]                |

use crate::{
    frame::{Command, Frame, HEART_BEAT, HeartBeat},
    message::ChatMessage,
};

/// What the session should do with an inbound frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Handshake completed. Carries the broker's heart-beat reply when it sent
    /// a parseable one.
    Connected {
        /// Broker heart-beat intervals.
        heart_beat: Option<HeartBeat>,
    },
    /// A chat message was delivered.
    Message(ChatMessage),
    /// A `MESSAGE` body was the JSON literal `null`.
    Empty,
    /// A `MESSAGE` body could not be decoded; carries the diagnostic.
    Malformed(String),
    /// The broker reported an error; carries the diagnostic.
    Error(String),
    /// The command is not handled; carries the diagnostic.
    Unrecognised(String),
}

impl Dispatch {
    /// Diagnostic text to publish as a system event, if any.
    #[must_use]
    pub fn system_event(&self) -> Option<String> {
        match self {
            Self::Connected { .. } => Some("STOMP CONNECTED".to_owned()),
            Self::Malformed(text) | Self::Error(text) | Self::Unrecognised(text) => {
                Some(text.clone())
            }
            Self::Message(_) | Self::Empty => None,
        }
    }
}

/// Classify an inbound frame.
#[must_use]
pub fn classify(frame: &Frame) -> Dispatch {
    match frame.kind() {
        Command::Connected => Dispatch::Connected {
            heart_beat: frame.header(HEART_BEAT).and_then(|v| v.parse().ok()),
        },
        Command::Message => classify_message(frame),
        Command::Error => Dispatch::Error(describe_error(frame)),
        other => Dispatch::Unrecognised(format!("Frame {other} received")),
    }
}

fn classify_message(frame: &Frame) -> Dispatch {
    let body = trim_terminators(frame.body());
    match serde_json::from_slice::<Option<ChatMessage>>(body) {
        Ok(Some(message)) => Dispatch::Message(message),
        Ok(None) => Dispatch::Empty,
        Err(err) => Dispatch::Malformed(format!("Failed to parse message: {err}")),
    }
}

/// Compose the diagnostic for an `ERROR` frame.
///
/// Format: `STOMP ERROR: <message>[ (receipt <id>)][ | <body>]`. The
/// `message` header defaults to `STOMP ERROR` when absent.
#[must_use]
pub fn describe_error(frame: &Frame) -> String {
    let message = frame
        .header("message")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("STOMP ERROR");
    let mut composed = format!("STOMP ERROR: {message}");
    if let Some(receipt) = frame
        .header("receipt-id")
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        composed.push_str(&format!(" (receipt {receipt})"));
    }
    let body = frame.body_text();
    let body = body.trim_end_matches('\0').trim();
    if !body.is_empty() {
        composed.push_str(" | ");
        composed.push_str(body);
    }
    composed
}

fn trim_terminators(body: &[u8]) -> &[u8] {
    let end = body
        .iter()
        .rposition(|b| !matches!(b, 0 | b'\n' | b'\r'))
        .map_or(0, |i| i + 1);
    &body[..end]
}

#[cfg(test)]
mod tests;
