//! Heart-beat header parsing and negotiation.
//!
//! The `heart-beat` header carries two comma-separated millisecond values:
//! how often the sender can emit heart-beats and how often it wants to
//! receive them. Zero means "cannot" or "does not want".

use std::{fmt, str::FromStr, time::Duration};

/// Heart-beat intervals advertised by one side of a connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeartBeat {
    /// Smallest interval, in milliseconds, at which this side can send.
    pub send_ms: u64,
    /// Desired interval, in milliseconds, at which this side wants to receive.
    pub receive_ms: u64,
}

impl HeartBeat {
    /// Heart-beats disabled in both directions.
    pub const DISABLED: Self = Self::new(0, 0);

    /// Create a heart-beat offer.
    #[must_use]
    pub const fn new(send_ms: u64, receive_ms: u64) -> Self {
        Self {
            send_ms,
            receive_ms,
        }
    }

    /// Whether neither direction is requested.
    #[must_use]
    pub const fn is_disabled(self) -> bool { self.send_ms == 0 && self.receive_ms == 0 }
}

impl fmt::Display for HeartBeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.send_ms, self.receive_ms)
    }
}

/// Malformed `heart-beat` header value.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid heart-beat value: {0:?}")]
pub struct HeartBeatParseError(pub String);

impl FromStr for HeartBeat {
    type Err = HeartBeatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HeartBeatParseError(s.to_owned());
        let (send, receive) = s.split_once(',').ok_or_else(invalid)?;
        let send_ms = send.trim().parse().map_err(|_| invalid())?;
        let receive_ms = receive.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(send_ms, receive_ms))
    }
}

/// Negotiate effective intervals from the client offer and broker reply.
///
/// Returns `(outgoing, incoming)`: how often the client must send a
/// heart-beat and how often it may expect one. Each direction is `None`
/// unless both sides asked for it, in which case the larger of the two
/// values applies.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use stompframe::frame::{HeartBeat, negotiate_heartbeats};
///
/// let (outgoing, incoming) =
///     negotiate_heartbeats(HeartBeat::new(10_000, 10_000), HeartBeat::new(0, 30_000));
/// assert_eq!(outgoing, Some(Duration::from_secs(30)));
/// assert_eq!(incoming, None);
/// ```
#[must_use]
pub fn negotiate_heartbeats(
    client: HeartBeat,
    server: HeartBeat,
) -> (Option<Duration>, Option<Duration>) {
    let pick = |ours: u64, theirs: u64| {
        (ours != 0 && theirs != 0).then(|| Duration::from_millis(ours.max(theirs)))
    };
    (
        pick(client.send_ms, server.receive_ms),
        pick(client.receive_ms, server.send_ms),
    )
}
