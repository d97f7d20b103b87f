//! Metric helpers for `stompframe`.
//!
//! Metric names and thin wrappers over the [`metrics`](https://docs.rs/metrics)
//! macros. Without an installed recorder, or with the `metrics` feature
//! disabled, every call is a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking open broker sessions.
pub const SESSIONS_ACTIVE: &str = "stompframe_sessions_active";
/// Name of the counter tracking frames by direction and command.
pub const FRAMES_PROCESSED: &str = "stompframe_frames_total";
/// Name of the counter tracking read loop and protocol errors.
pub const ERRORS_TOTAL: &str = "stompframe_errors_total";

/// Direction of a frame relative to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames received from the broker.
    Inbound,
    /// Frames sent to the broker.
    Outbound,
}

impl Direction {
    #[cfg_attr(
        not(feature = "metrics"),
        expect(dead_code, reason = "labels only feed the recorder")
    )]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a newly opened session.
pub fn inc_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).increment(1.0);
}

/// Record a closed session.
pub fn dec_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).decrement(1.0);
}

/// Record a frame for the given direction.
pub fn inc_frames(direction: Direction, command: &str) {
    #[cfg(feature = "metrics")]
    counter!(
        FRAMES_PROCESSED,
        "direction" => direction.as_str(),
        "command" => command.to_owned()
    )
    .increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (direction, command);
}

/// Record an error occurrence.
pub fn inc_errors() {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL).increment(1);
}
