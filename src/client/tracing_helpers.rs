//! Span and timing helpers for client operations.

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;

/// Create a span at a level chosen at runtime.
///
/// Each arm calls the matching `tracing::<level>_span!` macro so the span
/// metadata stays static per arm.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn connect_span(config: &TracingConfig, endpoint: &str) -> Span {
    dynamic_span!(
        config.connect_level,
        "client.connect",
        broker.endpoint = endpoint
    )
}

#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn send_span(config: &TracingConfig, destination: &str) -> Span {
    dynamic_span!(
        config.send_level,
        "client.send",
        destination = destination,
        frame.bytes = tracing::field::Empty
    )
}

/// Span covering the dispatch of one inbound frame.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn dispatch_span(config: &TracingConfig, command: &str, body_bytes: usize) -> Span {
    dynamic_span!(
        config.dispatch_level,
        "client.dispatch",
        frame.command = command,
        frame.bytes = body_bytes
    )
}

#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn disconnect_span(config: &TracingConfig) -> Span {
    dynamic_span!(config.disconnect_level, "client.disconnect")
}

/// Start a timer when `enabled`.
pub(crate) fn start_timer(enabled: bool) -> Option<Instant> { enabled.then(Instant::now) }

/// Emit an `elapsed_us` event if timing was started.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        let elapsed_us = start.elapsed().as_micros();
        tracing::debug!(elapsed_us = elapsed_us, "operation.timing");
    }
}
