//! STOMP client runtime.
//!
//! [`StompClient`] owns at most one broker session. Connecting opens a
//! transport, writes `CONNECT` and spawns a read loop that decodes frames,
//! classifies them and publishes [`crate::event::ClientEvent`]s. When the
//! broker answers `CONNECTED` the loop subscribes to the configured
//! destination and, if negotiated, starts sending heart-beats.
//!
//! Status moves `Disconnected → Connecting → Connected → Disconnected`. The
//! broker can end a session at any time with an `ERROR` frame or by closing
//! the connection; the next connect or disconnect releases it.

mod read_loop;
mod runtime;
mod session;
mod tracing_config;
mod tracing_helpers;

pub use runtime::StompClient;
pub use session::ConnectionStatus;
pub use tracing_config::TracingConfig;
