//! Tracing configuration for client operations.
//!
//! [`TracingConfig`] controls the level of the spans client operations open
//! and whether their elapsed time is recorded.

use tracing::Level;

/// Controls tracing span levels and per-operation timing.
///
/// By default lifecycle operations (`connect`, `disconnect`) emit spans at
/// `INFO` level, while `send` and per-frame `dispatch` emit spans at `DEBUG`.
/// Timing is disabled for all operations.
///
/// When timing is enabled for an operation an additional `DEBUG` event
/// recording `elapsed_us` is emitted when the operation completes.
///
/// # Examples
///
/// ```
/// use stompframe::client::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_connect_timing(true)
///     .with_dispatch_level(Level::TRACE);
/// let _ = config;
/// ```
#[expect(
    clippy::struct_excessive_bools,
    reason = "four independent on/off timing flags, one per operation"
)]
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub(crate) connect_level: Level,
    pub(crate) send_level: Level,
    pub(crate) dispatch_level: Level,
    pub(crate) disconnect_level: Level,
    pub(crate) connect_timing: bool,
    pub(crate) send_timing: bool,
    pub(crate) dispatch_timing: bool,
    pub(crate) disconnect_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            connect_level: Level::INFO,
            send_level: Level::DEBUG,
            dispatch_level: Level::DEBUG,
            disconnect_level: Level::INFO,
            connect_timing: false,
            send_timing: false,
            dispatch_timing: false,
            disconnect_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the span level for `connect`.
    #[must_use]
    pub fn with_connect_level(mut self, level: Level) -> Self {
        self.connect_level = level;
        self
    }

    /// Enable or disable timing for `connect`.
    #[must_use]
    pub fn with_connect_timing(mut self, enabled: bool) -> Self {
        self.connect_timing = enabled;
        self
    }

    /// Set the span level for `send` and its variants.
    #[must_use]
    pub fn with_send_level(mut self, level: Level) -> Self {
        self.send_level = level;
        self
    }

    /// Enable or disable timing for `send` and its variants.
    #[must_use]
    pub fn with_send_timing(mut self, enabled: bool) -> Self {
        self.send_timing = enabled;
        self
    }

    /// Set the span level for dispatching each inbound frame.
    #[must_use]
    pub fn with_dispatch_level(mut self, level: Level) -> Self {
        self.dispatch_level = level;
        self
    }

    /// Enable or disable timing for dispatching each inbound frame.
    #[must_use]
    pub fn with_dispatch_timing(mut self, enabled: bool) -> Self {
        self.dispatch_timing = enabled;
        self
    }

    /// Set the span level for `disconnect`.
    #[must_use]
    pub fn with_disconnect_level(mut self, level: Level) -> Self {
        self.disconnect_level = level;
        self
    }

    /// Enable or disable timing for `disconnect`.
    #[must_use]
    pub fn with_disconnect_timing(mut self, enabled: bool) -> Self {
        self.disconnect_timing = enabled;
        self
    }

    /// Set the span level for all operations at once.
    #[must_use]
    pub fn with_all_levels(mut self, level: Level) -> Self {
        self.connect_level = level;
        self.send_level = level;
        self.dispatch_level = level;
        self.disconnect_level = level;
        self
    }

    /// Enable or disable timing for all operations at once.
    #[must_use]
    pub fn with_all_timing(mut self, enabled: bool) -> Self {
        self.connect_timing = enabled;
        self.send_timing = enabled;
        self.dispatch_timing = enabled;
        self.disconnect_timing = enabled;
        self
    }
}
