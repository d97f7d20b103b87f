//! Command line interface for the `stompframe` chat binary.
//!
//! Shared with the build script, which renders the man page from it.

use clap::Parser;

/// Command line arguments for the `stompframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "stompframe",
    version,
    about = "Chat over a STOMP broker from the terminal"
)]
pub struct Cli {
    /// Display name attached to outgoing messages.
    #[arg(short, long, default_value = "Anonymous")]
    pub name: String,

    /// AMQP connection string supplying the broker host and credentials.
    #[arg(long, env = "STOMPFRAME_CONNECTION_STRING")]
    pub connection_string: Option<String>,

    /// Broker address (`host[:port]`, `tcp://`, `ws://` or `wss://`).
    /// Overrides the host taken from the connection string.
    #[arg(short, long, env = "STOMPFRAME_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Connect over Web-STOMP instead of raw TCP.
    #[arg(long, conflicts_with = "endpoint")]
    pub web_stomp: bool,

    /// Broker login.
    #[arg(long, env = "STOMPFRAME_LOGIN")]
    pub login: Option<String>,

    /// Broker passcode.
    #[arg(long, env = "STOMPFRAME_PASSCODE", hide_env_values = true)]
    pub passcode: Option<String>,

    /// Virtual host sent in the `CONNECT` frame.
    #[arg(long)]
    pub vhost: Option<String>,

    /// Heart-beat offer as `<send-ms>,<receive-ms>`; `0,0` disables.
    #[arg(long)]
    pub heart_beat: Option<String>,

    /// Seconds to wait for the broker to acknowledge the connection.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,
}
