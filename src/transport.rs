//! Broker transports.
//!
//! A transport is split into a [`TransportReader`] owned by the read loop and
//! a [`TransportWriter`] shared behind the session's write lock. Its
//! [`Framing`] tells the [`crate::codec::FrameReader`] whether chunk
//! boundaries carry meaning.
//!
//! Two transports are provided: raw TCP ([`Framing::Stream`]) and WebSocket
//! text messages ([`Framing::Message`]). [`Endpoint`] picks one from the
//! broker address.

use std::{fmt, io, str::FromStr};

use async_trait::async_trait;
use bytes::Bytes;
use url::{Host, Url};

use crate::{
    codec::{Chunk, Framing},
    config::DEFAULT_STOMP_PORT,
    error::ClientError,
};

mod tcp;
mod websocket;

/// Reading half of a transport.
#[async_trait]
pub trait TransportReader: Send {
    /// Read the next chunk of input.
    ///
    /// Returns `Ok(None)` once the broker has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the underlying connection fails.
    async fn read_chunk(&mut self) -> io::Result<Option<Chunk>>;
}

/// Writing half of a transport.
#[async_trait]
pub trait TransportWriter: Send {
    /// Write one encoded frame, or a heart-beat, and flush it.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the bytes cannot be delivered.
    async fn write_chunk(&mut self, data: Bytes) -> io::Result<()>;

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the shutdown handshake fails.
    async fn close(&mut self) -> io::Result<()>;
}

/// An open connection, split into halves.
pub struct Transport {
    /// Half consumed by the read loop.
    pub reader: Box<dyn TransportReader>,
    /// Half used for every outbound write.
    pub writer: Box<dyn TransportWriter>,
    /// How the reader delimits its input.
    pub framing: Framing,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("framing", &self.framing)
            .finish_non_exhaustive()
    }
}

/// Where and how to reach the broker.
///
/// Accepted forms:
///
/// - `host:port` and bare `host` (port 61613) for TCP
/// - `tcp://host[:port]` and `stomp://host[:port]` for TCP
/// - `ws://…` and `wss://…` URLs for WebSocket
///
/// # Examples
///
/// ```
/// use stompframe::transport::Endpoint;
///
/// let endpoint: Endpoint = "localhost".parse().expect("valid endpoint");
/// assert_eq!(
///     endpoint,
///     Endpoint::Tcp {
///         host: "localhost".into(),
///         port: 61613
///     }
/// );
///
/// let endpoint: Endpoint = "ws://localhost:15674/ws".parse().expect("valid endpoint");
/// assert!(matches!(endpoint, Endpoint::WebSocket(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Raw STOMP over TCP.
    Tcp {
        /// Host name or IP address.
        host: String,
        /// TCP port.
        port: u16,
    },
    /// STOMP over WebSocket text messages.
    WebSocket(Url),
}

impl Endpoint {
    /// Open a connection to this endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the TCP connection fails or
    /// [`ClientError::WebSocket`] if the WebSocket handshake fails.
    pub async fn open(&self) -> Result<Transport, ClientError> {
        match self {
            Self::Tcp { host, port } => Ok(tcp::open(host, *port).await?),
            Self::WebSocket(url) => websocket::open(url).await,
        }
    }

    /// Framing of the transport this endpoint opens.
    #[must_use]
    pub fn framing(&self) -> Framing {
        match self {
            Self::Tcp { .. } => Framing::Stream,
            Self::WebSocket(_) => Framing::Message,
        }
    }
}

impl FromStr for Endpoint {
    type Err = ClientError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ClientError::invalid_endpoint(input, "empty address"));
        }
        let url = if trimmed.contains("://") {
            Url::parse(trimmed)
        } else {
            Url::parse(&format!("tcp://{trimmed}"))
        }
        .map_err(|err| ClientError::invalid_endpoint(input, err.to_string()))?;

        match url.scheme() {
            "ws" | "wss" => Ok(Self::WebSocket(url)),
            "tcp" | "stomp" => {
                let host = match url.host() {
                    Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_owned(),
                    Some(Host::Ipv4(addr)) => addr.to_string(),
                    Some(Host::Ipv6(addr)) => addr.to_string(),
                    _ => return Err(ClientError::invalid_endpoint(input, "missing host")),
                };
                if !matches!(url.path(), "" | "/") {
                    return Err(ClientError::invalid_endpoint(
                        input,
                        "TCP addresses take no path",
                    ));
                }
                Ok(Self::Tcp {
                    host,
                    port: url.port().unwrap_or(DEFAULT_STOMP_PORT),
                })
            }
            other => Err(ClientError::invalid_endpoint(
                input,
                format!("unsupported scheme {other:?}"),
            )),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } if host.contains(':') => write!(f, "tcp://[{host}]:{port}"),
            Self::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Self::WebSocket(url) => f.write_str(url.as_str()),
        }
    }
}
