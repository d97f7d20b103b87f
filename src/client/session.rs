//! Per-connection state owned by the client.

use std::{fmt, io, sync::Arc, time::Duration};

use bytes::{Bytes, BytesMut};
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::{codec::Encoder, sync::CancellationToken};

use crate::{
    codec::{HEARTBEAT_EOL, StompCodec},
    frame::Frame,
    metrics::{self, Direction},
    transport::TransportWriter,
};

/// Connection lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// No session, or the session ended.
    #[default]
    Disconnected,
    /// Transport open and `CONNECT` sent; awaiting `CONNECTED`.
    Connecting,
    /// Handshake complete.
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

/// Serialises every write to the transport.
///
/// The caller, the read loop's auto-subscribe and the heart-beat task each
/// hold a clone; the lock keeps their frames from interleaving.
#[derive(Clone)]
pub(crate) struct SessionWriter {
    inner: Arc<Mutex<Box<dyn TransportWriter>>>,
    codec: StompCodec,
}

impl SessionWriter {
    pub(crate) fn new(writer: Box<dyn TransportWriter>, codec: StompCodec) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
            codec,
        }
    }

    /// Encode and write one frame, returning the number of bytes written.
    pub(crate) async fn send(&self, frame: Frame) -> io::Result<usize> {
        let command = frame.command().to_owned();
        let mut codec = self.codec;
        let mut buf = BytesMut::new();
        codec.encode(frame, &mut buf)?;
        let written = buf.len();
        self.inner.lock().await.write_chunk(buf.freeze()).await?;
        metrics::inc_frames(Direction::Outbound, &command);
        tracing::trace!(frame.command = %command, frame.bytes = written, "frame written");
        Ok(written)
    }

    pub(crate) async fn heartbeat(&self) -> io::Result<()> {
        self.inner
            .lock()
            .await
            .write_chunk(Bytes::from_static(HEARTBEAT_EOL))
            .await
    }

    pub(crate) async fn close(&self) -> io::Result<()> { self.inner.lock().await.close().await }
}

impl fmt::Debug for SessionWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionWriter")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// One connect/disconnect cycle: the writer, the read loop task and the
/// token that stops it.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) writer: SessionWriter,
    pub(crate) token: CancellationToken,
    pub(crate) read_loop: JoinHandle<()>,
}

impl Session {
    /// Stop the read loop and close the transport.
    ///
    /// The loop gets `grace` to observe cancellation before it is aborted.
    pub(crate) async fn shutdown(self, grace: Duration) {
        self.token.cancel();
        let mut read_loop = self.read_loop;
        if tokio::time::timeout(grace, &mut read_loop).await.is_err() {
            log::debug!("read loop still running after {grace:?}; aborting");
            read_loop.abort();
        }
        if let Err(err) = self.writer.close().await {
            log::debug!("closing transport failed: {err}");
        }
        metrics::dec_sessions();
    }

    /// Stop the read loop immediately without waiting or closing.
    pub(crate) fn abort(self) {
        self.token.cancel();
        self.read_loop.abort();
        metrics::dec_sessions();
    }
}
