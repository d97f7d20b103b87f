//! STOMP client runtime.

use std::{fmt, sync::Arc, time::Duration};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{
    read_loop::ReadLoop,
    session::{ConnectionStatus, Session, SessionWriter},
    tracing_helpers::{connect_span, disconnect_span, emit_timing_event, send_span, start_timer},
};
use crate::{
    codec::{FrameReader, StompCodec},
    config::{ClientConfig, ConnectRequest, ResolvedConnect, exchange_destination},
    error::ClientError,
    event::{EventReceiver, EventSink},
    frame::Frame,
    message::ChatMessage,
    metrics,
    transport::{Endpoint, Transport},
};

/// A STOMP chat client holding at most one broker session.
///
/// Lifecycle events and received messages are delivered on the
/// [`EventReceiver`] returned by [`StompClient::new`].
///
/// # Examples
///
/// ```no_run
/// use stompframe::{
///     client::StompClient,
///     config::{ClientConfig, ConnectRequest},
///     event::ClientEvent,
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), stompframe::error::ClientError> {
/// let (mut client, mut events) = StompClient::new(ClientConfig::default());
/// client.connect(ConnectRequest::new("Alice")).await?;
/// client.send_text("hello").await?;
/// while let Some(event) = events.recv().await {
///     if let ClientEvent::MessageReceived(message) = event {
///         println!("{}: {}", message.user, message.text);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct StompClient {
    config: Arc<ClientConfig>,
    events: EventSink,
    status: Arc<watch::Sender<ConnectionStatus>>,
    session: Option<Session>,
    display_name: String,
}

impl fmt::Debug for StompClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StompClient")
            .field("endpoint", &self.config.endpoint())
            .field("status", &self.status())
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

impl StompClient {
    /// Create a disconnected client and the receiver for its events.
    #[must_use]
    pub fn new(config: ClientConfig) -> (Self, EventReceiver) {
        let (events, receiver) = EventSink::channel();
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        let client = Self {
            config: Arc::new(config),
            events,
            status: Arc::new(status),
            session: None,
            display_name: String::new(),
        };
        (client, receiver)
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus { *self.status.borrow() }

    /// Whether the handshake has completed.
    #[must_use]
    pub fn is_connected(&self) -> bool { self.status() == ConnectionStatus::Connected }

    /// Watch status changes.
    #[must_use]
    pub fn status_changes(&self) -> watch::Receiver<ConnectionStatus> { self.status.subscribe() }

    /// Configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig { &self.config }

    /// Display name given to the last [`connect`](Self::connect).
    #[must_use]
    pub fn display_name(&self) -> &str { &self.display_name }

    /// Open a transport, send `CONNECT` and start the read loop.
    ///
    /// Returns once `CONNECT` has been written; [`ConnectionStatus::Connected`]
    /// follows when the broker's `CONNECTED` frame is processed. Calling this
    /// while a session is connected or still handshaking does nothing. A
    /// session ended by the broker is released first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the endpoint is invalid, the transport cannot
    /// be opened or `CONNECT` cannot be written. Status is
    /// [`ConnectionStatus::Disconnected`] afterwards.
    pub async fn connect(&mut self, request: ConnectRequest) -> Result<(), ClientError> {
        if self.session.is_some() && self.status() != ConnectionStatus::Disconnected {
            return Ok(());
        }
        self.release_stale_session().await;
        let config = Arc::clone(&self.config);
        let resolved = request.resolve(&config);
        let span = connect_span(config.tracing(), resolved.endpoint);
        let start = start_timer(config.tracing().connect_timing);
        let result = async {
            let endpoint: Endpoint = resolved.endpoint.parse()?;
            self.set_status(ConnectionStatus::Connecting);
            let transport = match endpoint.open().await {
                Ok(transport) => transport,
                Err(err) => {
                    self.set_status(ConnectionStatus::Disconnected);
                    return Err(err);
                }
            };
            self.attach(transport, &request).await
        }
        .instrument(span)
        .await;
        emit_timing_event(start);
        result
    }

    /// Run a session over an already open transport.
    pub(super) async fn attach(
        &mut self,
        transport: Transport,
        request: &ConnectRequest,
    ) -> Result<(), ClientError> {
        let config = Arc::clone(&self.config);
        let resolved = request.resolve(&config);
        match self.open_session(transport, resolved).await {
            Ok(session) => {
                self.session = Some(session);
                self.display_name = request.display_name.clone();
                log::info!("connected to {} as {}", resolved.endpoint, self.display_name);
                Ok(())
            }
            Err(err) => {
                self.set_status(ConnectionStatus::Disconnected);
                Err(err)
            }
        }
    }

    async fn open_session(
        &self,
        transport: Transport,
        resolved: ResolvedConnect<'_>,
    ) -> Result<Session, ClientError> {
        let codec = StompCodec::new(self.config.max_frame_length());
        let writer = SessionWriter::new(transport.writer, codec);
        let connect = Frame::connect(
            resolved.login,
            resolved.passcode,
            resolved.vhost,
            self.config.heart_beat(),
        );
        if let Err(err) = writer.send(connect).await {
            if let Err(close_err) = writer.close().await {
                log::debug!("closing transport after failed CONNECT: {close_err}");
            }
            return Err(err.into());
        }
        self.events.system("CONNECT frame sent");

        let token = CancellationToken::new();
        let read_loop = ReadLoop {
            reader: transport.reader,
            frames: FrameReader::new(codec, transport.framing),
            writer: writer.clone(),
            events: self.events.clone(),
            status: Arc::clone(&self.status),
            config: Arc::clone(&self.config),
            token: token.clone(),
            heartbeat: None,
        };
        let read_loop = tokio::spawn(read_loop.run());
        metrics::inc_sessions();
        Ok(Session {
            writer,
            token,
            read_loop,
        })
    }

    /// Wait until the handshake completes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] if the session is not connected within
    /// `timeout`.
    pub async fn wait_until_connected(&self, timeout: Duration) -> Result<(), ClientError> {
        let mut changes = self.status.subscribe();
        match tokio::time::timeout(
            timeout,
            changes.wait_for(|status| *status == ConnectionStatus::Connected),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) | Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }

    /// Send a chat message as `user` to the configured publish destination.
    ///
    /// Does nothing unless connected.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the message cannot be serialised or written.
    pub async fn send(&self, user: &str, text: &str) -> Result<(), ClientError> {
        self.publish(self.config.publish_destination(), user, text)
            .await
    }

    /// Send a chat message as the connected display name.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_text(&self, text: &str) -> Result<(), ClientError> {
        self.send(&self.display_name, text).await
    }

    /// Send a chat message through a specific exchange and routing key.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_to(
        &self,
        user: &str,
        text: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), ClientError> {
        self.publish(exchange_destination(exchange, routing_key), user, text)
            .await
    }

    async fn publish(
        &self,
        destination: String,
        user: &str,
        text: &str,
    ) -> Result<(), ClientError> {
        let Some(session) = self.session.as_ref().filter(|_| self.is_connected()) else {
            log::debug!("not connected; dropping message from {user}");
            return Ok(());
        };
        let span = send_span(self.config.tracing(), &destination);
        let start = start_timer(self.config.tracing().send_timing);
        let result = async {
            let json = serde_json::to_string(&ChatMessage::new(user, text))?;
            let written = session
                .writer
                .send(Frame::send_json(&destination, json))
                .await?;
            tracing::Span::current().record("frame.bytes", written);
            Ok::<_, ClientError>(())
        }
        .instrument(span)
        .await;
        emit_timing_event(start);
        result
    }

    /// Send `DISCONNECT`, stop the read loop and close the transport.
    ///
    /// Does nothing when not connected. Write failures are ignored; the
    /// session always ends and a `Disconnected` event is published.
    pub async fn disconnect(&mut self) {
        if !self.is_connected() {
            self.release_stale_session().await;
            return;
        }
        let Some(session) = self.session.take() else {
            return;
        };
        let span = disconnect_span(self.config.tracing());
        let start = start_timer(self.config.tracing().disconnect_timing);
        async {
            if let Err(err) = session.writer.send(Frame::disconnect()).await {
                log::debug!("sending DISCONNECT failed: {err}");
            }
            session.shutdown(self.config.shutdown_grace()).await;
            self.set_status(ConnectionStatus::Disconnected);
            log::info!("disconnected");
            self.events.system("Disconnected");
        }
        .instrument(span)
        .await;
        emit_timing_event(start);
    }

    /// Tear down a session that is no longer connected without publishing
    /// events.
    async fn release_stale_session(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("releasing ended session");
            session.shutdown(self.config.shutdown_grace()).await;
            self.set_status(ConnectionStatus::Disconnected);
        }
    }

    fn set_status(&self, status: ConnectionStatus) { self.status.send_replace(status); }
}

impl Drop for StompClient {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.abort();
        }
    }
}
