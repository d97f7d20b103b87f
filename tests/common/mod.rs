//! Shared utilities for integration tests.
//!
//! Provides a scripted STOMP broker on a loopback listener. The broker side
//! speaks through the crate's own codec so tests exchange [`Frame`]s rather
//! than raw bytes.

#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use stompframe::{
    codec::StompCodec,
    event::{ClientEvent, EventReceiver},
    frame::Frame,
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
};
use tokio_util::codec::Framed;

/// Upper bound on any single wait in these tests.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind a listener on an ephemeral loopback port.
///
/// Returns the listener and the `host:port` address clients should use.
pub async fn spawn_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("read local address");
    (listener, addr.to_string())
}

/// An address nothing is listening on.
pub async fn unused_address() -> String {
    let (listener, addr) = spawn_listener().await;
    drop(listener);
    addr
}

/// Broker side of one accepted connection.
pub struct BrokerConnection {
    framed: Framed<TcpStream, StompCodec>,
}

impl BrokerConnection {
    /// Accept the next client.
    pub async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = tokio::time::timeout(STEP_TIMEOUT, listener.accept())
            .await
            .expect("client connects in time")
            .expect("accept connection");
        Self {
            framed: Framed::new(stream, StompCodec::default()),
        }
    }

    /// Next frame from the client; `None` once the client has closed.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        tokio::time::timeout(STEP_TIMEOUT, self.framed.next())
            .await
            .expect("frame in time")
            .map(|frame| frame.expect("decode client frame"))
    }

    /// Next frame from the client, which must be `command`.
    pub async fn expect_frame(&mut self, command: &str) -> Frame {
        let frame = self.next_frame().await.expect("connection open");
        assert_eq!(frame.command(), command, "unexpected frame {frame}");
        frame
    }

    /// Send a frame to the client.
    pub async fn send(&mut self, frame: Frame) {
        self.framed.send(frame).await.expect("send frame to client");
    }

    /// Write raw bytes to the client.
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        let stream = self.framed.get_mut();
        stream.write_all(bytes).await.expect("write raw bytes");
        stream.flush().await.expect("flush raw bytes");
    }

    /// Consume `CONNECT`, reply `CONNECTED` without heart-beats and consume
    /// the resulting `SUBSCRIBE`.
    pub async fn complete_handshake(&mut self) -> (Frame, Frame) {
        let connect = self.expect_frame("CONNECT").await;
        self.send(
            Frame::new("CONNECTED")
                .with_header("version", "1.2")
                .with_header("heart-beat", "0,0"),
        )
        .await;
        let subscribe = self.expect_frame("SUBSCRIBE").await;
        (connect, subscribe)
    }

    /// Close the connection from the broker side.
    pub async fn close(mut self) {
        let stream = self.framed.get_mut();
        stream.shutdown().await.expect("shutdown broker stream");
    }
}

/// Next event, failing the test if none arrives in time.
pub async fn next_event(events: &mut EventReceiver) -> ClientEvent {
    tokio::time::timeout(STEP_TIMEOUT, events.recv())
        .await
        .expect("event in time")
        .expect("event channel open")
}

/// Next event, which must be a system event.
pub async fn next_system(events: &mut EventReceiver) -> String {
    match next_event(events).await {
        ClientEvent::System(text) => text,
        other => panic!("expected system event, got {other:?}"),
    }
}

/// Skip events until the system event `text` arrives.
pub async fn wait_for_system(events: &mut EventReceiver, text: &str) {
    loop {
        if next_event(events).await.system_text() == Some(text) {
            return;
        }
    }
}
