//! End-to-end tests for `StompClient` against a scripted TCP broker.

mod common;

use std::time::Duration;

use common::{
    BrokerConnection,
    next_event,
    next_system,
    spawn_listener,
    unused_address,
    wait_for_system,
};
use rstest::rstest;
use stompframe::{
    client::{ConnectionStatus, StompClient},
    config::{ClientConfig, ConnectRequest},
    error::ClientError,
    event::ClientEvent,
    frame::{Frame, HeartBeat},
    message::ChatMessage,
};

fn client_for(endpoint: &str) -> (StompClient, stompframe::event::EventReceiver) {
    StompClient::new(
        ClientConfig::default()
            .with_endpoint(endpoint)
            .with_shutdown_grace(Duration::from_millis(200)),
    )
}

#[tokio::test]
async fn handshake_subscribe_send_and_receive() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, mut events) = client_for(&addr);

    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("connect");
    assert_eq!(client.status(), ConnectionStatus::Connecting);

    let mut broker = BrokerConnection::accept(&listener).await;
    let (connect, subscribe) = broker.complete_handshake().await;
    assert_eq!(connect.header("accept-version"), Some("1.0,1.1,1.2"));
    assert_eq!(connect.header("login"), Some("chatuser"));
    assert_eq!(connect.header("passcode"), Some("chatpass"));
    assert_eq!(connect.header("host"), Some("/"));
    assert_eq!(connect.header("heart-beat"), Some("10000,10000"));
    assert_eq!(subscribe.header("id"), Some("sub-0"));
    assert_eq!(
        subscribe.header("destination"),
        Some("/exchange/chat.exchange/chat.#")
    );
    assert_eq!(subscribe.header("ack"), Some("auto"));

    assert_eq!(next_system(&mut events).await, "CONNECT frame sent");
    assert_eq!(next_system(&mut events).await, "STOMP CONNECTED");
    assert_eq!(
        next_system(&mut events).await,
        "Subscribed /exchange/chat.exchange/chat.#"
    );
    client
        .wait_until_connected(Duration::from_secs(1))
        .await
        .expect("connected");

    client.send_text("hi").await.expect("send");
    let send = broker.expect_frame("SEND").await;
    assert_eq!(
        send.header("destination"),
        Some("/exchange/chat.exchange/chat.message")
    );
    assert_eq!(send.header("content-type"), Some("application/json"));
    let sent: ChatMessage = serde_json::from_slice(send.body()).expect("chat message body");
    assert_eq!(sent.user, "Alice");
    assert_eq!(sent.text, "hi");

    // Deliver the message back split across two writes.
    let body = r#"{"Id":"1","User":"bob","Text":"yo","Timestamp":"2024-01-01T00:00:00Z"}"#;
    let raw = format!(
        "MESSAGE\ndestination:/exchange/chat.exchange/chat.message\nsubscription:sub-0\n\n{body}\0"
    );
    let (head, tail) = raw.as_bytes().split_at(30);
    broker.send_raw(head).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    broker.send_raw(tail).await;

    let ClientEvent::MessageReceived(received) = next_event(&mut events).await else {
        panic!("expected a chat message");
    };
    assert_eq!(received.id, "1");
    assert_eq!(received.user, "bob");
    assert_eq!(received.text, "yo");
}

#[rstest]
#[case::ascii("plain text")]
#[case::accented("héllo wörld")]
#[case::emoji("👋 🎉")]
#[tokio::test]
async fn content_length_counts_utf8_bytes(#[case] text: &str) {
    let (listener, addr) = spawn_listener().await;
    let (mut client, _events) = client_for(&addr);
    client
        .connect(ConnectRequest::new("Zoë"))
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    broker.complete_handshake().await;
    client
        .wait_until_connected(Duration::from_secs(1))
        .await
        .expect("connected");

    client.send("Zoë", text).await.expect("send");
    let send = broker.expect_frame("SEND").await;
    assert_eq!(send.content_length(), Some(send.body().len()));
    let sent: ChatMessage = serde_json::from_slice(send.body()).expect("chat message body");
    assert_eq!(sent.text, text);
}

#[tokio::test]
async fn send_to_uses_exchange_and_routing_key() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, _events) = client_for(&addr);
    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    broker.complete_handshake().await;
    client
        .wait_until_connected(Duration::from_secs(1))
        .await
        .expect("connected");

    client
        .send_to("Alice", "psst", "ops.exchange", "ops.alert")
        .await
        .expect("send");
    let send = broker.expect_frame("SEND").await;
    assert_eq!(send.header("destination"), Some("/exchange/ops.exchange/ops.alert"));
}

#[tokio::test]
async fn error_frame_disconnects_and_next_connect_starts_fresh() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, mut events) = client_for(&addr);
    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    broker.complete_handshake().await;
    wait_for_system(&mut events, "Subscribed /exchange/chat.exchange/chat.#").await;

    broker
        .send(
            Frame::new("ERROR")
                .with_header("message", "queue deleted")
                .with_header("receipt-id", "77")
                .with_body("resource gone"),
        )
        .await;
    assert_eq!(
        next_system(&mut events).await,
        "STOMP ERROR: queue deleted (receipt 77) | resource gone"
    );
    assert_eq!(client.status(), ConnectionStatus::Disconnected);

    // Sending while disconnected is a no-op.
    client.send_text("lost").await.expect("send is a no-op");

    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("reconnect");
    let mut second = BrokerConnection::accept(&listener).await;
    second.complete_handshake().await;
    client
        .wait_until_connected(Duration::from_secs(1))
        .await
        .expect("connected again");
    assert_eq!(next_system(&mut events).await, "CONNECT frame sent");

    // Nothing from the first session was written after the ERROR.
    assert!(broker.next_frame().await.is_none());
}

#[tokio::test]
async fn disconnect_sends_disconnect_and_reports() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, mut events) = client_for(&addr);
    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    broker.complete_handshake().await;
    wait_for_system(&mut events, "Subscribed /exchange/chat.exchange/chat.#").await;

    client.disconnect().await;
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert_eq!(next_system(&mut events).await, "Disconnected");

    broker.expect_frame("DISCONNECT").await;
    assert!(broker.next_frame().await.is_none());

    // A second disconnect does nothing.
    client.disconnect().await;
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn broker_close_is_reported() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, mut events) = client_for(&addr);
    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    broker.complete_handshake().await;
    wait_for_system(&mut events, "Subscribed /exchange/chat.exchange/chat.#").await;

    broker.close().await;
    assert_eq!(
        next_system(&mut events).await,
        "Connection closed by broker"
    );
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn malformed_message_keeps_session_connected() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, mut events) = client_for(&addr);
    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    broker.complete_handshake().await;
    wait_for_system(&mut events, "Subscribed /exchange/chat.exchange/chat.#").await;

    broker
        .send(Frame::new("MESSAGE").with_body("{not json"))
        .await;
    let text = next_system(&mut events).await;
    assert!(text.starts_with("Failed to parse message: "), "{text}");
    assert!(client.is_connected());
}

#[tokio::test]
async fn request_overrides_reach_connect_frame() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, _events) = StompClient::new(
        ClientConfig::default()
            .with_endpoint("unreachable.invalid:1")
            .with_heart_beat(HeartBeat::DISABLED),
    );
    client
        .connect(
            ConnectRequest::new("Alice")
                .endpoint(addr)
                .login("alice")
                .passcode("s3cret")
                .vhost("chat"),
        )
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    let connect = broker.expect_frame("CONNECT").await;
    assert_eq!(connect.header("login"), Some("alice"));
    assert_eq!(connect.header("passcode"), Some("s3cret"));
    assert_eq!(connect.header("host"), Some("chat"));
    assert_eq!(connect.header("heart-beat"), Some("0,0"));
}

#[tokio::test]
async fn connect_failure_leaves_client_disconnected() {
    let addr = unused_address().await;
    let (mut client, mut events) = client_for(&addr);
    let err = client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect_err("nothing is listening");
    assert!(matches!(err, ClientError::Io(_)), "{err}");
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn invalid_endpoint_is_rejected() {
    let (mut client, _events) = client_for("http://localhost");
    let err = client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect_err("unsupported scheme");
    assert!(matches!(err, ClientError::InvalidEndpoint { .. }), "{err}");
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn wait_until_connected_times_out_without_reply() {
    let (listener, addr) = spawn_listener().await;
    let (mut client, _events) = client_for(&addr);
    client
        .connect(ConnectRequest::new("Alice"))
        .await
        .expect("connect");
    let mut broker = BrokerConnection::accept(&listener).await;
    broker.expect_frame("CONNECT").await;

    let err = client
        .wait_until_connected(Duration::from_millis(100))
        .await
        .expect_err("no CONNECTED reply");
    assert!(matches!(err, ClientError::Timeout(_)));
    assert_eq!(client.status(), ConnectionStatus::Connecting);
}
