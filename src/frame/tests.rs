//! Unit tests for the frame model and heart-beat negotiation.

use std::time::Duration;

use rstest::rstest;

use super::*;

#[rstest]
#[case("CONNECTED", Command::Connected)]
#[case("MESSAGE", Command::Message)]
#[case("ERROR", Command::Error)]
#[case("RECEIPT", Command::Receipt)]
#[case("  CONNECTED\r", Command::Connected)]
#[case("PING", Command::Other("PING".to_owned()))]
fn command_classification(#[case] raw: &str, #[case] expected: Command) {
    assert_eq!(Command::from(raw), expected);
}

#[test]
fn headers_preserve_order_and_return_first_duplicate() {
    let mut headers = Headers::new();
    headers.push("destination", "/a");
    headers.push("content-type", "text/plain");
    headers.push("destination", "/b");

    assert_eq!(headers.get("destination"), Some("/a"));
    let keys: Vec<_> = headers.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["destination", "content-type", "destination"]);
}

#[test]
fn connect_frame_carries_handshake_headers_in_order() {
    let frame = Frame::connect("chatuser", "chatpass", "/", HeartBeat::new(10_000, 10_000));

    let headers: Vec<_> = frame.headers().iter().collect();
    assert_eq!(
        headers,
        [
            ("accept-version", "1.0,1.1,1.2"),
            ("login", "chatuser"),
            ("passcode", "chatpass"),
            ("host", "/"),
            ("heart-beat", "10000,10000"),
        ]
    );
    assert!(frame.body().is_empty());
}

#[test]
fn subscribe_frame_uses_auto_ack() {
    let frame = Frame::subscribe("sub-0", "/exchange/chat.exchange/chat.#");
    assert_eq!(frame.kind(), Command::Subscribe);
    assert_eq!(frame.header("id"), Some("sub-0"));
    assert_eq!(
        frame.header("destination"),
        Some("/exchange/chat.exchange/chat.#")
    );
    assert_eq!(frame.header("ack"), Some("auto"));
}

#[test]
fn send_frame_counts_utf8_bytes() {
    let body = r#"{"Text":"héllo 👋"}"#.to_owned();
    let chars = body.chars().count();
    let frame = Frame::send_json("/exchange/chat.exchange/chat.message", body);

    let length = frame.content_length().expect("content-length header");
    assert_eq!(length, frame.body().len());
    assert!(length > chars, "multi-byte text must count bytes");
}

#[rstest]
#[case("10000,10000", HeartBeat::new(10_000, 10_000))]
#[case("0,0", HeartBeat::DISABLED)]
#[case(" 500 , 0 ", HeartBeat::new(500, 0))]
fn heart_beat_parses(#[case] raw: &str, #[case] expected: HeartBeat) {
    assert_eq!(raw.parse::<HeartBeat>(), Ok(expected));
}

#[rstest]
#[case::both_zero(HeartBeat::DISABLED, true)]
#[case::send_only(HeartBeat::new(500, 0), false)]
#[case::receive_only(HeartBeat::new(0, 500), false)]
fn heart_beat_disabled_only_when_both_zero(#[case] offer: HeartBeat, #[case] disabled: bool) {
    assert_eq!(offer.is_disabled(), disabled);
}

#[rstest]
#[case("")]
#[case("10000")]
#[case("a,b")]
#[case("-1,0")]
fn heart_beat_rejects_malformed(#[case] raw: &str) {
    assert!(raw.parse::<HeartBeat>().is_err());
}

#[rstest]
#[case::both_directions(
    HeartBeat::new(10_000, 10_000),
    HeartBeat::new(5_000, 20_000),
    Some(Duration::from_secs(20)),
    Some(Duration::from_secs(10))
)]
#[case::server_refuses(
    HeartBeat::new(10_000, 10_000),
    HeartBeat::DISABLED,
    None,
    None
)]
#[case::client_disabled(HeartBeat::DISABLED, HeartBeat::new(1_000, 1_000), None, None)]
fn heart_beat_negotiation(
    #[case] client: HeartBeat,
    #[case] server: HeartBeat,
    #[case] outgoing: Option<Duration>,
    #[case] incoming: Option<Duration>,
) {
    assert_eq!(negotiate_heartbeats(client, server), (outgoing, incoming));
}
