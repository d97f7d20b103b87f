//! Tests for frame classification.

use rstest::rstest;

use super::*;
use crate::frame::HeartBeat;

const CHAT_BODY: &str =
    r#"{"Id":"1","User":"bob","Text":"yo","Timestamp":"2024-01-01T00:00:00Z"}"#;

#[test]
fn connected_carries_broker_heartbeat() {
    let frame = Frame::new("CONNECTED")
        .with_header("version", "1.2")
        .with_header("heart-beat", "0,5000");
    assert_eq!(
        classify(&frame),
        Dispatch::Connected {
            heart_beat: Some(HeartBeat::new(0, 5000)),
        }
    );
    assert_eq!(
        classify(&frame).system_event().as_deref(),
        Some("STOMP CONNECTED")
    );
}

#[rstest]
#[case::absent(None)]
#[case::garbage(Some("soon"))]
fn connected_without_usable_heartbeat(#[case] header: Option<&str>) {
    let mut frame = Frame::new("CONNECTED");
    if let Some(value) = header {
        frame = frame.with_header("heart-beat", value);
    }
    assert_eq!(classify(&frame), Dispatch::Connected { heart_beat: None });
}

#[test]
fn message_body_becomes_chat_message() {
    let frame = Frame::new("MESSAGE")
        .with_header("destination", "/exchange/chat.exchange/chat.message")
        .with_body(CHAT_BODY);
    let Dispatch::Message(message) = classify(&frame) else {
        panic!("expected a chat message");
    };
    assert_eq!(message.user, "bob");
    assert_eq!(message.text, "yo");
    assert!(classify(&frame).system_event().is_none());
}

#[rstest]
#[case::null("null")]
#[case::null_with_nul("null\0")]
fn message_without_payload_is_silent(#[case] body: &'static str) {
    let frame = Frame::new("MESSAGE").with_body(body);
    assert_eq!(classify(&frame), Dispatch::Empty);
    assert!(classify(&frame).system_event().is_none());
}

#[rstest]
#[case::empty("")]
#[case::newline("\n")]
#[case::blank(" \t")]
#[case::not_json("not json")]
#[case::truncated(r#"{"Id":"1""#)]
#[case::bad_timestamp(r#"{"Timestamp":"later"}"#)]
fn malformed_message_reports_parse_failure(#[case] body: &'static str) {
    let frame = Frame::new("MESSAGE").with_body(body);
    let outcome = classify(&frame);
    assert!(matches!(outcome, Dispatch::Malformed(_)));
    let text = outcome.system_event().expect("diagnostic");
    assert!(
        text.starts_with("Failed to parse message: "),
        "unexpected diagnostic: {text}"
    );
}

#[rstest]
#[case::message_only(
    Frame::new("ERROR").with_header("message", "bad login"),
    "STOMP ERROR: bad login"
)]
#[case::no_headers(Frame::new("ERROR"), "STOMP ERROR: STOMP ERROR")]
#[case::receipt(
    Frame::new("ERROR")
        .with_header("message", "denied")
        .with_header("receipt-id", "r-7"),
    "STOMP ERROR: denied (receipt r-7)"
)]
#[case::body(
    Frame::new("ERROR")
        .with_header("message", "denied")
        .with_body("  access refused\n"),
    "STOMP ERROR: denied | access refused"
)]
#[case::everything(
    Frame::new("ERROR")
        .with_header("message", "x")
        .with_header("receipt-id", "1")
        .with_body("detail"),
    "STOMP ERROR: x (receipt 1) | detail"
)]
#[case::blank_body(
    Frame::new("ERROR").with_header("message", "x").with_body(" \n\t"),
    "STOMP ERROR: x"
)]
fn error_diagnostic_composition(#[case] frame: Frame, #[case] expected: &str) {
    assert_eq!(classify(&frame), Dispatch::Error(expected.to_owned()));
}

#[rstest]
#[case("RECEIPT")]
#[case("WIBBLE")]
fn other_commands_are_reported(#[case] command: &str) {
    let outcome = classify(&Frame::new(command));
    assert_eq!(
        outcome.system_event(),
        Some(format!("Frame {command} received"))
    );
}
