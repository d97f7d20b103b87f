#![doc(html_root_url = "https://docs.rs/stompframe/latest")]
//! Public API for the `stompframe` library.
//!
//! A STOMP chat client. It connects to a broker over raw TCP or WebSocket,
//! performs the STOMP handshake, subscribes to a chat destination and turns
//! the incoming byte stream into typed chat messages and lifecycle events.
//!
//! The layers, leaf first:
//!
//! - [`frame`]: the frame model and heart-beat negotiation
//! - [`codec`]: incremental framing for byte and message transports
//! - [`transport`]: TCP and WebSocket connections
//! - [`dispatch`]: classification of inbound frames
//! - [`client`]: the connection state machine and read loop

pub mod client;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod frame;
pub mod message;
pub mod metrics;
pub mod transport;

pub use client::{ConnectionStatus, StompClient, TracingConfig};
pub use config::{ClientConfig, ConnectRequest};
pub use error::{ClientError, Result};
pub use event::{ClientEvent, EventReceiver};
pub use frame::{Command, Frame, HeartBeat};
pub use message::ChatMessage;
pub use metrics::{Direction, ERRORS_TOTAL, FRAMES_PROCESSED, SESSIONS_ACTIVE};
