//! STOMP over WebSocket.
//!
//! Each WebSocket message carries one frame. Outbound frames are sent as
//! text messages, falling back to binary when the bytes are not UTF-8.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{
    SinkExt,
    StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream,
    WebSocketStream,
    connect_async,
    tungstenite::Message,
};
use url::Url;

use super::{Transport, TransportReader, TransportWriter};
use crate::{
    codec::{Chunk, Framing},
    error::ClientError,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub(super) async fn open(url: &Url) -> Result<Transport, ClientError> {
    let (stream, response) = connect_async(url.as_str()).await?;
    log::debug!("websocket handshake completed with status {}", response.status());
    let (sink, stream) = stream.split();
    Ok(Transport {
        reader: Box::new(WsReader { inner: stream }),
        writer: Box::new(WsWriter { inner: sink }),
        framing: Framing::Message,
    })
}

fn ws_error(err: tokio_tungstenite::tungstenite::Error) -> io::Error { io::Error::other(err) }

struct WsReader {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl TransportReader for WsReader {
    async fn read_chunk(&mut self) -> io::Result<Option<Chunk>> {
        loop {
            let Some(message) = self.inner.next().await else {
                return Ok(None);
            };
            match message.map_err(ws_error)? {
                Message::Text(text) => {
                    return Ok(Some(Chunk::message(Bytes::copy_from_slice(
                        text.as_str().as_bytes(),
                    ))));
                }
                Message::Binary(data) => return Ok(Some(Chunk::message(data))),
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}

struct WsWriter {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl TransportWriter for WsWriter {
    async fn write_chunk(&mut self, data: Bytes) -> io::Result<()> {
        let message = match std::str::from_utf8(&data) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::Binary(data),
        };
        self.inner.send(message).await.map_err(ws_error)
    }

    async fn close(&mut self) -> io::Result<()> { self.inner.close().await.map_err(ws_error) }
}
