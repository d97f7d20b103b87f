//! Raw TCP transport.

use std::io;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

use super::{Transport, TransportReader, TransportWriter};
use crate::codec::{Chunk, Framing};

const READ_BUFFER: usize = 4096;

pub(super) async fn open(host: &str, port: u16) -> io::Result<Transport> {
    let stream = TcpStream::connect((host, port)).await?;
    stream.set_nodelay(true)?;
    Ok(from_stream(stream))
}

/// Split a connected stream into transport halves.
pub(super) fn from_stream(stream: TcpStream) -> Transport {
    let (read, write) = stream.into_split();
    Transport {
        reader: Box::new(TcpReader {
            inner: read,
            buffer: BytesMut::with_capacity(READ_BUFFER),
        }),
        writer: Box::new(TcpWriter { inner: write }),
        framing: Framing::Stream,
    }
}

struct TcpReader {
    inner: OwnedReadHalf,
    buffer: BytesMut,
}

#[async_trait]
impl TransportReader for TcpReader {
    async fn read_chunk(&mut self) -> io::Result<Option<Chunk>> {
        self.buffer.reserve(READ_BUFFER);
        let read = self.inner.read_buf(&mut self.buffer).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(Chunk::bytes(self.buffer.split().freeze())))
    }
}

struct TcpWriter {
    inner: OwnedWriteHalf,
}

#[async_trait]
impl TransportWriter for TcpWriter {
    async fn write_chunk(&mut self, data: Bytes) -> io::Result<()> {
        self.inner.write_all(&data).await?;
        self.inner.flush().await
    }

    async fn close(&mut self) -> io::Result<()> { self.inner.shutdown().await }
}
