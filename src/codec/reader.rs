//! Incremental frame reader shared by every transport.
//!
//! Transports hand over [`Chunk`]s as they arrive. For byte-oriented
//! transports chunk boundaries are meaningless and frames are found by their
//! NUL terminator. For message-oriented transports the reader buffers until
//! the transport flags the end of a message and then treats everything
//! buffered as complete, so a missing trailing NUL is tolerated.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use super::{CodecError, FramingError, StompCodec};
use crate::frame::Frame;

/// How a transport delimits its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Arbitrary byte chunks (TCP).
    Stream,
    /// Discrete messages with explicit boundaries (WebSocket).
    Message,
}

/// A unit of input read from a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Bytes received.
    pub data: Bytes,
    /// Whether these bytes complete a transport message. Ignored for
    /// [`Framing::Stream`].
    pub end_of_message: bool,
}

impl Chunk {
    /// Bytes from a byte-oriented transport.
    #[must_use]
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            end_of_message: false,
        }
    }

    /// A complete message from a message-oriented transport.
    #[must_use]
    pub fn message(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            end_of_message: true,
        }
    }
}

/// Accumulates transport input and yields complete frames.
///
/// # Examples
///
/// ```
/// use stompframe::codec::{Chunk, FrameReader, Framing, StompCodec};
///
/// let mut reader = FrameReader::new(StompCodec::default(), Framing::Stream);
/// assert!(reader.feed(Chunk::bytes("CONNEC")).expect("feed").is_empty());
/// let frames = reader
///     .feed(Chunk::bytes("TED\n\n\0"))
///     .expect("feed");
/// assert_eq!(frames[0].command(), "CONNECTED");
/// ```
#[derive(Debug)]
pub struct FrameReader {
    codec: StompCodec,
    framing: Framing,
    buffer: BytesMut,
}

impl FrameReader {
    /// Create a reader for a transport with the given framing.
    #[must_use]
    pub fn new(codec: StompCodec, framing: Framing) -> Self {
        Self {
            codec,
            framing,
            buffer: BytesMut::new(),
        }
    }

    /// Framing this reader was built for.
    #[must_use]
    pub fn framing(&self) -> Framing { self.framing }

    /// Bytes buffered but not yet part of a complete frame.
    #[must_use]
    pub fn buffered(&self) -> usize { self.buffer.len() }

    /// Feed a chunk and return every frame it completes, in order.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] of kind [`io::ErrorKind::InvalidData`] when
    /// buffered input exceeds the codec's maximum frame length.
    pub fn feed(&mut self, chunk: Chunk) -> io::Result<Vec<Frame>> {
        self.buffer.extend_from_slice(&chunk.data);
        let mut frames = Vec::new();
        match self.framing {
            Framing::Stream => {
                while let Some(frame) = self.codec.decode(&mut self.buffer)? {
                    frames.push(frame);
                }
            }
            Framing::Message if chunk.end_of_message => {
                while let Some(frame) = self.codec.decode_eof(&mut self.buffer)? {
                    frames.push(frame);
                }
            }
            Framing::Message => {
                if self.buffer.len() > self.codec.max_frame_length() {
                    return Err(CodecError::Framing(FramingError::OversizedFrame {
                        size: self.buffer.len(),
                        max: self.codec.max_frame_length(),
                    })
                    .into());
                }
            }
        }
        Ok(frames)
    }
}
