//! STOMP framing codec.
//!
//! [`StompCodec`] implements [`tokio_util::codec::Decoder`] and
//! [`tokio_util::codec::Encoder`] for [`Frame`]. The wire format is a command
//! line, `key:value` header lines, a blank line, the body and a single NUL:
//!
//! ```text
//! COMMAND
//! header1:value1
//! header2:value2
//!
//! body-bytes\0
//! ```
//!
//! Header values are written verbatim; no escaping is applied.
//!
//! # Error Handling
//!
//! Frames that cannot be parsed (no blank line after the headers, an empty
//! command) are dropped without an error so the stream keeps flowing.
//! Buffering more than the configured maximum frame length is a
//! [`FramingError::OversizedFrame`], surfaced as an [`io::Error`] of kind
//! [`io::ErrorKind::InvalidData`].
//!
//! [`FrameReader`] drives the codec for both byte-oriented and
//! message-oriented transports.

use std::io;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::Frame;

pub mod error;
mod parse;
mod reader;

pub use error::{CodecError, FramingError};
pub use parse::parse_frame;
use parse::{Boundary, NUL, frame_end, leading_eols};
pub use reader::{Chunk, FrameReader, Framing};

/// Minimum frame length in bytes.
///
/// Frame lengths passed to codec constructors are clamped to at least this
/// value.
pub const MIN_FRAME_LENGTH: usize = 64;

/// Maximum frame length in bytes (16 MiB).
///
/// Frame lengths passed to codec constructors are clamped to at most this
/// value to prevent unbounded memory allocation.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Frame length used by [`StompCodec::default`] (1 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// Bytes sent as a heart-beat between frames.
pub const HEARTBEAT_EOL: &[u8] = b"\n";

pub(crate) fn clamp_frame_length(value: usize) -> usize {
    value.clamp(MIN_FRAME_LENGTH, MAX_FRAME_LENGTH)
}

/// Number of bytes [`encode_frame`] produces for `frame`.
fn encoded_len(frame: &Frame) -> usize {
    let headers: usize = frame
        .headers()
        .iter()
        .map(|(k, v)| k.len() + v.len() + 2)
        .sum();
    frame.command().len() + 1 + headers + 1 + frame.body().len() + 1
}

fn write_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.put_slice(frame.command().as_bytes());
    dst.put_u8(b'\n');
    for (key, value) in frame.headers().iter() {
        dst.put_slice(key.as_bytes());
        dst.put_u8(b':');
        dst.put_slice(value.as_bytes());
        dst.put_u8(b'\n');
    }
    dst.put_u8(b'\n');
    dst.put_slice(frame.body());
    dst.put_u8(NUL);
}

/// Encode a frame without size checks.
///
/// # Examples
///
/// ```
/// use stompframe::{codec::encode_frame, frame::Frame};
///
/// let bytes = encode_frame(&Frame::new("CONNECTED").with_header("version", "1.2"));
/// assert_eq!(&bytes[..], b"CONNECTED\nversion:1.2\n\n\0");
/// ```
#[must_use]
pub fn encode_frame(frame: &Frame) -> Bytes {
    let mut dst = BytesMut::with_capacity(encoded_len(frame));
    write_frame(frame, &mut dst);
    dst.freeze()
}

/// Codec translating between bytes and [`Frame`]s.
#[derive(Clone, Copy, Debug)]
pub struct StompCodec {
    max_frame_length: usize,
}

impl StompCodec {
    /// Construct a new codec with a maximum frame length.
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: clamp_frame_length(max_frame_length),
        }
    }

    /// Return the maximum frame length accepted by this codec.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.max_frame_length }

    fn oversized(&self, size: usize) -> io::Error {
        CodecError::Framing(FramingError::OversizedFrame {
            size,
            max: self.max_frame_length,
        })
        .into()
    }
}

impl Default for StompCodec {
    fn default() -> Self { Self::new(DEFAULT_MAX_FRAME_LENGTH) }
}

impl Decoder for StompCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let eols = leading_eols(src);
            src.advance(eols);
            if src.is_empty() {
                return Ok(None);
            }
            match frame_end(src) {
                Boundary::Complete(end) => {
                    if end >= self.max_frame_length {
                        return Err(self.oversized(end + 1));
                    }
                    let raw = src.split_to(end + 1);
                    if let Some(frame) = parse_frame(&raw[..end]) {
                        return Ok(Some(frame));
                    }
                    tracing::debug!(frame.bytes = end, "dropping unparseable frame");
                }
                Boundary::Incomplete(needed) => {
                    let size = needed.unwrap_or_default().max(src.len());
                    if size > self.max_frame_length {
                        return Err(self.oversized(size));
                    }
                    src.reserve(size - src.len());
                    return Ok(None);
                }
            }
        }
    }

    /// Decode the remaining input once no more bytes will follow.
    ///
    /// A trailing frame without its NUL terminator is accepted as complete,
    /// which is how message-oriented transports deliver frames.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let raw = src.split();
        let frame = parse_frame(&raw);
        if frame.is_none() {
            tracing::debug!(
                frame.bytes = raw.len(),
                "dropping unparseable unterminated frame"
            );
        }
        Ok(frame)
    }
}

impl Encoder<Frame> for StompCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.command().is_empty() {
            return Err(CodecError::Framing(FramingError::EmptyCommand).into());
        }
        let size = encoded_len(&item);
        if size > self.max_frame_length {
            return Err(self.oversized(size));
        }
        dst.reserve(size);
        write_frame(&item, dst);
        Ok(())
    }
}
