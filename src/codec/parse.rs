//! STOMP frame boundary detection and parsing.
//!
//! The parser operates on raw bytes. [`frame_end`] answers "where does the
//! next frame stop?" without allocating, and [`parse_frame`] turns the bytes
//! of one frame (terminator excluded) into a [`Frame`]. Anything that cannot
//! be parsed yields `None`; callers drop it.

use std::str;

use bytes::Bytes;

use crate::frame::{CONTENT_LENGTH, Frame, Headers};

/// Byte terminating every frame.
pub(crate) const NUL: u8 = 0;

/// Location of the blank line separating headers from the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HeaderBlock {
    /// Index one past the last byte of the header lines.
    head_end: usize,
    /// Index of the first body byte.
    body_start: usize,
}

/// Find the first blank line, accepting `\n` or `\r\n` line endings.
fn header_block(buf: &[u8]) -> Option<HeaderBlock> {
    buf.iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .find_map(|(i, _)| match buf.get(i + 1..) {
            Some([b'\n', ..]) => Some(HeaderBlock {
                head_end: i,
                body_start: i + 2,
            }),
            Some([b'\r', b'\n', ..]) => Some(HeaderBlock {
                head_end: i,
                body_start: i + 3,
            }),
            _ => None,
        })
}

fn header_lines(head: &str) -> impl Iterator<Item = &str> {
    head.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Body length declared by a `content-length` header in `head`, if any.
fn declared_length(head: &[u8]) -> Option<usize> {
    let head = str::from_utf8(head).ok()?;
    header_lines(head)
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| *key == CONTENT_LENGTH)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Outcome of scanning a buffer for the end of the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// The frame terminator sits at this index.
    Complete(usize),
    /// More bytes are needed. Carries the total size required when a
    /// `content-length` header announced it.
    Incomplete(Option<usize>),
}

/// Locate the terminator of the frame starting at `buf[0]`.
///
/// A valid `content-length` lets the body contain NUL bytes. When the byte
/// after the declared body is not NUL the declaration is ignored and the
/// first NUL after the headers ends the frame instead.
///
/// The declaration is trusted until that byte is available, as STOMP 1.2
/// requires. On a byte stream a frame that overstates its length is held
/// back, even if a NUL already follows the real body, until enough further
/// input arrives or the buffer exceeds the maximum frame length. Message
/// framing is unaffected because the end of a message ends the frame.
pub(crate) fn frame_end(buf: &[u8]) -> Boundary {
    let first_nul = buf.iter().position(|b| *b == NUL);
    let block =
        header_block(buf).filter(|block| first_nul.is_none_or(|n| n >= block.body_start));
    let Some(block) = block else {
        return first_nul.map_or(Boundary::Incomplete(None), Boundary::Complete);
    };
    let nul_after_headers = || {
        buf[block.body_start..]
            .iter()
            .position(|b| *b == NUL)
            .map(|offset| block.body_start + offset)
    };
    match declared_length(&buf[..block.head_end]) {
        Some(len) => {
            let end = block.body_start.saturating_add(len);
            match buf.get(end) {
                None => Boundary::Incomplete(Some(end.saturating_add(1))),
                Some(&NUL) => Boundary::Complete(end),
                Some(_) => {
                    nul_after_headers().map_or(Boundary::Incomplete(None), Boundary::Complete)
                }
            }
        }
        None => first_nul.map_or(Boundary::Incomplete(None), Boundary::Complete),
    }
}

/// Parse the bytes of a single frame, terminator excluded.
///
/// Returns `None` for empty input, a blank command line, non-UTF-8 headers
/// or headers without a terminating blank line. Header lines lacking a colon
/// are skipped; keys and values are taken verbatim.
#[must_use]
pub fn parse_frame(raw: &[u8]) -> Option<Frame> {
    let block = header_block(raw)?;
    let head = str::from_utf8(&raw[..block.head_end]).ok()?;
    let mut lines = header_lines(head);
    let command = lines.next()?.trim();
    if command.is_empty() {
        return None;
    }
    let headers: Headers = lines.filter_map(|line| line.split_once(':')).collect();
    let body = Bytes::copy_from_slice(&raw[block.body_start..]);
    Some(Frame::from_parts(command, headers, body))
}

/// Number of heart-beat end-of-line bytes at the start of `buf`.
pub(crate) fn leading_eols(buf: &[u8]) -> usize {
    buf.iter()
        .take_while(|b| matches!(**b, b'\n' | b'\r'))
        .count()
}
