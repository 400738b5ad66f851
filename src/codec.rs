//! grpc-web wire framing.
//!
//! Every message on a grpc-web stream is wrapped in a frame of the form
//! `TAG(1) || LEN(4, big-endian) || PAYLOAD(LEN)`. The tag is `0x00` for a
//! serialized message and `0x80` for the trailer block that ends a response.
//!
//! Encoding is a pure function ([`encode_frame`]). Decoding is incremental:
//! response bytes arrive in arbitrary chunks, so [`FrameParser`] keeps the
//! partial frame between calls. [`GrpcWebCodec`] adapts the parser to
//! `tokio_util`'s [`Decoder`]/[`Encoder`] traits for callers that read from an
//! async byte source.
//!
//! The `grpc-web-text` variant base64-encodes the whole frame stream; see the
//! [`text`] module.

use std::{collections::VecDeque, io};

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::byte_order::write_network_u32;

pub mod error;
pub mod parser;
pub mod text;

pub use error::{ParseError, PayloadTooLarge};
pub use parser::{FrameParser, ParserState};
pub use text::{TextDecoder, encode_text};

/// Size of the tag byte plus the length prefix.
pub const FRAME_HEADER_SIZE: usize = 5;

/// Length prefix size (4 bytes for big-endian u32).
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Leading byte of a grpc-web frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameTag {
    /// A serialized application message.
    Data = 0x00,
    /// An HTTP/1-style header block carrying the final status.
    Trailer = 0x80,
}

impl FrameTag {
    /// Wire value of this tag.
    #[must_use]
    pub const fn as_u8(self) -> u8 { self as u8 }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Trailer => "trailer",
        }
    }
}

impl TryFrom<u8> for FrameTag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Data),
            0x80 => Ok(Self::Trailer),
            other => Err(other),
        }
    }
}

/// A complete grpc-web frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete serialized application message.
    Data(Bytes),
    /// Header-block bytes (`key: value\r\n` pairs) with the final status.
    Trailer(Bytes),
}

impl Frame {
    /// Build a frame from its tag and payload.
    #[must_use]
    pub fn new(tag: FrameTag, payload: Bytes) -> Self {
        match tag {
            FrameTag::Data => Self::Data(payload),
            FrameTag::Trailer => Self::Trailer(payload),
        }
    }

    /// Tag this frame is written with.
    #[must_use]
    pub fn tag(&self) -> FrameTag {
        match self {
            Self::Data(_) => FrameTag::Data,
            Self::Trailer(_) => FrameTag::Trailer,
        }
    }

    /// Payload bytes without the frame header.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        match self {
            Self::Data(payload) | Self::Trailer(payload) => payload,
        }
    }

    /// Consume the frame, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        match self {
            Self::Data(payload) | Self::Trailer(payload) => payload,
        }
    }

    /// Whether this is the trailer frame.
    #[must_use]
    pub fn is_trailer(&self) -> bool { matches!(self, Self::Trailer(_)) }

    /// Append the wire encoding of this frame to `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadTooLarge`] if the payload does not fit the 32-bit
    /// length prefix. Nothing is written in that case.
    pub fn encode_into(&self, dst: &mut BytesMut) -> Result<(), PayloadTooLarge> {
        write_frame(self.tag(), self.payload(), dst)
    }
}

fn write_frame(tag: FrameTag, payload: &[u8], dst: &mut BytesMut) -> Result<(), PayloadTooLarge> {
    let length = u32::try_from(payload.len()).map_err(|_| PayloadTooLarge {
        length: payload.len(),
    })?;
    dst.reserve(FRAME_HEADER_SIZE + payload.len());
    dst.put_u8(tag.as_u8());
    dst.put_slice(&write_network_u32(length));
    dst.put_slice(payload);
    Ok(())
}

/// Append a data frame carrying `payload` to `dst`.
///
/// # Errors
///
/// Returns [`PayloadTooLarge`] if the payload does not fit the 32-bit length
/// prefix.
pub fn encode_frame_into(payload: &[u8], dst: &mut BytesMut) -> Result<(), PayloadTooLarge> {
    write_frame(FrameTag::Data, payload, dst)
}

/// Wrap a serialized message in a data frame.
///
/// # Errors
///
/// Returns [`PayloadTooLarge`] if the payload does not fit the 32-bit length
/// prefix.
pub fn try_encode_frame(payload: &[u8]) -> Result<Bytes, PayloadTooLarge> {
    let mut dst = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
    encode_frame_into(payload, &mut dst)?;
    Ok(dst.freeze())
}

/// Wrap a serialized message in a data frame.
///
/// The result is `payload.len() + 5` bytes long: a `0x00` tag, the length as
/// a big-endian `u32`, then the payload.
///
/// # Panics
///
/// Panics if `payload` is longer than `u32::MAX` bytes. Use
/// [`try_encode_frame`] to handle that case.
///
/// # Examples
///
/// ```
/// use grpcweb::codec::encode_frame;
///
/// let frame = encode_frame(&[1, 2, 3]);
/// assert_eq!(&frame[..], &[0x00, 0, 0, 0, 3, 1, 2, 3]);
/// ```
#[must_use]
pub fn encode_frame(payload: &[u8]) -> Bytes {
    match try_encode_frame(payload) {
        Ok(frame) => frame,
        Err(err) => panic!("{err}"),
    }
}

/// Decode a fully buffered grpc-web body.
///
/// # Errors
///
/// Returns the parser's error for malformed input, or
/// [`ParseError::Truncated`] if the body ends inside a frame.
///
/// # Examples
///
/// ```
/// use grpcweb::codec::{Frame, decode_all, encode_frame};
///
/// let frames = decode_all(&encode_frame(b"hi")).expect("valid body");
/// assert_eq!(frames, vec![Frame::Data("hi".into())]);
/// ```
pub fn decode_all(body: &[u8]) -> Result<Vec<Frame>, ParseError> {
    let mut parser = FrameParser::new();
    let frames = parser.parse(body)?;
    if !parser.is_idle() {
        return Err(ParseError::Truncated {
            position: parser.position(),
        });
    }
    Ok(frames)
}

/// `tokio_util` codec for grpc-web frame streams.
///
/// Decoding drains every available byte into an internal [`FrameParser`] and
/// yields completed frames one at a time. Encoding writes any [`Frame`], or a
/// raw [`Bytes`] payload as a data frame.
#[derive(Debug, Default)]
pub struct GrpcWebCodec {
    parser: FrameParser,
    ready: VecDeque<Frame>,
}

impl GrpcWebCodec {
    /// Construct a codec without an inbound frame length limit.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Construct a codec that rejects frames longer than `max_frame_length`.
    #[must_use]
    pub fn with_max_frame_length(max_frame_length: u32) -> Self {
        Self {
            parser: FrameParser::with_max_frame_length(max_frame_length),
            ready: VecDeque::new(),
        }
    }
}

impl Decoder for GrpcWebCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.ready.is_empty() && !src.is_empty() {
            let chunk = src.split();
            self.ready.extend(self.parser.parse(&chunk)?);
        }
        Ok(self.ready.pop_front())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if let Some(err) = self.parser.error() {
            return Err(err.clone().into());
        }
        if self.parser.is_idle() {
            return Ok(None);
        }
        tracing::debug!(
            position = self.parser.position(),
            "grpc-web stream closed inside a frame"
        );
        Err(ParseError::Truncated {
            position: self.parser.position(),
        }
        .into())
    }
}

impl Encoder<Frame> for GrpcWebCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode_into(dst)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
    }
}

impl Encoder<Bytes> for GrpcWebCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame_into(&item, dst).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
    }
}
