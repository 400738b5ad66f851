//! Incremental grpc-web frame parser.
//!
//! [`FrameParser`] consumes response bytes in whatever chunks the transport
//! delivers and returns the frames completed by each chunk. A frame split
//! across chunks is carried over in the parser's state. The first malformed
//! byte breaks the parser for good.

use bytes::{Bytes, BytesMut};

use super::{Frame, FrameTag, LENGTH_PREFIX_SIZE, ParseError};
use crate::byte_order::read_network_u32;

/// Upper bound on the payload buffer reserved up front from a length prefix.
const MAX_PREALLOCATION: usize = 64 * 1024;

/// Payload-free view of the parser's position in the frame grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    /// At a frame boundary, waiting for a tag byte.
    AwaitingTag,
    /// Accumulating the 4-byte length prefix.
    AwaitingLength,
    /// Copying payload bytes.
    AwaitingPayload,
    /// A malformed frame was seen; all further input is rejected.
    Broken,
}

#[derive(Debug)]
enum State {
    AwaitingTag,
    AwaitingLength {
        tag: FrameTag,
        prefix: [u8; LENGTH_PREFIX_SIZE],
        filled: usize,
    },
    AwaitingPayload {
        tag: FrameTag,
        payload: BytesMut,
        remaining: usize,
    },
    Broken(ParseError),
}

/// Stateful grpc-web frame parser.
///
/// # Examples
///
/// ```
/// use grpcweb::codec::{Frame, FrameParser};
///
/// let mut parser = FrameParser::new();
/// assert!(parser.parse(&[0x00, 0, 0]).expect("valid prefix").is_empty());
/// let frames = parser.parse(&[0, 2, 38, 39]).expect("valid frame");
/// assert_eq!(frames, vec![Frame::Data(vec![38, 39].into())]);
/// ```
#[derive(Debug)]
pub struct FrameParser {
    state: State,
    position: u64,
    max_frame_length: Option<u32>,
}

impl Default for FrameParser {
    fn default() -> Self { Self::new() }
}

impl FrameParser {
    /// Create a parser that accepts any 32-bit frame length.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::AwaitingTag,
            position: 0,
            max_frame_length: None,
        }
    }

    /// Create a parser that breaks on frames longer than `max_frame_length`.
    #[must_use]
    pub fn with_max_frame_length(max_frame_length: u32) -> Self {
        Self {
            max_frame_length: Some(max_frame_length),
            ..Self::new()
        }
    }

    /// Feed the next chunk of the stream.
    ///
    /// Returns the frames completed by this chunk, in wire order. An empty
    /// chunk returns no frames and leaves the state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTag`] or [`ParseError::FrameTooLarge`]
    /// when the chunk contains a malformed frame header. Frames completed
    /// earlier in the same chunk are discarded. Once an error has been
    /// returned, every later call returns the same error.
    pub fn parse(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, ParseError> {
        if let State::Broken(err) = &self.state {
            return Err(err.clone());
        }
        let mut frames = Vec::new();
        let mut input = chunk;
        while !input.is_empty() {
            let consumed = self.step(input, &mut frames)?;
            input = &input[consumed..];
        }
        Ok(frames)
    }

    /// Current state of the frame grammar.
    #[must_use]
    pub fn state(&self) -> ParserState {
        match self.state {
            State::AwaitingTag => ParserState::AwaitingTag,
            State::AwaitingLength { .. } => ParserState::AwaitingLength,
            State::AwaitingPayload { .. } => ParserState::AwaitingPayload,
            State::Broken(_) => ParserState::Broken,
        }
    }

    /// Total number of bytes consumed across all calls.
    #[must_use]
    pub fn position(&self) -> u64 { self.position }

    /// Whether the parser sits on a frame boundary.
    #[must_use]
    pub fn is_idle(&self) -> bool { matches!(self.state, State::AwaitingTag) }

    /// Whether the parser has failed.
    #[must_use]
    pub fn is_broken(&self) -> bool { matches!(self.state, State::Broken(_)) }

    /// The error that broke the parser, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        match &self.state {
            State::Broken(err) => Some(err),
            _ => None,
        }
    }

    /// Advance the state machine over a prefix of `input`, returning the
    /// number of bytes consumed. `input` is never empty.
    fn step(&mut self, input: &[u8], frames: &mut Vec<Frame>) -> Result<usize, ParseError> {
        match &mut self.state {
            State::AwaitingTag => {
                let byte = input[0];
                let Ok(tag) = FrameTag::try_from(byte) else {
                    return Err(self.break_with(ParseError::InvalidTag {
                        tag: byte,
                        position: self.position,
                    }));
                };
                self.position += 1;
                self.state = State::AwaitingLength {
                    tag,
                    prefix: [0; LENGTH_PREFIX_SIZE],
                    filled: 0,
                };
                Ok(1)
            }
            State::AwaitingLength {
                tag,
                prefix,
                filled,
            } => {
                let take = (LENGTH_PREFIX_SIZE - *filled).min(input.len());
                prefix[*filled..*filled + take].copy_from_slice(&input[..take]);
                *filled += take;
                self.position += take as u64;
                if *filled == LENGTH_PREFIX_SIZE {
                    let tag = *tag;
                    let length = read_network_u32(*prefix);
                    self.begin_payload(tag, length, frames)?;
                }
                Ok(take)
            }
            State::AwaitingPayload {
                tag,
                payload,
                remaining,
            } => {
                let take = (*remaining).min(input.len());
                payload.extend_from_slice(&input[..take]);
                *remaining -= take;
                self.position += take as u64;
                if *remaining == 0 {
                    let frame = Frame::new(*tag, std::mem::take(payload).freeze());
                    frames.push(frame);
                    self.state = State::AwaitingTag;
                }
                Ok(take)
            }
            State::Broken(err) => Err(err.clone()),
        }
    }

    fn begin_payload(
        &mut self,
        tag: FrameTag,
        length: u32,
        frames: &mut Vec<Frame>,
    ) -> Result<(), ParseError> {
        if let Some(max) = self.max_frame_length.filter(|max| length > *max) {
            return Err(self.break_with(ParseError::FrameTooLarge {
                length,
                max,
                position: self.position.saturating_sub(1),
            }));
        }
        if length == 0 {
            frames.push(Frame::new(tag, Bytes::new()));
            self.state = State::AwaitingTag;
            return Ok(());
        }
        let remaining = length as usize;
        self.state = State::AwaitingPayload {
            tag,
            payload: BytesMut::with_capacity(remaining.min(MAX_PREALLOCATION)),
            remaining,
        };
        Ok(())
    }

    fn break_with(&mut self, err: ParseError) -> ParseError {
        tracing::warn!(
            position = self.position,
            error = %err,
            "grpc-web frame parser broken"
        );
        crate::metrics::inc_parse_errors();
        self.state = State::Broken(err.clone());
        err
    }
}
