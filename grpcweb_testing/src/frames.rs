//! Builders for response body bytes.

use bytes::BytesMut;
use grpcweb::codec::{Frame, encode_frame, encode_text};

/// Wire bytes of a data frame carrying `payload`.
#[must_use]
pub fn data_frame(payload: &[u8]) -> Vec<u8> { encode_frame(payload).to_vec() }

/// Wire bytes of a trailer frame whose header block lists `pairs` in order.
///
/// # Panics
///
/// Panics if the block does not fit a frame.
#[must_use]
pub fn trailer_block(pairs: &[(&str, &str)]) -> Vec<u8> {
    let block: String = pairs
        .iter()
        .map(|(key, value)| format!("{key}:{value}\r\n"))
        .collect();
    let mut dst = BytesMut::new();
    Frame::Trailer(block.into())
        .encode_into(&mut dst)
        .expect("trailer block fits a frame");
    dst.to_vec()
}

/// Wire bytes of a trailer frame carrying `grpc-status` and, when not
/// empty, `grpc-message`.
#[must_use]
pub fn trailer_frame(code: i32, message: &str) -> Vec<u8> {
    let code = code.to_string();
    if message.is_empty() {
        trailer_block(&[("grpc-status", &code)])
    } else {
        trailer_block(&[("grpc-status", &code), ("grpc-message", message)])
    }
}

/// Base64 body for `grpc-web-text`, encoding each part on its own so padding
/// may appear mid-stream.
#[must_use]
pub fn text_body(parts: &[&[u8]]) -> String { parts.iter().map(|part| encode_text(part)).collect() }
