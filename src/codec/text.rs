//! `grpc-web-text` support.
//!
//! In text mode the whole frame stream is base64-encoded. The transport hands
//! over text in arbitrary chunks, so only complete 4-character quanta can be
//! decoded; the remainder is kept until the next chunk arrives. Servers may
//! encode each message separately, which puts `=` padding in the middle of
//! the stream, so every padded quantum closes a segment that is decoded on
//! its own.

use base64::{
    Engine,
    alphabet,
    engine::{
        DecodePaddingMode,
        general_purpose::{GeneralPurpose, GeneralPurposeConfig},
    },
};

use super::ParseError;

const QUANTUM: usize = 4;

const STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Base64-encode a request body for `grpc-web-text`.
///
/// # Examples
///
/// ```
/// use grpcweb::codec::encode_text;
///
/// assert_eq!(encode_text(&[0, 0, 0, 0, 0]), "AAAAAAA=");
/// ```
#[must_use]
pub fn encode_text(bytes: &[u8]) -> String { STANDARD.encode(bytes) }

/// Incremental base64 decoder with quantum alignment buffering.
#[derive(Debug, Default)]
pub struct TextDecoder {
    pending: Vec<u8>,
    position: u64,
    error: Option<ParseError>,
}

impl TextDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Decode as much of the accumulated text as forms whole quanta.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidBase64`] if a complete quantum cannot be
    /// decoded. The error is sticky: later calls return it again.
    pub fn feed(&mut self, text: &[u8]) -> Result<Vec<u8>, ParseError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.pending.extend_from_slice(text);
        let aligned = self.pending.len() - self.pending.len() % QUANTUM;
        if aligned == 0 {
            return Ok(Vec::new());
        }
        let ready: Vec<u8> = self.pending.drain(..aligned).collect();
        match decode_segments(&ready, self.position) {
            Ok(decoded) => {
                self.position += aligned as u64;
                Ok(decoded)
            }
            Err(err) => {
                tracing::warn!(error = %err, "grpc-web-text body is not valid base64");
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Number of buffered characters waiting for a complete quantum.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.pending.len() }
}

fn decode_segments(text: &[u8], base: u64) -> Result<Vec<u8>, ParseError> {
    let mut decoded = Vec::with_capacity(text.len() / QUANTUM * 3);
    let mut start = 0;
    for end in (QUANTUM..=text.len()).step_by(QUANTUM) {
        if text[end - 1] != b'=' && end != text.len() {
            continue;
        }
        STANDARD
            .decode_vec(&text[start..end], &mut decoded)
            .map_err(|err| ParseError::InvalidBase64 {
                position: base + start as u64,
                reason: err.to_string(),
            })?;
        start = end;
    }
    Ok(decoded)
}
