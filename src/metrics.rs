//! Optional counters for frame decoding and stream outcomes.
//!
//! With the `metrics` feature disabled every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::codec::FrameTag;

/// Frames decoded from response bodies, labelled by `kind`.
pub const FRAMES_DECODED: &str = "grpcweb_frames_decoded_total";
/// Responses abandoned because their framing was malformed.
pub const PARSE_ERRORS: &str = "grpcweb_parse_errors_total";
/// Streams that reached a terminal event, labelled by `outcome`.
pub const STREAMS_FINISHED: &str = "grpcweb_streams_finished_total";

/// How a stream finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The stream ended normally.
    Ok,
    /// The stream ended with an error event.
    Error,
    /// The caller cancelled the stream.
    Cancelled,
}

impl Outcome {
    /// Label used for the `outcome` metric dimension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Record a decoded frame.
pub fn inc_frames(kind: FrameTag) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_DECODED, "kind" => kind.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a framing failure.
pub fn inc_parse_errors() {
    #[cfg(feature = "metrics")]
    counter!(PARSE_ERRORS).increment(1);
}

/// Record a finished stream.
pub fn inc_streams_finished(outcome: Outcome) {
    #[cfg(feature = "metrics")]
    counter!(STREAMS_FINISHED, "outcome" => outcome.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}
