//! Tracing span and event helpers for grpc-web calls.
//!
//! Span creation with a dynamically selected level lives here so the
//! response controller only deals with an already-built [`Span`].

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;

/// Create a tracing span at a dynamically selected level.
///
/// Each branch calls the corresponding `tracing::<level>_span!` macro so the
/// span metadata is statically known per branch while the branch selection
/// is dynamic.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

/// Create a span for a unary call.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn unary_span(config: &TracingConfig, method: &str) -> Span {
    dynamic_span!(
        config.unary_level,
        "grpcweb.unary",
        rpc.method = method,
        status.code = tracing::field::Empty
    )
}

/// Create a span for a server-streaming call.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn streaming_span(config: &TracingConfig, method: &str) -> Span {
    dynamic_span!(
        config.streaming_level,
        "grpcweb.server_streaming",
        rpc.method = method,
        status.code = tracing::field::Empty
    )
}

/// Record elapsed time if timing was enabled for this call.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        let elapsed_us = start.elapsed().as_micros();
        tracing::debug!(elapsed_us = elapsed_us, "call.timing");
    }
}
