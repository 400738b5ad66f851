//! Outgoing request construction.

use std::time::Duration;

use bytes::Bytes;

use super::{ClientConfig, ClientError};
use crate::{
    codec::{encode_text, try_encode_frame},
    config::WireFormat,
    metadata::Metadata,
    transport::TransportRequest,
};

/// Header carrying the call deadline as a relative timeout.
pub const GRPC_TIMEOUT: &str = "grpc-timeout";

/// Largest value the `grpc-timeout` header may carry in any unit.
const MAX_TIMEOUT_VALUE: u128 = 99_999_999;

/// Per-call options.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use grpcweb::client::CallOptions;
///
/// let options = CallOptions::default().with_deadline(Duration::from_secs(5));
/// assert_eq!(options.deadline(), Some(Duration::from_secs(5)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    deadline: Option<Duration>,
}

impl CallOptions {
    /// Ask the server to give up after `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Configured deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> { self.deadline }
}

/// Render a deadline in `grpc-timeout` syntax.
///
/// Milliseconds are used, rounded up with a floor of one. Deadlines too long
/// for eight digits of milliseconds fall back to whole seconds.
#[must_use]
pub fn format_timeout(deadline: Duration) -> String {
    let millis = deadline.as_nanos().div_ceil(1_000_000).max(1);
    if millis <= MAX_TIMEOUT_VALUE {
        return format!("{millis}m");
    }
    let seconds = deadline.as_nanos().div_ceil(1_000_000_000).min(MAX_TIMEOUT_VALUE);
    format!("{seconds}S")
}

fn encode_body(format: WireFormat, payload: &[u8]) -> Result<Bytes, ClientError> {
    let body = match format {
        WireFormat::Text => Bytes::from(encode_text(&try_encode_frame(payload)?)),
        WireFormat::Binary => try_encode_frame(payload)?,
        WireFormat::Json => Bytes::copy_from_slice(payload),
    };
    Ok(body)
}

/// Build the transport request for one call.
///
/// Header precedence, lowest first: protocol headers, client default
/// metadata, the deadline, then call metadata.
pub(crate) fn build_request(
    config: &ClientConfig,
    url: &str,
    payload: &[u8],
    metadata: &Metadata,
    options: CallOptions,
) -> Result<TransportRequest, ClientError> {
    let content_type = config.format.content_type();
    let mut headers = Metadata::new();
    headers.insert("Content-Type", content_type);
    headers.insert("Accept", content_type);
    headers.insert("X-User-Agent", config.user_agent.as_str());
    headers.insert("X-Grpc-Web", "1");
    headers.merge(&config.default_metadata);
    if let Some(deadline) = options.deadline {
        headers.insert(GRPC_TIMEOUT, format_timeout(deadline));
    }
    headers.merge(metadata);

    Ok(TransportRequest {
        url: url.to_owned(),
        method: "POST",
        body: encode_body(config.format, payload)?,
        headers,
    })
}
