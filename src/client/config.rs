//! Client-wide settings shared by every call.

use super::TracingConfig;
use crate::{config::WireFormat, metadata::Metadata};

/// Default `X-User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("grpc-web-rust/", env!("CARGO_PKG_VERSION"));

/// Settings applied to every call made by a [`GrpcWebClient`](super::GrpcWebClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub(crate) format: WireFormat,
    pub(crate) max_frame_length: Option<u32>,
    pub(crate) default_metadata: Metadata,
    pub(crate) user_agent: String,
    pub(crate) tracing: TracingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            format: WireFormat::default(),
            max_frame_length: None,
            default_metadata: Metadata::new(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            tracing: TracingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Wire format used for requests and responses.
    #[must_use]
    pub fn format(&self) -> WireFormat { self.format }

    /// Inbound frame length limit, if any.
    #[must_use]
    pub fn max_frame_length(&self) -> Option<u32> { self.max_frame_length }

    /// Metadata sent with every call.
    #[must_use]
    pub fn default_metadata(&self) -> &Metadata { &self.default_metadata }

    /// Value of the `X-User-Agent` header.
    #[must_use]
    pub fn user_agent(&self) -> &str { &self.user_agent }
}
