//! Builder for [`GrpcWebClient`].

use super::{ClientConfig, GrpcWebClient, TracingConfig};
use crate::{config::WireFormat, metadata::Metadata, transport::TransportFactory};

/// Builder for [`GrpcWebClient`].
///
/// # Examples
///
/// ```
/// use grpcweb::{
///     client::GrpcWebClientBuilder,
///     config::WireFormat,
///     metadata::Metadata,
/// };
///
/// let mut defaults = Metadata::new();
/// defaults.insert("authorization", "Bearer token");
/// let builder = GrpcWebClientBuilder::new()
///     .format(WireFormat::Binary)
///     .max_frame_length(4 * 1024 * 1024)
///     .default_metadata(defaults);
/// let _ = builder;
/// ```
#[derive(Clone, Debug, Default)]
pub struct GrpcWebClientBuilder {
    config: ClientConfig,
}

impl GrpcWebClientBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Select the wire format.
    #[must_use]
    pub fn format(mut self, format: WireFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Reject response frames whose declared length exceeds `max`.
    #[must_use]
    pub fn max_frame_length(mut self, max: u32) -> Self {
        self.config.max_frame_length = Some(max);
        self
    }

    /// Metadata sent with every call. Per-call metadata overrides it.
    #[must_use]
    pub fn default_metadata(mut self, metadata: Metadata) -> Self {
        self.config.default_metadata = metadata;
        self
    }

    /// Override the `X-User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Configure tracing spans and timing.
    #[must_use]
    pub fn tracing_config(mut self, tracing: TracingConfig) -> Self {
        self.config.tracing = tracing;
        self
    }

    /// Finish the builder with the factory that creates per-call transports.
    #[must_use]
    pub fn build<F: TransportFactory>(self, factory: F) -> GrpcWebClient<F> {
        GrpcWebClient::with_config(factory, self.config)
    }
}
