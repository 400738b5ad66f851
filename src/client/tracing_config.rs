//! Tracing configuration for grpc-web calls.
//!
//! [`TracingConfig`] controls the level of the span that wraps each call and
//! whether an elapsed-time event is recorded when the call finishes.

use tracing::Level;

/// Controls tracing span levels and per-call timing.
///
/// By default unary and server-streaming calls both emit spans at `DEBUG`
/// level and timing is disabled.
///
/// Spans are always created at the configured level. When no `tracing`
/// subscriber is installed, span creation is a no-op. When timing is
/// enabled, an event recording `elapsed_us` is emitted once the stream
/// reaches its terminal event.
///
/// # Examples
///
/// ```
/// use grpcweb::client::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_unary_level(Level::INFO)
///     .with_streaming_timing(true);
/// let _ = config;
/// ```
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub(crate) unary_level: Level,
    pub(crate) streaming_level: Level,
    pub(crate) unary_timing: bool,
    pub(crate) streaming_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            unary_level: Level::DEBUG,
            streaming_level: Level::DEBUG,
            unary_timing: false,
            streaming_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the span level for unary calls.
    #[must_use]
    pub fn with_unary_level(mut self, level: Level) -> Self {
        self.unary_level = level;
        self
    }

    /// Enable or disable timing for unary calls.
    #[must_use]
    pub fn with_unary_timing(mut self, enabled: bool) -> Self {
        self.unary_timing = enabled;
        self
    }

    /// Set the span level for server-streaming calls.
    #[must_use]
    pub fn with_streaming_level(mut self, level: Level) -> Self {
        self.streaming_level = level;
        self
    }

    /// Enable or disable timing for server-streaming calls.
    #[must_use]
    pub fn with_streaming_timing(mut self, enabled: bool) -> Self {
        self.streaming_timing = enabled;
        self
    }

    /// Set the span level for every call kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use grpcweb::client::TracingConfig;
    /// use tracing::Level;
    ///
    /// let config = TracingConfig::default().with_all_levels(Level::TRACE);
    /// let _ = config;
    /// ```
    #[must_use]
    pub fn with_all_levels(mut self, level: Level) -> Self {
        self.unary_level = level;
        self.streaming_level = level;
        self
    }

    /// Enable or disable timing for every call kind.
    #[must_use]
    pub fn with_all_timing(mut self, enabled: bool) -> Self {
        self.unary_timing = enabled;
        self.streaming_timing = enabled;
        self
    }
}
