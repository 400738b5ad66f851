//! grpc-web client runtime.
//!
//! A [`GrpcWebClient`] serializes a request, frames it for the configured
//! wire format and hands it to a fresh [`Transport`](crate::transport::Transport).
//! The response is observed through a [`ResponseStream`], which the
//! transport's event loop drives with progress and completion
//! notifications. Unary calls are the same stream with a single completion
//! callback attached.

mod builder;
mod callbacks;
mod config;
mod error;
mod method;
mod request;
mod response_stream;
mod runtime;
mod tracing_config;
mod tracing_helpers;
mod unary;

pub use builder::GrpcWebClientBuilder;
pub use callbacks::{DataCallback, EndCallback, StatusCallback, StreamEvent};
pub use config::{ClientConfig, DEFAULT_USER_AGENT};
pub use error::{BoxError, ClientError};
pub use method::{MethodDescriptor, RequestSerializer, ResponseDeserializer};
pub use request::{CallOptions, GRPC_TIMEOUT, format_timeout};
pub use response_stream::ResponseStream;
pub use runtime::GrpcWebClient;
pub use tracing_config::TracingConfig;
pub use unary::UnaryCallback;
