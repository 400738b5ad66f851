//! Per-method serialization.

use std::{fmt, sync::Arc};

use super::error::BoxError;
use crate::message::Message;

/// Serializes a request message into bytes.
pub type RequestSerializer<Req> = Arc<dyn Fn(&Req) -> Result<Vec<u8>, BoxError> + Send + Sync>;

/// Deserializes a response payload. `Ok(None)` marks a payload with nothing
/// to deliver; it is skipped rather than passed to the `data` callback.
pub type ResponseDeserializer<Resp> =
    Arc<dyn Fn(&[u8]) -> Result<Option<Resp>, BoxError> + Send + Sync>;

/// Describes how one RPC method encodes its request and decodes its
/// responses.
///
/// # Examples
///
/// ```
/// use grpcweb::client::MethodDescriptor;
///
/// let descriptor = MethodDescriptor::<String, String>::new(
///     "echo.Echo/Say",
///     |request: &String| Ok(request.as_bytes().to_vec()),
///     |payload: &[u8]| Ok(Some(String::from_utf8(payload.to_vec())?)),
/// );
/// assert_eq!(descriptor.name(), "echo.Echo/Say");
/// ```
pub struct MethodDescriptor<Req, Resp> {
    name: String,
    serialize: RequestSerializer<Req>,
    deserialize: ResponseDeserializer<Resp>,
}

impl<Req, Resp> MethodDescriptor<Req, Resp> {
    /// Build a descriptor from explicit serializer functions.
    pub fn new<S, D>(name: impl Into<String>, serialize: S, deserialize: D) -> Self
    where
        S: Fn(&Req) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<Option<Resp>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
        }
    }

    /// Fully qualified method name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Serialize a request.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize_request(&self, request: &Req) -> Result<Vec<u8>, BoxError> {
        (self.serialize)(request)
    }

    /// Shared handle to the response deserializer.
    #[must_use]
    pub fn response_deserializer(&self) -> ResponseDeserializer<Resp> {
        Arc::clone(&self.deserialize)
    }
}

impl<Req, Resp> MethodDescriptor<Req, Resp>
where
    Req: Message + 'static,
    Resp: Message + 'static,
{
    /// Descriptor encoding both directions with bincode.
    #[must_use]
    pub fn bincode(name: impl Into<String>) -> Self {
        Self::new(
            name,
            |request: &Req| request.to_bytes().map_err(BoxError::from),
            |payload: &[u8]| Resp::from_payload(payload).map_err(BoxError::from),
        )
    }
}

impl<Req, Resp> Clone for MethodDescriptor<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            serialize: Arc::clone(&self.serialize),
            deserialize: Arc::clone(&self.deserialize),
        }
    }
}

impl<Req, Resp> fmt::Debug for MethodDescriptor<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
