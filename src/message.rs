//! bincode-backed message helpers.
//!
//! Protobuf serialization is the generated stubs' business. The crate ships
//! bincode as its built-in message encoding so that method descriptors can be
//! built without generated code, for tools and tests.

use bincode::{
    BorrowDecode,
    Encode,
    borrow_decode_from_slice,
    config,
    encode_to_vec,
    error::{DecodeError, EncodeError},
};

/// Wrapper trait for message types carried in grpc-web frames.
///
/// Any type deriving [`Encode`] and [`BorrowDecode`] implements this trait
/// via the blanket implementation.
pub trait Message: Encode + for<'de> BorrowDecode<'de, ()> {
    /// Serialize the message with bincode's standard configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if serialization fails.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> { encode_to_vec(self, config::standard()) }

    /// Deserialize a frame payload.
    ///
    /// Every payload is handed to the decoder, including an empty one: a
    /// message whose encoding is zero bytes long is still a message. The
    /// `Option` matches [`ResponseDeserializer`](crate::client::ResponseDeserializer),
    /// whose `None` means "no message"; this helper never returns it.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the payload is not a valid encoding of
    /// `Self`.
    fn from_payload(bytes: &[u8]) -> Result<Option<Self>, DecodeError>
    where
        Self: Sized,
    {
        borrow_decode_from_slice(bytes, config::standard()).map(|(message, _)| Some(message))
    }
}

impl<T> Message for T where for<'de> T: Encode + BorrowDecode<'de, ()> {}
