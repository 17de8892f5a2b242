//! Self-describing serialized values.
//!
//! A [`TypedPayload`] pairs a type URL with the encoded bytes of a message,
//! which lets a generic container (a listener filter, a discovery response)
//! carry nested configuration of any registered type.

use prost::Message;

use crate::constants::TYPE_URL_PREFIX;
use crate::PayloadError;

/// Messages that can be packed into a [`TypedPayload`].
pub trait TypedMessage: Message + Default + Sized {
    const TYPE_URL: &'static str;
}

/// Type-tagged opaque blob, wire compatible with `google.protobuf.Any`.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct TypedPayload {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

impl TypedPayload {
    /// Pack a message without a size limit.
    pub fn pack<M: TypedMessage>(message: &M) -> Self {
        Self {
            type_url: M::TYPE_URL.to_string(),
            value: message.encode_to_vec(),
        }
    }

    /// Pack a message, rejecting encodings larger than `limit` bytes.
    pub fn pack_bounded<M: TypedMessage>(
        message: &M,
        limit: usize,
    ) -> Result<Self, PayloadError> {
        let size = message.encoded_len();
        if size > limit {
            return Err(PayloadError::TooLarge {
                type_url: M::TYPE_URL,
                size,
                limit,
            });
        }

        let mut value = Vec::with_capacity(size);
        message.encode(&mut value)?;

        Ok(Self {
            type_url: M::TYPE_URL.to_string(),
            value,
        })
    }

    /// Decode the payload as `M`.
    ///
    /// # Errors
    /// - [`PayloadError::TypeMismatch`] if the payload is tagged with another type
    /// - [`PayloadError::Decode`] if the bytes are not a valid `M`
    pub fn unpack<M: TypedMessage>(&self) -> Result<M, PayloadError> {
        if !self.is::<M>() {
            return Err(PayloadError::TypeMismatch {
                expected: M::TYPE_URL,
                actual: self.type_url.clone(),
            });
        }
        Ok(M::decode(self.value.as_slice())?)
    }

    pub fn is<M: TypedMessage>(&self) -> bool {
        self.type_url == M::TYPE_URL
    }

    /// Fully qualified message name, without the `type.googleapis.com/` prefix.
    pub fn type_name(&self) -> &str {
        self.type_url.strip_prefix(TYPE_URL_PREFIX).unwrap_or(&self.type_url)
    }
}
