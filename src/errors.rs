//! Discovery Cache Error Hierarchy
//!
//! Defines the error types of the discovery cache, categorized by the layer
//! that produces them: configuration, resource generation, typed payload
//! encoding and the session layer that fronts the cache.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source or deserialization failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration values rejected by validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Resource snapshot generation failures
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Metrics collection or encoding failures
    #[error(transparent)]
    Metrics(#[from] prometheus::Error),

    /// Discovery stream rejected by the session layer or a callback
    #[error("Session error: {0}")]
    Session(String),

    /// Service cannot take the stream right now. Returned by `Callbacks`
    /// implementations to refuse work, surfaced as `Unavailable`.
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Nested configuration could not be packed into a typed payload
    #[error("Failed to serialize {type_url} while generating {resource}")]
    Serialization {
        resource: &'static str,
        type_url: &'static str,
        #[source]
        source: PayloadError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// Payload tagged with a different type than the one requested
    #[error("Type URL mismatch (expected: {expected}, actual: {actual})")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },

    /// Encoded message exceeds the configured payload limit
    #[error("Payload for {type_url} is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        type_url: &'static str,
        size: usize,
        limit: usize,
    },

    #[error(transparent)]
    Encode(#[from] prost::EncodeError),

    #[error(transparent)]
    Decode(#[from] prost::DecodeError),
}

impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Session(msg) => tonic::Status::invalid_argument(msg),
            Error::Generation(e) => tonic::Status::internal(e.to_string()),
            Error::Config(e) => tonic::Status::failed_precondition(e.to_string()),
            Error::InvalidConfig(msg) => tonic::Status::failed_precondition(msg),
            Error::Metrics(e) => tonic::Status::internal(e.to_string()),
            Error::Fatal(msg) => tonic::Status::unavailable(msg),
        }
    }
}
