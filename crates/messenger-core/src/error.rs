//! Error types for the message model.

use thiserror::Error;

/// Boxed error returned by a failing handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Codec error.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The decoder has no type registered for this kind
    #[error("No message type registered for kind \"{0}\"")]
    UnknownKind(String),

    /// Decoding produced a message that differs from the encoded one
    #[error("Message \"{kind}\" did not survive an encode/decode round-trip unchanged")]
    Mismatch { kind: String },
}

/// Result type alias using SerializationError.
pub type SerializationResult<T> = Result<T, SerializationError>;

/// Failure raised by the dispatch pipeline for a single envelope.
#[derive(Error, Debug)]
pub enum HandlerFailure {
    /// No handler is registered for the message kind
    #[error("No handler for message \"{kind}\"")]
    NoHandler { kind: String },

    /// A handler returned an error
    #[error("Handling \"{kind}\" failed in {handler}: {source}")]
    Failed {
        kind: String,
        handler: String,
        #[source]
        source: BoxError,
    },
}

impl HandlerFailure {
    /// Kind of the message that failed.
    pub fn kind(&self) -> &str {
        match self {
            Self::NoHandler { kind } | Self::Failed { kind, .. } => kind,
        }
    }
}
