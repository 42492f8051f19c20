//! Error types for the test transport.

use messenger_core::{HandlerFailure, SerializationError};
use thiserror::Error;

/// Test transport error type.
#[derive(Error, Debug)]
pub enum TransportError {
    /// More messages requested than are queued
    #[error("Tried to process {requested} queued messages but only {queued} are in the queue.")]
    Precondition { requested: usize, queued: usize },

    /// The message does not survive the wire codec
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A handler failed while exceptions are being thrown
    #[error("Handler failure: {0}")]
    Handler(#[from] HandlerFailure),

    /// Registry lookup or envelope search found nothing
    #[error("{0}")]
    NotFound(String),

    /// Registry lookup without a name while several transports exist
    #[error("Multiple transports are registered ({}), you must specify a name.", .names.join(", "))]
    AmbiguousSelection { names: Vec<String> },

    /// Registered transport is not an in-memory test transport
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport DSN could not be parsed
    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),
}

/// Result type alias using TransportError.
pub type TransportResult<T> = Result<T, TransportError>;
