//! Envelope metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed metadata item attached to an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stamp {
    /// Name of the bus the message was dispatched on.
    Bus { name: String },
    /// Requested delivery delay.
    Delay { millis: u64 },
    /// The envelope was pulled from this transport by a worker.
    Received { transport: String },
    /// A handler ran successfully for the message.
    Handled { handler: String },
    /// Redelivery attempt counter.
    Redelivery { retry_count: u32 },
    /// Why handling failed.
    ErrorDetails { message: String },
    /// Broker-assigned message id.
    TransportMessageId { id: String },
    /// Application-defined metadata.
    Custom {
        name: String,
        #[serde(default)]
        value: serde_json::Value,
    },
}

impl Stamp {
    pub fn kind(&self) -> StampKind {
        match self {
            Self::Bus { .. } => StampKind::Bus,
            Self::Delay { .. } => StampKind::Delay,
            Self::Received { .. } => StampKind::Received,
            Self::Handled { .. } => StampKind::Handled,
            Self::Redelivery { .. } => StampKind::Redelivery,
            Self::ErrorDetails { .. } => StampKind::ErrorDetails,
            Self::TransportMessageId { .. } => StampKind::TransportMessageId,
            Self::Custom { name, .. } => StampKind::Custom(name.clone()),
        }
    }

    /// Whether the stamp is written to the wire.
    ///
    /// Received and Handled only describe local processing.
    pub fn is_sendable(&self) -> bool {
        !matches!(self, Self::Received { .. } | Self::Handled { .. })
    }
}

/// Tag identifying a stamp type, used for lookups and assertions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StampKind {
    Bus,
    Delay,
    Received,
    Handled,
    Redelivery,
    ErrorDetails,
    TransportMessageId,
    Custom(String),
}

impl StampKind {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

impl fmt::Display for StampKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => f.write_str("bus"),
            Self::Delay => f.write_str("delay"),
            Self::Received => f.write_str("received"),
            Self::Handled => f.write_str("handled"),
            Self::Redelivery => f.write_str("redelivery"),
            Self::ErrorDetails => f.write_str("error_details"),
            Self::TransportMessageId => f.write_str("transport_message_id"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}
