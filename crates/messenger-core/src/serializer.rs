//! Wire codec contract and the JSON reference codec.

use crate::envelope::Envelope;
use crate::error::{SerializationError, SerializationResult};
use crate::message::{AnyMessage, Message};
use crate::stamp::Stamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Encodes envelopes to bytes and back.
pub trait Serializer: Send + Sync {
    fn encode(&self, envelope: &Envelope) -> SerializationResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> SerializationResult<Envelope>;

    /// Encodes then decodes `envelope` and checks the message came back equal.
    fn verify_round_trip(&self, envelope: &Envelope) -> SerializationResult<()> {
        let decoded = self.decode(&self.encode(envelope)?)?;

        if !decoded.message().equals(envelope.message()) {
            return Err(SerializationError::Mismatch {
                kind: envelope.kind().to_string(),
            });
        }

        Ok(())
    }
}

type DecodeFn = fn(serde_json::Value) -> serde_json::Result<Arc<dyn AnyMessage>>;

fn decode_message<M: Message>(body: serde_json::Value) -> serde_json::Result<Arc<dyn AnyMessage>> {
    let message: M = serde_json::from_value(body)?;
    Ok(Arc::new(message))
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    kind: String,
    body: serde_json::Value,
    #[serde(default)]
    stamps: Vec<Stamp>,
}

/// JSON codec.
///
/// Decoding needs to know the concrete type behind each kind, so every
/// message type that crosses the wire must be registered.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    types: HashMap<&'static str, DecodeFn>,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `M` for decoding.
    pub fn register<M: Message>(mut self) -> Self {
        self.types.insert(M::KIND, decode_message::<M> as DecodeFn);
        self
    }

    pub fn knows(&self, kind: &str) -> bool {
        self.types.contains_key(kind)
    }
}

impl Serializer for JsonSerializer {
    fn encode(&self, envelope: &Envelope) -> SerializationResult<Vec<u8>> {
        let wire = WireEnvelope {
            kind: envelope.kind().to_string(),
            body: envelope.message().to_value()?,
            stamps: envelope
                .stamps()
                .iter()
                .filter(|stamp| stamp.is_sendable())
                .cloned()
                .collect(),
        };

        let bytes = serde_json::to_vec(&wire)?;
        trace!(kind = %wire.kind, len = bytes.len(), "Encoded envelope");
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> SerializationResult<Envelope> {
        let wire: WireEnvelope = serde_json::from_slice(bytes)?;

        let decode = self
            .types
            .get(wire.kind.as_str())
            .ok_or_else(|| SerializationError::UnknownKind(wire.kind.clone()))?;

        let message = decode(wire.body)?;
        Ok(Envelope::with_stamps(message, wire.stamps))
    }
}
