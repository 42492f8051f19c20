//! Message traits and message identity.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value object that can travel on the bus.
///
/// `KIND` names the message type on the wire and in assertions.
pub trait Message:
    Serialize + DeserializeOwned + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const KIND: &'static str;
}

/// Object-safe view of a [`Message`].
///
/// Implemented for every `Message`; envelopes hold `Arc<dyn AnyMessage>`.
pub trait AnyMessage: fmt::Debug + Send + Sync {
    /// The message kind (`Message::KIND`).
    fn kind(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// Serializes the message body.
    fn to_value(&self) -> serde_json::Result<serde_json::Value>;

    /// Value equality across the type-erased boundary.
    fn equals(&self, other: &dyn AnyMessage) -> bool;
}

impl<M: Message> AnyMessage for M {
    fn kind(&self) -> &'static str {
        M::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    fn equals(&self, other: &dyn AnyMessage) -> bool {
        other
            .as_any()
            .downcast_ref::<M>()
            .is_some_and(|other| other == self)
    }
}

impl<'a> dyn AnyMessage + 'a {
    /// Returns the concrete message if it is an `M`.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }

    /// Returns true if the message is an `M`.
    pub fn is<M: Message>(&self) -> bool {
        self.as_any().is::<M>()
    }
}

/// Identity of a message allocation.
///
/// Two envelopes carry the same `MessageId` only if they wrap the same
/// `Arc`. Equal values in separate allocations are different messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(usize);

impl MessageId {
    pub fn of(message: &Arc<dyn AnyMessage>) -> Self {
        Self(Arc::as_ptr(message) as *const () as usize)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
