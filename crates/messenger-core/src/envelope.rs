//! The envelope: a message plus its stamps.

use crate::message::{AnyMessage, Message, MessageId};
use crate::stamp::{Stamp, StampKind};
use std::fmt;
use std::sync::Arc;

/// An immutable pairing of a message and ordered stamps.
///
/// Cloning an envelope, or deriving one with [`Envelope::with`], keeps the
/// same message allocation and therefore the same [`MessageId`].
#[derive(Clone)]
pub struct Envelope {
    message: Arc<dyn AnyMessage>,
    stamps: Vec<Stamp>,
}

impl Envelope {
    /// Wraps a freshly allocated message.
    pub fn new<M: Message>(message: M) -> Self {
        Self::wrap(Arc::new(message))
    }

    /// Wraps an existing message allocation, keeping its identity.
    pub fn wrap(message: Arc<dyn AnyMessage>) -> Self {
        Self::with_stamps(message, Vec::new())
    }

    pub fn with_stamps(message: Arc<dyn AnyMessage>, stamps: Vec<Stamp>) -> Self {
        Self { message, stamps }
    }

    /// Returns a copy with `stamp` appended.
    pub fn with(&self, stamp: Stamp) -> Self {
        let mut stamps = self.stamps.clone();
        stamps.push(stamp);
        Self::with_stamps(self.message.clone(), stamps)
    }

    /// Returns a copy without any stamp of `kind`.
    pub fn without(&self, kind: &StampKind) -> Self {
        let stamps = self
            .stamps
            .iter()
            .filter(|stamp| &stamp.kind() != kind)
            .cloned()
            .collect();
        Self::with_stamps(self.message.clone(), stamps)
    }

    pub fn message(&self) -> &dyn AnyMessage {
        self.message.as_ref()
    }

    /// The shared message allocation.
    pub fn shared_message(&self) -> &Arc<dyn AnyMessage> {
        &self.message
    }

    /// The message as `M`, if it is one.
    pub fn message_as<M: Message>(&self) -> Option<&M> {
        self.message.downcast_ref::<M>()
    }

    pub fn kind(&self) -> &'static str {
        self.message.kind()
    }

    pub fn message_id(&self) -> MessageId {
        MessageId::of(&self.message)
    }

    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    /// All stamps of `kind`, in attachment order.
    pub fn all(&self, kind: &StampKind) -> Vec<&Stamp> {
        self.stamps
            .iter()
            .filter(|stamp| &stamp.kind() == kind)
            .collect()
    }

    /// The most recently attached stamp of `kind`.
    pub fn last(&self, kind: &StampKind) -> Option<&Stamp> {
        self.stamps.iter().rev().find(|stamp| &stamp.kind() == kind)
    }

    pub fn has_stamp(&self, kind: &StampKind) -> bool {
        self.stamps.iter().any(|stamp| &stamp.kind() == kind)
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.message_id())
            .field("message", &self.message)
            .field("stamps", &self.stamps)
            .finish()
    }
}
