//! Channel state and the injectable store that shares it by name.
//!
//! A channel owns four ordered logs:
//!
//! - `sent`: every envelope ever sent, duplicates included
//! - `queue`: envelopes waiting to be processed, unique by message identity
//! - `acknowledged`: envelopes handled successfully
//! - `rejected`: envelopes whose handling failed
//!
//! Only [`ChannelState::clear`] ever shrinks `sent`, `acknowledged` or
//! `rejected`.
//!
//! Queued messages a worker has claimed stay in `queue` until settled but are
//! not offered to other workers, including ones nested inside a handler.

use messenger_core::{Envelope, MessageId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Channel state behind a lock, shared by every transport bound to it.
pub type SharedChannel = Arc<Mutex<ChannelState>>;

/// The four envelope logs of one channel.
#[derive(Debug, Default)]
pub struct ChannelState {
    sent: Vec<Envelope>,
    queue: Vec<Envelope>,
    acknowledged: Vec<Envelope>,
    rejected: Vec<Envelope>,
    in_flight: HashSet<MessageId>,
}

impl ChannelState {
    pub fn sent(&self) -> &[Envelope] {
        &self.sent
    }

    /// Pending envelopes in first-queued order.
    pub fn queue(&self) -> &[Envelope] {
        &self.queue
    }

    pub fn acknowledged(&self) -> &[Envelope] {
        &self.acknowledged
    }

    pub fn rejected(&self) -> &[Envelope] {
        &self.rejected
    }

    pub fn is_pending(&self, id: MessageId) -> bool {
        self.position(id).is_some()
    }

    /// Queued envelopes no worker is handling right now.
    pub fn available(&self) -> impl Iterator<Item = &Envelope> + '_ {
        self.queue
            .iter()
            .filter(|envelope| !self.in_flight.contains(&envelope.message_id()))
    }

    /// Marks a queued message as being handled.
    ///
    /// Returns false when it is no longer queued or already claimed.
    pub(crate) fn claim(&mut self, id: MessageId) -> bool {
        self.is_pending(id) && self.in_flight.insert(id)
    }

    /// Drops a claim. Settling a message already drops it.
    pub(crate) fn release(&mut self, id: MessageId) {
        self.in_flight.remove(&id);
    }

    /// Records a send and queues the envelope.
    ///
    /// A message already queued keeps its slot; the newer envelope replaces
    /// the older one in place.
    pub(crate) fn enqueue(&mut self, envelope: Envelope) {
        self.sent.push(envelope.clone());

        match self.position(envelope.message_id()) {
            Some(index) => self.queue[index] = envelope,
            None => self.queue.push(envelope),
        }
    }

    /// Logs an ack; returns whether the message was still queued.
    pub(crate) fn acknowledge(&mut self, envelope: Envelope) -> bool {
        let was_pending = self.remove_pending(envelope.message_id());
        self.acknowledged.push(envelope);
        was_pending
    }

    /// Logs a reject; returns whether the message was still queued.
    pub(crate) fn reject(&mut self, envelope: Envelope) -> bool {
        let was_pending = self.remove_pending(envelope.message_id());
        self.rejected.push(envelope);
        was_pending
    }

    pub(crate) fn clear(&mut self) {
        self.sent.clear();
        self.queue.clear();
        self.acknowledged.clear();
        self.rejected.clear();
        self.in_flight.clear();
    }

    /// Removing an identity that is not queued is a no-op.
    fn remove_pending(&mut self, id: MessageId) -> bool {
        self.in_flight.remove(&id);
        match self.position(id) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    fn position(&self, id: MessageId) -> Option<usize> {
        self.queue
            .iter()
            .position(|envelope| envelope.message_id() == id)
    }
}

/// Store of channel state keyed by channel name.
///
/// Transports bound to the same store and name observe the same logs, so a
/// transport can be rebuilt (per request, per test step) without losing what
/// was sent. Clones share the underlying map.
#[derive(Debug, Clone, Default)]
pub struct ChannelStore {
    channels: Arc<Mutex<HashMap<String, SharedChannel>>>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the channel for `name`, creating it on first access.
    pub fn channel(&self, name: &str) -> SharedChannel {
        self.channels
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.lock().contains_key(name)
    }

    /// Channel names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.channels.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Clears every channel in the store.
    pub fn reset_all(&self) {
        for channel in self.channels.lock().values() {
            channel.lock().clear();
        }
    }
}
