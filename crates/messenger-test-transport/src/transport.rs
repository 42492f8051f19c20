//! The in-memory test transport.
//!
//! # Flow
//!
//! ```text
//! send ──> round-trip codec check ──> sent log + queue
//!                                        │
//!        intercepting? ── no ──> process(all)
//!
//! process(n) ──> worker: get() ──> bus.dispatch ──> ack | reject
//! ```
//!
//! The channel lock is never held while handlers run, so a handler may send
//! to the transport that is processing it.

use crate::collection::EnvelopeCollection;
use crate::error::{TransportError, TransportResult};
use crate::options::TransportOptions;
use crate::store::{ChannelState, ChannelStore, SharedChannel};
use crate::worker::Worker;
use messenger_core::{Envelope, MessageBus, MessageId, Serializer};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A transport the bus can send to and consume from.
pub trait Transport: Send + Sync {
    fn send(&self, envelope: Envelope) -> TransportResult<Envelope>;

    /// Envelopes currently waiting to be consumed.
    fn get(&self) -> Vec<Envelope>;

    fn ack(&self, envelope: Envelope);

    fn reject(&self, envelope: Envelope);

    /// Downcast hook used by the registry.
    fn as_in_memory(&self) -> Option<&InMemoryTransport> {
        None
    }
}

/// Transport that keeps messages in memory and hands them to the bus only
/// when told to.
///
/// Handles are cheap to clone; clones share channel state and mode flags.
#[derive(Clone)]
pub struct InMemoryTransport {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    bus: Arc<dyn MessageBus>,
    serializer: Arc<dyn Serializer>,
    state: SharedChannel,
    intercept: AtomicBool,
    catch_exceptions: AtomicBool,
}

impl InMemoryTransport {
    /// Creates a transport with its own private channel state.
    pub fn new(
        name: impl Into<String>,
        bus: Arc<dyn MessageBus>,
        serializer: Arc<dyn Serializer>,
        options: TransportOptions,
    ) -> Self {
        let state = Arc::new(Mutex::new(ChannelState::default()));
        Self::with_state(name.into(), bus, serializer, options, state)
    }

    /// Creates a transport whose channel state lives in `store` under `name`.
    ///
    /// Every transport built from the same store and name sees the same
    /// logs, and a `reset` through any of them clears them for all.
    pub fn shared(
        name: impl Into<String>,
        store: &ChannelStore,
        bus: Arc<dyn MessageBus>,
        serializer: Arc<dyn Serializer>,
        options: TransportOptions,
    ) -> Self {
        let name = name.into();
        let state = store.channel(&name);
        Self::with_state(name, bus, serializer, options, state)
    }

    fn with_state(
        name: String,
        bus: Arc<dyn MessageBus>,
        serializer: Arc<dyn Serializer>,
        options: TransportOptions,
        state: SharedChannel,
    ) -> Self {
        debug!(
            transport = %name,
            intercept = options.intercept,
            catch_exceptions = options.catch_exceptions,
            "Created in-memory transport"
        );

        Self {
            inner: Arc::new(Inner {
                name,
                bus,
                serializer,
                state,
                intercept: AtomicBool::new(options.intercept),
                catch_exceptions: AtomicBool::new(options.catch_exceptions),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_intercepting(&self) -> bool {
        self.inner.intercept.load(Ordering::SeqCst)
    }

    pub fn is_catching_exceptions(&self) -> bool {
        self.inner.catch_exceptions.load(Ordering::SeqCst)
    }

    /// Processes everything queued, then handles future sends immediately.
    pub fn unblock(&self) -> TransportResult<&Self> {
        self.process(None)?;
        self.inner.intercept.store(false, Ordering::SeqCst);

        info!(transport = %self.inner.name, "Transport unblocked");
        Ok(self)
    }

    /// Queues future sends instead of handling them.
    pub fn intercept(&self) -> &Self {
        self.inner.intercept.store(true, Ordering::SeqCst);
        self
    }

    /// Turns handler failures into rejects.
    pub fn catch_exceptions(&self) -> &Self {
        self.inner.catch_exceptions.store(true, Ordering::SeqCst);
        self
    }

    /// Returns handler failures from `process`.
    pub fn throw_exceptions(&self) -> &Self {
        self.inner.catch_exceptions.store(false, Ordering::SeqCst);
        self
    }

    /// Processes `count` queued messages, or all currently queued when `None`.
    ///
    /// The count is fixed when the call starts: messages queued by handlers
    /// during this call are left for a later one. Asking for more than is
    /// queued fails without touching the queue. Messages another worker is
    /// already handling count as queued but are not handled again, so a
    /// nested call may stop short of `count`.
    pub fn process(&self, count: Option<usize>) -> TransportResult<&Self> {
        let queued = self.inner.state.lock().queue().len();
        let count = count.unwrap_or(queued);

        if count > queued {
            return Err(TransportError::Precondition {
                requested: count,
                queued,
            });
        }

        if count == 0 {
            return Ok(self);
        }

        info!(transport = %self.inner.name, count, queued, "Processing queued messages");
        let handled = Worker::new(self, count).run()?;
        debug!(transport = %self.inner.name, handled, "Processing finished");

        Ok(self)
    }

    /// Processes every message currently queued.
    pub fn process_all(&self) -> TransportResult<&Self> {
        self.process(None)
    }

    /// Round-trips `envelope` through the codec, logs it and queues it.
    pub fn send(&self, envelope: Envelope) -> TransportResult<Envelope> {
        self.inner.serializer.verify_round_trip(&envelope)?;

        {
            let mut state = self.inner.state.lock();
            state.enqueue(envelope.clone());
            debug!(
                transport = %self.inner.name,
                kind = envelope.kind(),
                message_id = %envelope.message_id(),
                queued = state.queue().len(),
                "Message sent"
            );
        }

        if !self.is_intercepting() {
            self.process(None)?;
        }

        Ok(envelope)
    }

    /// Queued envelopes not already being handled. Used by the worker loop.
    pub fn get(&self) -> Vec<Envelope> {
        self.inner.state.lock().available().cloned().collect()
    }

    pub fn ack(&self, envelope: Envelope) {
        let kind = envelope.kind();
        let message_id = envelope.message_id();
        let was_pending = self.inner.state.lock().acknowledge(envelope);

        debug!(transport = %self.inner.name, kind, %message_id, was_pending, "Message acknowledged");
    }

    pub fn reject(&self, envelope: Envelope) {
        let kind = envelope.kind();
        let message_id = envelope.message_id();
        let was_pending = self.inner.state.lock().reject(envelope);

        debug!(transport = %self.inner.name, kind, %message_id, was_pending, "Message rejected");
    }

    pub fn is_pending(&self, id: MessageId) -> bool {
        self.inner.state.lock().is_pending(id)
    }

    pub(crate) fn claim(&self, id: MessageId) -> bool {
        self.inner.state.lock().claim(id)
    }

    pub(crate) fn release(&self, id: MessageId) {
        self.inner.state.lock().release(id);
    }

    pub fn queue(&self) -> EnvelopeCollection {
        EnvelopeCollection::new(self.inner.state.lock().queue().to_vec())
    }

    pub fn sent(&self) -> EnvelopeCollection {
        EnvelopeCollection::new(self.inner.state.lock().sent().to_vec())
    }

    pub fn acknowledged(&self) -> EnvelopeCollection {
        EnvelopeCollection::new(self.inner.state.lock().acknowledged().to_vec())
    }

    pub fn rejected(&self) -> EnvelopeCollection {
        EnvelopeCollection::new(self.inner.state.lock().rejected().to_vec())
    }

    /// Clears all four logs of this channel.
    pub fn reset(&self) {
        self.inner.state.lock().clear();
        info!(transport = %self.inner.name, "Transport reset");
    }

    pub(crate) fn bus(&self) -> &dyn MessageBus {
        self.inner.bus.as_ref()
    }
}

impl Transport for InMemoryTransport {
    fn send(&self, envelope: Envelope) -> TransportResult<Envelope> {
        InMemoryTransport::send(self, envelope)
    }

    fn get(&self) -> Vec<Envelope> {
        InMemoryTransport::get(self)
    }

    fn ack(&self, envelope: Envelope) {
        InMemoryTransport::ack(self, envelope)
    }

    fn reject(&self, envelope: Envelope) {
        InMemoryTransport::reject(self, envelope)
    }

    fn as_in_memory(&self) -> Option<&InMemoryTransport> {
        Some(self)
    }
}

impl fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("InMemoryTransport")
            .field("name", &self.inner.name)
            .field("intercept", &self.is_intercepting())
            .field("catch_exceptions", &self.is_catching_exceptions())
            .field("queued", &state.queue().len())
            .field("sent", &state.sent().len())
            .field("acknowledged", &state.acknowledged().len())
            .field("rejected", &state.rejected().len())
            .finish()
    }
}
