//! Builds in-memory transports from `test://` DSNs.

use crate::error::{TransportError, TransportResult};
use crate::options::{TransportOptions, TEST_SCHEME};
use crate::store::ChannelStore;
use crate::transport::InMemoryTransport;
use messenger_core::{MessageBus, Serializer};
use std::sync::Arc;

/// Creates [`InMemoryTransport`]s bound to one bus and codec.
///
/// With a store attached, transports created for the same name share their
/// channel state; without one, every transport gets private state.
#[derive(Clone)]
pub struct TransportFactory {
    bus: Arc<dyn MessageBus>,
    serializer: Arc<dyn Serializer>,
    store: Option<ChannelStore>,
}

impl TransportFactory {
    pub fn new(bus: Arc<dyn MessageBus>, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            bus,
            serializer,
            store: None,
        }
    }

    pub fn with_store(mut self, store: ChannelStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn store(&self) -> Option<&ChannelStore> {
        self.store.as_ref()
    }

    /// Whether `dsn` names the test transport.
    pub fn supports(dsn: &str) -> bool {
        dsn.strip_prefix(TEST_SCHEME)
            .is_some_and(|rest| rest.starts_with("://"))
    }

    pub fn create(&self, name: &str, dsn: &str) -> TransportResult<InMemoryTransport> {
        if !Self::supports(dsn) {
            return Err(TransportError::InvalidDsn(format!(
                "{dsn}: the test transport only handles \"{TEST_SCHEME}://\" DSNs"
            )));
        }

        let options = TransportOptions::from_dsn(dsn)?;

        let transport = match &self.store {
            Some(store) => InMemoryTransport::shared(
                name,
                store,
                self.bus.clone(),
                self.serializer.clone(),
                options,
            ),
            None => InMemoryTransport::new(name, self.bus.clone(), self.serializer.clone(), options),
        };

        Ok(transport)
    }
}
