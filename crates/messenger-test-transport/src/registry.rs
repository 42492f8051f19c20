//! Directory of named transports.

use crate::error::{TransportError, TransportResult};
use crate::transport::{InMemoryTransport, Transport};
use std::sync::Arc;

/// Named transports in registration order.
///
/// Lookups only hand out in-memory test transports; anything else registered
/// under the requested name is reported as a misconfiguration.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: Vec<(String, Arc<dyn Transport>)>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `transport` under `name`, replacing an existing entry in place.
    pub fn register(&mut self, name: impl Into<String>, transport: Arc<dyn Transport>) {
        let name = name.into();

        match self.transports.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = transport,
            None => self.transports.push((name, transport)),
        }
    }

    /// Resolves the transport to inspect.
    ///
    /// Without a name, the single registered transport is returned.
    pub fn resolve(&self, name: Option<&str>) -> TransportResult<InMemoryTransport> {
        if self.transports.is_empty() {
            return Err(TransportError::NotFound(
                "No transports registered.".to_string(),
            ));
        }

        let (name, transport) = match name {
            Some(name) => self
                .transports
                .iter()
                .find(|(existing, _)| existing == name)
                .ok_or_else(|| {
                    TransportError::NotFound(format!("Transport \"{name}\" not registered."))
                })?,
            None if self.transports.len() == 1 => &self.transports[0],
            None => {
                return Err(TransportError::AmbiguousSelection {
                    names: self.names(),
                })
            }
        };

        transport.as_in_memory().cloned().ok_or_else(|| {
            TransportError::Configuration(format!(
                "Transport \"{name}\" needs to be set to \"test://\" in your test config to use this feature."
            ))
        })
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.transports.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}
