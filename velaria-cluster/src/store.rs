//! In-memory attribute storage
//!
//! [`RamAttributeStore`] is a fixed-capacity stand-in for the host
//! stack's attribute storage engine, used by the firmware and by host
//! tests. [`NotifyingStore`] layers the attribute-change notification
//! hook on top of any store, posting mapped events after every
//! successful write.

use heapless::LinearMap;

use crate::attributes::{Attribute, AttributeStore, ClusterError, EndpointId, WINDOW_COVERING_CLUSTER_ID};
use crate::events::EventSink;
use crate::notify;

/// Attributes stored per endpoint
const ATTRIBUTES_PER_ENDPOINT: usize = 24;

/// Zero-initialized attribute storage for `E` endpoints
pub struct RamAttributeStore<const E: usize> {
    endpoints: [EndpointId; E],
    values: [LinearMap<u32, u16, ATTRIBUTES_PER_ENDPOINT>; E],
}

impl<const E: usize> RamAttributeStore<E> {
    pub fn new(endpoints: [EndpointId; E]) -> Self {
        Self {
            endpoints,
            values: core::array::from_fn(|_| LinearMap::new()),
        }
    }

    fn index_of(&self, endpoint: EndpointId) -> Result<usize, ClusterError> {
        self.endpoints
            .iter()
            .position(|&candidate| candidate == endpoint)
            .ok_or(ClusterError::UnsupportedEndpoint)
    }
}

impl<const E: usize> AttributeStore for RamAttributeStore<E> {
    fn get(&self, endpoint: EndpointId, attribute: Attribute) -> Result<u16, ClusterError> {
        let index = self.index_of(endpoint)?;
        // Unwritten attributes read back as zero
        Ok(self.values[index]
            .get(&attribute.id())
            .copied()
            .unwrap_or(0))
    }

    fn set(
        &mut self,
        endpoint: EndpointId,
        attribute: Attribute,
        value: u16,
    ) -> Result<(), ClusterError> {
        let index = self.index_of(endpoint)?;
        self.values[index]
            .insert(attribute.id(), value)
            // Capacity covers every attribute the cluster defines, so a
            // full map means an attribute outside that set
            .map_err(|_| ClusterError::UnsupportedAttribute)?;
        Ok(())
    }
}

/// Store wrapper that posts attribute-change events after writes
pub struct NotifyingStore<'a, S: AttributeStore, Q: EventSink> {
    inner: &'a mut S,
    sink: &'a Q,
}

impl<'a, S: AttributeStore, Q: EventSink> NotifyingStore<'a, S, Q> {
    pub fn new(inner: &'a mut S, sink: &'a Q) -> Self {
        Self { inner, sink }
    }
}

impl<S: AttributeStore, Q: EventSink> AttributeStore for NotifyingStore<'_, S, Q> {
    fn get(&self, endpoint: EndpointId, attribute: Attribute) -> Result<u16, ClusterError> {
        self.inner.get(endpoint, attribute)
    }

    fn set(
        &mut self,
        endpoint: EndpointId,
        attribute: Attribute,
        value: u16,
    ) -> Result<(), ClusterError> {
        self.inner.set(endpoint, attribute, value)?;
        if let Some(event) =
            notify::attribute_event(endpoint, WINDOW_COVERING_CLUSTER_ID, attribute.id(), &[])
        {
            self.sink.post(event);
        }
        Ok(())
    }
}
