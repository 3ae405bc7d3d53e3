use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Delivery, DeliveryId, Transport, TransportError};

/// Keeps every delivery in memory for later inspection
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    delivered: Arc<Mutex<Vec<(DeliveryId, Delivery)>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far, oldest first
    pub fn deliveries(&self) -> Vec<(DeliveryId, Delivery)> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn deliver(&self, delivery: Delivery) -> Result<DeliveryId, TransportError> {
        if delivery.to.trim().is_empty() {
            return Err(TransportError::InvalidDelivery("missing recipient".into()));
        }

        let id = DeliveryId::new();
        self.delivered
            .lock()
            .map_err(|e| TransportError::Other(e.to_string()))?
            .push((id, delivery));
        Ok(id)
    }
}
