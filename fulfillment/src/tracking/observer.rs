//! Callbacks fired by the status engine.

use crate::types::{OrderId, StatusUpdate};

/// Receives status changes of tracked orders
///
/// Called synchronously from the reducer while the store holds its state
/// lock. Implementations must return quickly and must not send actions back
/// into the same store from inside a callback.
pub trait TrackingObserver: Send + Sync {
    /// A tracked order reached a new status
    fn on_update(&self, order_id: &OrderId, update: &StatusUpdate);

    /// A tracked order reached `Delivered`; no further callbacks follow
    fn on_complete(&self, order_id: &OrderId);
}

/// Observer that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl TrackingObserver for LoggingObserver {
    fn on_update(&self, order_id: &OrderId, update: &StatusUpdate) {
        tracing::info!(
            %order_id,
            status = %update.status,
            estimated_delivery = %update.estimated_delivery,
            "Order status changed"
        );
    }

    fn on_complete(&self, order_id: &OrderId) {
        tracing::info!(%order_id, "Order delivered");
    }
}
