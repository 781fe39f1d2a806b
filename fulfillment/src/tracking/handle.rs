//! Starting and cancelling tracking through a running store.

use super::reducer::TrackingAction;
use crate::types::{Order, OrderId};
use freshcart_core::reducer::Reducer;
use freshcart_runtime::{Store, StoreError};

/// Cancels the engine of one tracked order
///
/// Cancelling is idempotent and safe after the order was delivered.
pub struct TrackingHandle<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    store: Store<S, A, E, R>,
    order_id: OrderId,
}

impl<S, A, E, R> TrackingHandle<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: From<TrackingAction> + Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// The tracked order
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Stop the engine; no callback fires for this order afterwards
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    pub async fn cancel(&self) -> Result<(), StoreError> {
        let action = TrackingAction::StopTracking {
            order_id: self.order_id.clone(),
        };
        let mut handle = self.store.send(A::from(action)).await?;
        handle.wait().await;
        Ok(())
    }
}

/// Start tracking `order` in `store` and return its cancellation handle
///
/// # Errors
///
/// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
pub async fn track_order<S, A, E, R>(
    store: &Store<S, A, E, R>,
    order: Order,
) -> Result<TrackingHandle<S, A, E, R>, StoreError>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: From<TrackingAction> + Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    let order_id = order.id.clone();
    store
        .send(A::from(TrackingAction::StartTracking { order }))
        .await?;

    Ok(TrackingHandle {
        store: store.clone(),
        order_id,
    })
}
