//! Error types for the fulfillment domain.

use crate::types::{CustomerId, OrderId, OrderStatus, ProductId};
use freshcart_runtime::StoreError;
use thiserror::Error;

/// Failure reported by the rating persistence collaborator
///
/// Opaque to the fulfillment core: it is surfaced to the caller, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The backing store could not be reached
    #[error("rating store unavailable: {0}")]
    Unavailable(String),

    /// The backing store refused the write
    #[error("rating store rejected write: {0}")]
    Rejected(String),
}

/// Errors from the rating submission flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// Required input missing (no order reference)
    #[error("validation failed: {0}")]
    Validation(String),

    /// No delivered order of this customer contains the product
    #[error("customer {customer_id} has no delivered order containing product {product_id}")]
    Ineligible {
        /// Product the customer tried to rate
        product_id: ProductId,
        /// Customer who tried to rate
        customer_id: CustomerId,
    },

    /// Rating outside 1..=5
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Saving the rating failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// No result arrived before the caller's deadline
    #[error("rating submission timed out")]
    Timeout,

    /// The store runtime refused or dropped the submission
    #[error("rating submission did not complete: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RatingError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Timeout => Self::Timeout,
            other => Self::Store(other),
        }
    }
}

/// Reasons a tracking command is refused
///
/// Recorded in state and logged; the status engine itself never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingRejection {
    /// The order is not known to the tracker
    #[error("order {0} is not known")]
    UnknownOrder(OrderId),

    /// The order already has a running engine
    #[error("order {0} is already being tracked")]
    AlreadyTracking(OrderId),

    /// An external update tried to move status backwards
    #[error("order {order_id} cannot move from {current} back to {requested}")]
    StatusRegression {
        /// Order the update targeted
        order_id: OrderId,
        /// Status the order already has
        current: OrderStatus,
        /// Status the update asked for
        requested: OrderStatus,
    },
}
