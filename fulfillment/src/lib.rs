//! # FreshCart Fulfillment
//!
//! Order lifecycle and delivery estimation for the FreshCart storefront.
//!
//! - [`tracking`]: the Order Status Engine, advancing tracked orders through
//!   `pending → … → delivered` on a timer
//! - [`geo`]: haversine delivery cost and ETA, plus placeholder courier
//!   positions for maps
//! - [`policy`]: who may rate what, and rating aggregates
//! - [`rating`]: the rating submission flow
//! - [`fulfillment`]: tracking and ratings composed behind one store
//!
//! ## Example
//!
//! ```no_run
//! use fulfillment::fulfillment::{
//!     FulfillmentEnvironment, FulfillmentReducer, FulfillmentState, FulfillmentStore,
//! };
//! use fulfillment::mocks::InMemoryRatingStore;
//! use fulfillment::rating::RatingEnvironment;
//! use fulfillment::tracking::{track_order, LoggingObserver, TrackingEnvironment};
//! use fulfillment::types::{CustomerId, Order, OrderId};
//! use freshcart_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = FulfillmentEnvironment {
//!     tracking: TrackingEnvironment::new(Arc::new(SystemClock), Arc::new(LoggingObserver)),
//!     rating: RatingEnvironment::new(Arc::new(SystemClock), Arc::new(InMemoryRatingStore::new())),
//! };
//! let store = FulfillmentStore::new(FulfillmentState::default(), FulfillmentReducer::new(), env);
//!
//! let order = Order::new(
//!     OrderId::new("order-1"),
//!     CustomerId::new("cust-1"),
//!     Vec::new(),
//!     chrono::Utc::now(),
//! );
//! let handle = track_order(&store, order).await?;
//! handle.cancel().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fulfillment;
pub mod geo;
pub mod mocks;
pub mod policy;
pub mod rating;
pub mod tracking;
pub mod types;

pub use error::{PersistenceError, RatingError, TrackingRejection};
pub use fulfillment::{
    FulfillmentAction, FulfillmentEnvironment, FulfillmentReducer, FulfillmentState,
    FulfillmentStore,
};
pub use geo::{DeliveryCostEstimate, DeliveryPricing, estimate_delivery};
pub use types::{
    Coordinates, CustomerId, LineItem, Money, Order, OrderId, OrderStatus, ProductId,
    ProductRating, RatingValue, StatusUpdate,
};
