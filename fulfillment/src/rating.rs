//! Rating Submission Flow
//!
//! A submission is checked against the eligibility policy, persisted through
//! the injected [`RatingStore`], then recorded in the in-memory
//! [`RatingBook`] so later queries in the process see it. The customer's
//! selected star value is tracked optimistically and rolled back to the last
//! committed rating when a submission fails.

use crate::error::{PersistenceError, RatingError};
use crate::policy::{self, RatingBook};
use crate::types::{CustomerId, Order, OrderId, ProductId, ProductRating, RatingKey, RatingValue};
use freshcart_core::async_effect;
use freshcart_core::effect::Effect;
use freshcart_core::environment::Clock;
use freshcart_core::reducer::Reducer;
use freshcart_core::{SmallVec, smallvec};
use freshcart_runtime::{Store, StoreError};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Persists submitted ratings
///
/// Returns a boxed future so the store can be held as `Arc<dyn RatingStore>`
/// and captured by effects.
pub trait RatingStore: Send + Sync {
    /// Save or overwrite the rating for its (product, customer) key
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when the write did not happen.
    fn save_rating(
        &self,
        rating: ProductRating,
    ) -> Pin<Box<dyn Future<Output = Result<(), PersistenceError>> + Send + '_>>;
}

/// Told about every rating that was saved
///
/// Called synchronously from the reducer while the store holds its state
/// lock. Implementations must return quickly and must not send actions back
/// into the same store from inside a callback.
pub trait RatingNotifier: Send + Sync {
    /// Called once per saved rating, from inside the reducer
    fn on_rating_submitted(&self, rating: &ProductRating);
}

/// A customer's rating submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RatingRequest {
    /// Product being rated
    pub product_id: ProductId,
    /// Customer submitting
    pub customer_id: CustomerId,
    /// Order the product was delivered in; required
    pub order_id: Option<OrderId>,
    /// Star value
    pub rating: RatingValue,
}

impl RatingRequest {
    /// A request without an order reference
    #[must_use]
    pub const fn new(product_id: ProductId, customer_id: CustomerId, rating: RatingValue) -> Self {
        Self {
            product_id,
            customer_id,
            order_id: None,
            rating,
        }
    }

    /// Attach the order reference
    #[must_use]
    pub fn for_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    /// The (product, customer) key the request targets
    #[must_use]
    pub fn key(&self) -> RatingKey {
        RatingKey::new(self.product_id.clone(), self.customer_id.clone())
    }
}

/// Check a request against the known orders
///
/// Returns the referenced order id on success.
///
/// # Errors
///
/// - [`RatingError::Validation`] when no order is referenced, the order is
///   unknown, or it was placed by another customer
/// - [`RatingError::Ineligible`] when no delivered order of the customer
///   contains the product
pub fn validate_submission(
    request: &RatingRequest,
    orders: &[Order],
) -> Result<OrderId, RatingError> {
    let Some(order_id) = request.order_id.clone() else {
        return Err(RatingError::Validation("an order reference is required".to_string()));
    };

    let Some(order) = orders.iter().find(|order| order.id == order_id) else {
        return Err(RatingError::Validation(format!("unknown order {order_id}")));
    };
    if order.customer_id != request.customer_id {
        return Err(RatingError::Validation(format!(
            "order {order_id} was placed by another customer"
        )));
    }

    if !policy::can_rate(&request.product_id, &request.customer_id, orders) {
        return Err(RatingError::Ineligible {
            product_id: request.product_id.clone(),
            customer_id: request.customer_id.clone(),
        });
    }

    Ok(order_id)
}

/// Orders, committed ratings and in-flight submissions
#[derive(Clone, Debug, Default)]
pub struct RatingState {
    orders: Vec<Order>,
    book: RatingBook,
    selections: HashMap<RatingKey, RatingValue>,
    pending: HashMap<RatingKey, ProductRating>,
    last_error: Option<RatingError>,
}

impl RatingState {
    /// State seeded from previously loaded orders and ratings
    #[must_use]
    pub fn new(orders: Vec<Order>, ratings: impl IntoIterator<Item = ProductRating>) -> Self {
        let book: RatingBook = ratings.into_iter().collect();
        let selections = book.iter().map(|rating| (rating.key(), rating.rating)).collect();

        Self {
            orders,
            book,
            selections,
            ..Self::default()
        }
    }

    /// Committed ratings
    #[must_use]
    pub const fn book(&self) -> &RatingBook {
        &self.book
    }

    /// Known orders
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// A known order
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == order_id)
    }

    /// Whether the customer may rate the product
    #[must_use]
    pub fn can_rate(&self, product_id: &ProductId, customer_id: &CustomerId) -> bool {
        policy::can_rate(product_id, customer_id, &self.orders)
    }

    /// Whether the customer has a committed rating for the product
    #[must_use]
    pub fn has_rated(&self, product_id: &ProductId, customer_id: &CustomerId) -> bool {
        self.book.has_rated(product_id, customer_id)
    }

    /// Mean committed rating, `0.0` when there is none
    #[must_use]
    pub fn average_rating(&self, product_id: &ProductId) -> f64 {
        self.book.average_rating(product_id)
    }

    /// Star value currently shown for a key
    #[must_use]
    pub fn selection(&self, key: &RatingKey) -> Option<RatingValue> {
        self.selections.get(key).copied()
    }

    /// Whether a save is in flight for a key
    #[must_use]
    pub fn is_pending(&self, key: &RatingKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Error of the most recent failed submission
    #[must_use]
    pub const fn last_error(&self) -> Option<&RatingError> {
        self.last_error.as_ref()
    }

    /// Insert or replace a known order
    pub fn upsert_order(&mut self, order: Order) {
        match self.orders.iter_mut().find(|known| known.id == order.id) {
            Some(known) => *known = order,
            None => self.orders.push(order),
        }
    }

    fn roll_back_selection(&mut self, key: &RatingKey) {
        match self.book.get(key) {
            Some(committed) => {
                self.selections.insert(key.clone(), committed.rating);
            },
            None => {
                self.selections.remove(key);
            },
        }
    }
}

/// Inputs to the rating flow
#[derive(Clone, Debug, PartialEq)]
pub enum RatingAction {
    /// Customer picked a star value; not yet submitted
    SelectRating {
        /// Product and customer
        key: RatingKey,
        /// Picked value
        rating: RatingValue,
    },
    /// Validate and persist a rating
    SubmitRating {
        /// The submission
        request: RatingRequest,
    },
    /// Persistence succeeded
    RatingSaved {
        /// The stored rating
        rating: ProductRating,
    },
    /// Persistence failed
    RatingSaveFailed {
        /// Product and customer
        key: RatingKey,
        /// Store failure
        error: PersistenceError,
    },
    /// Submission refused before persistence
    RatingRejected {
        /// Product and customer
        key: RatingKey,
        /// Validation or eligibility failure
        error: RatingError,
    },
    /// An order changed elsewhere (status engine, checkout)
    OrderUpdated {
        /// Latest order snapshot
        order: Order,
    },
}

impl RatingAction {
    /// Final result of a submission for `key`, if this action is one
    #[must_use]
    pub fn outcome(&self, key: &RatingKey) -> Option<Result<ProductRating, RatingError>> {
        match self {
            Self::RatingSaved { rating } if &rating.key() == key => Some(Ok(rating.clone())),
            Self::RatingSaveFailed { key: failed, error } if failed == key => {
                Some(Err(RatingError::Persistence(error.clone())))
            },
            Self::RatingRejected {
                key: rejected,
                error,
            } if rejected == key => Some(Err(error.clone())),
            _ => None,
        }
    }
}

/// Action types that carry [`RatingAction`]s
///
/// Lets [`submit_rating`] drive a store whose reducer embeds the rating flow.
pub trait EmbedsRating: From<RatingAction> {
    /// The rating action inside, if any
    fn as_rating(&self) -> Option<&RatingAction>;
}

impl EmbedsRating for RatingAction {
    fn as_rating(&self) -> Option<&RatingAction> {
        Some(self)
    }
}

/// Dependencies of the rating flow
#[derive(Clone)]
pub struct RatingEnvironment {
    /// Timestamps submitted ratings
    pub clock: Arc<dyn Clock>,
    /// Persistence
    pub store: Arc<dyn RatingStore>,
    /// Optional listener for saved ratings
    pub notifier: Option<Arc<dyn RatingNotifier>>,
}

impl RatingEnvironment {
    /// Environment without a notifier
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, store: Arc<dyn RatingStore>) -> Self {
        Self {
            clock,
            store,
            notifier: None,
        }
    }

    /// Attach a notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn RatingNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }
}

/// Reducer for [`RatingAction`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingReducer;

impl RatingReducer {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn submit(
        state: &mut RatingState,
        request: RatingRequest,
        env: &RatingEnvironment,
    ) -> SmallVec<[Effect<RatingAction>; 4]> {
        let key = request.key();

        let order_id = match validate_submission(&request, &state.orders) {
            Ok(order_id) => order_id,
            Err(error) => {
                // Routed through an effect so waiters on the action stream see it
                return smallvec![async_effect! {
                    Some(RatingAction::RatingRejected { key, error })
                }];
            },
        };

        let rating = ProductRating {
            product_id: request.product_id,
            customer_id: request.customer_id,
            order_id,
            rating: request.rating,
            created_at: env.clock.now(),
        };

        tracing::debug!(
            product_id = %rating.product_id,
            customer_id = %rating.customer_id,
            rating = rating.rating.get(),
            "Saving rating"
        );
        state.selections.insert(key.clone(), rating.rating);
        state.pending.insert(key.clone(), rating.clone());

        let store = Arc::clone(&env.store);
        smallvec![async_effect! {
            match store.save_rating(rating.clone()).await {
                Ok(()) => Some(RatingAction::RatingSaved { rating }),
                Err(error) => Some(RatingAction::RatingSaveFailed { key, error }),
            }
        }]
    }
}

impl Reducer for RatingReducer {
    type State = RatingState;
    type Action = RatingAction;
    type Environment = RatingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RatingAction::SelectRating { key, rating } => {
                state.selections.insert(key, rating);
            },
            RatingAction::SubmitRating { request } => return Self::submit(state, request, env),
            RatingAction::RatingSaved { rating } => {
                let key = rating.key();
                state.pending.remove(&key);
                state.selections.insert(key, rating.rating);
                state.last_error = None;

                if let Some(notifier) = &env.notifier {
                    notifier.on_rating_submitted(&rating);
                }
                metrics::counter!("fulfillment.ratings.saved").increment(1);
                tracing::info!(
                    product_id = %rating.product_id,
                    customer_id = %rating.customer_id,
                    rating = rating.rating.get(),
                    "Rating saved"
                );
                state.book.upsert(rating);
            },
            RatingAction::RatingSaveFailed { key, error } => {
                tracing::warn!(product_id = %key.product_id, %error, "Rating save failed");
                state.pending.remove(&key);
                state.roll_back_selection(&key);
                state.last_error = Some(RatingError::Persistence(error));
            },
            RatingAction::RatingRejected { key, error } => {
                tracing::warn!(product_id = %key.product_id, %error, "Rating rejected");
                state.roll_back_selection(&key);
                state.last_error = Some(error);
            },
            RatingAction::OrderUpdated { order } => state.upsert_order(order),
        }

        smallvec![Effect::None]
    }
}

/// Submit a rating through `store` and wait for its outcome
///
/// # Errors
///
/// - [`RatingError::Validation`] / [`RatingError::Ineligible`] from the policy
/// - [`RatingError::Persistence`] when the rating store failed
/// - [`RatingError::Timeout`] when no outcome arrived within `timeout`
/// - [`RatingError::Store`] when the store is shutting down
pub async fn submit_rating<S, A, E, R>(
    store: &Store<S, A, E, R>,
    request: RatingRequest,
    timeout: Duration,
) -> Result<ProductRating, RatingError>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: EmbedsRating + Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    let key = request.key();
    let outcome = store
        .send_and_wait_for(
            A::from(RatingAction::SubmitRating { request }),
            |action| {
                action
                    .as_rating()
                    .is_some_and(|rating| rating.outcome(&key).is_some())
            },
            timeout,
        )
        .await?;

    outcome
        .as_rating()
        .and_then(|rating| rating.outcome(&key))
        .unwrap_or(Err(RatingError::Store(StoreError::ChannelClosed)))
}
