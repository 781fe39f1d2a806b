//! The fulfillment feature: status tracking and ratings behind one store.
//!
//! The tracking and rating reducers stay independent; this reducer routes
//! each action to its child, lifts the child's effects into
//! [`FulfillmentAction`] and copies order changes made by the status engine
//! into the rating state, so an order becomes rateable the moment it is
//! delivered.

use crate::rating::{EmbedsRating, RatingAction, RatingEnvironment, RatingReducer, RatingState};
use crate::tracking::{TrackingAction, TrackingEnvironment, TrackingReducer, TrackingState};
use crate::types::{Order, ProductRating};
use freshcart_core::effect::Effect;
use freshcart_core::reducer::Reducer;
use freshcart_core::SmallVec;
use freshcart_runtime::Store;

/// Combined state
#[derive(Debug, Clone, Default)]
pub struct FulfillmentState {
    /// Status engines and their orders
    pub tracking: TrackingState,
    /// Rating eligibility and submissions
    pub ratings: RatingState,
}

impl FulfillmentState {
    /// Rebuild state from persisted orders and ratings
    ///
    /// No order is tracked afterwards; start engines explicitly.
    #[must_use]
    pub fn from_snapshot(orders: Vec<Order>, ratings: Vec<ProductRating>) -> Self {
        Self {
            tracking: TrackingState::with_orders(orders.iter().cloned()),
            ratings: RatingState::new(orders, ratings),
        }
    }
}

/// Combined action
#[derive(Clone, Debug, PartialEq)]
pub enum FulfillmentAction {
    /// Routed to the status engine
    Tracking(TrackingAction),
    /// Routed to the rating flow
    Rating(RatingAction),
}

impl From<TrackingAction> for FulfillmentAction {
    fn from(action: TrackingAction) -> Self {
        Self::Tracking(action)
    }
}

impl From<RatingAction> for FulfillmentAction {
    fn from(action: RatingAction) -> Self {
        Self::Rating(action)
    }
}

impl EmbedsRating for FulfillmentAction {
    fn as_rating(&self) -> Option<&RatingAction> {
        match self {
            Self::Rating(action) => Some(action),
            Self::Tracking(_) => None,
        }
    }
}

/// Combined environment
#[derive(Clone)]
pub struct FulfillmentEnvironment {
    /// Status engine dependencies
    pub tracking: TrackingEnvironment,
    /// Rating flow dependencies
    pub rating: RatingEnvironment,
}

/// Reducer composing [`TrackingReducer`] and [`RatingReducer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FulfillmentReducer {
    tracking: TrackingReducer,
    rating: RatingReducer,
}

impl FulfillmentReducer {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tracking: TrackingReducer::new(),
            rating: RatingReducer::new(),
        }
    }
}

impl Reducer for FulfillmentReducer {
    type State = FulfillmentState;
    type Action = FulfillmentAction;
    type Environment = FulfillmentEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FulfillmentAction::Tracking(action) => {
                let order_id = action.order_id().clone();
                let effects = self.tracking.reduce(&mut state.tracking, action, &env.tracking);

                if let Some(order) = state.tracking.order(&order_id) {
                    let known = state.ratings.order(&order_id).map(|known| known.status);
                    if known != Some(order.status) {
                        state.ratings.upsert_order(order.clone());
                    }
                }

                effects
                    .into_iter()
                    .map(|effect| effect.map(FulfillmentAction::Tracking))
                    .collect()
            },
            FulfillmentAction::Rating(action) => self
                .rating
                .reduce(&mut state.ratings, action, &env.rating)
                .into_iter()
                .map(|effect| effect.map(FulfillmentAction::Rating))
                .collect(),
        }
    }
}

/// Store running the fulfillment reducer
pub type FulfillmentStore =
    Store<FulfillmentState, FulfillmentAction, FulfillmentEnvironment, FulfillmentReducer>;
