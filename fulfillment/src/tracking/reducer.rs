//! Reducer driving status engines for many orders at once.
//!
//! Every tracked order owns a [`StatusProgression`] and a generation number.
//! Ticks are scheduled as cancellable delays tagged with that generation, so
//! a tick that outlives its tracker (stopped, completed or restarted) is
//! recognised and dropped.

use super::config::TrackingConfig;
use super::observer::TrackingObserver;
use super::progression::{StatusProgression, Step};
use crate::error::TrackingRejection;
use crate::types::{Order, OrderId, OrderStatus, StatusUpdate};
use freshcart_core::cancellable_delay;
use freshcart_core::effect::{Effect, EffectId};
use freshcart_core::environment::Clock;
use freshcart_core::reducer::Reducer;
use freshcart_core::{SmallVec, smallvec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Cancellation id of the timer chain driving `order_id`
#[must_use]
pub fn tracking_effect_id(order_id: &OrderId) -> EffectId {
    EffectId::new(format!("tracking-{order_id}"))
}

#[derive(Debug, Clone)]
struct Tracker {
    progression: StatusProgression,
    generation: u64,
}

/// Orders known to the tracker and the engines currently running
#[derive(Debug, Clone, Default)]
pub struct TrackingState {
    orders: HashMap<OrderId, Order>,
    trackers: HashMap<OrderId, Tracker>,
    next_generation: u64,
    last_rejection: Option<TrackingRejection>,
}

impl TrackingState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded with known orders, none of them tracked
    #[must_use]
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: orders.into_iter().map(|order| (order.id.clone(), order)).collect(),
            ..Self::default()
        }
    }

    /// Add or replace a known order
    pub fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }

    /// The order as last updated by its engine
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// All known orders
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Whether an engine is running for `order_id`
    #[must_use]
    pub fn is_tracking(&self, order_id: &OrderId) -> bool {
        self.trackers.contains_key(order_id)
    }

    /// Progress of a running engine, `0.0..=1.0`
    #[must_use]
    pub fn progress(&self, order_id: &OrderId) -> Option<f64> {
        self.trackers
            .get(order_id)
            .map(|tracker| tracker.progression.progress())
    }

    /// Number of running engines
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.trackers.len()
    }

    /// Most recent refused command
    #[must_use]
    pub const fn last_rejection(&self) -> Option<&TrackingRejection> {
        self.last_rejection.as_ref()
    }

    fn reject(&mut self, rejection: TrackingRejection) {
        tracing::warn!(%rejection, "Tracking command rejected");
        self.last_rejection = Some(rejection);
    }

    fn apply_update(&mut self, order_id: &OrderId, update: &StatusUpdate) {
        if let Some(order) = self.orders.get_mut(order_id) {
            order.status = update.status;
            order.estimated_delivery = Some(update.estimated_delivery);
        }
    }
}

/// Inputs to the status engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TrackingAction {
    /// Begin advancing `order` from its current status
    StartTracking {
        /// Order to track
        order: Order,
    },
    /// Timer fired for the given tracker generation
    Tick {
        /// Tracked order
        order_id: OrderId,
        /// Generation the tick was scheduled for
        generation: u64,
    },
    /// Stop the engine; idempotent
    StopTracking {
        /// Tracked order
        order_id: OrderId,
    },
    /// Status reported from outside the engine
    OverrideStatus {
        /// Affected order
        order_id: OrderId,
        /// Reported status
        status: OrderStatus,
    },
}

impl TrackingAction {
    /// Order the action concerns
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        match self {
            Self::StartTracking { order } => &order.id,
            Self::Tick { order_id, .. }
            | Self::StopTracking { order_id }
            | Self::OverrideStatus { order_id, .. } => order_id,
        }
    }
}

/// Dependencies of the status engine
#[derive(Clone)]
pub struct TrackingEnvironment {
    /// Source of `now` for delivery projections
    pub clock: Arc<dyn Clock>,
    /// Receives updates and completions
    pub observer: Arc<dyn TrackingObserver>,
    /// Engine timing
    pub config: TrackingConfig,
}

impl TrackingEnvironment {
    /// Creates an environment with default timing
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, observer: Arc<dyn TrackingObserver>) -> Self {
        Self {
            clock,
            observer,
            config: TrackingConfig::default(),
        }
    }

    /// Replace the timing configuration
    #[must_use]
    pub const fn with_config(mut self, config: TrackingConfig) -> Self {
        self.config = config;
        self
    }
}

/// Reducer for [`TrackingAction`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingReducer;

impl TrackingReducer {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn schedule_tick(
        order_id: &OrderId,
        generation: u64,
        after: Duration,
    ) -> Effect<TrackingAction> {
        cancellable_delay! {
            id: tracking_effect_id(order_id),
            duration: after,
            action: TrackingAction::Tick {
                order_id: order_id.clone(),
                generation,
            }
        }
    }

    fn complete(
        state: &mut TrackingState,
        order_id: &OrderId,
        update: Option<&StatusUpdate>,
        env: &TrackingEnvironment,
    ) {
        if let Some(update) = update {
            state.apply_update(order_id, update);
            env.observer.on_update(order_id, update);
            metrics::counter!("fulfillment.status.advanced").increment(1);
        }
        state.trackers.remove(order_id);
        env.observer.on_complete(order_id);
        tracing::info!(%order_id, "Tracking completed");
    }

    fn start(
        state: &mut TrackingState,
        order: Order,
        env: &TrackingEnvironment,
    ) -> SmallVec<[Effect<TrackingAction>; 4]> {
        let order_id = order.id.clone();
        if state.is_tracking(&order_id) {
            state.reject(TrackingRejection::AlreadyTracking(order_id));
            return smallvec![Effect::None];
        }

        let mut progression =
            StatusProgression::new(&order, env.config.tick, env.config.fallback_duration);
        state.insert_order(order);

        if let Step::Completed(update) = progression.start(env.clock.now()) {
            Self::complete(state, &order_id, update.as_ref(), env);
            return smallvec![Effect::None];
        }

        let generation = state.next_generation;
        state.next_generation += 1;

        tracing::info!(
            %order_id,
            status = %progression.status(),
            total_secs = progression.total().as_secs(),
            "Tracking started"
        );
        state.trackers.insert(
            order_id.clone(),
            Tracker {
                progression,
                generation,
            },
        );

        smallvec![Self::schedule_tick(&order_id, generation, env.config.initial_delay)]
    }

    fn tick(
        state: &mut TrackingState,
        order_id: &OrderId,
        generation: u64,
        env: &TrackingEnvironment,
    ) -> SmallVec<[Effect<TrackingAction>; 4]> {
        let Some(tracker) = state.trackers.get_mut(order_id) else {
            tracing::debug!(%order_id, generation, "Ignoring tick for untracked order");
            return smallvec![Effect::None];
        };
        if tracker.generation != generation {
            tracing::debug!(
                %order_id,
                generation,
                current = tracker.generation,
                "Ignoring stale tick"
            );
            return smallvec![Effect::None];
        }

        let step = tracker.progression.advance(env.clock.now());
        tracing::debug!(
            %order_id,
            elapsed_secs = tracker.progression.elapsed().as_secs(),
            progress = tracker.progression.progress(),
            "Tick"
        );

        match step {
            Step::Unchanged => {},
            Step::Advanced(update) => {
                state.apply_update(order_id, &update);
                env.observer.on_update(order_id, &update);
                metrics::counter!("fulfillment.status.advanced").increment(1);
            },
            Step::Completed(update) => {
                Self::complete(state, order_id, update.as_ref(), env);
                return smallvec![Effect::None];
            },
        }

        smallvec![Self::schedule_tick(order_id, generation, env.config.tick)]
    }

    fn override_status(
        state: &mut TrackingState,
        order_id: &OrderId,
        status: OrderStatus,
        env: &TrackingEnvironment,
    ) -> SmallVec<[Effect<TrackingAction>; 4]> {
        let Some(order) = state.orders.get_mut(order_id) else {
            state.reject(TrackingRejection::UnknownOrder(order_id.clone()));
            return smallvec![Effect::None];
        };

        let current = order.status;
        if status < current {
            state.reject(TrackingRejection::StatusRegression {
                order_id: order_id.clone(),
                current,
                requested: status,
            });
            return smallvec![Effect::None];
        }
        if status == current {
            return smallvec![Effect::None];
        }

        order.status = status;
        tracing::info!(%order_id, from = %current, to = %status, "Status overridden");

        let Some(tracker) = state.trackers.get_mut(order_id) else {
            return smallvec![Effect::None];
        };
        tracker.progression.override_status(status);

        if status.is_terminal() {
            Self::complete(state, order_id, None, env);
            return smallvec![Effect::Cancel(tracking_effect_id(order_id))];
        }

        smallvec![Effect::None]
    }
}

impl Reducer for TrackingReducer {
    type State = TrackingState;
    type Action = TrackingAction;
    type Environment = TrackingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TrackingAction::StartTracking { order } => Self::start(state, order, env),
            TrackingAction::Tick {
                order_id,
                generation,
            } => Self::tick(state, &order_id, generation, env),
            TrackingAction::StopTracking { order_id } => {
                if state.trackers.remove(&order_id).is_some() {
                    tracing::info!(%order_id, "Tracking stopped");
                }
                smallvec![Effect::Cancel(tracking_effect_id(&order_id))]
            },
            TrackingAction::OverrideStatus { order_id, status } => {
                Self::override_status(state, &order_id, status, env)
            },
        }
    }
}
