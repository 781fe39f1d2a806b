//! # FreshCart Core
//!
//! Core traits and types for the FreshCart fulfillment subsystem.
//!
//! Business logic is written as reducers: pure functions
//! `(State, Action, Environment) → (State, Effects)`. Reducers never block,
//! await or wait on timers themselves; they return [`Effect`](effect::Effect)
//! descriptions that the runtime executes, feeding any resulting actions back
//! into the reducer. The only side effects a reducer performs directly are
//! quick, non-blocking notifications to environment observers, which run
//! while the store holds its state lock.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature (orders being tracked, ratings)
//! - **Action**: All possible inputs to a reducer (commands, timer ticks, async results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (delays, async work, cancellation)
//! - **Environment**: Injected dependencies (clock, persistence, observers)
//!
//! ## Example
//!
//! ```
//! use freshcart_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug, Default)]
//! struct TimerState {
//!     ticks: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum TimerAction {
//!     Tick,
//! }
//!
//! struct TimerReducer;
//!
//! impl Reducer for TimerReducer {
//!     type State = TimerState;
//!     type Action = TimerAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TimerState,
//!         action: TimerAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TimerAction>; 4]> {
//!         match action {
//!             TimerAction::Tick => {
//!                 state.ticks += 1;
//!                 smallvec![Effect::Delay {
//!                     duration: Duration::from_secs(1),
//!                     action: Box::new(TimerAction::Tick),
//!                 }]
//!             },
//!         }
//!     }
//! }
//!
//! let mut state = TimerState::default();
//! let effects = TimerReducer.reduce(&mut state, TimerAction::Tick, &());
//! assert_eq!(state.ticks, 1);
//! assert_eq!(effects.len(), 1);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Reducer trait - the core abstraction for business logic
pub mod reducer;

/// Effect descriptions returned by reducers
pub mod effect;

/// Dependency injection traits
pub mod environment;

/// Declarative macros for building effects
pub mod effect_macros;
