//! The [`Reducer`] trait.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
//! They contain all business logic and are deterministic given their
//! environment, which makes them testable without a runtime.

use crate::effect::Effect;
use smallvec::SmallVec;

/// The Reducer trait - core abstraction for business logic
///
/// # Type Parameters
///
/// - `State`: The domain state this reducer operates on
/// - `Action`: The action type this reducer processes
/// - `Environment`: The injected dependencies this reducer needs
///
/// # Example
///
/// ```ignore
/// impl Reducer for TrackingReducer {
///     type State = TrackingState;
///     type Action = TrackingAction;
///     type Environment = TrackingEnvironment;
///
///     fn reduce(
///         &self,
///         state: &mut TrackingState,
///         action: TrackingAction,
///         env: &TrackingEnvironment,
///     ) -> SmallVec<[Effect<TrackingAction>; 4]> {
///         match action {
///             TrackingAction::Tick { .. } => smallvec![Effect::None],
///             _ => smallvec![Effect::None],
///         }
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Reduce an action into state changes and effects
    ///
    /// This is a pure function that:
    /// 1. Validates the action against current state
    /// 2. Updates state in place
    /// 3. Returns effect descriptions to be executed by the runtime
    ///
    /// Most reducers return zero to two effects, so the result is stored
    /// inline in a [`SmallVec`].
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]>;
}
