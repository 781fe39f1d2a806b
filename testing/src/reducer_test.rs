//! Ergonomic testing utilities for reducers
//!
//! Reducers are driven by hand, one action at a time, so timer-driven flows
//! can be stepped deterministically without a runtime: reduce the action a
//! `Delay` effect would deliver and assert on the result.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use freshcart_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// All `when_action` calls are reduced in order; effect assertions see the
/// effects returned by the last one.
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(TrackingReducer::new())
///     .with_env(env)
///     .given_state(TrackingState::default())
///     .when_action(TrackingAction::StartTracking { order })
///     .when_action(TrackingAction::Tick { order_id, generation: 1 })
///     .then_state(|state| assert!(state.is_tracking(&order_id)))
///     .then_effects(assertions::assert_has_delay_effect)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Append an action to reduce (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Append several actions to reduce in order (When)
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, actions, or environment are not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");
        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use freshcart_core::effect::{Effect, EffectId};
    use std::time::Duration;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect other than `Effect::None` is present.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(unwrap_cancellable(e), Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// Assert that effects contain at least one Delay effect
    ///
    /// Delays wrapped in `Effect::Cancellable` count.
    ///
    /// # Panics
    ///
    /// Panics if no Delay effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_delay_effect<A>(effects: &[Effect<A>]) {
        assert!(
            !delays(effects).is_empty(),
            "Expected at least one Delay effect, but none found"
        );
    }

    /// Assert that effects cancel the given id
    ///
    /// # Panics
    ///
    /// Panics if no matching `Effect::Cancel` is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_cancels<A>(effects: &[Effect<A>], id: &EffectId) {
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::Cancel(cancelled) if cancelled == id)),
            "Expected Effect::Cancel({id})"
        );
    }

    /// Durations and actions of every Delay effect, unwrapping cancellables
    #[must_use]
    pub fn delays<A>(effects: &[Effect<A>]) -> Vec<(Duration, &A)> {
        effects
            .iter()
            .filter_map(|e| match unwrap_cancellable(e) {
                Effect::Delay { duration, action } => Some((*duration, action.as_ref())),
                _ => None,
            })
            .collect()
    }

    fn unwrap_cancellable<A>(effect: &Effect<A>) -> &Effect<A> {
        match effect {
            Effect::Cancellable { effect, .. } => unwrap_cancellable(effect),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freshcart_core::effect::{Effect, EffectId};
    use freshcart_core::reducer::Reducer;
    use freshcart_core::{SmallVec, smallvec};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Increment,
        Later,
        Stop,
    }

    struct TestReducer;

    struct TestEnv;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                TestAction::Later => smallvec![
                    Effect::Delay {
                        duration: Duration::from_secs(5),
                        action: Box::new(TestAction::Increment),
                    }
                    .cancellable(EffectId::new("later"))
                ],
                TestAction::Stop => smallvec![Effect::Cancel(EffectId::new("later"))],
            }
        }
    }

    #[test]
    fn test_reducer_test_sequence() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_actions([TestAction::Increment, TestAction::Increment])
            .then_state(|state| {
                assert_eq!(state.count, 2);
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_delay_inside_cancellable_is_found() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Later)
            .then_effects(|effects| {
                assertions::assert_has_delay_effect(effects);
                let delays = assertions::delays(effects);
                assert_eq!(delays, vec![(Duration::from_secs(5), &TestAction::Increment)]);
            })
            .run();
    }

    #[test]
    fn test_assert_cancels() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Stop)
            .then_effects(|effects| {
                assertions::assert_cancels(effects, &EffectId::new("later"));
            })
            .run();
    }

    #[test]
    fn test_assertions_effects_count() {
        assertions::assert_effects_count(&[Effect::<TestAction>::None], 1);
        assertions::assert_effects_count::<TestAction>(&[], 0);
    }
}
