//! Given-When-Then harness for reducers
//!
//! Runs a reducer synchronously against a given state, then hands the
//! resulting state and effects to assertion closures. Effects are not
//! executed, which keeps transition tests free of any transport.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use composable_rest_core::{effect::Effect, reducer::Reducer};

type StateAssertion<S> = Box<dyn FnOnce(&S)>;

type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent reducer test
///
/// # Example
///
/// ```ignore
/// use composable_rest_testing::{ReducerTest, assertions};
///
/// ReducerTest::new(widgets.reducer().clone())
///     .with_env(widgets.environment().clone())
///     .given_state(ResourceState::new())
///     .when_actions([ResourceAction::Read { records }])
///     .then_state(|state| assert!(state.is_loaded))
///     .then_effects(assertions::assert_no_effects)
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
    /// Test driving `reducer`
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

    /// Set the environment
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

    /// Add an action to reduce (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several actions, reduced in order (When)
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Assert on the final state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Assert on the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Reduce every action and run the assertions
    ///
    /// # Panics
    ///
    /// Panics if the state, environment or actions are missing, or if any
    /// assertion fails.
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
    use composable_rest_core::effect::Effect;

    /// Assert that nothing is left to execute
    ///
    /// # Panics
    ///
    /// Panics if any effect other than [`Effect::None`] is present.
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

    /// Assert that a request effect was returned
    ///
    /// # Panics
    ///
    /// Panics if no [`Effect::Future`] is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_rest_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct PageState {
        cursor: usize,
        exhausted: bool,
    }

    #[derive(Clone, Debug)]
    enum PageAction {
        Advance,
        Exhausted,
        Reload,
    }

    struct PageReducer;

    impl Reducer for PageReducer {
        type State = PageState;
        type Action = PageAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                PageAction::Advance => {
                    state.cursor += 1;
                    smallvec![Effect::None]
                },
                PageAction::Exhausted => {
                    state.exhausted = true;
                    smallvec![Effect::None]
                },
                PageAction::Reload => {
                    *state = PageState::default();
                    smallvec![Effect::Future(Box::pin(async { Some(PageAction::Advance) }))]
                },
            }
        }
    }

    #[test]
    fn test_single_action() {
        ReducerTest::new(PageReducer)
            .with_env(())
            .given_state(PageState::default())
            .when_action(PageAction::Advance)
            .then_state(|state| assert_eq!(state.cursor, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_actions_reduce_in_order() {
        ReducerTest::new(PageReducer)
            .with_env(())
            .given_state(PageState::default())
            .when_actions([PageAction::Advance, PageAction::Advance, PageAction::Exhausted])
            .then_state(|state| {
                assert_eq!(state.cursor, 2);
                assert!(state.exhausted);
            })
            .run();
    }

    #[test]
    fn test_effects_of_last_action() {
        ReducerTest::new(PageReducer)
            .with_env(())
            .given_state(PageState { cursor: 4, exhausted: true })
            .when_action(PageAction::Reload)
            .then_state(|state| assert_eq!(state.cursor, 0))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }
}
