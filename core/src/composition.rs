//! Reducer composition utilities
//!
//! - **`combine_reducers`**: Run several reducers over the same state and action
//! - **`scope_reducer`**: Embed a child reducer into a slot of a parent state
//!
//! A host application typically keeps one slot per REST resource in its root
//! state, scopes each resource reducer onto its slot, and combines the scoped
//! reducers into the single reducer its store runs.
//!
//! # Example
//!
//! ```
//! use composable_rest_core::{smallvec, Effect, Reducer, SmallVec};
//! use composable_rest_core::composition::{combine_reducers, scope_reducer};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Tally {
//!     hits: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum TallyAction {
//!     Hit,
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = Tally;
//!     type Action = TallyAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Tally, _action: TallyAction, _env: &()) -> SmallVec<[Effect<TallyAction>; 4]> {
//!         state.hits += 1;
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     left: Tally,
//!     right: Tally,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Left(TallyAction),
//!     Right(TallyAction),
//! }
//!
//! let app = combine_reducers(vec![
//!     Box::new(scope_reducer(
//!         TallyReducer,
//!         |s: &mut AppState| &mut s.left,
//!         |a: AppAction| match a { AppAction::Left(a) => Some(a), AppAction::Right(_) => None },
//!         AppAction::Left,
//!     )),
//!     Box::new(scope_reducer(
//!         TallyReducer,
//!         |s: &mut AppState| &mut s.right,
//!         |a: AppAction| match a { AppAction::Right(a) => Some(a), AppAction::Left(_) => None },
//!         AppAction::Right,
//!     )),
//! ]);
//!
//! let mut state = AppState::default();
//! let _ = app.reduce(&mut state, AppAction::Left(TallyAction::Hit), &());
//! assert_eq!(state.left.hits, 1);
//! assert_eq!(state.right.hits, 0);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer sees every action, in order, and all effects are concatenated.
#[must_use]
pub fn combine_reducers<S, A, E>(
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a child reducer onto one slot of a parent state.
///
/// - `slot` borrows the child state out of the parent state
/// - `extract` picks the child action out of a parent action (`None` skips the child)
/// - `embed` wraps child actions produced by effects back into parent actions
pub fn scope_reducer<S, SubS, A, SubA, E, R>(
    reducer: R,
    slot: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
) -> ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    ScopedReducer {
        reducer,
        slot,
        extract,
        embed,
    }
}

/// A reducer that operates on one slot of a larger state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    reducer: R,
    slot: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
}

impl<S, SubS, A, SubA, E, R> Clone for ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            slot: self.slot,
            extract: self.extract,
            embed: self.embed,
        }
    }
}

impl<S, SubS, A, SubA, E, R> Reducer for ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
    A: Send + 'static,
    SubA: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(child_action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        let embed = self.embed;
        self.reducer
            .reduce((self.slot)(state), child_action, env)
            .into_iter()
            .map(|effect| effect.map(embed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smallvec;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Slot {
        names: Vec<String>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum SlotAction {
        Add(String),
        Reset,
        Echo(String),
    }

    #[derive(Clone)]
    struct SlotReducer;

    impl Reducer for SlotReducer {
        type State = Slot;
        type Action = SlotAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SlotAction::Add(name) => {
                    state.names.push(name.clone());
                    smallvec![Effect::Future(Box::pin(async move { Some(SlotAction::Echo(name)) }))]
                },
                SlotAction::Reset => {
                    state.names.clear();
                    smallvec![Effect::None]
                },
                SlotAction::Echo(_) => SmallVec::new(),
            }
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Root {
        users: Slot,
        teams: Slot,
        audit: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum RootAction {
        Users(SlotAction),
        Teams(SlotAction),
    }

    struct AuditReducer;

    impl Reducer for AuditReducer {
        type State = Root;
        type Action = RootAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            _action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            state.audit += 1;
            SmallVec::new()
        }
    }

    fn users_reducer() -> ScopedReducer<Root, Slot, RootAction, SlotAction, (), SlotReducer> {
        scope_reducer(
            SlotReducer,
            |root: &mut Root| &mut root.users,
            |action: RootAction| match action {
                RootAction::Users(inner) => Some(inner),
                RootAction::Teams(_) => None,
            },
            RootAction::Users,
        )
    }

    fn teams_reducer() -> ScopedReducer<Root, Slot, RootAction, SlotAction, (), SlotReducer> {
        scope_reducer(
            SlotReducer,
            |root: &mut Root| &mut root.teams,
            |action: RootAction| match action {
                RootAction::Teams(inner) => Some(inner),
                RootAction::Users(_) => None,
            },
            RootAction::Teams,
        )
    }

    #[test]
    fn test_scope_reducer_touches_only_its_slot() {
        let scoped = users_reducer();
        let mut root = Root::default();
        root.teams.names.push("core".to_string());

        let _ = scoped.reduce(&mut root, RootAction::Users(SlotAction::Add("ada".to_string())), &());
        assert_eq!(root.users.names, vec!["ada".to_string()]);
        assert_eq!(root.teams.names, vec!["core".to_string()]);

        let effects = scoped.reduce(&mut root, RootAction::Teams(SlotAction::Reset), &());
        assert!(effects.is_empty());
        assert_eq!(root.teams.names.len(), 1);
    }

    #[tokio::test]
    async fn test_scope_reducer_embeds_effect_actions() {
        let scoped = users_reducer();
        let mut root = Root::default();

        let mut effects =
            scoped.reduce(&mut root, RootAction::Users(SlotAction::Add("bob".to_string())), &());
        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("Add must produce a future effect");
        };
        assert_eq!(fut.await, Some(RootAction::Users(SlotAction::Echo("bob".to_string()))));
    }

    #[test]
    fn test_combine_reducers() {
        let combined = combine_reducers(vec![
            Box::new(users_reducer()),
            Box::new(teams_reducer()),
            Box::new(AuditReducer),
        ]);
        let mut root = Root::default();

        let _ = combined.reduce(&mut root, RootAction::Users(SlotAction::Add("ada".to_string())), &());
        let _ = combined.reduce(&mut root, RootAction::Teams(SlotAction::Add("ops".to_string())), &());
        let _ = combined.reduce(&mut root, RootAction::Users(SlotAction::Reset), &());

        assert!(root.users.names.is_empty());
        assert_eq!(root.teams.names, vec!["ops".to_string()]);
        assert_eq!(root.audit, 3);
    }
}
