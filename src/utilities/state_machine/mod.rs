//! Finite state machine with timed enter/update/exit callbacks.
//!
//! The machine owns a fixed table of states keyed by `K`. Usually `K` is a small enum
//! (`StateMachine<SpawnerState, SpawnerRun>`); [`SimpleStateMachine`] keys states by the
//! [`StateId`] handed out from [`StateMachine::register`] instead.
//!
//! Callbacks are plain `fn` pointers taking the machine and the owner's context:
//!
//! ```text
//!   fn(&mut StateMachine<K, C>, &mut C)
//! ```
//!
//! so a callback can read `time_in_current_state()` and request a new transition while it
//! runs. Transitions requested from `on_enter` complete synchronously before the outer
//! `transition` returns.
//!
//! # Transition order
//! ```text
//!   exit(current)  (machine still shows the old state + its elapsed time)
//!   previous = current; current = target; time = 0
//!   enter(target)
//! ```
//!
//! Driving is the owner's job: call [`StateMachine::tick`] once per frame with the frame delta.

use std::fmt::Debug;
use std::hash::Hash;

use bevy::log::error;
use bevy::platform::collections::HashMap;

pub type StateFn<K, C> = fn(&mut StateMachine<K, C>, &mut C);

/// One node of the table. Every callback is optional.
pub struct State<K, C> {
    enter: Option<StateFn<K, C>>,
    update: Option<StateFn<K, C>>,
    exit: Option<StateFn<K, C>>,
}

// Manual impls: derives would needlessly require `K: Clone, C: Clone`.
impl<K, C> Clone for State<K, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, C> Copy for State<K, C> {}

impl<K, C> Default for State<K, C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, C> State<K, C> {
    /// A state with no behaviour (e.g. `Inactive`).
    pub const fn empty() -> Self {
        Self { enter: None, update: None, exit: None }
    }

    pub fn on_enter(mut self, f: StateFn<K, C>) -> Self {
        self.enter = Some(f);
        self
    }

    pub fn on_update(mut self, f: StateFn<K, C>) -> Self {
        self.update = Some(f);
        self
    }

    pub fn on_exit(mut self, f: StateFn<K, C>) -> Self {
        self.exit = Some(f);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMachineError<K> {
    /// Requested state is not in the table.
    UnknownState(K),
}

impl<K: Debug> std::fmt::Display for StateMachineError<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateMachineError::UnknownState(k) => write!(f, "State [{k:?}] is undefined"),
        }
    }
}

impl<K: Debug> std::error::Error for StateMachineError<K> {}

pub struct StateMachine<K, C> {
    states: HashMap<K, State<K, C>>,
    current: Option<K>,
    previous: Option<K>,
    time_in_current_state: f32,
}

impl<K: Debug, C> Debug for StateMachine<K, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("time_in_current_state", &self.time_in_current_state)
            .field("states", &self.states.len())
            .finish()
    }
}

impl<K: Eq + Hash, C> Default for StateMachine<K, C> {
    fn default() -> Self {
        Self {
            states: HashMap::default(),
            current: None,
            previous: None,
            time_in_current_state: 0.0,
        }
    }
}

impl<K, C> StateMachine<K, C>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Build the state table. No state is entered yet.
    pub fn new(states: impl IntoIterator<Item = (K, State<K, C>)>) -> Self {
        let mut machine = Self::default();
        for (key, state) in states {
            machine.states.insert(key, state);
        }
        machine
    }

    /// Build the state table and enter `initial` (its `on_enter` runs).
    pub fn with_initial(
        ctx: &mut C,
        initial: K,
        states: impl IntoIterator<Item = (K, State<K, C>)>,
    ) -> Self {
        let mut machine = Self::new(states);
        machine.transition(ctx, initial, true);
        machine
    }

    #[inline]
    pub fn current_state(&self) -> Option<K> {
        self.current
    }

    #[inline]
    pub fn previous_state(&self) -> Option<K> {
        self.previous
    }

    /// Seconds accumulated by [`tick`](Self::tick) since the last transition.
    #[inline]
    pub fn time_in_current_state(&self) -> f32 {
        self.time_in_current_state
    }

    #[inline]
    pub fn is_in(&self, key: K) -> bool {
        self.current == Some(key)
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.states.contains_key(&key)
    }

    /// Advance the timer and run the current state's `on_update`.
    pub fn tick(&mut self, ctx: &mut C, dt: f32) {
        self.time_in_current_state += dt;

        let update = self
            .current
            .and_then(|k| self.states.get(&k))
            .and_then(|s| s.update);
        if let Some(update) = update {
            update(self, ctx);
        }
    }

    /// Move to `target`.
    ///
    /// Returns `Ok(false)` when `target` is already current and `allow_self` is false.
    /// An unknown `target` leaves the machine untouched.
    pub fn try_transition(
        &mut self,
        ctx: &mut C,
        target: K,
        allow_self: bool,
    ) -> Result<bool, StateMachineError<K>> {
        if self.current == Some(target) && !allow_self {
            return Ok(false);
        }

        let next = *self
            .states
            .get(&target)
            .ok_or(StateMachineError::UnknownState(target))?;

        let from = self.current;
        let exit = from.and_then(|k| self.states.get(&k)).and_then(|s| s.exit);
        if let Some(exit) = exit {
            exit(self, ctx);
        }

        self.previous = from;
        self.current = Some(target);
        self.time_in_current_state = 0.0;

        if let Some(enter) = next.enter {
            enter(self, ctx);
        }

        Ok(true)
    }

    /// [`try_transition`](Self::try_transition) that reports an unknown state instead of
    /// returning it. Returns whether a transition happened.
    pub fn transition(&mut self, ctx: &mut C, target: K, allow_self: bool) -> bool {
        match self.try_transition(ctx, target, allow_self) {
            Ok(changed) => changed,
            Err(e) => {
                error!(
                    "Tried to switch to state [{target:?}]. {e}. Remaining in state [{:?}].",
                    self.current
                );
                false
            }
        }
    }
}

/// Opaque handle for states of a [`SimpleStateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(u32);

/// State machine whose states are identified by registration order.
pub type SimpleStateMachine<C> = StateMachine<StateId, C>;

impl<C> StateMachine<StateId, C> {
    /// Add a state to the table and get its handle.
    pub fn register(&mut self, state: State<StateId, C>) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.insert(id, state);
        id
    }
}
