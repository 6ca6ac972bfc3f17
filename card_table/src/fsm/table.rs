//! Transition tables and entry actions.

use std::{collections::HashMap, fmt, hash::Hash, sync::Arc};

use super::errors::TableConfigError;

/// Bound shared by state and event labels.
pub trait Label: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> Label for T where T: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// What an entry action asks the machine to do next.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Next<E> {
    /// Stop; the event has been fully handled.
    NoOp,
    /// Feed another event into the machine within the same call.
    Event(E),
}

/// Work run when a machine enters a state.
///
/// Actions only ever see the actor through `A`, so the engine stays
/// ignorant of what kind of object it drives.
pub trait Action<A: ?Sized, E>: Send + Sync {
    fn execute(&self, actor: &mut A) -> Next<E>;
}

impl<A, E, F> Action<A, E> for F
where
    A: ?Sized,
    F: Fn(&mut A) -> Next<E> + Send + Sync,
{
    fn execute(&self, actor: &mut A) -> Next<E> {
        self(actor)
    }
}

struct StateDef<S, E, A: ?Sized> {
    action: Option<Arc<dyn Action<A, E>>>,
    events: HashMap<E, S>,
}

impl<S, E, A: ?Sized> Default for StateDef<S, E, A> {
    fn default() -> Self {
        Self {
            action: None,
            events: HashMap::new(),
        }
    }
}

/// Validated configuration of a state machine: per-state entry actions
/// and the `(state, event) -> state` transition map.
///
/// Tables are immutable once built and are meant to be shared (behind an
/// `Arc`) by every machine of the same kind.
pub struct StateTable<S, E, A: ?Sized> {
    initial: S,
    states: HashMap<S, StateDef<S, E, A>>,
}

impl<S: Label, E: Label, A: ?Sized> StateTable<S, E, A> {
    #[must_use]
    pub fn builder(initial: S) -> StateTableBuilder<S, E, A> {
        StateTableBuilder {
            initial,
            states: HashMap::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn initial(&self) -> S {
        self.initial
    }

    #[must_use]
    pub fn declares(&self, state: S) -> bool {
        self.states.contains_key(&state)
    }

    /// Target of `event` out of `current`, if the table has one.
    #[must_use]
    pub fn next_state(&self, current: S, event: E) -> Option<S> {
        self.states
            .get(&current)
            .and_then(|def| def.events.get(&event))
            .copied()
    }

    pub(super) fn action(&self, state: S) -> Option<&Arc<dyn Action<A, E>>> {
        self.states.get(&state).and_then(|def| def.action.as_ref())
    }

    /// Events accepted in `state`, in no particular order.
    pub fn events_from(&self, state: S) -> impl Iterator<Item = E> + '_ {
        self.states
            .get(&state)
            .into_iter()
            .flat_map(|def| def.events.keys().copied())
    }
}

impl<S: fmt::Debug, E, A: ?Sized> fmt::Debug for StateTable<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTable")
            .field("initial", &self.initial)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Incrementally declares a [`StateTable`]. Nothing is checked until
/// [`StateTableBuilder::build`].
pub struct StateTableBuilder<S, E, A: ?Sized> {
    initial: S,
    states: HashMap<S, StateDef<S, E, A>>,
    /// Declaration order of transitions, so validation reports the first
    /// offending edge deterministically.
    edges: Vec<(S, E, S)>,
}

impl<S: Label, E: Label, A: ?Sized> StateTableBuilder<S, E, A> {
    /// Sets the action run whenever the machine enters `state`.
    #[must_use]
    pub fn entry(mut self, state: S, action: impl Action<A, E> + 'static) -> Self {
        self.states.entry(state).or_default().action = Some(Arc::new(action));
        self
    }

    /// Adds `from --event--> to`. A later edge for the same pair replaces
    /// the earlier one.
    #[must_use]
    pub fn transition(mut self, from: S, event: E, to: S) -> Self {
        self.states.entry(from).or_default().events.insert(event, to);
        self.edges.push((from, event, to));
        self
    }

    pub fn build(self) -> Result<StateTable<S, E, A>, TableConfigError> {
        if !self.states.contains_key(&self.initial) {
            return Err(TableConfigError::MissingInitial(format!(
                "{:?}",
                self.initial
            )));
        }

        for (from, event, to) in &self.edges {
            match self.states.get(to) {
                None => {
                    return Err(TableConfigError::UnknownTarget {
                        from: format!("{from:?}"),
                        event: format!("{event:?}"),
                        to: format!("{to:?}"),
                    });
                }
                Some(def) if def.action.is_none() => {
                    return Err(TableConfigError::MissingAction {
                        state: format!("{to:?}"),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(StateTable {
            initial: self.initial,
            states: self.states,
        })
    }
}
