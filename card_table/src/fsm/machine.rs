//! The state machine itself.

use log::{debug, warn};
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::{
    errors::{StateMachineError, TableConfigError},
    table::{Label, Next, StateTable},
};

/// Chained transitions allowed within one `send_event` call.
pub const DEFAULT_CASCADE_LIMIT: usize = 32;

/// Where a machine is and where it came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cursor<S> {
    pub current: S,
    pub previous: S,
}

/// A finite state machine driving one actor.
///
/// The machine does not own its actor: callers pass it in on every
/// [`StateMachine::send_event`], which lets an object keep its machine
/// and its data as sibling fields.
pub struct StateMachine<S, E, A: ?Sized> {
    table: Arc<StateTable<S, E, A>>,
    /// Held for the whole of `send_event`, so at most one event is in
    /// flight per machine.
    cursor: Mutex<Cursor<S>>,
    cascade_limit: usize,
}

impl<S: Label, E: Label, A: ?Sized> StateMachine<S, E, A> {
    /// New machine parked in the table's initial state.
    #[must_use]
    pub fn new(table: Arc<StateTable<S, E, A>>) -> Self {
        let initial = table.initial();
        Self {
            table,
            cursor: Mutex::new(Cursor {
                current: initial,
                previous: initial,
            }),
            cascade_limit: DEFAULT_CASCADE_LIMIT,
        }
    }

    /// New machine parked in `state` instead of the table's initial state.
    pub fn starting_at(
        table: Arc<StateTable<S, E, A>>,
        state: S,
    ) -> Result<Self, TableConfigError> {
        if !table.declares(state) {
            return Err(TableConfigError::MissingInitial(format!("{state:?}")));
        }
        let machine = Self::new(table);
        *machine.lock() = Cursor {
            current: state,
            previous: state,
        };
        Ok(machine)
    }

    #[must_use]
    pub fn with_cascade_limit(mut self, limit: usize) -> Self {
        self.cascade_limit = limit;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Cursor<S>> {
        // An action that panicked left the cursor at a committed state.
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn current(&self) -> S {
        self.lock().current
    }

    #[must_use]
    pub fn previous(&self) -> S {
        self.lock().previous
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor<S> {
        *self.lock()
    }

    #[must_use]
    pub fn table(&self) -> &Arc<StateTable<S, E, A>> {
        &self.table
    }

    /// Whether `event` would be accepted right now.
    #[must_use]
    pub fn accepts(&self, event: E) -> bool {
        self.table.next_state(self.current(), event).is_some()
    }

    /// Feeds `event` to the machine.
    ///
    /// Each accepted event moves `current` into `previous`, enters the
    /// target state and runs its entry action. An action answering with
    /// another event keeps the loop going, so one call may cascade through
    /// several states. Returns the state the machine settled in.
    ///
    /// # Errors
    ///
    /// - [`StateMachineError::Rejected`] when the current state has no
    ///   transition for the event. A rejected first event leaves the
    ///   cursor untouched; a rejected chained event leaves the machine in
    ///   the last state it entered.
    /// - [`StateMachineError::CascadeLimit`] when chaining does not settle
    ///   within the machine's cascade limit.
    pub fn send_event(&self, event: E, actor: &mut A) -> Result<S, StateMachineError> {
        let mut cursor = self.lock();
        let mut event = event;
        let mut steps = 0;

        loop {
            let Some(next) = self.table.next_state(cursor.current, event) else {
                debug!("{event:?} rejected in {:?}", cursor.current);
                return Err(StateMachineError::Rejected {
                    state: format!("{:?}", cursor.current),
                    event: format!("{event:?}"),
                });
            };

            if steps == self.cascade_limit {
                warn!(
                    "{event:?} exceeded cascade limit {} in {:?}",
                    self.cascade_limit, cursor.current
                );
                return Err(StateMachineError::CascadeLimit {
                    event: format!("{event:?}"),
                    limit: self.cascade_limit,
                });
            }
            steps += 1;

            cursor.previous = cursor.current;
            cursor.current = next;

            // Built tables guarantee every target has an action.
            let follow = match self.table.action(next) {
                Some(action) => action.execute(actor),
                None => Next::NoOp,
            };
            match follow {
                Next::NoOp => return Ok(next),
                Next::Event(chained) => event = chained,
            }
        }
    }
}

impl<S: fmt::Debug + Copy, E, A: ?Sized> fmt::Debug for StateMachine<S, E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cursor = *self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("StateMachine")
            .field("current", &cursor.current)
            .field("previous", &cursor.previous)
            .field("cascade_limit", &self.cascade_limit)
            .finish()
    }
}
