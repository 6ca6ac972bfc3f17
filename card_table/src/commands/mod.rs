//! Deferred, one-shot board mutations.
//!
//! Input handling turns device events into [`Command`] values keyed by a
//! descriptive string. Once per frame [`CommandQueue::execute_all`] drains
//! the queue and runs every command on the rayon pool, joining before it
//! returns.
//!
//! Ordinary misses (nothing under the cursor, board full, an event the
//! target does not accept) come back as [`CommandOutcome::Rejected`].
//! [`CommandError`] is reserved for contract violations and build
//! failures.

pub mod actions;
pub mod queue;

use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use actions::{
    AddObjectAtPosition, MoveSelectedToPosition, RemoveObjectAtPosition, SelectObjectAtPosition,
};
pub use queue::{CommandQueue, ExecutionReport};

use crate::{
    board::{Board, EntityId, Vec2},
    objects::{Event, FactoryError},
};

/// A captured intent plus everything needed to carry it out later.
pub trait Command: Send {
    /// Runs the command once. The board is shared with every other
    /// command of the same batch; lock it only for the mutation itself.
    fn execute(self: Box<Self>, board: &Mutex<Board>) -> Result<CommandOutcome, CommandError>;
}

/// What a command did.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    Added(EntityId),
    Removed(EntityId),
    /// `event` was the first of the attempted events the target accepted
    Selected { id: EntityId, event: Event, state: String },
    Moved { id: EntityId, position: Vec2 },
    Rejected(Rejection),
}

impl CommandOutcome {
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Expected, recoverable reasons a command changed nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    NothingAtPosition(Vec2),
    BoardFull { capacity: usize },
    /// The object refused every attempted event
    EventRejected(EntityId),
    NothingSelected,
    /// The selected object left the board
    SelectionGone(EntityId),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{command} needs at least one object on the board")]
    EmptyBoard { command: &'static str },

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

pub(crate) fn lock_board(board: &Mutex<Board>) -> MutexGuard<'_, Board> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}
