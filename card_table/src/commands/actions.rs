//! The board commands input handling produces.

use log::debug;
use std::sync::Mutex;

use super::{Command, CommandError, CommandOutcome, Rejection, lock_board};
use crate::{
    board::{Board, EntityId, GameObject, Registry, RegistryError, Vec2},
    objects::{Blueprint, Event, ObjectFactory},
};

/// Hit-tests `point`, treating an empty board as a broken contract.
fn hit_test(
    registry: &Registry,
    point: Vec2,
    command: &'static str,
) -> Result<Option<(usize, EntityId)>, CommandError> {
    match registry.find_at_position(point) {
        Ok(hit) => Ok(hit.map(|(index, object)| (index, object.id()))),
        Err(RegistryError::Empty) => Err(CommandError::EmptyBoard { command }),
        Err(RegistryError::IndexOutOfRange { .. }) => Ok(None),
    }
}

/// Builds `blueprint` at `position` and puts it on the board.
#[derive(Debug)]
pub struct AddObjectAtPosition {
    factory: ObjectFactory,
    blueprint: Blueprint,
    position: Vec2,
}

impl AddObjectAtPosition {
    #[must_use]
    pub fn new(factory: ObjectFactory, blueprint: Blueprint, position: Vec2) -> Self {
        Self {
            factory,
            blueprint,
            position,
        }
    }
}

impl Command for AddObjectAtPosition {
    fn execute(self: Box<Self>, board: &Mutex<Board>) -> Result<CommandOutcome, CommandError> {
        let mut board = lock_board(board);
        let registry = &mut board.registry;
        let full = Rejection::BoardFull {
            capacity: registry.capacity(),
        };

        // Checked first so a full board burns no ids.
        if registry.is_full() {
            debug!("board full, {:?} not added", self.blueprint);
            return Ok(CommandOutcome::Rejected(full));
        }

        let object = self.factory.build(&self.blueprint, registry.ids(), self.position)?;
        let id = object.id();
        if registry.append(object) {
            Ok(CommandOutcome::Added(id))
        } else {
            Ok(CommandOutcome::Rejected(full))
        }
    }
}

/// Removes the first object whose hit box contains `position`.
#[derive(Clone, Copy, Debug)]
pub struct RemoveObjectAtPosition {
    position: Vec2,
}

impl RemoveObjectAtPosition {
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }
}

impl Command for RemoveObjectAtPosition {
    fn execute(self: Box<Self>, board: &Mutex<Board>) -> Result<CommandOutcome, CommandError> {
        let mut board = lock_board(board);
        let hit = hit_test(&board.registry, self.position, "RemoveObjectAtPosition")?;
        let Some((index, id)) = hit else {
            debug!("nothing to remove at {}", self.position);
            return Ok(CommandOutcome::Rejected(Rejection::NothingAtPosition(self.position)));
        };

        if board.registry.remove_at(index).is_err() {
            return Ok(CommandOutcome::Rejected(Rejection::NothingAtPosition(self.position)));
        }
        if board.selected == Some(id) {
            board.selected = None;
        }
        debug!("object {id} removed");
        Ok(CommandOutcome::Removed(id))
    }
}

/// Selects the object at `position` and drives its state machine: the
/// primary event first, then each fallback in turn until one is accepted.
///
/// Events that deal a card onto the board are not attempted while the
/// board is full; if nothing else is accepted the outcome is
/// [`Rejection::BoardFull`].
#[derive(Clone, Debug)]
pub struct SelectObjectAtPosition {
    position: Vec2,
    events: Vec<Event>,
}

impl SelectObjectAtPosition {
    #[must_use]
    pub fn new(position: Vec2, primary: Event) -> Self {
        Self {
            position,
            events: vec![primary],
        }
    }

    #[must_use]
    pub fn or_else(mut self, fallback: Event) -> Self {
        self.events.push(fallback);
        self
    }
}

impl Command for SelectObjectAtPosition {
    fn execute(self: Box<Self>, board: &Mutex<Board>) -> Result<CommandOutcome, CommandError> {
        let mut board = lock_board(board);
        let hit = hit_test(&board.registry, self.position, "SelectObjectAtPosition")?;
        let Some((index, id)) = hit else {
            return Ok(CommandOutcome::Rejected(Rejection::NothingAtPosition(self.position)));
        };
        board.selected = Some(id);

        let capacity = board.registry.capacity();
        let full = board.registry.is_full();
        let Some(object) = board.registry.get_index_mut(index) else {
            return Ok(CommandOutcome::Rejected(Rejection::SelectionGone(id)));
        };
        let mut held_back = false;
        for event in self.events {
            if full && event.deals_card() {
                debug!("{} {id}: {event} held back, board full", object.object_name());
                held_back = true;
                continue;
            }
            match object.send_event(event) {
                Ok(()) => {
                    return Ok(CommandOutcome::Selected {
                        id,
                        event,
                        state: object.state_label(),
                    });
                }
                Err(err) => debug!("{} {id}: {err}", object.object_name()),
            }
        }
        if held_back {
            return Ok(CommandOutcome::Rejected(Rejection::BoardFull { capacity }));
        }
        Ok(CommandOutcome::Rejected(Rejection::EventRejected(id)))
    }
}

/// Moves the selected object to `position`.
#[derive(Clone, Copy, Debug)]
pub struct MoveSelectedToPosition {
    position: Vec2,
}

impl MoveSelectedToPosition {
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }
}

impl Command for MoveSelectedToPosition {
    fn execute(self: Box<Self>, board: &Mutex<Board>) -> Result<CommandOutcome, CommandError> {
        let mut board = lock_board(board);
        let Some(id) = board.selected else {
            return Ok(CommandOutcome::Rejected(Rejection::NothingSelected));
        };
        match board.registry.get_mut(id) {
            Some(object) => {
                object.move_to_position(self.position);
                Ok(CommandOutcome::Moved {
                    id,
                    position: self.position,
                })
            }
            None => {
                board.selected = None;
                Ok(CommandOutcome::Rejected(Rejection::SelectionGone(id)))
            }
        }
    }
}
