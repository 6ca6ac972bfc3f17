//! Boundary to the input collaborator.
//!
//! A windowing layer reports what the player did as [`InputEvent`]s, in
//! board coordinates. [`InputMapper`] turns them into keyed commands; the
//! core never polls devices itself.

use serde::{Deserialize, Serialize};

use crate::{
    board::Vec2,
    commands::{
        AddObjectAtPosition, Command, MoveSelectedToPosition, RemoveObjectAtPosition,
        SelectObjectAtPosition,
    },
    objects::{Blueprint, Event, ObjectFactory},
};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Modifier + primary click: select and act on the object
    SelectAt { position: Vec2 },
    /// Place the current blueprint
    PlaceAt { position: Vec2 },
    RemoveAt { position: Vec2 },
    MoveSelectedTo { position: Vec2 },
    /// Toggle hit box outlines
    ToggleHitBoxes,
}

/// What an input event turned into.
pub enum Mapped {
    Command { key: String, command: Box<dyn Command> },
    ToggleHitBoxes,
}

impl std::fmt::Debug for Mapped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command { key, .. } => f.debug_struct("Command").field("key", key).finish(),
            Self::ToggleHitBoxes => f.write_str("ToggleHitBoxes"),
        }
    }
}

/// Translates input events into commands.
#[derive(Debug, Clone)]
pub struct InputMapper {
    factory: ObjectFactory,
    placing: Blueprint,
}

impl InputMapper {
    #[must_use]
    pub fn new(factory: ObjectFactory, placing: Blueprint) -> Self {
        Self { factory, placing }
    }

    #[must_use]
    pub fn factory(&self) -> &ObjectFactory {
        &self.factory
    }

    /// Blueprint used by [`InputEvent::PlaceAt`].
    #[must_use]
    pub fn placing(&self) -> &Blueprint {
        &self.placing
    }

    pub fn set_placing(&mut self, blueprint: Blueprint) {
        self.placing = blueprint;
    }

    /// Keys name the command and its position, so repeating the same
    /// action at the same spot within one frame collapses into one
    /// command.
    #[must_use]
    pub fn translate(&self, event: InputEvent) -> Mapped {
        match event {
            InputEvent::SelectAt { position } => Mapped::Command {
                key: format!("SelectObjectAtPosition x:{:.1}, y:{:.1}", position.x, position.y),
                command: Box::new(
                    SelectObjectAtPosition::new(position, Event::Flip)
                        .or_else(Event::Pull)
                        .or_else(Event::Play),
                ),
            },
            InputEvent::PlaceAt { position } => Mapped::Command {
                key: format!(
                    "AddObjectAtPosition x:{:.1}, y:{:.1}, blueprint:{:?}",
                    position.x, position.y, self.placing
                ),
                command: Box::new(AddObjectAtPosition::new(
                    self.factory.clone(),
                    self.placing.clone(),
                    position,
                )),
            },
            InputEvent::RemoveAt { position } => Mapped::Command {
                key: format!("RemoveObjectAtPosition x:{:.1}, y:{:.1}", position.x, position.y),
                command: Box::new(RemoveObjectAtPosition::new(position)),
            },
            InputEvent::MoveSelectedTo { position } => Mapped::Command {
                key: format!("MoveSelectedToPosition x:{:.1}, y:{:.1}", position.x, position.y),
                command: Box::new(MoveSelectedToPosition::new(position)),
            },
            InputEvent::ToggleHitBoxes => Mapped::ToggleHitBoxes,
        }
    }
}
