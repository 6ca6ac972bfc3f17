//! The capability contract every board object satisfies.

use enum_dispatch::enum_dispatch;

use super::{
    effects::Effect,
    geometry::{Rect, Vec2},
    identity::EntityId,
    render::RenderTarget,
};
use crate::{
    fsm::StateMachineError,
    objects::{Entity, Event},
};

/// Operations the registry, scheduler and command queue rely on.
///
/// None of them needs to know which concrete kind of object it holds; the
/// [`crate::objects::Entity`] enum dispatches to the concrete kinds.
#[enum_dispatch]
pub trait GameObject {
    /// Kind name, e.g. `"Card"`.
    fn object_name(&self) -> &'static str;

    fn id(&self) -> EntityId;

    fn position(&self) -> Vec2;

    /// Rectangle used for point selection.
    fn hit_box(&self) -> Rect;

    /// Debug name of the object's current machine state.
    fn state_label(&self) -> String;

    /// Advances the object by `dt` seconds.
    ///
    /// Runs in parallel with every other object's update. Implementations
    /// may read `view` but write only their own fields; anything that must
    /// touch the board or another object is returned as an [`Effect`] and
    /// applied after the phase joins.
    fn update(&mut self, dt: f64, view: &BoardView) -> Vec<Effect>;

    /// Emits draw calls. Runs after every update of the frame has joined.
    fn draw(&self, target: &dyn RenderTarget, draw_hit_box: bool);

    /// Moves the object and recomputes its hit box.
    fn move_to_position(&mut self, position: Vec2);

    /// Forwards `event` to the object's state machine.
    fn send_event(&mut self, event: Event) -> Result<(), StateMachineError>;

    /// Takes back an object this one dealt onto a board that had no room
    /// for it. Returns the object when it cannot be taken back.
    fn take_back(&mut self, entity: Entity) -> Option<Entity> {
        Some(entity)
    }
}

/// Read-only facts about one object, captured before the update phase.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSnapshot {
    pub id: EntityId,
    pub name: &'static str,
    pub position: Vec2,
    pub hit_box: Rect,
}

/// What every update task may look at: the board as it stood when the
/// update phase began.
#[derive(Clone, Debug, Default)]
pub struct BoardView {
    objects: Vec<ObjectSnapshot>,
}

impl BoardView {
    pub fn capture<'a, T, I>(objects: I) -> Self
    where
        T: GameObject + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        Self {
            objects: objects
                .into_iter()
                .map(|object| ObjectSnapshot {
                    id: object.id(),
                    name: object.object_name(),
                    position: object.position(),
                    hit_box: object.hit_box(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectSnapshot> {
        self.objects.iter()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&ObjectSnapshot> {
        self.objects.iter().find(|snapshot| snapshot.id == id)
    }
}
