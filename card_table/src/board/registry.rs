//! The live set of board objects.

use log::debug;
use std::slice;
use thiserror::Error;

use super::{
    geometry::Vec2,
    identity::{EntityId, IdGenerator},
    object::{BoardView, GameObject},
};
use crate::objects::Entity;

/// Capacity ceiling used when none is configured.
pub const DEFAULT_MAX_OBJECTS: usize = 400;

/// Errors raised by registry addressing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RegistryError {
    #[error("no objects on the board")]
    Empty,

    #[error("index {index} out of range for {len} objects")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered, capacity-bounded collection of objects, unique by id.
///
/// Iteration order is insertion order, except that removal moves the last
/// object into the vacated slot.
#[derive(Debug)]
pub struct Registry<T = Entity> {
    objects: Vec<T>,
    capacity: usize,
    ids: IdGenerator,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OBJECTS, IdGenerator::new())
    }
}

impl<T> Registry<T> {
    #[must_use]
    pub fn new(capacity: usize, ids: IdGenerator) -> Self {
        Self {
            objects: Vec::with_capacity(capacity.min(DEFAULT_MAX_OBJECTS)),
            capacity,
            ids,
        }
    }

    /// The generator identities must come from for objects entering this
    /// registry.
    #[must_use]
    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.objects.len() >= self.capacity
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.objects.iter_mut()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.objects
    }

    /// Mutable access to every slot. Callers may mutate objects in place but
    /// cannot add or remove them through this.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.objects
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.objects.get(index)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.objects.get_mut(index)
    }

    /// Swaps the object at `index` with the last one and truncates.
    ///
    /// # Errors
    ///
    /// [`RegistryError::IndexOutOfRange`] when `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, RegistryError> {
        if index >= self.objects.len() {
            return Err(RegistryError::IndexOutOfRange {
                index,
                len: self.objects.len(),
            });
        }
        Ok(self.objects.swap_remove(index))
    }
}

impl<T: GameObject> Registry<T> {
    /// Appends `object` unless the registry is full or already holds its
    /// id. Returns whether it was appended.
    pub fn append(&mut self, object: T) -> bool {
        if self.is_full() {
            debug!(
                "{} {} dropped: registry at capacity {}",
                object.object_name(),
                object.id(),
                self.capacity
            );
            return false;
        }
        if self.index_of(object.id()).is_some() {
            debug!("{} {} dropped: id already on the board", object.object_name(), object.id());
            return false;
        }
        self.objects.push(object);
        true
    }

    /// Builds and appends an object only if there is room for it, so a
    /// rejected object never consumes an identity.
    pub fn insert_with<F>(&mut self, build: F) -> Option<EntityId>
    where
        F: FnOnce(&IdGenerator) -> T,
    {
        if self.is_full() {
            debug!("insert dropped: registry at capacity {}", self.capacity);
            return None;
        }
        let object = build(&self.ids);
        let id = object.id();
        self.objects.push(object);
        Some(id)
    }

    /// First object, in current order, whose hit box contains `point`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((index, object)))` - hit
    /// * `Ok(None)` - no object at `point`
    ///
    /// # Errors
    ///
    /// [`RegistryError::Empty`] when there is nothing on the board at all.
    pub fn find_at_position(&self, point: Vec2) -> Result<Option<(usize, &T)>, RegistryError> {
        if self.objects.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(self
            .objects
            .iter()
            .enumerate()
            .find(|(_, object)| object.hit_box().contains(point)))
    }

    #[must_use]
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.objects.iter().position(|object| object.id() == id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.objects.iter().find(|object| object.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    /// Removes the object with `id`, if present.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let index = self.index_of(id)?;
        Some(self.objects.swap_remove(index))
    }

    /// Ids in current iteration order.
    #[must_use]
    pub fn id_order(&self) -> Vec<EntityId> {
        self.objects.iter().map(GameObject::id).collect()
    }

    /// Snapshot handed to update tasks.
    #[must_use]
    pub fn view(&self) -> BoardView {
        BoardView::capture(&self.objects)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        board::{
            effects::Effect,
            geometry::Rect,
            render::RenderTarget,
        },
        fsm::StateMachineError,
        objects::Event,
    };

    /// Minimal object for exercising the registry without assets.
    #[derive(Debug)]
    pub(crate) struct Token {
        pub id: EntityId,
        pub position: Vec2,
        pub size: Vec2,
        pub updates: u32,
    }

    impl Token {
        pub(crate) fn new(ids: &IdGenerator, position: Vec2) -> Self {
            Self {
                id: ids.next_id(),
                position,
                size: Vec2::new(10.0, 10.0),
                updates: 0,
            }
        }
    }

    impl GameObject for Token {
        fn object_name(&self) -> &'static str {
            "Token"
        }

        fn id(&self) -> EntityId {
            self.id
        }

        fn position(&self) -> Vec2 {
            self.position
        }

        fn hit_box(&self) -> Rect {
            Rect::centered(self.position, self.size)
        }

        fn state_label(&self) -> String {
            "Idle".to_string()
        }

        fn update(&mut self, _dt: f64, _view: &BoardView) -> Vec<Effect> {
            self.updates += 1;
            Vec::new()
        }

        fn draw(&self, target: &dyn RenderTarget, draw_hit_box: bool) {
            if draw_hit_box {
                target.draw_outline(self.id, self.hit_box());
            }
        }

        fn move_to_position(&mut self, position: Vec2) {
            self.position = position;
        }

        fn send_event(&mut self, event: Event) -> Result<(), StateMachineError> {
            Err(StateMachineError::Rejected {
                state: "Idle".to_string(),
                event: format!("{event:?}"),
            })
        }
    }

    fn registry(capacity: usize) -> Registry<Token> {
        Registry::new(capacity, IdGenerator::new())
    }

    fn spawn(registry: &mut Registry<Token>, x: f64) -> Option<EntityId> {
        registry.insert_with(|ids| Token::new(ids, Vec2::new(x, 0.0)))
    }

    #[test]
    fn test_capacity_scenario() {
        let mut registry = registry(2);
        let a = spawn(&mut registry, 0.0).unwrap();
        let b = spawn(&mut registry, 100.0).unwrap();
        assert_eq!((a, b), (EntityId(0), EntityId(1)));

        // Full: nothing is built, no id is consumed.
        assert_eq!(spawn(&mut registry, 200.0), None);
        assert_eq!(registry.id_order(), vec![a, b]);

        let removed = registry.remove_at(0).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(registry.id_order(), vec![b]);

        let d = spawn(&mut registry, 300.0).unwrap();
        assert_eq!(d, EntityId(2));
        assert_eq!(registry.id_order(), vec![b, d]);
    }

    #[test]
    fn test_append_beyond_capacity_is_noop() {
        let mut registry = registry(1);
        let ids = IdGenerator::starting_at(50);
        assert!(registry.append(Token::new(&ids, Vec2::ZERO)));
        assert!(!registry.append(Token::new(&ids, Vec2::ZERO)));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_full());
    }

    #[test]
    fn test_append_refuses_duplicate_id() {
        let mut registry = registry(4);
        let first = Token::new(&IdGenerator::new(), Vec2::ZERO);
        let second = Token::new(&IdGenerator::new(), Vec2::new(10.0, 0.0));
        assert_eq!(first.id(), second.id());

        assert!(registry.append(first));
        assert!(!registry.append(second));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(EntityId(0)).unwrap().position(), Vec2::ZERO);
    }

    #[test]
    fn test_remove_moves_last_into_slot() {
        let mut registry = registry(10);
        for x in 0..4 {
            spawn(&mut registry, f64::from(x) * 100.0);
        }
        registry.remove_at(1).unwrap();
        assert_eq!(
            registry.id_order(),
            vec![EntityId(0), EntityId(3), EntityId(2)]
        );
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut registry = registry(10);
        spawn(&mut registry, 0.0);
        assert_eq!(
            registry.remove_at(3).unwrap_err(),
            RegistryError::IndexOutOfRange { index: 3, len: 1 }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find_returns_first_hit_in_order() {
        let mut registry = registry(10);
        let first = spawn(&mut registry, 0.0).unwrap();
        // Overlaps the first token.
        spawn(&mut registry, 4.0).unwrap();

        let (index, hit) = registry
            .find_at_position(Vec2::new(2.0, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(hit.id, first);
    }

    #[test]
    fn test_find_miss_is_none() {
        let mut registry = registry(10);
        spawn(&mut registry, 0.0);
        assert!(registry.find_at_position(Vec2::new(500.0, 500.0)).unwrap().is_none());
    }

    #[test]
    fn test_find_on_empty_registry() {
        let registry = registry(10);
        assert_eq!(
            registry.find_at_position(Vec2::ZERO).unwrap_err(),
            RegistryError::Empty
        );
    }

    #[test]
    fn test_stale_id_misses_after_removal() {
        let mut registry = registry(10);
        let id = spawn(&mut registry, 0.0).unwrap();
        spawn(&mut registry, 100.0);
        assert!(registry.remove(id).is_some());
        assert!(registry.get(id).is_none());
        assert!(registry.remove(id).is_none());
        // New objects never reuse the removed id.
        assert_ne!(spawn(&mut registry, 0.0), Some(id));
    }

    #[test]
    fn test_view_captures_positions() {
        let mut registry = registry(10);
        let id = spawn(&mut registry, 42.0).unwrap();
        let view = registry.view();
        assert_eq!(view.len(), 1);
        assert_eq!(view.get(id).unwrap().position, Vec2::new(42.0, 0.0));
    }
}
