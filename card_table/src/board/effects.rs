//! Collect-then-apply: board mutations proposed during the parallel update
//! phase, applied by a single thread once the phase has joined.

use log::{debug, warn};

use super::{identity::EntityId, object::GameObject, registry::Registry};
use crate::objects::Entity;

/// A mutation an update task wants applied to the board.
#[derive(Debug)]
pub enum Effect {
    /// Put a new object on the board. When the board has no room, the
    /// object is handed back to `origin`, if there is one.
    Spawn {
        entity: Entity,
        origin: Option<EntityId>,
    },
}

impl Effect {
    #[must_use]
    pub fn spawn(entity: Entity) -> Self {
        Self::Spawn {
            entity,
            origin: None,
        }
    }

    /// `entity` came out of the object `origin`.
    #[must_use]
    pub fn deal(origin: EntityId, entity: Entity) -> Self {
        Self::Spawn {
            entity,
            origin: Some(origin),
        }
    }
}

/// Tally of one reducer pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EffectReport {
    pub spawned: Vec<EntityId>,
    /// Spawns that found no room and went back to their origin
    pub returned: Vec<EntityId>,
    /// Spawns that found no room and had nowhere to go
    pub dropped: usize,
}

impl EffectReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Applies `effects` in order.
pub fn apply_effects<T>(registry: &mut Registry<T>, effects: Vec<Effect>) -> EffectReport
where
    T: GameObject + From<Entity>,
{
    let mut report = EffectReport::default();

    for effect in effects {
        match effect {
            Effect::Spawn { entity, origin } => {
                let id = entity.id();
                if registry.is_full() {
                    let refused = match origin.and_then(|origin| registry.get_mut(origin)) {
                        Some(source) => source.take_back(entity),
                        None => Some(entity),
                    };
                    match refused {
                        None => {
                            debug!("{id} handed back to its origin: board full");
                            report.returned.push(id);
                        }
                        Some(lost) => {
                            warn!("{} {id} dropped: board full", lost.object_name());
                            report.dropped += 1;
                        }
                    }
                } else if registry.append(T::from(entity)) {
                    report.spawned.push(id);
                } else {
                    report.dropped += 1;
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{geometry::Vec2, identity::IdGenerator},
        objects::{ObjectFactory, test_assets},
    };
    use std::sync::Arc;

    fn factory() -> ObjectFactory {
        ObjectFactory::new(Arc::new(test_assets())).unwrap()
    }

    #[test]
    fn test_spawns_apply_in_order() {
        let factory = factory();
        let mut registry: Registry = Registry::new(3, IdGenerator::new());
        let first = factory.card(registry.ids(), Vec2::ZERO, "ammo_box").unwrap();
        let second = factory.card(registry.ids(), Vec2::new(80.0, 0.0), "bullet").unwrap();
        let ids = vec![first.id(), second.id()];

        let report = apply_effects(
            &mut registry,
            vec![Effect::spawn(first.into()), Effect::spawn(second.into())],
        );

        assert_eq!(report.spawned, ids);
        assert_eq!(registry.id_order(), ids);
    }

    #[test]
    fn test_spawn_without_origin_is_dropped_when_full() {
        let factory = factory();
        let mut registry: Registry = Registry::new(1, IdGenerator::new());
        let first = factory.card(registry.ids(), Vec2::ZERO, "bullet").unwrap();
        let second = factory.card(registry.ids(), Vec2::ZERO, "bullet").unwrap();

        let report = apply_effects(
            &mut registry,
            vec![Effect::spawn(first.into()), Effect::spawn(second.into())],
        );

        assert_eq!(report.spawned.len(), 1);
        assert_eq!(report.dropped, 1);
        assert!(!report.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dealt_card_goes_back_to_full_deck() {
        let factory = factory();
        let mut registry: Registry = Registry::new(1, IdGenerator::new());
        let deck = registry
            .insert_with(|ids| {
                factory
                    .deck(ids, Vec2::ZERO, "draw", &["bullet"])
                    .unwrap()
                    .into()
            })
            .unwrap();
        let extra = factory.card(registry.ids(), Vec2::new(90.0, 0.0), "zombies").unwrap();
        let extra_id = extra.id();

        let report = apply_effects(&mut registry, vec![Effect::deal(deck, extra.into())]);

        assert_eq!(report.returned, vec![extra_id]);
        assert_eq!(report.dropped, 0);
        assert_eq!(registry.len(), 1);
        let deck = registry.get(deck).and_then(Entity::as_deck).unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.top().unwrap().name(), "zombies");
    }

    #[test]
    fn test_origin_that_cannot_hold_cards_drops() {
        let factory = factory();
        let mut registry: Registry = Registry::new(1, IdGenerator::new());
        let holder = registry
            .insert_with(|ids| factory.card(ids, Vec2::ZERO, "bullet").unwrap().into())
            .unwrap();
        let extra = factory.card(registry.ids(), Vec2::ZERO, "zombies").unwrap();

        let report = apply_effects(&mut registry, vec![Effect::deal(holder, extra.into())]);

        assert!(report.returned.is_empty());
        assert_eq!(report.dropped, 1);
    }
}
