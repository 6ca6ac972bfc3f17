//! The board: entity registry, capability contract and frame phases.
//!
//! This module provides:
//! - [`Registry`]: capacity-bounded, identity-unique object collection with
//!   O(1) swap-remove and point hit-testing
//! - [`GameObject`]: the capability contract every object kind satisfies
//! - [`Scheduler`]: parallel update/draw fan-out with a join per phase
//! - [`apply_effects`]: single-threaded reducer for cross-object changes
//!   proposed during the update phase

pub mod config;
pub mod effects;
pub mod geometry;
pub mod identity;
pub mod object;
pub mod registry;
pub mod render;
pub mod scheduler;

pub use config::{BoardConfig, BoardConfigError};
pub use effects::{Effect, EffectReport, apply_effects};
pub use geometry::{Rect, Vec2};
pub use identity::{EntityId, IdGenerator};
pub use object::{BoardView, GameObject, ObjectSnapshot};
pub use registry::{DEFAULT_MAX_OBJECTS, Registry, RegistryError};
pub use render::{DrawCall, DrawList, RenderTarget, SpriteFrame, Transform};
pub use scheduler::{PhaseReport, Scheduler};

/// The registry plus the board-level relations that refer into it.
///
/// The current selection is held by identity, never by reference, so a
/// removed object leaves a selection that simply misses on lookup.
#[derive(Debug, Default)]
pub struct Board {
    pub registry: Registry,
    pub selected: Option<EntityId>,
}

impl Board {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            selected: None,
        }
    }

    #[must_use]
    pub fn with_config(config: &BoardConfig) -> Self {
        Self::new(Registry::new(config.capacity, IdGenerator::new()))
    }

    /// The selected object, if it is still on the board.
    #[must_use]
    pub fn selected_object(&self) -> Option<&crate::objects::Entity> {
        self.selected.and_then(|id| self.registry.get(id))
    }
}
