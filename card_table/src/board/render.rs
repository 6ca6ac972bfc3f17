//! Boundary to the rendering collaborator.
//!
//! Objects describe what to draw through [`RenderTarget`]; the windowing
//! layer decides how. [`DrawList`] is the headless target used by the
//! runner and by tests.

use std::sync::{Arc, Mutex, PoisonError};

use super::{
    geometry::{Rect, Vec2},
    identity::EntityId,
};

/// A named sub-rectangle of a sprite sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteFrame {
    pub sheet: Arc<str>,
    pub frame: Rect,
}

impl SpriteFrame {
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.frame.size()
    }
}

/// Placement of a sprite: centre position and rotation in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f64,
}

impl Transform {
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }
}

/// Something objects can draw onto. Shared by every draw task of a frame.
pub trait RenderTarget: Sync {
    fn draw_sprite(&self, owner: EntityId, sprite: &SpriteFrame, transform: Transform);

    /// Outline of a hit box, drawn when the debug overlay is on.
    fn draw_outline(&self, owner: EntityId, rect: Rect);
}

/// A recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Sprite {
        owner: EntityId,
        sprite: SpriteFrame,
        transform: Transform,
    },
    Outline {
        owner: EntityId,
        rect: Rect,
    },
}

impl DrawCall {
    #[must_use]
    pub fn owner(&self) -> EntityId {
        match self {
            Self::Sprite { owner, .. } | Self::Outline { owner, .. } => *owner,
        }
    }
}

/// Records draw calls instead of rasterizing them.
#[derive(Debug, Default)]
pub struct DrawList {
    calls: Mutex<Vec<DrawCall>>,
}

impl DrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: DrawCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Drains the recorded calls, grouped by owner. Calls of one owner keep
    /// the order they were issued in.
    pub fn take(&self) -> Vec<DrawCall> {
        let mut calls =
            std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner));
        calls.sort_by_key(DrawCall::owner);
        calls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RenderTarget for DrawList {
    fn draw_sprite(&self, owner: EntityId, sprite: &SpriteFrame, transform: Transform) {
        self.push(DrawCall::Sprite {
            owner,
            sprite: sprite.clone(),
            transform,
        });
    }

    fn draw_outline(&self, owner: EntityId, rect: Rect) {
        self.push(DrawCall::Outline { owner, rect });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_groups_by_owner_and_drains() {
        let list = DrawList::new();
        let sprite = SpriteFrame {
            sheet: Arc::from("cards"),
            frame: Rect::new(Vec2::ZERO, Vec2::new(70.0, 100.0)),
        };
        list.draw_outline(EntityId(2), Rect::default());
        list.draw_sprite(EntityId(1), &sprite, Transform::at(Vec2::ZERO));
        list.draw_sprite(EntityId(2), &sprite, Transform::at(Vec2::new(1.0, 1.0)));

        let calls = list.take();

        assert_eq!(
            calls.iter().map(DrawCall::owner).collect::<Vec<_>>(),
            vec![EntityId(1), EntityId(2), EntityId(2)]
        );
        assert!(matches!(calls[1], DrawCall::Outline { .. }));
        assert!(list.is_empty());
    }
}
