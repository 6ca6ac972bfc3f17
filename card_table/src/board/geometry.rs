//! Plane geometry used for placement and hit-testing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point or offset on the board.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Linear interpolation from `self` to `other`; `t = 0` yields `self`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self.add(other.sub(self).scaled(t))
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Axis-aligned rectangle. `min` is the bottom-left corner.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Builds a rectangle from two corners, normalizing their order.
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle of `size` centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let half = size.scaled(0.5);
        Self::new(center.sub(half), center.add(half))
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min.lerp(self.max, 0.5)
    }

    /// Edges are inclusive.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.min.x <= point.x
            && point.x <= self.max.x
            && self.min.y <= point.y
            && point.y <= self.max.y
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_uses_height_for_vertical_extent() {
        let rect = Rect::centered(Vec2::new(10.0, 10.0), Vec2::new(4.0, 8.0));
        assert_eq!(rect.min, Vec2::new(8.0, 6.0));
        assert_eq!(rect.max, Vec2::new(12.0, 14.0));
        assert_eq!(rect.size(), Vec2::new(4.0, 8.0));
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(2.0, 2.0)));
        assert!(rect.contains(Vec2::new(1.0, 1.5)));
        assert!(!rect.contains(Vec2::new(2.1, 1.0)));
        assert!(!rect.contains(Vec2::new(1.0, -0.1)));
    }

    #[test]
    fn test_new_normalizes_corners() {
        let rect = Rect::new(Vec2::new(5.0, -1.0), Vec2::new(-5.0, 1.0));
        assert_eq!(rect.min, Vec2::new(-5.0, -1.0));
        assert_eq!(rect.max, Vec2::new(5.0, 1.0));
        assert_eq!(rect.center(), Vec2::ZERO);
    }

    #[test]
    fn test_intersects() {
        let a = Rect::centered(Vec2::ZERO, Vec2::new(2.0, 2.0));
        let b = Rect::centered(Vec2::new(1.5, 0.0), Vec2::new(2.0, 2.0));
        let c = Rect::centered(Vec2::new(10.0, 0.0), Vec2::new(2.0, 2.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Vec2::new(0.0, 10.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(5.0, 5.0));
    }
}
