//! Distance tests between boxes and circles
//!
//! Boxes are described by center, half extents and a heading using the same
//! "0 = facing up" convention as the ship.

use glam::Vec2;

use crate::{heading_forward, heading_right};

/// An oriented rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub center: Vec2,
    /// Half width (along the heading's right vector) and half height (along forward)
    pub half_extents: Vec2,
    pub rotation: f32,
}

impl OrientedRect {
    pub fn new(center: Vec2, half_extents: Vec2, rotation: f32) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Express a world point in the rectangle's local `(right, forward)` frame
    #[inline]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        let d = point - self.center;
        Vec2::new(
            d.dot(heading_right(self.rotation)),
            d.dot(heading_forward(self.rotation)),
        )
    }
}

/// Squared distance from a circle center to the nearest point of a rectangle
#[inline]
pub fn rect_point_distance_sq(rect: &OrientedRect, point: Vec2) -> f32 {
    let local = rect.to_local(point);
    let closest = local.clamp(-rect.half_extents, rect.half_extents);
    (local - closest).length_squared()
}

/// Whether a circle touches or overlaps a rectangle
#[inline]
pub fn rect_circle_overlap(rect: &OrientedRect, circle_center: Vec2, radius: f32) -> bool {
    rect_point_distance_sq(rect, circle_center) <= radius * radius
}

/// Whether a point lies inside `[min - margin, max + margin]` on both axes
#[inline]
pub fn inside_expanded(point: Vec2, extent: f32, size: Vec2, margin: f32) -> bool {
    point.x + extent >= -margin
        && point.x - extent <= size.x + margin
        && point.y + extent >= -margin
        && point.y - extent <= size.y + margin
}
