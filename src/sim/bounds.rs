//! Oriented-rectangle collision bounds
//!
//! Every entity describes its hull as a few axis-aligned rectangles in its
//! unrotated frame, plus the heading and the centre it rotates about. Overlap
//! is a separating-axis test between the rotated quadrilaterals.

use glam::Vec2;

use crate::rotate_about;

/// Axis-aligned rectangle anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Corners in winding order
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
            Vec2::new(self.x, self.y + self.height),
        ]
    }
}

/// Per-tick snapshot of an entity's collision hull
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    /// Rectangles in the entity's unrotated frame
    pub rects: Vec<Rect>,
    /// Rotation in degrees (counter-clockwise)
    pub rotation: f32,
    /// Centre of rotation
    pub origin: Vec2,
}

impl Bounds {
    pub fn new(rotation: f32, origin: Vec2) -> Self {
        Self {
            rects: Vec::with_capacity(2),
            rotation,
            origin,
        }
    }

    /// Unrotated bounds made of a single rectangle
    pub fn single(rect: Rect) -> Self {
        let origin = Vec2::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
        Self {
            rects: vec![rect],
            rotation: 0.0,
            origin,
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rects.push(rect);
        self
    }

    /// World-space corners of one rectangle
    pub fn world_corners(&self, rect: &Rect) -> [Vec2; 4] {
        rect.corners()
            .map(|c| rotate_about(c, self.origin, self.rotation))
    }

    /// True if any rectangle of `self` overlaps any rectangle of `other`
    pub fn overlaps(&self, other: &Bounds) -> bool {
        overlaps(self, other)
    }
}

/// True on the first overlapping rectangle pair between `a` and `b`
pub fn overlaps(a: &Bounds, b: &Bounds) -> bool {
    for ra in &a.rects {
        let pa = a.world_corners(ra);
        for rb in &b.rects {
            let pb = b.world_corners(rb);
            if convex_polygons_overlap(&pa, &pb) {
                return true;
            }
        }
    }
    false
}

/// Separating-axis test between two convex polygons.
///
/// Polygons that only touch along an edge or at a corner do not overlap.
pub fn convex_polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    !has_separating_axis(a, b) && !has_separating_axis(b, a)
}

fn has_separating_axis(poly: &[Vec2], other: &[Vec2]) -> bool {
    for i in 0..poly.len() {
        let edge = poly[(i + 1) % poly.len()] - poly[i];
        let axis = edge.perp();
        if axis.length_squared() <= f32::EPSILON {
            continue;
        }
        let (min_a, max_a) = project(poly, axis);
        let (min_b, max_b) = project(other, axis);
        if max_a <= min_b || max_b <= min_a {
            return true;
        }
    }
    false
}

fn project(poly: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for p in poly {
        let d = p.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}
