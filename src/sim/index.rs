//! Quad-subdivision spatial index
//!
//! Built once per leg over the whole course. Each internal node splits its
//! rectangle into four quadrants around its centre, and splits only while both
//! half-extents exceed the minimum cell size. On a course
//! tens of thousands of units long and a few thousand wide this yields thin,
//! Y-stacked leaves holding a handful of entities each.
//!
//! Lookups are same-leaf only: `get` returns exactly the leaf a point routes
//! to, never its neighbours. Two entities straddling a leaf boundary do not
//! see each other.

use std::collections::BTreeSet;

use glam::Vec2;

/// Default floor for a leaf's half-extent
pub const MIN_CELL_SIZE: f32 = 200.0;

#[derive(Debug, Clone)]
enum QuadNode<T> {
    Branch {
        centre: Vec2,
        /// Top-left, top-right, bottom-left, bottom-right
        children: Box<[QuadNode<T>; 4]>,
    },
    Leaf(BTreeSet<T>),
}

impl<T: Ord + Copy> QuadNode<T> {
    fn build(width: f32, height: f32, origin: Vec2, min_cell: f32) -> Self {
        let w = width.max(min_cell);
        let h = height.max(min_cell);
        let half_w = w * 0.5;
        let half_h = h * 0.5;

        if half_w > min_cell && half_h > min_cell {
            let child = |x: f32, y: f32| QuadNode::build(half_w, half_h, Vec2::new(x, y), min_cell);
            QuadNode::Branch {
                centre: origin + Vec2::new(half_w, half_h),
                children: Box::new([
                    child(origin.x, origin.y + half_h),
                    child(origin.x + half_w, origin.y + half_h),
                    child(origin.x, origin.y),
                    child(origin.x + half_w, origin.y),
                ]),
            }
        } else {
            QuadNode::Leaf(BTreeSet::new())
        }
    }

    /// Quadrant slot for a point, compared strictly against the centre
    #[inline]
    fn quadrant(centre: Vec2, p: Vec2) -> usize {
        match (p.x > centre.x, p.y > centre.y) {
            (false, true) => 0,
            (true, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        }
    }

    fn leaf(&self, p: Vec2) -> &BTreeSet<T> {
        match self {
            QuadNode::Branch { centre, children } => children[Self::quadrant(*centre, p)].leaf(p),
            QuadNode::Leaf(items) => items,
        }
    }

    fn leaf_mut(&mut self, p: Vec2) -> &mut BTreeSet<T> {
        match self {
            QuadNode::Branch { centre, children } => {
                let slot = Self::quadrant(*centre, p);
                children[slot].leaf_mut(p)
            }
            QuadNode::Leaf(items) => items,
        }
    }

    fn clear(&mut self) {
        match self {
            QuadNode::Branch { children, .. } => children.iter_mut().for_each(QuadNode::clear),
            QuadNode::Leaf(items) => items.clear(),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            QuadNode::Branch { children, .. } => children.iter().map(QuadNode::leaf_count).sum(),
            QuadNode::Leaf(_) => 1,
        }
    }
}

/// Point index mapping world coordinates to sets of handles
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    root: QuadNode<T>,
}

impl<T: Ord + Copy> SpatialIndex<T> {
    /// Build an index covering `width` x `height` with its bottom-left corner at `origin`
    pub fn build(width: f32, height: f32, origin: Vec2) -> Self {
        Self::with_min_cell(width, height, origin, MIN_CELL_SIZE)
    }

    pub fn with_min_cell(width: f32, height: f32, origin: Vec2, min_cell: f32) -> Self {
        // A non-positive floor would never terminate
        let min_cell = if min_cell > 0.0 { min_cell } else { MIN_CELL_SIZE };
        Self {
            root: QuadNode::build(width, height, origin, min_cell),
        }
    }

    /// Insert `item` into the leaf `p` routes to.
    ///
    /// Points outside the covered rectangle go to the nearest quadrant.
    pub fn add(&mut self, p: Vec2, item: T) {
        self.root.leaf_mut(p).insert(item);
    }

    /// Remove `item` from the leaf `p` routes to.
    ///
    /// `p` must be the point the item was last added under; removing from the
    /// wrong leaf is a no-op and leaves the item orphaned.
    pub fn remove(&mut self, p: Vec2, item: T) {
        self.root.leaf_mut(p).remove(&item);
    }

    /// Move `item` from the leaf for `from` to the leaf for `to`
    pub fn relocate(&mut self, from: Vec2, to: Vec2, item: T) {
        self.remove(from, item);
        self.add(to, item);
    }

    /// Contents of the single leaf `p` routes to
    pub fn get(&self, p: Vec2) -> &BTreeSet<T> {
        self.root.leaf(p)
    }

    /// Empty every leaf, keeping the subdivision
    pub fn clear(&mut self) {
        self.root.clear();
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_index() -> SpatialIndex<u32> {
        SpatialIndex::build(MIN_CELL_SIZE * 2.0, MIN_CELL_SIZE * 2.0, Vec2::ZERO)
    }

    #[test]
    fn test_add_then_get() {
        let mut index = small_index();
        let p = Vec2::new(MIN_CELL_SIZE * 1.5, MIN_CELL_SIZE * 1.5);
        index.add(p, 7);
        assert!(index.get(p).contains(&7));
    }

    #[test]
    fn test_remove_with_insert_coordinates() {
        let mut index = small_index();
        let p = Vec2::new(MIN_CELL_SIZE * 1.5, MIN_CELL_SIZE * 1.5);
        index.add(p, 7);
        index.remove(p, 7);
        assert!(!index.get(p).contains(&7));
    }

    #[test]
    fn test_empty_index() {
        let index = small_index();
        assert!(index.get(Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_out_of_bounds_routes_to_nearest_quadrant() {
        let mut index = SpatialIndex::build(4000.0, 40_000.0, Vec2::new(-2000.0, 0.0));
        assert!(index.get(Vec2::new(1e6, 1e6)).is_empty());

        index.add(Vec2::new(1e6, 1e6), 3);
        // Same far corner leaf as the course's top-right cell
        assert!(index.get(Vec2::new(1999.0, 39_999.0)).contains(&3));
        assert!(!index.get(Vec2::new(-1999.0, 1.0)).contains(&3));
    }

    #[test]
    fn test_stale_remove_orphans_item() {
        let mut index = SpatialIndex::build(4000.0, 40_000.0, Vec2::new(-2000.0, 0.0));
        let before = Vec2::new(0.0, 100.0);
        let after = Vec2::new(0.0, 30_000.0);
        index.add(before, 1);

        // Removing under the moved position misses the real leaf
        index.remove(after, 1);
        assert!(index.get(before).contains(&1));

        index.relocate(before, after, 1);
        assert!(!index.get(before).contains(&1));
        assert!(index.get(after).contains(&1));
    }

    #[test]
    fn test_get_is_same_leaf_only() {
        let mut index = SpatialIndex::build(800.0, 800.0, Vec2::ZERO);
        // Just either side of the root's vertical split
        index.add(Vec2::new(399.0, 100.0), 1);
        assert!(index.get(Vec2::new(399.5, 100.0)).contains(&1));
        assert!(!index.get(Vec2::new(401.0, 100.0)).contains(&1));
    }

    #[test]
    fn test_zero_sized_course_is_single_leaf() {
        let mut index: SpatialIndex<u32> = SpatialIndex::build(0.0, 0.0, Vec2::ZERO);
        assert_eq!(index.leaf_count(), 1);
        index.add(Vec2::new(-1000.0, 5000.0), 9);
        assert!(index.get(Vec2::new(123.0, -4.0)).contains(&9));
    }

    #[test]
    fn test_elongated_course_leaves_stack_along_y() {
        // 7 lanes of 400 plus margins, 40k long
        let index: SpatialIndex<u32> = SpatialIndex::build(3600.0, 41_000.0, Vec2::new(-1800.0, -500.0));
        // Width stops splitting first, so leaves are tall and thin
        assert_eq!(index.leaf_count(), 256);
    }

    #[test]
    fn test_split_needs_both_half_extents_above_floor() {
        let leaves = |w, h| SpatialIndex::<u32>::with_min_cell(w, h, Vec2::ZERO, 200.0).leaf_count();
        assert_eq!(leaves(800.0, 800.0), 4);
        // One half-extent at or under the floor stops the split
        assert_eq!(leaves(800.0, 300.0), 1);
        assert_eq!(leaves(800.0, 400.0), 1);
        assert_eq!(leaves(800.0, 401.0), 4);
    }

    #[test]
    fn test_clear_keeps_structure() {
        let mut index = SpatialIndex::build(4000.0, 4000.0, Vec2::ZERO);
        let leaves = index.leaf_count();
        index.add(Vec2::new(10.0, 10.0), 1);
        index.add(Vec2::new(3900.0, 3900.0), 2);
        index.clear();
        assert!(index.get(Vec2::new(10.0, 10.0)).is_empty());
        assert!(index.get(Vec2::new(3900.0, 3900.0)).is_empty());
        assert_eq!(index.leaf_count(), leaves);
    }

    proptest! {
        #[test]
        fn prop_insert_get_remove_round_trip(
            x in -3000.0f32..3000.0,
            y in -1000.0f32..45_000.0,
            item in 0u32..1000,
        ) {
            let mut index = SpatialIndex::build(2800.0, 40_000.0, Vec2::new(-1400.0, 0.0));
            let p = Vec2::new(x, y);
            index.add(p, item);
            prop_assert!(index.get(p).contains(&item));
            index.remove(p, item);
            prop_assert!(!index.get(p).contains(&item));
        }
    }
}
