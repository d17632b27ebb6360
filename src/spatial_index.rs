//! Static bounding-box index used to prune segment pair tests.
//!
//! Boxes are bulk-loaded once into an R*-tree; queries report the insertion
//! position of every box overlapping the query box.

use std::ops::ControlFlow;

use rstar::{RTree, RTreeObject, AABB};

use crate::math::Point2;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Aabb {
    /// Creates a box from explicit bounds.
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Box of side `2 * half_size` centered on `point`.
    #[must_use]
    pub fn around_point(point: Point2, half_size: f64) -> Self {
        Self::new(
            point.x - half_size,
            point.y - half_size,
            point.x + half_size,
            point.y + half_size,
        )
    }

    /// Returns this box grown by `amount` on every side.
    #[must_use]
    pub fn expanded(&self, amount: f64) -> Self {
        Self::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Returns `true` if the boxes share any point.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

/// A box tagged with its insertion position.
#[derive(Debug, Clone)]
struct IndexEntry {
    index: usize,
    aabb: Aabb,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb.envelope()
    }
}

/// Immutable spatial index over a fixed list of boxes.
#[derive(Debug)]
pub struct StaticSpatialIndex {
    tree: RTree<IndexEntry>,
    boxes: Vec<Aabb>,
}

impl StaticSpatialIndex {
    /// Bulk-loads an index over `boxes`; query results refer to positions in this list.
    #[must_use]
    pub fn build(boxes: Vec<Aabb>) -> Self {
        let entries = boxes
            .iter()
            .enumerate()
            .map(|(index, aabb)| IndexEntry { index, aabb: *aabb })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            boxes,
        }
    }

    /// Number of indexed boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns `true` if no boxes were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The indexed boxes, in insertion order.
    #[must_use]
    pub fn item_boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Positions of all boxes overlapping `query`, in ascending order.
    #[must_use]
    pub fn query(&self, query: &Aabb) -> Vec<usize> {
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query.envelope())
            .map(|entry| entry.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Calls `visitor` with each box overlapping `query` until it returns
    /// [`ControlFlow::Break`]. Visit order is unspecified.
    pub fn visit_query<F>(&self, query: &Aabb, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(usize) -> ControlFlow<()>,
    {
        for entry in self.tree.locate_in_envelope_intersecting(&query.envelope()) {
            if visitor(entry.index).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}
