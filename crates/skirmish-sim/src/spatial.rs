//! Quadtree spatial index over the live entity populations.
//!
//! Rebuilt from scratch every tick: the tree holds entity handles for the
//! current tick only and is never updated incrementally. Retrieval visits
//! every node whose region overlaps the query rectangle, so a query
//! containing an entity's position can never miss it; callers still perform
//! exact narrow-phase checks on the candidates.

use hecs::Entity;

use skirmish_core::constants::{MIN_QUERY_EXTENT, QUADTREE_MAX_DEPTH, QUADTREE_NODE_CAPACITY};
use skirmish_core::types::Rect;

/// An entity reference stored for the current tick.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub rect: Rect,
}

/// A quadtree node. Child quadrants are created lazily when the local entry
/// count exceeds the node capacity, down to the maximum depth.
#[derive(Debug)]
pub struct Quadtree {
    bounds: Rect,
    level: usize,
    entries: Vec<SpatialEntry>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    pub fn new(bounds: Rect) -> Self {
        Self::with_level(bounds, 0)
    }

    fn with_level(bounds: Rect, level: usize) -> Self {
        Self {
            bounds,
            level,
            entries: Vec::new(),
            children: None,
        }
    }

    /// Discard all entries and child nodes.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.children = None;
    }

    /// Place an entity, keyed by its bounding rectangle.
    pub fn insert(&mut self, entity: Entity, rect: Rect) {
        if let Some(children) = self.children.as_mut() {
            if let Some(idx) = child_index(&children_bounds(&self.bounds), &rect) {
                children[idx].insert(entity, rect);
                return;
            }
        }

        self.entries.push(SpatialEntry { entity, rect });

        if self.children.is_none()
            && self.entries.len() > QUADTREE_NODE_CAPACITY
            && self.level < QUADTREE_MAX_DEPTH
        {
            self.split();
        }
    }

    /// All entities in nodes touched by `query`. False positives are
    /// expected; false negatives are not.
    pub fn retrieve(&self, query: Rect) -> Vec<Entity> {
        let query = normalize_query(query);
        let mut out = Vec::new();
        self.collect_into(&query, &mut out);
        out
    }

    /// Total stored entry count (diagnostics and tests).
    pub fn len(&self) -> usize {
        let child_total: usize = self
            .children
            .as_ref()
            .map(|c| c.iter().map(Quadtree::len).sum())
            .unwrap_or(0);
        self.entries.len() + child_total
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_into(&self, query: &Rect, out: &mut Vec<Entity>) {
        if !self.bounds.intersects(query) {
            return;
        }
        out.extend(self.entries.iter().map(|e| e.entity));
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect_into(query, out);
            }
        }
    }

    fn split(&mut self) {
        let quads = children_bounds(&self.bounds);
        let level = self.level + 1;
        self.children = Some(Box::new([
            Quadtree::with_level(quads[0], level),
            Quadtree::with_level(quads[1], level),
            Quadtree::with_level(quads[2], level),
            Quadtree::with_level(quads[3], level),
        ]));

        // Redistribute entries that fit entirely inside a quadrant; spanning
        // entries stay at this node.
        let entries = std::mem::take(&mut self.entries);
        if let Some(children) = self.children.as_mut() {
            for entry in entries {
                match child_index(&quads, &entry.rect) {
                    Some(idx) => children[idx].insert(entry.entity, entry.rect),
                    None => self.entries.push(entry),
                }
            }
        }
    }
}

/// Quadrant bounds in the order NE, NW, SW, SE.
fn children_bounds(bounds: &Rect) -> [Rect; 4] {
    let hw = bounds.width / 2.0;
    let hh = bounds.height / 2.0;
    [
        Rect::new(bounds.x + hw, bounds.y, hw, hh),
        Rect::new(bounds.x, bounds.y, hw, hh),
        Rect::new(bounds.x, bounds.y + hh, hw, hh),
        Rect::new(bounds.x + hw, bounds.y + hh, hw, hh),
    ]
}

/// Index of the quadrant fully containing `rect`, if any.
fn child_index(quads: &[Rect; 4], rect: &Rect) -> Option<usize> {
    quads.iter().position(|q| q.contains_rect(rect))
}

/// Degenerate query rectangles get a minimum extent so a point query still
/// touches the node it lands in.
fn normalize_query(mut query: Rect) -> Rect {
    if query.width < MIN_QUERY_EXTENT {
        let grow = MIN_QUERY_EXTENT - query.width;
        query.x -= grow / 2.0;
        query.width = MIN_QUERY_EXTENT;
    }
    if query.height < MIN_QUERY_EXTENT {
        let grow = MIN_QUERY_EXTENT - query.height;
        query.y -= grow / 2.0;
        query.height = MIN_QUERY_EXTENT;
    }
    query
}
