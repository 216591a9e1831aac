//! Broad-phase spatial index
//!
//! An R-tree of body rectangles keyed by body key. The dynamic index is
//! rebuilt with a bulk load every step; the static index is maintained
//! incrementally, so a key-to-rectangle map is kept alongside the tree for
//! exact removal.

use std::collections::HashMap;
use std::hash::Hash;

use arcade2d_math::{Rect, Vec2};
use rstar::{RTree, RTreeObject, AABB};

/// Smallest accepted node capacity
pub const MIN_MAX_ENTRIES: usize = 4;

/// A rectangle stored in the tree, tagged with its key
#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry<K> {
    key: K,
    min: [f32; 2],
    max: [f32; 2],
}

impl<K> Entry<K> {
    fn new(key: K, rect: &Rect) -> Self {
        Self {
            key,
            min: rect.min().to_array(),
            max: rect.max().to_array(),
        }
    }
}

impl<K> RTreeObject for Entry<K> {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// R-tree over body bounds
pub struct SpatialIndex<K: Copy + Eq + Hash> {
    tree: RTree<Entry<K>>,
    rects: HashMap<K, Rect>,
}

impl<K: Copy + Eq + Hash> Default for SpatialIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> SpatialIndex<K> {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            rects: HashMap::new(),
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.rects.clear();
    }

    /// Replace the contents with a bulk-loaded set of entries
    pub fn load<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, Rect)>,
    {
        self.rects.clear();
        let entries: Vec<Entry<K>> = items
            .into_iter()
            .map(|(key, rect)| {
                self.rects.insert(key, rect);
                Entry::new(key, &rect)
            })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Add an entry, replacing any existing one for the same key
    pub fn insert(&mut self, key: K, rect: Rect) {
        self.remove(key);
        self.tree.insert(Entry::new(key, &rect));
        self.rects.insert(key, rect);
    }

    /// Remove an entry; returns whether it was present
    pub fn remove(&mut self, key: K) -> bool {
        match self.rects.remove(&key) {
            Some(rect) => self.tree.remove(&Entry::new(key, &rect)).is_some(),
            None => false,
        }
    }

    /// Move an existing entry (or insert a new one)
    pub fn update(&mut self, key: K, rect: Rect) {
        self.insert(key, rect);
    }

    pub fn contains(&self, key: K) -> bool {
        self.rects.contains_key(&key)
    }

    /// Rectangle last stored for `key`
    pub fn rect(&self, key: K) -> Option<Rect> {
        self.rects.get(&key).copied()
    }

    /// Keys whose rectangles intersect `area`
    pub fn search_rect(&self, area: &Rect) -> Vec<K> {
        let envelope = AABB::from_corners(area.min().to_array(), area.max().to_array());
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.key)
            .collect()
    }

    /// Keys whose rectangles intersect the circle
    pub fn search_circle(&self, center: Vec2, radius: f32) -> Vec<K> {
        self.search_rect(&Rect::from_circle(center, radius))
            .into_iter()
            .filter(|key| {
                self.rects
                    .get(key)
                    .map_or(false, |rect| rect.intersects_circle(center, radius))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}
