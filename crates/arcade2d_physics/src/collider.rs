//! Persistent collision pairings
//!
//! A [`Collider`] names two sets of objects and is re-evaluated every step,
//! in registration order. Its callbacks are owned boxed closures; any state
//! they need is captured by the closure.

use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::body::BodyRef;
use crate::error::PhysicsError;
use crate::tile::{Tile, TileSource};
use crate::world::World;

new_key_type! {
    /// Key to a collider in the physics world
    pub struct ColliderKey;
}

new_key_type! {
    /// Key to a body group in the physics world
    pub struct GroupKey;
}

/// The two participants handed to a callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CollisionPair {
    Bodies(BodyRef, BodyRef),
    Tile(BodyRef, Tile),
}

impl CollisionPair {
    /// The first participant, always a body
    pub fn body(&self) -> BodyRef {
        match self {
            CollisionPair::Bodies(body, _) | CollisionPair::Tile(body, _) => *body,
        }
    }

    /// The second participant if it is a body
    pub fn other_body(&self) -> Option<BodyRef> {
        match self {
            CollisionPair::Bodies(_, other) => Some(*other),
            CollisionPair::Tile(..) => None,
        }
    }

    /// The second participant if it is a tile
    pub fn tile(&self) -> Option<&Tile> {
        match self {
            CollisionPair::Tile(_, tile) => Some(tile),
            CollisionPair::Bodies(..) => None,
        }
    }
}

/// Decides whether a pair that intersects should be separated
pub type ProcessCallback =
    Box<dyn FnMut(&mut World, CollisionPair) -> Result<bool, PhysicsError>>;

/// Runs after a pair has been separated (or found overlapping)
pub type CollideCallback = Box<dyn FnMut(&mut World, CollisionPair) -> Result<(), PhysicsError>>;

/// Something a collider can test against
#[derive(Clone)]
pub enum ColliderTarget {
    Body(BodyRef),
    Group(GroupKey),
    List(Vec<ColliderTarget>),
    Tiles(Arc<dyn TileSource>),
}

impl fmt::Debug for ColliderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColliderTarget::Body(body) => f.debug_tuple("Body").field(body).finish(),
            ColliderTarget::Group(group) => f.debug_tuple("Group").field(group).finish(),
            ColliderTarget::List(list) => f.debug_tuple("List").field(list).finish(),
            ColliderTarget::Tiles(_) => f.write_str("Tiles"),
        }
    }
}

impl From<BodyRef> for ColliderTarget {
    fn from(body: BodyRef) -> Self {
        ColliderTarget::Body(body)
    }
}

impl From<crate::body::BodyKey> for ColliderTarget {
    fn from(key: crate::body::BodyKey) -> Self {
        ColliderTarget::Body(BodyRef::Dynamic(key))
    }
}

impl From<crate::static_body::StaticBodyKey> for ColliderTarget {
    fn from(key: crate::static_body::StaticBodyKey) -> Self {
        ColliderTarget::Body(BodyRef::Static(key))
    }
}

impl From<GroupKey> for ColliderTarget {
    fn from(group: GroupKey) -> Self {
        ColliderTarget::Group(group)
    }
}

impl From<Vec<ColliderTarget>> for ColliderTarget {
    fn from(list: Vec<ColliderTarget>) -> Self {
        ColliderTarget::List(list)
    }
}

impl From<Arc<dyn TileSource>> for ColliderTarget {
    fn from(tiles: Arc<dyn TileSource>) -> Self {
        ColliderTarget::Tiles(tiles)
    }
}

/// A persistent pairing evaluated every step
pub struct Collider {
    pub name: String,
    pub active: bool,
    pub overlap_only: bool,
    pub object1: ColliderTarget,
    /// `None` tests `object1` against itself
    pub object2: Option<ColliderTarget>,
    pub(crate) process_callback: Option<ProcessCallback>,
    pub(crate) collide_callback: Option<CollideCallback>,
}

impl Collider {
    pub fn new(object1: impl Into<ColliderTarget>, object2: Option<ColliderTarget>) -> Self {
        Self {
            name: String::new(),
            active: true,
            overlap_only: false,
            object1: object1.into(),
            object2,
            process_callback: None,
            collide_callback: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Only report overlaps; never separate
    pub fn with_overlap_only(mut self, overlap_only: bool) -> Self {
        self.overlap_only = overlap_only;
        self
    }

    pub fn with_process<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut World, CollisionPair) -> Result<bool, PhysicsError> + 'static,
    {
        self.process_callback = Some(Box::new(callback));
        self
    }

    pub fn with_collide<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut World, CollisionPair) -> Result<(), PhysicsError> + 'static,
    {
        self.collide_callback = Some(Box::new(callback));
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn has_process_callback(&self) -> bool {
        self.process_callback.is_some()
    }

    pub fn has_collide_callback(&self) -> bool {
        self.collide_callback.is_some()
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("overlap_only", &self.overlap_only)
            .field("object1", &self.object1)
            .field("object2", &self.object2)
            .finish()
    }
}

/// An ordered collection of bodies used as a collider target
#[derive(Clone, Debug, Default)]
pub struct Group {
    pub name: String,
    members: Vec<BodyRef>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a body; adding an existing member is a no-op
    pub fn add(&mut self, body: BodyRef) {
        if !self.members.contains(&body) {
            self.members.push(body);
        }
    }

    /// Remove a body; returns whether it was a member
    pub fn remove(&mut self, body: BodyRef) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != body);
        self.members.len() != before
    }

    pub fn contains(&self, body: BodyRef) -> bool {
        self.members.contains(&body)
    }

    pub fn members(&self) -> &[BodyRef] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&BodyRef) -> bool) {
        self.members.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKey;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<BodyKey> {
        let mut map: SlotMap<BodyKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_group_membership() {
        let k = keys(2);
        let mut group = Group::new("enemies");
        group.add(BodyRef::Dynamic(k[0]));
        group.add(BodyRef::Dynamic(k[0]));
        group.add(BodyRef::Dynamic(k[1]));

        assert_eq!(group.len(), 2);
        assert!(group.contains(BodyRef::Dynamic(k[1])));
        assert!(group.remove(BodyRef::Dynamic(k[0])));
        assert!(!group.remove(BodyRef::Dynamic(k[0])));
        assert_eq!(group.members(), &[BodyRef::Dynamic(k[1])]);
    }

    #[test]
    fn test_collider_builder() {
        let k = keys(2);
        let collider = Collider::new(k[0], Some(k[1].into()))
            .with_name("player-vs-coin")
            .with_overlap_only(true)
            .with_collide(|_, _| Ok(()));

        assert_eq!(collider.name, "player-vs-coin");
        assert!(collider.active);
        assert!(collider.overlap_only);
        assert!(collider.has_collide_callback());
        assert!(!collider.has_process_callback());
    }

    #[test]
    fn test_collision_pair_accessors() {
        let k = keys(2);
        let pair = CollisionPair::Bodies(k[0].into(), k[1].into());
        assert_eq!(pair.body(), BodyRef::Dynamic(k[0]));
        assert_eq!(pair.other_body(), Some(BodyRef::Dynamic(k[1])));
        assert!(pair.tile().is_none());
    }
}
