//! Game objects and their serializable templates
//!
//! A GameObject is something placed in a scene: a transform, a frame size and
//! optionally a physics body that moves it.

use std::collections::HashSet;

use arcade2d_math::Vec2;
use arcade2d_physics::{Body, BodyRef, OwnerHandle, OwnerTransform, StaticBody};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::Transform2D;

bitflags! {
    /// Flags indicating which parts of a game object changed since the last sync
    ///
    /// The scene uses them to decide which static bodies must be re-read from
    /// their owner.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// Position, rotation, scale or origin changed
        const TRANSFORM = 1 << 0;
        /// Frame size changed
        const FRAME = 1 << 1;
        /// All flags set
        const ALL = Self::TRANSFORM.bits() | Self::FRAME.bits();
    }
}

/// An object in a scene
///
/// Each game object has:
/// - An optional name (for lookup by name)
/// - Tags (for grouping in colliders)
/// - A transform
/// - The unscaled size of its frame
/// - An optional physics body (links to the physics World)
/// - Dirty flags (for change tracking)
#[derive(Clone, Debug)]
pub struct GameObject {
    /// Optional name for this object (for lookup)
    pub name: Option<String>,
    /// Tags for categorization (e.g., "player", "platform", "coin")
    pub tags: HashSet<String>,
    pub transform: Transform2D,
    /// Unscaled size of the displayed frame
    pub frame_size: Vec2,
    /// Physics body driving this object, if any
    pub physics_body: Option<BodyRef>,
    dirty: DirtyFlags,
}

impl GameObject {
    /// Create a game object with the given frame size at the origin
    pub fn new(frame_size: Vec2) -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            transform: Transform2D::identity(),
            frame_size,
            physics_body: None,
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }

    /// Set the name of this object (for lookup)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this object
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags to this object
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for tag in tags {
            self.tags.insert(tag.into());
        }
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Attach a physics body to this object
    pub fn with_physics_body(mut self, body: BodyRef) -> Self {
        self.physics_body = Some(body);
        self
    }

    /// What a body needs to follow this object
    pub fn owner_transform(&self) -> OwnerTransform {
        OwnerTransform {
            position: self.transform.position,
            display_origin: self.transform.display_origin(self.frame_size),
            scale: self.transform.scale,
            frame_size: self.frame_size,
            rotation: self.transform.rotation,
        }
    }

    // --- Dirty tracking methods ---

    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }

    /// Set the position and mark the transform as dirty
    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Set the transform and mark it as dirty
    pub fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Change the frame size and mark it as dirty
    pub fn set_frame_size(&mut self, frame_size: Vec2) {
        self.frame_size = frame_size;
        self.mark_dirty(DirtyFlags::FRAME);
    }
}

/// Serializable physics settings for a game object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTemplate {
    /// Create a static body instead of a dynamic one
    pub is_static: bool,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub drag: Vec2,
    pub bounce: Vec2,
    pub mass: f32,
    pub allow_gravity: bool,
    pub immovable: bool,
    pub pushable: bool,
    /// Circle radius; `None` keeps the body rectangular
    pub circle: Option<f32>,
    pub collide_world_bounds: bool,
    pub on_collide: bool,
    pub on_overlap: bool,
    pub on_world_bounds: bool,
}

impl Default for BodyTemplate {
    fn default() -> Self {
        Self {
            is_static: false,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            drag: Vec2::ZERO,
            bounce: Vec2::ZERO,
            mass: 1.0,
            allow_gravity: true,
            immovable: false,
            pushable: true,
            circle: None,
            collide_world_bounds: false,
            on_collide: false,
            on_overlap: false,
            on_world_bounds: false,
        }
    }
}

impl BodyTemplate {
    /// A static body with default settings
    pub fn fixed() -> Self {
        Self {
            is_static: true,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_circle(mut self, radius: f32) -> Self {
        self.circle = Some(radius);
        self
    }

    /// Build a dynamic body owned by `owner`
    pub fn build_body(&self, owner: OwnerHandle, transform: &OwnerTransform) -> Body {
        let mut body = Body::from_owner(owner, transform)
            .with_velocity(self.velocity)
            .with_acceleration(self.acceleration)
            .with_drag(self.drag)
            .with_bounce(self.bounce)
            .with_mass(self.mass)
            .with_gravity(self.allow_gravity)
            .with_immovable(self.immovable)
            .with_pushable(self.pushable)
            .with_world_bounds(self.collide_world_bounds);
        if let Some(radius) = self.circle {
            body.set_circle(radius, None);
        }
        body.on_collide = self.on_collide;
        body.on_overlap = self.on_overlap;
        body.on_world_bounds = self.on_world_bounds;
        body
    }

    /// Build a static body owned by `owner`
    pub fn build_static_body(&self, owner: OwnerHandle, transform: &OwnerTransform) -> StaticBody {
        let mut body = StaticBody::from_owner(owner, transform);
        if let Some(radius) = self.circle {
            body.set_circle(radius, None);
        }
        body.set_mass(self.mass);
        body.on_collide = self.on_collide;
        body.on_overlap = self.on_overlap;
        body
    }
}

/// A serializable game object template
///
/// Used for scene serialization; the body is created when the scene is
/// instantiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObjectTemplate {
    /// Optional name for this object (for lookup)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub transform: Transform2D,
    /// Unscaled frame size
    pub size: Vec2,
    #[serde(default)]
    pub body: Option<BodyTemplate>,
}

impl GameObjectTemplate {
    pub fn new(size: Vec2, transform: Transform2D) -> Self {
        Self {
            name: None,
            tags: Vec::new(),
            transform,
            size,
            body: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_body(mut self, body: BodyTemplate) -> Self {
        self.body = Some(body);
        self
    }

    /// Convert this template to a GameObject (without its body)
    pub fn to_game_object(&self) -> GameObject {
        let mut object = GameObject::new(self.size).with_transform(self.transform);
        if let Some(ref name) = self.name {
            object = object.with_name(name.clone());
        }
        object.with_tags(self.tags.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade2d_physics::ArcadeBody;

    #[test]
    fn test_new_object_is_dirty() {
        let object = GameObject::new(Vec2::new(16.0, 16.0));
        assert!(object.is_dirty());
        assert_eq!(object.dirty_flags(), DirtyFlags::ALL);
        assert!(object.physics_body.is_none());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut object = GameObject::new(Vec2::new(16.0, 16.0));
        object.clear_dirty();
        assert!(!object.is_dirty());

        object.set_position(Vec2::new(5.0, 5.0));
        assert!(object.dirty_flags().contains(DirtyFlags::TRANSFORM));
        assert!(!object.dirty_flags().contains(DirtyFlags::FRAME));

        object.set_frame_size(Vec2::new(8.0, 8.0));
        assert_eq!(object.dirty_flags(), DirtyFlags::ALL);
    }

    #[test]
    fn test_tags() {
        let object = GameObject::new(Vec2::ONE)
            .with_name("hero")
            .with_tag("player")
            .with_tags(["blue", "team"]);
        assert_eq!(object.name.as_deref(), Some("hero"));
        assert!(object.has_tag("player"));
        assert!(object.has_tag("team"));
        assert!(!object.has_tag("enemy"));
    }

    #[test]
    fn test_owner_transform() {
        let object = GameObject::new(Vec2::new(32.0, 16.0)).with_transform(
            Transform2D::from_position(Vec2::new(100.0, 50.0)).with_scale(Vec2::new(2.0, 1.0)),
        );
        let owner = object.owner_transform();
        assert_eq!(owner.position, Vec2::new(100.0, 50.0));
        assert_eq!(owner.display_origin, Vec2::new(16.0, 8.0));
        assert_eq!(owner.scale, Vec2::new(2.0, 1.0));
        assert_eq!(owner.frame_size, Vec2::new(32.0, 16.0));
    }

    #[test]
    fn test_body_template_builds_centred_body() {
        let object = GameObject::new(Vec2::new(32.0, 32.0))
            .with_transform(Transform2D::from_position(Vec2::new(100.0, 100.0)));
        let template = BodyTemplate::default().with_velocity(Vec2::new(10.0, 0.0));

        let body = template.build_body(OwnerHandle(1), &object.owner_transform());

        assert_eq!(body.position(), Vec2::new(84.0, 84.0));
        assert_eq!(body.center(), Vec2::new(100.0, 100.0));
        assert_eq!(body.velocity, Vec2::new(10.0, 0.0));
        assert_eq!(body.owner(), Some(OwnerHandle(1)));
    }

    #[test]
    fn test_body_template_static_circle() {
        let object = GameObject::new(Vec2::new(20.0, 20.0));
        let body = BodyTemplate::fixed()
            .with_circle(10.0)
            .build_static_body(OwnerHandle(2), &object.owner_transform());
        assert!(body.is_circle());
        assert_eq!(body.radius(), 10.0);
    }

    #[test]
    fn test_template_to_game_object() {
        let template = GameObjectTemplate::new(
            Vec2::new(16.0, 16.0),
            Transform2D::from_position(Vec2::new(1.0, 2.0)),
        )
        .with_name("crate")
        .with_tag("box");

        let object = template.to_game_object();
        assert_eq!(object.name.as_deref(), Some("crate"));
        assert!(object.has_tag("box"));
        assert_eq!(object.transform.position, Vec2::new(1.0, 2.0));
        assert_eq!(object.frame_size, Vec2::new(16.0, 16.0));
    }
}
