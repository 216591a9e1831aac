//! Static bodies
//!
//! Immovable rectangles or circles that are never integrated. They live in
//! their own spatial index which is only touched when their bounds change.

use arcade2d_math::Vec2;
use slotmap::new_key_type;

use crate::body::{
    sanitize_extent, sanitize_mass, ArcadeBody, BodyKind, OwnerHandle, OwnerTransform,
};
use crate::edges::{CollisionEdges, EdgeState};

new_key_type! {
    /// Key to a static body in the physics world
    pub struct StaticBodyKey;
}

/// An immovable body
#[derive(Clone, Debug)]
pub struct StaticBody {
    pub enable: bool,
    owner: Option<OwnerHandle>,
    position: Vec2,
    offset: Vec2,
    center: Vec2,
    width: f32,
    height: f32,
    half_width: f32,
    half_height: f32,
    is_circle: bool,
    radius: f32,
    mass: f32,
    pub pushable: bool,
    pub on_collide: bool,
    pub on_overlap: bool,
    pub custom_separate_x: bool,
    pub custom_separate_y: bool,
    pub check_collision: CollisionEdges,
    touching: EdgeState,
    was_touching: EdgeState,
    blocked: EdgeState,
    embedded: bool,
    overlap_x: f32,
    overlap_y: f32,
    overlap_r: f32,
    dirty: bool,
}

impl StaticBody {
    /// Create an ownerless static body with its top-left corner at (x, y)
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let width = sanitize_extent(width, "width");
        let height = sanitize_extent(height, "height");
        let mut body = Self {
            enable: true,
            owner: None,
            position: Vec2::new(x, y),
            offset: Vec2::ZERO,
            center: Vec2::ZERO,
            width,
            height,
            half_width: width * 0.5,
            half_height: height * 0.5,
            is_circle: false,
            radius: 0.0,
            mass: 1.0,
            pushable: false,
            on_collide: false,
            on_overlap: false,
            custom_separate_x: false,
            custom_separate_y: false,
            check_collision: CollisionEdges::ALL,
            touching: EdgeState::CLEAR,
            was_touching: EdgeState::CLEAR,
            blocked: EdgeState::CLEAR,
            embedded: false,
            overlap_x: 0.0,
            overlap_y: 0.0,
            overlap_r: 0.0,
            dirty: false,
        };
        body.update_center();
        body
    }

    /// Create a static body covering its owner's scaled frame
    pub fn from_owner(owner: OwnerHandle, transform: &OwnerTransform) -> Self {
        let mut body = Self::new(0.0, 0.0, transform.frame_size.x, transform.frame_size.y);
        body.owner = Some(owner);
        body.update_from_owner(transform);
        body.dirty = false;
        body
    }

    pub fn with_circle(mut self, radius: f32) -> Self {
        self.set_circle(radius, None);
        self
    }

    pub fn owner(&self) -> Option<OwnerHandle> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<OwnerHandle>) {
        self.owner = owner;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f32) {
        self.mass = sanitize_mass(mass);
    }

    pub fn overlap_x(&self) -> f32 {
        self.overlap_x
    }

    pub fn overlap_y(&self) -> f32 {
        self.overlap_y
    }

    pub fn overlap_r(&self) -> f32 {
        self.overlap_r
    }

    pub fn was_touching(&self) -> EdgeState {
        self.was_touching
    }

    fn update_center(&mut self) {
        self.center = Vec2::new(
            self.position.x + self.half_width,
            self.position.y + self.half_height,
        );
    }

    /// Resize, optionally keeping the same center
    pub fn set_size(&mut self, width: f32, height: f32, center: bool) {
        let old_center = self.center;
        self.width = sanitize_extent(width, "width");
        self.height = sanitize_extent(height, "height");
        self.half_width = self.width * 0.5;
        self.half_height = self.height * 0.5;
        self.is_circle = false;
        self.radius = 0.0;
        if center {
            self.position = old_center - Vec2::new(self.half_width, self.half_height);
        }
        self.update_center();
        self.dirty = true;
    }

    /// Make the body a circle; a radius of zero or less reverts to a rectangle
    pub fn set_circle(&mut self, radius: f32, offset: Option<Vec2>) {
        if radius > 0.0 {
            self.is_circle = true;
            self.radius = radius;
            self.width = radius * 2.0;
            self.height = radius * 2.0;
            self.half_width = radius;
            self.half_height = radius;
            if let Some(offset) = offset {
                self.set_offset(offset.x, offset.y);
            }
            self.update_center();
        } else {
            self.is_circle = false;
            self.radius = 0.0;
        }
        self.dirty = true;
    }

    /// Change the offset from the owner origin, moving the body with it
    pub fn set_offset(&mut self, x: f32, y: f32) {
        let offset = Vec2::new(x, y);
        self.position += offset - self.offset;
        self.offset = offset;
        self.update_center();
        self.dirty = true;
    }

    /// Move the top-left corner to (x, y)
    pub fn reset(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.update_center();
        self.dirty = true;
    }

    /// Re-read size and position from the owner
    pub fn update_from_owner(&mut self, transform: &OwnerTransform) {
        let scale = transform.scale.abs();
        if !self.is_circle {
            self.width = sanitize_extent(transform.frame_size.x * scale.x, "width");
            self.height = sanitize_extent(transform.frame_size.y * scale.y, "height");
            self.half_width = self.width * 0.5;
            self.half_height = self.height * 0.5;
        }
        self.position = transform.position
            + (self.offset - transform.display_origin).component_mul(transform.scale);
        self.update_center();
        self.dirty = true;
    }

    pub fn hit_test(&self, x: f32, y: f32) -> bool {
        if self.is_circle {
            self.center.distance(Vec2::new(x, y)) <= self.radius
        } else {
            self.bounds().contains(Vec2::new(x, y))
        }
    }

    /// Clear per-step contact flags
    pub fn reset_flags(&mut self) {
        self.was_touching = self.touching;
        self.touching = EdgeState::CLEAR;
        self.blocked = EdgeState::CLEAR;
        self.embedded = false;
        self.overlap_x = 0.0;
        self.overlap_y = 0.0;
        self.overlap_r = 0.0;
    }

    /// Bounds changed since the static index last saw this body
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl ArcadeBody for StaticBody {
    fn kind(&self) -> BodyKind {
        BodyKind::Static
    }

    fn is_enabled(&self) -> bool {
        self.enable
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    // Static bodies are only moved through their own setters so the index
    // stays consistent.
    fn translate(&mut self, _delta: Vec2) {}

    fn prev(&self) -> Vec2 {
        self.position
    }

    fn delta(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn refresh_delta(&mut self) {}

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn center(&self) -> Vec2 {
        self.center
    }

    fn is_circle(&self) -> bool {
        self.is_circle
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn velocity(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn set_velocity(&mut self, _velocity: Vec2) {}

    fn bounce(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn immovable(&self) -> bool {
        true
    }

    fn pushable(&self) -> bool {
        self.pushable
    }

    fn moves(&self) -> bool {
        false
    }

    fn friction(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn slide_factor(&self) -> Vec2 {
        Vec2::ONE
    }

    fn custom_separate_x(&self) -> bool {
        self.custom_separate_x
    }

    fn custom_separate_y(&self) -> bool {
        self.custom_separate_y
    }

    fn check_collision(&self) -> CollisionEdges {
        self.check_collision
    }

    fn touching(&self) -> EdgeState {
        self.touching
    }

    fn touching_mut(&mut self) -> &mut EdgeState {
        &mut self.touching
    }

    fn blocked(&self) -> EdgeState {
        self.blocked
    }

    fn blocked_mut(&mut self) -> &mut EdgeState {
        &mut self.blocked
    }

    fn embedded(&self) -> bool {
        self.embedded
    }

    fn set_embedded(&mut self, embedded: bool) {
        self.embedded = embedded;
    }

    fn set_overlap_x(&mut self, overlap: f32) {
        self.overlap_x = overlap;
    }

    fn set_overlap_y(&mut self, overlap: f32) {
        self.overlap_y = overlap;
    }

    fn set_overlap_r(&mut self, overlap: f32) {
        self.overlap_r = overlap;
    }
}
