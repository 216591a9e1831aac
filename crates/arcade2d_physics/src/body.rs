//! Dynamic arcade bodies
//!
//! A [`Body`] is an axis-aligned rectangle (or circle) with velocity,
//! acceleration, drag and the per-edge contact flags that the separation
//! code fills in every step. Static bodies live in [`crate::static_body`];
//! both implement [`ArcadeBody`] so the narrow phase can treat them alike.

use arcade2d_math::{Rect, Vec2};
use log::{debug, warn};
use slotmap::new_key_type;

use crate::edges::{CollisionEdges, Edge, EdgeState, Facing};
use crate::motion;
use crate::static_body::StaticBodyKey;

new_key_type! {
    /// Key to a dynamic body in the physics world
    ///
    /// Generational: once the body is removed the key resolves to `None`,
    /// even if its slot is reused.
    pub struct BodyKey;
}

/// Smallest mass a body may have
pub const MIN_MASS: f32 = 0.1;

/// Handle to either kind of body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyRef {
    Dynamic(BodyKey),
    Static(StaticBodyKey),
}

impl BodyRef {
    pub fn is_static(&self) -> bool {
        matches!(self, BodyRef::Static(_))
    }

    /// The dynamic key, if this is a dynamic body
    pub fn dynamic(&self) -> Option<BodyKey> {
        match self {
            BodyRef::Dynamic(key) => Some(*key),
            BodyRef::Static(_) => None,
        }
    }

    /// The static key, if this is a static body
    pub fn static_key(&self) -> Option<StaticBodyKey> {
        match self {
            BodyRef::Static(key) => Some(*key),
            BodyRef::Dynamic(_) => None,
        }
    }
}

impl From<BodyKey> for BodyRef {
    fn from(key: BodyKey) -> Self {
        BodyRef::Dynamic(key)
    }
}

impl From<StaticBodyKey> for BodyRef {
    fn from(key: StaticBodyKey) -> Self {
        BodyRef::Static(key)
    }
}

/// Discriminates dynamic and static bodies behind [`ArcadeBody`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Static,
}

/// Opaque reference to whatever object owns a body
///
/// The physics world never interprets it; the owning system maps it back to
/// its own objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OwnerHandle(pub u64);

/// What a body needs to know about its owner's transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OwnerTransform {
    /// Owner position in world space
    pub position: Vec2,
    /// Origin offset in pixels (origin * frame size)
    pub display_origin: Vec2,
    pub scale: Vec2,
    /// Unscaled frame size
    pub frame_size: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
}

impl Default for OwnerTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            display_origin: Vec2::ZERO,
            scale: Vec2::ONE,
            frame_size: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

/// Movement the owner should apply after a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySync {
    pub owner: OwnerHandle,
    pub delta: Vec2,
    pub rotation_delta: f32,
}

/// Common view over dynamic and static bodies used by the narrow phase
pub trait ArcadeBody {
    fn kind(&self) -> BodyKind;
    fn is_enabled(&self) -> bool;

    /// Top-left corner
    fn position(&self) -> Vec2;
    /// Move by `delta`, keeping the center in sync
    fn translate(&mut self, delta: Vec2);
    /// Position at the start of the current step
    fn prev(&self) -> Vec2;
    /// Displacement during the current step
    fn delta(&self) -> Vec2;
    /// Recompute the step displacement after an external position change
    fn refresh_delta(&mut self);

    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn center(&self) -> Vec2;
    fn is_circle(&self) -> bool;
    fn radius(&self) -> f32;

    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn bounce(&self) -> Vec2;
    fn mass(&self) -> f32;
    fn immovable(&self) -> bool;
    fn pushable(&self) -> bool;
    fn moves(&self) -> bool;
    fn friction(&self) -> Vec2;
    fn slide_factor(&self) -> Vec2;
    fn custom_separate_x(&self) -> bool;
    fn custom_separate_y(&self) -> bool;
    fn check_collision(&self) -> CollisionEdges;

    fn touching(&self) -> EdgeState;
    fn touching_mut(&mut self) -> &mut EdgeState;
    fn blocked(&self) -> EdgeState;
    fn blocked_mut(&mut self) -> &mut EdgeState;
    fn embedded(&self) -> bool;
    fn set_embedded(&mut self, embedded: bool);
    fn set_overlap_x(&mut self, overlap: f32);
    fn set_overlap_y(&mut self, overlap: f32);
    fn set_overlap_r(&mut self, overlap: f32);

    fn left(&self) -> f32 {
        self.position().x
    }

    fn right(&self) -> f32 {
        self.position().x + self.width()
    }

    fn top(&self) -> f32 {
        self.position().y
    }

    fn bottom(&self) -> f32 {
        self.position().y + self.height()
    }

    fn bounds(&self) -> Rect {
        let p = self.position();
        Rect::new(p.x, p.y, self.width(), self.height())
    }
}

/// Clamp a body extent to at least one pixel
pub(crate) fn sanitize_extent(value: f32, what: &str) -> f32 {
    if value.is_finite() && value >= 1.0 {
        value
    } else {
        warn!("Body {} {} is below 1px, using 1px", what, value);
        1.0
    }
}

/// Clamp a mass to [`MIN_MASS`]
pub(crate) fn sanitize_mass(mass: f32) -> f32 {
    if mass.is_finite() && mass >= MIN_MASS {
        mass
    } else {
        debug!("Clamping body mass {} to {}", mass, MIN_MASS);
        MIN_MASS
    }
}

/// A dynamic arcade body
#[derive(Clone, Debug)]
pub struct Body {
    /// Disabled bodies are skipped by integration, collision and indexing
    pub enable: bool,
    owner: Option<OwnerHandle>,

    position: Vec2,
    prev: Vec2,
    prev_frame: Vec2,
    offset: Vec2,
    center: Vec2,
    width: f32,
    height: f32,
    half_width: f32,
    half_height: f32,
    source_width: f32,
    source_height: f32,
    owner_scale: Vec2,
    frame_size: Option<Vec2>,
    is_circle: bool,
    radius: f32,

    pub velocity: Vec2,
    new_velocity: Vec2,
    /// Per-axis cap on displacement per step; zero disables the cap
    pub delta_max: Vec2,
    pub acceleration: Vec2,
    pub allow_drag: bool,
    pub drag: Vec2,
    /// Drag multiplies velocity (per second) instead of subtracting from it
    pub use_damping: bool,
    pub allow_gravity: bool,
    /// Added to the world gravity
    pub gravity: Vec2,
    bounce: Vec2,
    /// Bounce used against world bounds instead of `bounce`
    pub world_bounce: Option<Vec2>,
    pub max_velocity: Vec2,
    /// Maximum speed; negative disables the limit
    pub max_speed: f32,
    /// Fraction of an immovable partner's motion passed on to this body
    pub friction: Vec2,
    /// Fraction of velocity kept after a blocked separation
    pub slide_factor: Vec2,

    pub allow_rotation: bool,
    /// Cosmetic rotation in degrees
    pub rotation: f32,
    pre_rotation: f32,
    pub angular_velocity: f32,
    pub angular_acceleration: f32,
    pub angular_drag: f32,
    pub max_angular: f32,

    mass: f32,
    pub immovable: bool,
    pub pushable: bool,
    /// When false, the body is never integrated and its owner drives it
    pub moves: bool,

    speed: f32,
    angle: f32,
    facing: Facing,
    frame_delta: Vec2,
    dx: f32,
    dy: f32,

    pub collide_world_bounds: bool,
    /// Rectangle used instead of the world bounds
    pub custom_bounds: Option<Rect>,
    pub on_world_bounds: bool,
    pub on_collide: bool,
    pub on_overlap: bool,
    pub custom_separate_x: bool,
    pub custom_separate_y: bool,
    pub check_collision: CollisionEdges,

    overlap_x: f32,
    overlap_y: f32,
    overlap_r: f32,
    embedded: bool,
    touching: EdgeState,
    was_touching: EdgeState,
    blocked: EdgeState,
}

impl Body {
    /// Create an ownerless body with its top-left corner at (x, y)
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let width = sanitize_extent(width, "width");
        let height = sanitize_extent(height, "height");
        let position = Vec2::new(x, y);

        let mut body = Self {
            enable: true,
            owner: None,
            position,
            prev: position,
            prev_frame: position,
            offset: Vec2::ZERO,
            center: Vec2::ZERO,
            width,
            height,
            half_width: width * 0.5,
            half_height: height * 0.5,
            source_width: width,
            source_height: height,
            owner_scale: Vec2::ONE,
            frame_size: None,
            is_circle: false,
            radius: 0.0,
            velocity: Vec2::ZERO,
            new_velocity: Vec2::ZERO,
            delta_max: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            allow_drag: true,
            drag: Vec2::ZERO,
            use_damping: false,
            allow_gravity: true,
            gravity: Vec2::ZERO,
            bounce: Vec2::ZERO,
            world_bounce: None,
            max_velocity: Vec2::splat(10000.0),
            max_speed: -1.0,
            friction: Vec2::new(1.0, 0.0),
            slide_factor: Vec2::ONE,
            allow_rotation: true,
            rotation: 0.0,
            pre_rotation: 0.0,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            angular_drag: 0.0,
            max_angular: 1000.0,
            mass: 1.0,
            immovable: false,
            pushable: true,
            moves: true,
            speed: 0.0,
            angle: 0.0,
            facing: Facing::None,
            frame_delta: Vec2::ZERO,
            dx: 0.0,
            dy: 0.0,
            collide_world_bounds: false,
            custom_bounds: None,
            on_world_bounds: false,
            on_collide: false,
            on_overlap: false,
            custom_separate_x: false,
            custom_separate_y: false,
            check_collision: CollisionEdges::ALL,
            overlap_x: 0.0,
            overlap_y: 0.0,
            overlap_r: 0.0,
            embedded: false,
            touching: EdgeState::CLEAR,
            was_touching: EdgeState::CLEAR,
            blocked: EdgeState::CLEAR,
        };
        body.update_center();
        body
    }

    /// Create a body sized and placed from its owner's transform
    pub fn from_owner(owner: OwnerHandle, transform: &OwnerTransform) -> Self {
        let mut body = Self::new(
            0.0,
            0.0,
            transform.frame_size.x,
            transform.frame_size.y,
        );
        body.owner = Some(owner);
        body.frame_size = Some(transform.frame_size);
        body.update_from_owner(transform);
        body.prev = body.position;
        body.prev_frame = body.position;
        body.pre_rotation = body.rotation;
        body
    }

    // Builders

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_drag(mut self, drag: Vec2) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_bounce(mut self, bounce: Vec2) -> Self {
        self.set_bounce(bounce);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Set whether world and body gravity apply
    pub fn with_gravity(mut self, allow: bool) -> Self {
        self.allow_gravity = allow;
        self
    }

    pub fn with_immovable(mut self, immovable: bool) -> Self {
        self.immovable = immovable;
        self
    }

    pub fn with_pushable(mut self, pushable: bool) -> Self {
        self.pushable = pushable;
        self
    }

    /// Turn the body into a circle of the given radius
    pub fn with_circle(mut self, radius: f32) -> Self {
        self.set_circle(radius, None);
        self
    }

    pub fn with_world_bounds(mut self, collide: bool) -> Self {
        self.collide_world_bounds = collide;
        self
    }

    // Geometry

    pub fn owner(&self) -> Option<OwnerHandle> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<OwnerHandle>) {
        self.owner = owner;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    /// Unscaled size
    pub fn source_size(&self) -> Vec2 {
        Vec2::new(self.source_width, self.source_height)
    }

    /// Recompute the center from position and half extents
    pub fn update_center(&mut self) {
        self.center = Vec2::new(
            self.position.x + self.half_width,
            self.position.y + self.half_height,
        );
    }

    /// Resize the body, optionally centering it on the owner's frame
    ///
    /// Turns a circular body back into a rectangle.
    pub fn set_size(&mut self, width: f32, height: f32, center: bool) {
        self.source_width = sanitize_extent(width, "width");
        self.source_height = sanitize_extent(height, "height");
        self.is_circle = false;
        self.radius = 0.0;
        self.apply_scale();

        if center {
            if let Some(frame) = self.frame_size {
                let offset = Vec2::new(
                    (frame.x - self.source_width) * 0.5,
                    (frame.y - self.source_height) * 0.5,
                );
                self.move_offset(offset);
            }
        }
        self.update_center();
    }

    /// Resize the body to match the owner's frame
    pub fn set_size_from_owner(&mut self, transform: &OwnerTransform) {
        self.frame_size = Some(transform.frame_size);
        self.owner_scale = transform.scale;
        self.set_size(transform.frame_size.x, transform.frame_size.y, false);
    }

    /// Make the body a circle; `None` keeps the current offset
    ///
    /// A radius of zero or less turns the body back into a rectangle.
    pub fn set_circle(&mut self, radius: f32, offset: Option<Vec2>) {
        if radius > 0.0 {
            self.is_circle = true;
            self.radius = radius;
            self.source_width = radius * 2.0;
            self.source_height = radius * 2.0;
            self.apply_scale();
            if let Some(offset) = offset {
                self.move_offset(offset);
            }
            self.update_center();
        } else {
            self.is_circle = false;
            self.radius = 0.0;
        }
    }

    /// Change the offset from the owner origin
    pub fn set_offset(&mut self, x: f32, y: f32) {
        self.move_offset(Vec2::new(x, y));
        self.update_center();
    }

    fn move_offset(&mut self, offset: Vec2) {
        let shift = (offset - self.offset).component_mul(self.owner_scale);
        self.offset = offset;
        self.position += shift;
    }

    fn apply_scale(&mut self) {
        let scale = self.owner_scale.abs();
        self.width = self.source_width * scale.x;
        self.height = self.source_height * scale.y;
        self.half_width = self.width * 0.5;
        self.half_height = self.height * 0.5;
        if self.is_circle {
            self.radius = self.half_width;
        }
    }

    /// Re-read position, scale and rotation from the owner
    pub fn update_from_owner(&mut self, transform: &OwnerTransform) {
        if transform.scale != self.owner_scale {
            self.owner_scale = transform.scale;
            self.apply_scale();
        }
        self.frame_size = Some(transform.frame_size);
        self.position = transform.position
            + (self.offset - transform.display_origin).component_mul(transform.scale);
        self.rotation = transform.rotation;
        self.update_center();
    }

    /// Teleport the top-left corner to (x, y) and stop all motion
    pub fn reset(&mut self, x: f32, y: f32) {
        self.stop();
        self.position = Vec2::new(x, y);
        self.prev = self.position;
        self.prev_frame = self.position;
        self.pre_rotation = self.rotation;
        self.update_center();
        self.reset_flags(true);
    }

    /// Move the top-left corner to (x, y) keeping velocity
    ///
    /// The jump is not part of this step's delta but is still reported to
    /// the owner at the end of the frame.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.prev = self.position;
        self.update_center();
    }

    /// Zero velocity, acceleration and angular motion
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
        self.speed = 0.0;
        self.angular_velocity = 0.0;
        self.angular_acceleration = 0.0;
    }

    /// Check whether a point lies inside the body
    pub fn hit_test(&self, x: f32, y: f32) -> bool {
        if self.is_circle {
            self.center.distance(Vec2::new(x, y)) <= self.radius
        } else {
            ArcadeBody::bounds(self).contains(Vec2::new(x, y))
        }
    }

    // Physical parameters

    pub fn bounce(&self) -> Vec2 {
        self.bounce
    }

    /// Negative components are clamped to zero
    pub fn set_bounce(&mut self, bounce: Vec2) {
        self.bounce = bounce.max_components(Vec2::ZERO);
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f32) {
        self.mass = sanitize_mass(mass);
    }

    /// Enable world-bounds collision, optionally overriding bounce and events
    pub fn set_collide_world_bounds(
        &mut self,
        collide: bool,
        bounce: Option<Vec2>,
        on_world_bounds: Option<bool>,
    ) {
        self.collide_world_bounds = collide;
        if let Some(bounce) = bounce {
            self.world_bounce = Some(bounce.max_components(Vec2::ZERO));
        }
        if let Some(on_world_bounds) = on_world_bounds {
            self.on_world_bounds = on_world_bounds;
        }
    }

    // Derived state

    pub fn prev_frame(&self) -> Vec2 {
        self.prev_frame
    }

    /// Displacement applied during the last step
    pub fn new_velocity(&self) -> Vec2 {
        self.new_velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Direction of travel in radians
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Horizontal displacement during the current step
    pub fn delta_x(&self) -> f32 {
        self.dx
    }

    /// Vertical displacement during the current step
    pub fn delta_y(&self) -> f32 {
        self.dy
    }

    /// Rotation change since the start of the frame
    pub fn delta_rotation(&self) -> f32 {
        self.rotation - self.pre_rotation
    }

    /// Displacement over the last completed frame
    pub fn frame_delta(&self) -> Vec2 {
        self.frame_delta
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

    /// Blocked from below
    pub fn on_floor(&self) -> bool {
        self.blocked.down
    }

    /// Blocked from above
    pub fn on_ceiling(&self) -> bool {
        self.blocked.up
    }

    /// Blocked on either side
    pub fn on_wall(&self) -> bool {
        self.blocked.left || self.blocked.right
    }

    // Per-step lifecycle

    /// Clear the per-step contact flags
    ///
    /// With `clear` the previous-step touching state is wiped too.
    pub fn reset_flags(&mut self, clear: bool) {
        self.was_touching = if clear { EdgeState::CLEAR } else { self.touching };
        self.touching = EdgeState::CLEAR;
        self.blocked = EdgeState::CLEAR;
        self.overlap_x = 0.0;
        self.overlap_y = 0.0;
        self.overlap_r = 0.0;
        self.embedded = false;
    }

    /// Start-of-frame bookkeeping, followed by one step if `will_step`
    pub fn pre_update(&mut self, will_step: bool, delta: f32, world_gravity: Vec2) {
        if will_step {
            self.reset_flags(false);
        }
        self.pre_rotation = self.rotation;
        if self.moves {
            self.prev = self.position;
            self.prev_frame = self.position;
        }
        if will_step {
            self.update(delta, world_gravity);
        }
    }

    /// Integrate one step of `delta` seconds
    pub fn update(&mut self, delta: f32, world_gravity: Vec2) {
        self.prev = self.position;

        if self.moves {
            if self.allow_rotation {
                motion::compute_angular_velocity(self, delta);
            }
            motion::compute_velocity(self, world_gravity, delta);

            let mut step = self.velocity * delta;
            if self.delta_max.x != 0.0 {
                step.x = step.x.clamp(-self.delta_max.x, self.delta_max.x);
            }
            if self.delta_max.y != 0.0 {
                step.y = step.y.clamp(-self.delta_max.y, self.delta_max.y);
            }
            self.new_velocity = step;
            self.position += step;
            self.update_center();

            self.angle = self.velocity.angle();
            self.speed = self.velocity.length();
        }

        self.dx = self.position.x - self.prev.x;
        self.dy = self.position.y - self.prev.y;
    }

    /// Clamp the body inside `bounds` (or its custom bounds)
    ///
    /// Returns true if any edge was hit.
    pub fn check_world_bounds(&mut self, bounds: Rect, check: CollisionEdges) -> bool {
        let bounds = self.custom_bounds.unwrap_or(bounds);
        let bounce = self.world_bounce.unwrap_or(self.bounce);
        let mut hit = false;

        if self.position.x < bounds.left() && check.allows(Edge::Left) {
            self.position.x = bounds.left();
            if self.velocity.x < 0.0 {
                self.velocity.x *= -bounce.x;
            }
            self.blocked.set(Edge::Left);
            hit = true;
        } else if self.position.x + self.width > bounds.right() && check.allows(Edge::Right) {
            self.position.x = bounds.right() - self.width;
            if self.velocity.x > 0.0 {
                self.velocity.x *= -bounce.x;
            }
            self.blocked.set(Edge::Right);
            hit = true;
        }

        if self.position.y < bounds.top() && check.allows(Edge::Up) {
            self.position.y = bounds.top();
            if self.velocity.y < 0.0 {
                self.velocity.y *= -bounce.y;
            }
            self.blocked.set(Edge::Up);
            hit = true;
        } else if self.position.y + self.height > bounds.bottom() && check.allows(Edge::Down) {
            self.position.y = bounds.bottom() - self.height;
            if self.velocity.y > 0.0 {
                self.velocity.y *= -bounce.y;
            }
            self.blocked.set(Edge::Down);
            hit = true;
        }

        if hit {
            self.update_center();
            self.refresh_delta();
        }
        hit
    }

    /// End-of-frame bookkeeping
    ///
    /// Records the frame displacement and facing, and returns the movement
    /// the owner should apply.
    pub fn post_update(&mut self) -> Option<BodySync> {
        let delta = self.position - self.prev_frame;

        if self.moves {
            if delta.x < 0.0 {
                self.facing = Facing::Left;
            } else if delta.x > 0.0 {
                self.facing = Facing::Right;
            }
            if delta.y < 0.0 {
                self.facing = Facing::Up;
            } else if delta.y > 0.0 {
                self.facing = Facing::Down;
            }
        }

        self.frame_delta = delta;
        self.prev_frame = self.position;

        let rotation_delta = if self.allow_rotation { self.delta_rotation() } else { 0.0 };
        self.pre_rotation = self.rotation;

        self.owner.map(|owner| BodySync {
            owner,
            delta,
            rotation_delta,
        })
    }
}

impl ArcadeBody for Body {
    fn kind(&self) -> BodyKind {
        BodyKind::Dynamic
    }

    fn is_enabled(&self) -> bool {
        self.enable
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        self.update_center();
    }

    fn prev(&self) -> Vec2 {
        self.prev
    }

    fn delta(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }

    fn refresh_delta(&mut self) {
        self.dx = self.position.x - self.prev.x;
        self.dy = self.position.y - self.prev.y;
    }

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
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn bounce(&self) -> Vec2 {
        self.bounce
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn immovable(&self) -> bool {
        self.immovable
    }

    fn pushable(&self) -> bool {
        self.pushable
    }

    fn moves(&self) -> bool {
        self.moves
    }

    fn friction(&self) -> Vec2 {
        self.friction
    }

    fn slide_factor(&self) -> Vec2 {
        self.slide_factor
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
