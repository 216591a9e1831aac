//! Physics world and simulation

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arcade2d_math::{Rect, Vec2};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::body::{ArcadeBody, Body, BodyKey, BodyRef, BodySync, OwnerHandle};
use crate::collider::{
    CollideCallback, Collider, ColliderKey, ColliderTarget, CollisionPair, Group, GroupKey,
    ProcessCallback,
};
use crate::collision::{intersects, separate_bodies};
use crate::edges::CollisionEdges;
use crate::error::PhysicsError;
use crate::events::PhysicsEvent;
use crate::motion;
use crate::spatial::{SpatialIndex, MIN_MAX_ENTRIES};
use crate::static_body::{StaticBody, StaticBodyKey};
use crate::tile::{separate_tile, tile_intersects_body, Tile, TileSource};

/// Configuration for the physics world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed steps per second
    pub fps: f32,
    /// Step with a fixed delta; otherwise every update is one step of the frame delta
    pub fixed_step: bool,
    /// Values above 1 slow the simulation down
    pub time_scale: f32,
    pub gravity: Vec2,
    pub bounds: Rect,
    /// Which world-bound edges bodies collide with
    pub check_collision: CollisionEdges,
    /// Extra penetration tolerated between bodies before a contact is ignored
    pub overlap_bias: f32,
    /// Extra penetration tolerated against tiles
    pub tile_bias: f32,
    /// Always separate on the x axis first
    pub force_x: bool,
    pub is_paused: bool,
    /// Log per-step statistics
    pub debug: bool,
    /// Node capacity hint for the spatial index
    ///
    /// Validated but advisory: the R-tree keeps rstar's default node
    /// parameters, which are fixed at compile time.
    pub max_entries: usize,
    /// Use the spatial index for the broad phase
    pub use_tree: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            fixed_step: true,
            time_scale: 1.0,
            gravity: Vec2::ZERO,
            bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
            check_collision: CollisionEdges::ALL,
            overlap_bias: 4.0,
            tile_bias: 16.0,
            force_x: false,
            is_paused: false,
            debug: false,
            max_entries: 16,
            use_tree: true,
        }
    }
}

impl WorldConfig {
    /// Check that every value is in range
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_scale must be positive, got {}",
                self.time_scale
            )));
        }
        if self.max_entries < MIN_MAX_ENTRIES {
            return Err(PhysicsError::InvalidConfig(format!(
                "max_entries must be at least {}, got {}",
                MIN_MAX_ENTRIES, self.max_entries
            )));
        }
        if self.overlap_bias < 0.0 || self.tile_bias < 0.0 {
            return Err(PhysicsError::InvalidConfig(
                "overlap_bias and tile_bias must not be negative".to_string(),
            ));
        }
        if self.bounds.width < 0.0 || self.bounds.height < 0.0 {
            return Err(PhysicsError::InvalidConfig(
                "bounds must have a non-negative size".to_string(),
            ));
        }
        Ok(())
    }
}

/// Callbacks in use for one dispatch
#[derive(Default)]
struct Callbacks {
    process: Option<ProcessCallback>,
    collide: Option<CollideCallback>,
}

/// Bodies and tile layers a target resolves to
#[derive(Default)]
struct Resolved {
    bodies: Vec<BodyRef>,
    tiles: Vec<Arc<dyn TileSource>>,
}

/// The physics world containing all bodies, colliders and groups
pub struct World {
    bodies: SlotMap<BodyKey, Body>,
    static_bodies: SlotMap<StaticBodyKey, StaticBody>,
    groups: SlotMap<GroupKey, Group>,
    colliders: SlotMap<ColliderKey, Collider>,
    /// Registration order of colliders
    collider_order: Vec<ColliderKey>,
    pending_destroy: Vec<BodyRef>,
    tree: SpatialIndex<BodyKey>,
    static_tree: SpatialIndex<StaticBodyKey>,
    events: Vec<PhysicsEvent>,

    gravity: Vec2,
    bounds: Rect,
    check_collision: CollisionEdges,
    fps: f32,
    frame_time: f32,
    fixed_step: bool,
    time_scale: f32,
    overlap_bias: f32,
    tile_bias: f32,
    force_x: bool,
    use_tree: bool,
    max_entries: usize,
    debug: bool,
    is_paused: bool,

    accumulator: f32,
    steps_last_frame: u32,
    step_count: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }
}

impl World {
    /// Create a world from a configuration
    pub fn new(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        debug!(
            "Creating physics world: fps={} gravity=({}, {}) use_tree={}",
            config.fps, config.gravity.x, config.gravity.y, config.use_tree
        );
        Self {
            bodies: SlotMap::with_key(),
            static_bodies: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            colliders: SlotMap::with_key(),
            collider_order: Vec::new(),
            pending_destroy: Vec::new(),
            tree: SpatialIndex::new(),
            static_tree: SpatialIndex::new(),
            events: Vec::new(),
            gravity: config.gravity,
            bounds: config.bounds,
            check_collision: config.check_collision,
            fps: config.fps,
            frame_time: 1.0 / config.fps,
            fixed_step: config.fixed_step,
            time_scale: config.time_scale,
            overlap_bias: config.overlap_bias,
            tile_bias: config.tile_bias,
            force_x: config.force_x,
            use_tree: config.use_tree,
            max_entries: config.max_entries,
            debug: config.debug,
            is_paused: config.is_paused,
            accumulator: 0.0,
            steps_last_frame: 0,
            step_count: 0,
        }
    }

    /// Snapshot of the current settings
    pub fn config(&self) -> WorldConfig {
        WorldConfig {
            fps: self.fps,
            fixed_step: self.fixed_step,
            time_scale: self.time_scale,
            gravity: self.gravity,
            bounds: self.bounds,
            check_collision: self.check_collision,
            overlap_bias: self.overlap_bias,
            tile_bias: self.tile_bias,
            force_x: self.force_x,
            is_paused: self.is_paused,
            debug: self.debug,
            max_entries: self.max_entries,
            use_tree: self.use_tree,
        }
    }

    // Bodies

    /// Add a dynamic body and return its key
    pub fn add_body(&mut self, body: Body) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Add a static body and return its key
    pub fn add_static_body(&mut self, mut body: StaticBody) -> StaticBodyKey {
        body.take_dirty();
        let enabled = body.enable;
        let bounds = body.bounds();
        let key = self.static_bodies.insert(body);
        if enabled {
            self.static_tree.insert(key, bounds);
        }
        key
    }

    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    pub fn static_body(&self, key: StaticBodyKey) -> Option<&StaticBody> {
        self.static_bodies.get(key)
    }

    /// Bounds changes made through the returned reference are picked up by
    /// the static index before the next query or step
    pub fn static_body_mut(&mut self, key: StaticBodyKey) -> Option<&mut StaticBody> {
        self.static_bodies.get_mut(key)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn static_bodies(&self) -> impl Iterator<Item = (StaticBodyKey, &StaticBody)> + '_ {
        self.static_bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn static_body_count(&self) -> usize {
        self.static_bodies.len()
    }

    /// Either kind of body behind the common trait
    pub fn arcade_body(&self, body: BodyRef) -> Option<&dyn ArcadeBody> {
        match body {
            BodyRef::Dynamic(key) => self.bodies.get(key).map(|b| b as &dyn ArcadeBody),
            BodyRef::Static(key) => self.static_bodies.get(key).map(|b| b as &dyn ArcadeBody),
        }
    }

    /// The owner a body was created for
    pub fn owner_of(&self, body: BodyRef) -> Option<OwnerHandle> {
        match body {
            BodyRef::Dynamic(key) => self.bodies.get(key).and_then(Body::owner),
            BodyRef::Static(key) => self.static_bodies.get(key).and_then(StaticBody::owner),
        }
    }

    /// Re-enable a body; returns false if the key is stale
    pub fn enable_body(&mut self, body: BodyRef) -> bool {
        match body {
            BodyRef::Dynamic(key) => match self.bodies.get_mut(key) {
                Some(b) => {
                    b.enable = true;
                    true
                }
                None => false,
            },
            BodyRef::Static(key) => match self.static_bodies.get_mut(key) {
                Some(b) => {
                    b.enable = true;
                    self.static_tree.insert(key, b.bounds());
                    true
                }
                None => false,
            },
        }
    }

    /// Disable a body; it keeps its state but is skipped everywhere
    pub fn disable_body(&mut self, body: BodyRef) -> bool {
        match body {
            BodyRef::Dynamic(key) => match self.bodies.get_mut(key) {
                Some(b) => {
                    b.enable = false;
                    self.tree.remove(key);
                    true
                }
                None => false,
            },
            BodyRef::Static(key) => match self.static_bodies.get_mut(key) {
                Some(b) => {
                    b.enable = false;
                    self.static_tree.remove(key);
                    true
                }
                None => false,
            },
        }
    }

    /// Schedule a body for removal at the next [`World::post_update`]
    ///
    /// The body is disabled immediately.
    pub fn destroy_body(&mut self, body: BodyRef) -> bool {
        if !self.disable_body(body) {
            return false;
        }
        if !self.pending_destroy.contains(&body) {
            self.pending_destroy.push(body);
        }
        true
    }

    /// Re-index a static body after its bounds were changed
    pub fn refresh_static_body(&mut self, key: StaticBodyKey) -> Result<(), PhysicsError> {
        let body = self
            .static_bodies
            .get_mut(key)
            .ok_or(PhysicsError::MissingBody)?;
        body.take_dirty();
        if body.enable {
            self.static_tree.update(key, body.bounds());
        } else {
            self.static_tree.remove(key);
        }
        Ok(())
    }

    fn flush_pending_destroy(&mut self) {
        if self.pending_destroy.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_destroy);
        for body in &pending {
            match *body {
                BodyRef::Dynamic(key) => {
                    self.tree.remove(key);
                    self.bodies.remove(key);
                }
                BodyRef::Static(key) => {
                    self.static_tree.remove(key);
                    self.static_bodies.remove(key);
                }
            }
        }
        for group in self.groups.values_mut() {
            group.retain(|member| !pending.contains(member));
        }
        debug!("Destroyed {} bodies", pending.len());
    }

    // Groups

    pub fn add_group(&mut self, name: impl Into<String>) -> GroupKey {
        self.groups.insert(Group::new(name))
    }

    pub fn group(&self, key: GroupKey) -> Option<&Group> {
        self.groups.get(key)
    }

    pub fn remove_group(&mut self, key: GroupKey) -> Option<Group> {
        self.groups.remove(key)
    }

    /// Add a live body to a group
    pub fn group_add(&mut self, group: GroupKey, body: BodyRef) -> Result<(), PhysicsError> {
        if self.arcade_body(body).is_none() {
            return Err(PhysicsError::MissingBody);
        }
        let group = self
            .groups
            .get_mut(group)
            .ok_or_else(|| PhysicsError::InvalidConfig("unknown group".to_string()))?;
        group.add(body);
        Ok(())
    }

    /// Remove a body from a group; returns whether it was a member
    pub fn group_remove(&mut self, group: GroupKey, body: BodyRef) -> bool {
        self.groups
            .get_mut(group)
            .map_or(false, |group| group.remove(body))
    }

    // Colliders

    /// Register a collider; it runs every step after those added before it
    pub fn add_collider(&mut self, collider: Collider) -> ColliderKey {
        debug!("Adding collider '{}'", collider.name);
        let key = self.colliders.insert(collider);
        self.collider_order.push(key);
        key
    }

    /// Register a collider that only reports overlaps
    pub fn add_overlap(&mut self, collider: Collider) -> ColliderKey {
        self.add_collider(collider.with_overlap_only(true))
    }

    pub fn collider(&self, key: ColliderKey) -> Option<&Collider> {
        self.colliders.get(key)
    }

    pub fn collider_mut(&mut self, key: ColliderKey) -> Option<&mut Collider> {
        self.colliders.get_mut(key)
    }

    /// Remove a collider; it will not run again, even later in the current step
    pub fn remove_collider(&mut self, key: ColliderKey) -> bool {
        self.collider_order.retain(|k| *k != key);
        self.colliders.remove(key).is_some()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Collider keys in registration order
    pub fn collider_keys(&self) -> &[ColliderKey] {
        &self.collider_order
    }

    // Environment

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.gravity = Vec2::new(x, y);
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn bounds_collision(&self) -> CollisionEdges {
        self.check_collision
    }

    /// Set the world bounds and which of its edges collide
    #[allow(clippy::too_many_arguments)]
    pub fn set_bounds(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        left: bool,
        right: bool,
        up: bool,
        down: bool,
    ) {
        self.bounds = Rect::new(x, y, width.max(0.0), height.max(0.0));
        self.set_bounds_collision(left, right, up, down);
    }

    pub fn set_bounds_collision(&mut self, left: bool, right: bool, up: bool, down: bool) {
        self.check_collision = CollisionEdges::new(left, right, up, down);
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: f32) -> Result<(), PhysicsError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "fps must be positive, got {}",
                fps
            )));
        }
        self.fps = fps;
        self.frame_time = 1.0 / fps;
        Ok(())
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) -> Result<(), PhysicsError> {
        if !(time_scale.is_finite() && time_scale > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_scale must be positive, got {}",
                time_scale
            )));
        }
        self.time_scale = time_scale;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Stop stepping; manual collide and overlap calls still work
    pub fn pause(&mut self) {
        self.is_paused = true;
        self.events.push(PhysicsEvent::Pause);
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
        self.events.push(PhysicsEvent::Resume);
    }

    // Events

    pub fn events(&self) -> &[PhysicsEvent] {
        &self.events
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }

    // Stepping

    /// Number of steps run by the last [`World::update`]
    pub fn steps_last_frame(&self) -> u32 {
        self.steps_last_frame
    }

    /// Total number of steps run
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Apply gravity, acceleration, drag and limits to a body
    pub fn compute_velocity(&self, body: &mut Body, delta: f32) {
        motion::compute_velocity(body, self.gravity, delta);
    }

    /// Advance the simulation by a frame of `delta` seconds
    ///
    /// With a fixed step the frame time is accumulated and consumed in
    /// steps of `1 / fps` (scaled by the time scale); otherwise the whole
    /// delta is one step. A callback error stops the update and is returned.
    pub fn update(&mut self, _time: f32, delta: f32) -> Result<(), PhysicsError> {
        self.steps_last_frame = 0;
        if self.is_paused || self.bodies.is_empty() {
            return Ok(());
        }

        let step_time = self.frame_time * self.time_scale;
        let (will_step, fixed_delta) = if self.fixed_step {
            self.accumulator += delta;
            (self.accumulator >= step_time, self.frame_time)
        } else {
            self.accumulator = 0.0;
            (true, delta)
        };

        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.enable) {
            body.pre_update(will_step, fixed_delta, gravity);
        }
        if !will_step {
            return Ok(());
        }
        for body in self.static_bodies.values_mut() {
            body.reset_flags();
        }

        if self.fixed_step {
            self.accumulator -= step_time;
        }
        self.steps_last_frame = 1;
        self.finish_step(fixed_delta)?;

        while self.fixed_step && self.accumulator >= step_time {
            self.accumulator -= step_time;
            self.steps_last_frame += 1;
            self.step(fixed_delta)?;
        }
        Ok(())
    }

    /// Run one extra fixed step regardless of accumulated time
    pub fn single_step(&mut self) -> Result<(), PhysicsError> {
        let step_time = self.frame_time * self.time_scale;
        self.update(0.0, step_time)
    }

    /// Integrate every enabled body by `delta` and run one collision pass
    ///
    /// Contact flags are per step: `touching` moves to `was_touching` and the
    /// rest are cleared before integrating.
    pub fn step(&mut self, delta: f32) -> Result<(), PhysicsError> {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.enable) {
            body.reset_flags(false);
            body.update(delta, gravity);
        }
        for body in self.static_bodies.values_mut() {
            body.reset_flags();
        }
        self.finish_step(delta)
    }

    fn finish_step(&mut self, delta: f32) -> Result<(), PhysicsError> {
        self.refresh_indices();
        self.run_colliders()?;
        self.check_world_bounds();
        self.step_count += 1;
        if self.debug {
            debug!(
                "Step {}: {} bodies, {} static, {} colliders",
                self.step_count,
                self.bodies.len(),
                self.static_bodies.len(),
                self.colliders.len()
            );
        }
        self.events.push(PhysicsEvent::WorldStep { delta });
        Ok(())
    }

    /// End-of-frame bookkeeping
    ///
    /// Returns the movement each owned body's owner should apply, then drops
    /// bodies scheduled for destruction.
    pub fn post_update(&mut self) -> Vec<BodySync> {
        let mut syncs = Vec::new();
        if self.steps_last_frame > 0 {
            for body in self.bodies.values_mut().filter(|b| b.enable) {
                if let Some(sync) = body.post_update() {
                    syncs.push(sync);
                }
            }
        }
        self.flush_pending_destroy();
        syncs
    }

    fn check_world_bounds(&mut self) {
        let bounds = self.bounds;
        let check = self.check_collision;
        for (key, body) in self.bodies.iter_mut() {
            if !body.enable || !body.collide_world_bounds {
                continue;
            }
            if body.check_world_bounds(bounds, check) && body.on_world_bounds {
                self.events.push(PhysicsEvent::WorldBounds {
                    body: key,
                    edges: body.blocked(),
                });
            }
        }
    }

    fn run_colliders(&mut self) -> Result<(), PhysicsError> {
        let order = self.collider_order.clone();
        for key in order {
            let Some(collider) = self.colliders.get_mut(key) else {
                continue;
            };
            if !collider.active {
                continue;
            }
            let object1 = collider.object1.clone();
            let object2 = collider.object2.clone();
            let overlap_only = collider.overlap_only;
            let mut callbacks = Callbacks {
                process: collider.process_callback.take(),
                collide: collider.collide_callback.take(),
            };

            let result = self.collide_objects(&object1, object2.as_ref(), overlap_only, &mut callbacks);

            if let Some(collider) = self.colliders.get_mut(key) {
                if collider.process_callback.is_none() {
                    collider.process_callback = callbacks.process;
                }
                if collider.collide_callback.is_none() {
                    collider.collide_callback = callbacks.collide;
                }
            }
            result?;
        }
        Ok(())
    }

    // Spatial indices

    /// Bring the static index up to date and rebuild the dynamic one
    fn refresh_indices(&mut self) {
        for (key, body) in self.static_bodies.iter_mut() {
            let dirty = body.take_dirty();
            let indexed = self.static_tree.contains(key);
            if body.enable && (dirty || !indexed) {
                self.static_tree.update(key, body.bounds());
            } else if !body.enable && indexed {
                self.static_tree.remove(key);
            }
        }
        if self.use_tree {
            self.tree.load(
                self.bodies
                    .iter()
                    .filter(|(_, b)| b.enable)
                    .map(|(k, b)| (k, b.bounds())),
            );
        }
    }

    // Queries

    /// Enabled bodies whose shape intersects `area`
    pub fn overlap_rect(
        &mut self,
        area: Rect,
        include_dynamic: bool,
        include_static: bool,
    ) -> Vec<BodyRef> {
        self.refresh_indices();
        let mut found = Vec::new();

        if include_dynamic {
            let keys: Vec<BodyKey> = if self.use_tree {
                self.tree.search_rect(&area)
            } else {
                self.bodies.keys().collect()
            };
            found.extend(
                keys.into_iter()
                    .filter(|k| self.bodies.get(*k).map_or(false, |b| shape_hits_rect(b, &area)))
                    .map(BodyRef::Dynamic),
            );
        }
        if include_static {
            found.extend(
                self.static_tree
                    .search_rect(&area)
                    .into_iter()
                    .filter(|k| {
                        self.static_bodies
                            .get(*k)
                            .map_or(false, |b| shape_hits_rect(b, &area))
                    })
                    .map(BodyRef::Static),
            );
        }
        found
    }

    /// Enabled bodies whose shape intersects the circle
    pub fn overlap_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        include_dynamic: bool,
        include_static: bool,
    ) -> Vec<BodyRef> {
        self.refresh_indices();
        let mut found = Vec::new();

        if include_dynamic {
            let keys: Vec<BodyKey> = if self.use_tree {
                self.tree.search_circle(center, radius)
            } else {
                self.bodies.keys().collect()
            };
            found.extend(
                keys.into_iter()
                    .filter(|k| {
                        self.bodies
                            .get(*k)
                            .map_or(false, |b| shape_hits_circle(b, center, radius))
                    })
                    .map(BodyRef::Dynamic),
            );
        }
        if include_static {
            found.extend(
                self.static_tree
                    .search_circle(center, radius)
                    .into_iter()
                    .filter(|k| {
                        self.static_bodies
                            .get(*k)
                            .map_or(false, |b| shape_hits_circle(b, center, radius))
                    })
                    .map(BodyRef::Static),
            );
        }
        found
    }

    /// Body whose center is nearest to `point`
    ///
    /// `candidates` defaults to every enabled dynamic body.
    pub fn closest(&self, point: Vec2, candidates: Option<&[BodyRef]>) -> Option<BodyRef> {
        self.by_distance(point, candidates, |best, d| d < best)
    }

    /// Body whose center is furthest from `point`
    pub fn furthest(&self, point: Vec2, candidates: Option<&[BodyRef]>) -> Option<BodyRef> {
        self.by_distance(point, candidates, |best, d| d > best)
    }

    fn by_distance(
        &self,
        point: Vec2,
        candidates: Option<&[BodyRef]>,
        better: impl Fn(f32, f32) -> bool,
    ) -> Option<BodyRef> {
        let all: Vec<BodyRef>;
        let candidates = match candidates {
            Some(candidates) => candidates,
            None => {
                all = self.bodies.keys().map(BodyRef::Dynamic).collect();
                &all
            }
        };

        let mut best: Option<(BodyRef, f32)> = None;
        for &candidate in candidates {
            let Some(body) = self.arcade_body(candidate) else {
                continue;
            };
            if !body.is_enabled() {
                continue;
            }
            let d = (body.center() - point).length_squared();
            if best.map_or(true, |(_, best_d)| better(best_d, d)) {
                best = Some((candidate, d));
            }
        }
        best.map(|(body, _)| body)
    }

    // Motion helpers

    /// Velocity of the given length pointing at `angle` degrees
    pub fn velocity_from_angle(angle: f32, speed: f32) -> Vec2 {
        Vec2::from_angle(angle.to_radians(), speed)
    }

    /// Velocity of the given length pointing at `rotation` radians
    pub fn velocity_from_rotation(rotation: f32, speed: f32) -> Vec2 {
        Vec2::from_angle(rotation, speed)
    }

    /// Send a body toward (x, y)
    ///
    /// With `max_time > 0` the speed is chosen so the body arrives in that
    /// many seconds. Returns the heading in radians.
    pub fn move_to(
        &mut self,
        key: BodyKey,
        x: f32,
        y: f32,
        speed: f32,
        max_time: f32,
    ) -> Result<f32, PhysicsError> {
        let body = self.bodies.get_mut(key).ok_or(PhysicsError::MissingBody)?;
        let target = Vec2::new(x, y);
        let center = body.center();
        let angle = (target - center).angle();
        let speed = if max_time > 0.0 {
            center.distance(target) / max_time
        } else {
            speed
        };
        body.velocity = Vec2::from_angle(angle, speed);
        Ok(angle)
    }

    /// Accelerate a body toward (x, y), optionally capping its velocity
    ///
    /// Returns the heading in radians.
    pub fn accelerate_to(
        &mut self,
        key: BodyKey,
        x: f32,
        y: f32,
        acceleration: f32,
        max_velocity: Option<Vec2>,
    ) -> Result<f32, PhysicsError> {
        let body = self.bodies.get_mut(key).ok_or(PhysicsError::MissingBody)?;
        let angle = (Vec2::new(x, y) - body.center()).angle();
        body.acceleration = Vec2::from_angle(angle, acceleration);
        if let Some(max) = max_velocity {
            body.max_velocity = max;
        }
        Ok(angle)
    }

    /// Wrap a body's center around the world bounds grown by `padding`
    pub fn wrap(&mut self, key: BodyKey, padding: f32) -> Result<(), PhysicsError> {
        let bounds = self.bounds;
        let body = self.bodies.get_mut(key).ok_or(PhysicsError::MissingBody)?;
        let center = body.center();
        let wrapped = Vec2::new(
            wrap_value(center.x, bounds.left() - padding, bounds.right() + padding),
            wrap_value(center.y, bounds.top() - padding, bounds.bottom() + padding),
        );
        if wrapped != center {
            let position = body.position() + (wrapped - center);
            body.set_position(position.x, position.y);
        }
        Ok(())
    }

    // Manual collision

    /// Collide two targets now; `None` tests `object1` against itself
    ///
    /// Returns whether any pair collided.
    pub fn collide(
        &mut self,
        object1: impl Into<ColliderTarget>,
        object2: Option<ColliderTarget>,
    ) -> Result<bool, PhysicsError> {
        self.collide_with(object1, object2, None, None)
    }

    /// Collide two targets now with one-off callbacks
    pub fn collide_with(
        &mut self,
        object1: impl Into<ColliderTarget>,
        object2: Option<ColliderTarget>,
        process: Option<ProcessCallback>,
        collide: Option<CollideCallback>,
    ) -> Result<bool, PhysicsError> {
        self.manual(object1.into(), object2, false, Callbacks { process, collide })
    }

    /// Test two targets for overlap now without separating them
    pub fn overlap(
        &mut self,
        object1: impl Into<ColliderTarget>,
        object2: Option<ColliderTarget>,
    ) -> Result<bool, PhysicsError> {
        self.overlap_with(object1, object2, None, None)
    }

    pub fn overlap_with(
        &mut self,
        object1: impl Into<ColliderTarget>,
        object2: Option<ColliderTarget>,
        process: Option<ProcessCallback>,
        collide: Option<CollideCallback>,
    ) -> Result<bool, PhysicsError> {
        self.manual(object1.into(), object2, true, Callbacks { process, collide })
    }

    fn manual(
        &mut self,
        object1: ColliderTarget,
        object2: Option<ColliderTarget>,
        overlap_only: bool,
        mut callbacks: Callbacks,
    ) -> Result<bool, PhysicsError> {
        self.refresh_indices();
        self.collide_objects(&object1, object2.as_ref(), overlap_only, &mut callbacks)
    }

    /// Separate a body from a list of tiles now
    pub fn collide_tiles(&mut self, body: BodyKey, tiles: &[Tile]) -> Result<bool, PhysicsError> {
        self.collide_tiles_with(body, tiles, None, None)
    }

    pub fn collide_tiles_with(
        &mut self,
        body: BodyKey,
        tiles: &[Tile],
        process: Option<ProcessCallback>,
        collide: Option<CollideCallback>,
    ) -> Result<bool, PhysicsError> {
        let mut callbacks = Callbacks { process, collide };
        self.collide_body_with_tiles(body, tiles, false, &mut callbacks)
    }

    /// Test a body against a list of tiles now without separating
    pub fn overlap_tiles(&mut self, body: BodyKey, tiles: &[Tile]) -> Result<bool, PhysicsError> {
        self.overlap_tiles_with(body, tiles, None, None)
    }

    pub fn overlap_tiles_with(
        &mut self,
        body: BodyKey,
        tiles: &[Tile],
        process: Option<ProcessCallback>,
        collide: Option<CollideCallback>,
    ) -> Result<bool, PhysicsError> {
        let mut callbacks = Callbacks { process, collide };
        self.collide_body_with_tiles(body, tiles, true, &mut callbacks)
    }

    // Dispatch

    fn resolve(&self, target: &ColliderTarget) -> Resolved {
        let mut resolved = Resolved::default();
        let mut seen = HashSet::new();
        self.resolve_into(target, &mut resolved, &mut seen);
        resolved
    }

    fn resolve_into(
        &self,
        target: &ColliderTarget,
        resolved: &mut Resolved,
        seen: &mut HashSet<BodyRef>,
    ) {
        match target {
            ColliderTarget::Body(body) => {
                if self.arcade_body(*body).is_some() && seen.insert(*body) {
                    resolved.bodies.push(*body);
                }
            }
            ColliderTarget::Group(key) => {
                if let Some(group) = self.groups.get(*key) {
                    for body in group.members() {
                        if self.arcade_body(*body).is_some() && seen.insert(*body) {
                            resolved.bodies.push(*body);
                        }
                    }
                }
            }
            ColliderTarget::List(list) => {
                for target in list {
                    self.resolve_into(target, resolved, seen);
                }
            }
            ColliderTarget::Tiles(tiles) => resolved.tiles.push(Arc::clone(tiles)),
        }
    }

    fn collide_objects(
        &mut self,
        object1: &ColliderTarget,
        object2: Option<&ColliderTarget>,
        overlap_only: bool,
        callbacks: &mut Callbacks,
    ) -> Result<bool, PhysicsError> {
        let first = self.resolve(object1);
        let same_group = matches!(
            (object1, object2),
            (ColliderTarget::Group(a), Some(ColliderTarget::Group(b))) if a == b
        );

        let Some(object2) = object2.filter(|_| !same_group) else {
            return self.collide_set_with_itself(&first.bodies, overlap_only, callbacks);
        };

        let second = self.resolve(object2);
        let mut hit = self.collide_sets(&first.bodies, &second.bodies, overlap_only, callbacks)?;

        for tiles in &second.tiles {
            for &body in &first.bodies {
                hit |= self.collide_body_with_layer(body, tiles.as_ref(), overlap_only, callbacks)?;
            }
        }
        for tiles in &first.tiles {
            for &body in &second.bodies {
                hit |= self.collide_body_with_layer(body, tiles.as_ref(), overlap_only, callbacks)?;
            }
        }
        Ok(hit)
    }

    fn collide_sets(
        &mut self,
        first: &[BodyRef],
        second: &[BodyRef],
        overlap_only: bool,
        callbacks: &mut Callbacks,
    ) -> Result<bool, PhysicsError> {
        if first.is_empty() || second.is_empty() {
            return Ok(false);
        }
        let index = index_of(second);
        let mut hit = false;
        for &a in first {
            for b in self.candidates(a, second, &index, 0) {
                hit |= self.collide_pair(a, b, overlap_only, callbacks)?;
            }
        }
        Ok(hit)
    }

    /// Every unordered pair of the set is tested exactly once
    fn collide_set_with_itself(
        &mut self,
        set: &[BodyRef],
        overlap_only: bool,
        callbacks: &mut Callbacks,
    ) -> Result<bool, PhysicsError> {
        if set.len() < 2 {
            return Ok(false);
        }
        let index = index_of(set);
        let mut hit = false;
        for (i, &a) in set.iter().enumerate() {
            for b in self.candidates(a, set, &index, i + 1) {
                hit |= self.collide_pair(a, b, overlap_only, callbacks)?;
            }
        }
        Ok(hit)
    }

    /// Members of `set` at or after `from` that may touch `body`, in set order
    fn candidates(
        &self,
        body: BodyRef,
        set: &[BodyRef],
        index: &HashMap<BodyRef, usize>,
        from: usize,
    ) -> Vec<BodyRef> {
        let Some(bounds) = self
            .arcade_body(body)
            .filter(|b| b.is_enabled())
            .map(|b| b.bounds())
        else {
            return Vec::new();
        };

        if !self.use_tree {
            return set.iter().skip(from).copied().collect();
        }

        let mut found: Vec<(usize, BodyRef)> = self
            .tree
            .search_rect(&bounds)
            .into_iter()
            .map(BodyRef::Dynamic)
            .chain(
                self.static_tree
                    .search_rect(&bounds)
                    .into_iter()
                    .map(BodyRef::Static),
            )
            .filter_map(|candidate| {
                index
                    .get(&candidate)
                    .filter(|i| **i >= from)
                    .map(|i| (*i, candidate))
            })
            .collect();
        found.sort_unstable_by_key(|(i, _)| *i);
        found.into_iter().map(|(_, candidate)| candidate).collect()
    }

    /// Mutable access to both bodies of a separable pair
    fn pair_mut(
        &mut self,
        a: BodyRef,
        b: BodyRef,
    ) -> Option<(&mut dyn ArcadeBody, &mut dyn ArcadeBody)> {
        match (a, b) {
            (BodyRef::Dynamic(ka), BodyRef::Dynamic(kb)) => {
                let [x, y] = self.bodies.get_disjoint_mut([ka, kb])?;
                Some((x as &mut dyn ArcadeBody, y as &mut dyn ArcadeBody))
            }
            (BodyRef::Dynamic(ka), BodyRef::Static(kb)) => {
                let x = self.bodies.get_mut(ka)?;
                let y = self.static_bodies.get_mut(kb)?;
                Some((x as &mut dyn ArcadeBody, y as &mut dyn ArcadeBody))
            }
            (BodyRef::Static(ka), BodyRef::Dynamic(kb)) => {
                let x = self.static_bodies.get_mut(ka)?;
                let y = self.bodies.get_mut(kb)?;
                Some((x as &mut dyn ArcadeBody, y as &mut dyn ArcadeBody))
            }
            (BodyRef::Static(_), BodyRef::Static(_)) => None,
        }
    }

    /// Whether the x axis is separated first for a pair led by `body`
    fn x_first(&self, body: BodyRef) -> bool {
        if self.force_x {
            return true;
        }
        let body_gravity = body
            .dynamic()
            .and_then(|key| self.bodies.get(key))
            .map_or(Vec2::ZERO, |b| b.gravity);
        let gravity = self.gravity + body_gravity;
        gravity.y.abs() < gravity.x.abs()
    }

    fn collide_pair(
        &mut self,
        a: BodyRef,
        b: BodyRef,
        overlap_only: bool,
        callbacks: &mut Callbacks,
    ) -> Result<bool, PhysicsError> {
        if a == b || (a.is_static() && b.is_static()) {
            return Ok(false);
        }
        let (Some(body1), Some(body2)) = (self.arcade_body(a), self.arcade_body(b)) else {
            return Ok(false);
        };
        if !body1.is_enabled()
            || !body2.is_enabled()
            || body1.check_collision().none
            || body2.check_collision().none
            || !intersects(body1, body2)
        {
            return Ok(false);
        }

        let pair = CollisionPair::Bodies(a, b);
        if let Some(process) = callbacks.process.as_mut() {
            if !process(self, pair)? {
                return Ok(false);
            }
        }

        let bias = self.overlap_bias;
        let x_first = self.x_first(a);
        let collided = match self.pair_mut(a, b) {
            Some((body1, body2)) if body1.is_enabled() && body2.is_enabled() => {
                separate_bodies(body1, body2, overlap_only, bias, x_first)
            }
            _ => false,
        };
        if !collided {
            return Ok(false);
        }
        trace!("Collision between {:?} and {:?}", a, b);

        if let Some(collide) = callbacks.collide.as_mut() {
            collide(self, pair)?;
        }

        let (collide1, overlap1) = self.event_flags(a);
        let (collide2, overlap2) = self.event_flags(b);
        if overlap_only && (overlap1 || overlap2) {
            self.events.push(PhysicsEvent::Overlap { body1: a, body2: b });
        } else if !overlap_only && (collide1 || collide2) {
            self.events.push(PhysicsEvent::Collide { body1: a, body2: b });
        }
        Ok(true)
    }

    /// (`on_collide`, `on_overlap`) for a body
    fn event_flags(&self, body: BodyRef) -> (bool, bool) {
        match body {
            BodyRef::Dynamic(key) => self
                .bodies
                .get(key)
                .map_or((false, false), |b| (b.on_collide, b.on_overlap)),
            BodyRef::Static(key) => self
                .static_bodies
                .get(key)
                .map_or((false, false), |b| (b.on_collide, b.on_overlap)),
        }
    }

    fn collide_body_with_layer(
        &mut self,
        body: BodyRef,
        layer: &dyn TileSource,
        overlap_only: bool,
        callbacks: &mut Callbacks,
    ) -> Result<bool, PhysicsError> {
        let Some(key) = body.dynamic() else {
            return Ok(false);
        };
        let Some(bounds) = self
            .bodies
            .get(key)
            .filter(|b| b.enable)
            .map(|b| b.bounds())
        else {
            return Ok(false);
        };
        let tiles = layer.tiles_in_rect(bounds);
        self.collide_body_with_tiles(key, &tiles, overlap_only, callbacks)
    }

    fn collide_body_with_tiles(
        &mut self,
        key: BodyKey,
        tiles: &[Tile],
        overlap_only: bool,
        callbacks: &mut Callbacks,
    ) -> Result<bool, PhysicsError> {
        let mut hit = false;
        for tile in tiles {
            let Some(body) = self.bodies.get(key) else {
                break;
            };
            if !body.enable || body.check_collision.none {
                break;
            }
            if tile.faces.is_empty() || !tile_intersects_body(&tile.bounds, body) {
                continue;
            }

            let pair = CollisionPair::Tile(BodyRef::Dynamic(key), *tile);
            if let Some(process) = callbacks.process.as_mut() {
                if !process(self, pair)? {
                    continue;
                }
            }

            let bias = self.tile_bias;
            let collided = match self.bodies.get_mut(key) {
                Some(body) if body.enable => overlap_only || separate_tile(body, tile, bias),
                _ => false,
            };
            if !collided {
                continue;
            }
            hit = true;

            if let Some(collide) = callbacks.collide.as_mut() {
                collide(self, pair)?;
            }

            let (on_collide, on_overlap) = self.event_flags(BodyRef::Dynamic(key));
            if overlap_only && on_overlap {
                self.events.push(PhysicsEvent::TileOverlap { body: key, tile: *tile });
            } else if !overlap_only && on_collide {
                self.events.push(PhysicsEvent::TileCollide { body: key, tile: *tile });
            }
        }
        Ok(hit)
    }
}

fn index_of(set: &[BodyRef]) -> HashMap<BodyRef, usize> {
    set.iter().enumerate().map(|(i, body)| (*body, i)).collect()
}

fn shape_hits_rect(body: &dyn ArcadeBody, area: &Rect) -> bool {
    body.is_enabled()
        && if body.is_circle() {
            area.intersects_circle(body.center(), body.radius())
        } else {
            area.intersects(&body.bounds())
        }
}

fn shape_hits_circle(body: &dyn ArcadeBody, center: Vec2, radius: f32) -> bool {
    body.is_enabled()
        && if body.is_circle() {
            body.center().distance(center) <= body.radius() + radius
        } else {
            body.bounds().intersects_circle(center, radius)
        }
}

/// Wrap `value` into `[min, max)`
fn wrap_value(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range <= 0.0 {
        return min;
    }
    min + (value - min).rem_euclid(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_world_config_default() {
        let config = WorldConfig::default();
        assert_eq!(config.fps, 60.0);
        assert!(config.fixed_step);
        assert_eq!(config.overlap_bias, 4.0);
        assert_eq!(config.tile_bias, 16.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_world_config_rejects_bad_values() {
        let config = WorldConfig {
            fps: 0.0,
            ..WorldConfig::default()
        };
        assert!(matches!(World::new(config), Err(PhysicsError::InvalidConfig(_))));

        let config = WorldConfig {
            max_entries: 2,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_world_add_body() {
        let mut world = World::default();
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(world.body_count(), 1);
        assert!(world.body(key).is_some());
    }

    #[test]
    fn test_stale_key_returns_none() {
        let mut world = World::default();
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));

        assert!(world.destroy_body(key.into()));
        // Disabled now, gone after post_update
        assert!(!world.body(key).map_or(true, |b| b.enable));
        world.post_update();
        assert!(world.body(key).is_none());

        let new_key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        assert!(world.body(key).is_none());
        assert!(world.body(new_key).is_some());
    }

    #[test]
    fn test_velocity_integration() {
        let mut world = World::default();
        let key = world.add_body(Body::new(0.0, 0.0, 32.0, 32.0).with_velocity(Vec2::new(100.0, 0.0)));

        world.update(0.0, DT).unwrap();

        let body = world.body(key).unwrap();
        assert!((body.position().x - 100.0 / 60.0).abs() < 0.0001);
        assert_eq!(world.steps_last_frame(), 1);
    }

    #[test]
    fn test_gravity_application() {
        let mut world = World::default();
        world.set_gravity(0.0, 600.0);
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));

        world.update(0.0, 0.1).unwrap();

        // 0.1s is six steps of 1/60s
        assert_eq!(world.steps_last_frame(), 6);
        let body = world.body(key).unwrap();
        assert!((body.velocity.y - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_accumulator_waits_for_a_full_step() {
        let mut world = World::default();
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(60.0, 0.0)));

        world.update(0.0, DT * 0.5).unwrap();
        assert_eq!(world.steps_last_frame(), 0);
        assert_eq!(world.body(key).unwrap().position().x, 0.0);

        world.update(0.0, DT * 0.5).unwrap();
        assert_eq!(world.steps_last_frame(), 1);
        assert!((world.body(key).unwrap().position().x - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_variable_step() {
        let config = WorldConfig {
            fixed_step: false,
            ..WorldConfig::default()
        };
        let mut world = World::new(config).unwrap();
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(10.0, 0.0)));

        world.update(0.0, 0.25).unwrap();
        assert_eq!(world.steps_last_frame(), 1);
        assert!((world.body(key).unwrap().position().x - 2.5).abs() < 0.0001);
    }

    #[test]
    fn test_time_scale_slows_stepping() {
        let mut world = World::default();
        world.set_time_scale(2.0).unwrap();
        world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));

        world.update(0.0, DT).unwrap();
        assert_eq!(world.steps_last_frame(), 0);
        world.update(0.0, DT).unwrap();
        assert_eq!(world.steps_last_frame(), 1);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut world = World::default();
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(60.0, 0.0)));

        world.pause();
        world.update(0.0, DT).unwrap();
        assert_eq!(world.body(key).unwrap().position().x, 0.0);

        world.resume();
        world.update(0.0, DT).unwrap();
        assert!(world.body(key).unwrap().position().x > 0.0);

        let events = world.drain_events();
        assert_eq!(events[0], PhysicsEvent::Pause);
        assert_eq!(events[1], PhysicsEvent::Resume);
        assert!(matches!(events[2], PhysicsEvent::WorldStep { .. }));
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_single_step() {
        let mut world = World::default();
        world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        world.single_step().unwrap();
        assert_eq!(world.step_count(), 1);
    }

    #[test]
    fn test_disabled_body_is_skipped() {
        let mut world = World::default();
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(60.0, 0.0)));
        world.disable_body(key.into());

        world.update(0.0, DT).unwrap();
        assert_eq!(world.body(key).unwrap().position().x, 0.0);

        world.enable_body(key.into());
        world.update(0.0, DT).unwrap();
        assert!((world.body(key).unwrap().position().x - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_collider_separates_bodies() {
        let mut world = World::default();
        let a = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(120.0, 0.0)));
        let b = world.add_body(Body::new(11.0, 0.0, 10.0, 10.0).with_immovable(true));
        world.add_collider(Collider::new(a, Some(b.into())));

        world.update(0.0, DT).unwrap();

        let body = world.body(a).unwrap();
        assert!((body.right() - 11.0).abs() < 0.0001);
        assert!(body.touching().right);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn test_process_callback_can_reject() {
        let mut world = World::default();
        let a = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(120.0, 0.0)));
        let b = world.add_body(Body::new(11.0, 0.0, 10.0, 10.0).with_immovable(true));
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        world.add_collider(
            Collider::new(a, Some(b.into()))
                .with_process(|_, _| Ok(false))
                .with_collide(move |_, _| {
                    *counter.borrow_mut() += 1;
                    Ok(())
                }),
        );

        world.update(0.0, DT).unwrap();

        // Passed straight through
        assert!(world.body(a).unwrap().right() > 11.0);
        assert_eq!(*calls.borrow(), 0);
        // Callbacks were restored after the step
        assert!(world.collider_keys().iter().all(|k| {
            world.collider(*k).map_or(false, |c| c.has_process_callback())
        }));
    }

    #[test]
    fn test_callback_error_propagates() {
        let mut world = World::default();
        let a = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(120.0, 0.0)));
        let b = world.add_body(Body::new(11.0, 0.0, 10.0, 10.0));
        world.add_collider(
            Collider::new(a, Some(b.into())).with_collide(|_, _| Err(PhysicsError::from("boom"))),
        );

        let err = world.update(0.0, DT).unwrap_err();
        assert_eq!(err, PhysicsError::Callback("boom".to_string()));
    }

    #[test]
    fn test_callback_may_remove_its_collider() {
        let mut world = World::default();
        let a = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(120.0, 0.0)));
        let b = world.add_body(Body::new(11.0, 0.0, 10.0, 10.0));
        let slot: Rc<RefCell<Option<ColliderKey>>> = Rc::new(RefCell::new(None));
        let own_key = Rc::clone(&slot);
        let key = world.add_collider(Collider::new(a, Some(b.into())).with_collide(move |world, _| {
            if let Some(key) = *own_key.borrow() {
                world.remove_collider(key);
            }
            Ok(())
        }));
        *slot.borrow_mut() = Some(key);

        world.update(0.0, DT).unwrap();
        assert_eq!(world.collider_count(), 0);
        assert!(world.collider(key).is_none());
    }

    #[test]
    fn test_collider_added_in_callback_runs_next_step() {
        let mut world = World::default();
        let a = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        let b = world.add_body(Body::new(5.0, 0.0, 10.0, 10.0));
        let added = Rc::new(RefCell::new(false));
        let late_hits = Rc::new(RefCell::new(0u32));

        let (added_flag, hits) = (Rc::clone(&added), Rc::clone(&late_hits));
        world.add_overlap(Collider::new(a, Some(b.into())).with_collide(move |world, _| {
            if !*added_flag.borrow() {
                *added_flag.borrow_mut() = true;
                let hits = Rc::clone(&hits);
                world.add_overlap(Collider::new(a, Some(b.into())).with_collide(move |_, _| {
                    *hits.borrow_mut() += 1;
                    Ok(())
                }));
            }
            Ok(())
        }));

        world.update(0.0, DT).unwrap();
        assert!(*added.borrow());
        assert_eq!(world.collider_count(), 2);
        assert_eq!(*late_hits.borrow(), 0);

        world.update(0.0, DT).unwrap();
        assert_eq!(*late_hits.borrow(), 1);
    }

    #[test]
    fn test_overlap_with_shared_velocity() {
        let mut world = World::default();
        let a = world.add_body(Body::new(100.0, 100.0, 20.0, 20.0).with_velocity(Vec2::new(60.0, 60.0)));
        let b = world.add_body(Body::new(110.0, 110.0, 20.0, 20.0).with_velocity(Vec2::new(60.0, 60.0)));
        world.body_mut(a).unwrap().on_overlap = true;
        let hits = Rc::new(RefCell::new(0u32));
        let counter = Rc::clone(&hits);
        world.add_overlap(Collider::new(a, Some(b.into())).with_collide(move |_, _| {
            *counter.borrow_mut() += 1;
            Ok(())
        }));

        world.update(0.0, DT).unwrap();
        assert_eq!(*hits.borrow(), 1);
        assert!(world.body(a).unwrap().embedded());
        assert!(world
            .events()
            .iter()
            .any(|e| matches!(e, PhysicsEvent::Overlap { .. })));
        assert!(world.overlap(a, Some(b.into())).unwrap());
    }

    #[test]
    fn test_flags_reset_every_step() {
        let mut world = World::default();
        let key = world.add_body(
            Body::new(789.5, 100.0, 10.0, 10.0)
                .with_velocity(Vec2::new(50.0, 0.0))
                .with_bounce(Vec2::new(1.0, 1.0))
                .with_world_bounds(true),
        );

        // One frame covering three fixed steps; only the first hits the wall
        world.update(0.0, 3.5 * DT).unwrap();
        assert_eq!(world.steps_last_frame(), 3);
        let body = world.body(key).unwrap();
        assert!(!body.blocked().right);
        assert!(body.velocity.x < 0.0);
        assert!(body.right() < 799.0);
    }

    #[test]
    fn test_blocked_lasts_one_step() {
        let mut world = World::default();
        let key = world.add_body(
            Body::new(789.5, 100.0, 10.0, 10.0)
                .with_velocity(Vec2::new(50.0, 0.0))
                .with_bounce(Vec2::new(1.0, 1.0))
                .with_world_bounds(true),
        );

        world.update(0.0, DT).unwrap();
        assert!(world.body(key).unwrap().blocked().right);

        world.step(DT).unwrap();
        assert!(!world.body(key).unwrap().blocked().right);
    }

    #[test]
    fn test_inactive_collider_is_skipped() {
        let mut world = World::default();
        let a = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0).with_velocity(Vec2::new(120.0, 0.0)));
        let b = world.add_body(Body::new(11.0, 0.0, 10.0, 10.0).with_immovable(true));
        let key = world.add_collider(Collider::new(a, Some(b.into())));
        world.collider_mut(key).unwrap().set_active(false);

        world.update(0.0, DT).unwrap();
        assert!(world.body(a).unwrap().right() > 11.0);
    }

    #[test]
    fn test_group_self_collision_counts_each_pair_once() {
        for use_tree in [true, false] {
            let config = WorldConfig {
                use_tree,
                ..WorldConfig::default()
            };
            let mut world = World::new(config).unwrap();
            let group = world.add_group("crates");
            for i in 0..3 {
                let key = world.add_body(Body::new(i as f32 * 2.0, 0.0, 10.0, 10.0));
                world.group_add(group, key.into()).unwrap();
            }
            let pairs = Rc::new(RefCell::new(Vec::new()));
            let seen = Rc::clone(&pairs);
            world.add_overlap(Collider::new(group, None).with_collide(move |_, pair| {
                seen.borrow_mut().push(pair);
                Ok(())
            }));

            world.update(0.0, DT).unwrap();
            assert_eq!(pairs.borrow().len(), 3, "use_tree = {}", use_tree);
        }
    }

    #[test]
    fn test_overlap_events() {
        let mut world = World::default();
        let mut a = Body::new(0.0, 0.0, 10.0, 10.0);
        a.on_overlap = true;
        let a = world.add_body(a);
        let b = world.add_body(Body::new(5.0, 0.0, 10.0, 10.0));

        assert!(world.overlap(a, Some(b.into())).unwrap());
        let events = world.drain_events();
        assert_eq!(
            events,
            vec![PhysicsEvent::Overlap {
                body1: a.into(),
                body2: b.into()
            }]
        );
        // Bodies were not moved
        assert_eq!(world.body(b).unwrap().position().x, 5.0);
    }

    #[test]
    fn test_manual_collide_against_static() {
        let mut world = World::default();
        world.set_gravity(0.0, 600.0);
        let player = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        let floor = world.add_static_body(StaticBody::new(-100.0, 10.5, 300.0, 20.0));

        world.update(0.0, DT).unwrap();
        world.update(0.0, DT).unwrap();
        world.update(0.0, DT).unwrap();
        assert!(world.body(player).unwrap().bottom() > 10.5);

        assert!(world.collide(player, Some(floor.into())).unwrap());
        let body = world.body(player).unwrap();
        assert!((body.bottom() - 10.5).abs() < 0.0001);
        assert!(body.on_floor());
    }

    #[test]
    fn test_world_bounds_event() {
        let mut world = World::default();
        let mut body = Body::new(795.0, 0.0, 10.0, 10.0).with_world_bounds(true);
        body.on_world_bounds = true;
        let key = world.add_body(body);

        world.update(0.0, DT).unwrap();
        let events = world.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            PhysicsEvent::WorldBounds { body, edges } if *body == key && edges.right
        )));
    }

    #[test]
    fn test_set_bounds_collision() {
        let mut world = World::default();
        world.set_bounds(0.0, 0.0, 100.0, 100.0, true, false, true, true);
        let key = world.add_body(
            Body::new(95.0, 0.0, 10.0, 10.0)
                .with_velocity(Vec2::new(60.0, 0.0))
                .with_world_bounds(true),
        );

        world.update(0.0, DT).unwrap();
        // Right edge is open
        assert!(world.body(key).unwrap().right() > 100.0);
        assert!(!world.bounds_collision().right);
    }

    #[test]
    fn test_overlap_rect_and_circle() {
        let mut world = World::default();
        let inside = world.add_body(Body::new(10.0, 10.0, 5.0, 5.0));
        let outside = world.add_body(Body::new(200.0, 200.0, 5.0, 5.0));
        let wall = world.add_static_body(StaticBody::new(0.0, 0.0, 2.0, 50.0));

        let found = world.overlap_rect(Rect::new(0.0, 0.0, 50.0, 50.0), true, true);
        assert!(found.contains(&inside.into()));
        assert!(found.contains(&wall.into()));
        assert!(!found.contains(&outside.into()));

        let found = world.overlap_rect(Rect::new(0.0, 0.0, 50.0, 50.0), true, false);
        assert!(!found.contains(&wall.into()));

        let found = world.overlap_circle(Vec2::new(202.0, 202.0), 1.0, true, true);
        assert_eq!(found, vec![BodyRef::Dynamic(outside)]);
    }

    #[test]
    fn test_closest_and_furthest() {
        let mut world = World::default();
        let near = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        let far = world.add_body(Body::new(100.0, 0.0, 10.0, 10.0));

        assert_eq!(world.closest(Vec2::ZERO, None), Some(near.into()));
        assert_eq!(world.furthest(Vec2::ZERO, None), Some(far.into()));
        assert_eq!(world.closest(Vec2::ZERO, Some(&[far.into()])), Some(far.into()));
    }

    #[test]
    fn test_move_to_with_max_time() {
        let mut world = World::default();
        let key = world.add_body(Body::new(-5.0, -5.0, 10.0, 10.0));

        let angle = world.move_to(key, 100.0, 0.0, 0.0, 2.0).unwrap();
        assert!(angle.abs() < 0.0001);
        assert!((world.body(key).unwrap().velocity.x - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_accelerate_to() {
        let mut world = World::default();
        let key = world.add_body(Body::new(-5.0, -5.0, 10.0, 10.0));

        world
            .accelerate_to(key, 0.0, 100.0, 30.0, Some(Vec2::new(10.0, 10.0)))
            .unwrap();
        let body = world.body(key).unwrap();
        assert!((body.acceleration.y - 30.0).abs() < 0.001);
        assert_eq!(body.max_velocity, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_motion_helpers_report_missing_body() {
        let mut world = World::default();
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        world.destroy_body(key.into());
        world.post_update();

        assert_eq!(world.move_to(key, 0.0, 0.0, 1.0, 0.0), Err(PhysicsError::MissingBody));
        assert_eq!(world.wrap(key, 0.0), Err(PhysicsError::MissingBody));
    }

    #[test]
    fn test_velocity_from_angle() {
        let v = World::velocity_from_angle(90.0, 10.0);
        assert!(v.x.abs() < 0.0001);
        assert!((v.y - 10.0).abs() < 0.0001);
    }

    #[test]
    fn test_wrap() {
        let mut world = World::default();
        let key = world.add_body(Body::new(805.0, 100.0, 10.0, 10.0));

        world.wrap(key, 0.0).unwrap();
        let body = world.body(key).unwrap();
        assert!((body.center().x - 10.0).abs() < 0.0001);
        assert_eq!(body.center().y, 105.0);
    }

    #[test]
    fn test_post_update_syncs_owned_bodies() {
        let mut world = World::default();
        let transform = crate::body::OwnerTransform {
            frame_size: Vec2::new(10.0, 10.0),
            ..Default::default()
        };
        let key = world.add_body(
            Body::from_owner(OwnerHandle(42), &transform).with_velocity(Vec2::new(60.0, 0.0)),
        );

        world.update(0.0, DT).unwrap();
        let syncs = world.post_update();

        assert_eq!(syncs.len(), 1);
        assert_eq!(syncs[0].owner, OwnerHandle(42));
        assert!((syncs[0].delta.x - 1.0).abs() < 0.0001);
        assert_eq!(world.owner_of(key.into()), Some(OwnerHandle(42)));
    }

    #[test]
    fn test_destroyed_body_leaves_groups() {
        let mut world = World::default();
        let group = world.add_group("g");
        let key = world.add_body(Body::new(0.0, 0.0, 10.0, 10.0));
        world.group_add(group, key.into()).unwrap();

        world.destroy_body(key.into());
        world.post_update();
        assert!(world.group(group).unwrap().is_empty());
        assert_eq!(world.group_add(group, key.into()), Err(PhysicsError::MissingBody));
    }

    #[test]
    fn test_static_body_reindexed_after_move() {
        let mut world = World::default();
        let wall = world.add_static_body(StaticBody::new(0.0, 0.0, 10.0, 10.0));
        world.static_body_mut(wall).unwrap().reset(500.0, 500.0);

        let found = world.overlap_rect(Rect::new(495.0, 495.0, 10.0, 10.0), false, true);
        assert_eq!(found, vec![BodyRef::Static(wall)]);
        assert!(world
            .overlap_rect(Rect::new(0.0, 0.0, 10.0, 10.0), false, true)
            .is_empty());
    }

    #[test]
    fn test_collide_tiles() {
        let mut world = World::default();
        world.set_gravity(0.0, 600.0);
        let mut body = Body::new(8.0, 0.0, 16.0, 16.0);
        body.on_collide = true;
        let key = world.add_body(body);
        let tiles = [Tile::solid(0, 1, Rect::new(0.0, 16.0, 32.0, 32.0))];

        for _ in 0..5 {
            world.update(0.0, DT).unwrap();
            world.collide_tiles(key, &tiles).unwrap();
        }

        let body = world.body(key).unwrap();
        assert!((body.bottom() - 16.0).abs() < 0.0001);
        assert!(world
            .drain_events()
            .iter()
            .any(|e| matches!(e, PhysicsEvent::TileCollide { .. })));
    }
}
