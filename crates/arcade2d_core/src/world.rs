//! Game world container
//!
//! The GameWorld owns every game object, the tile layers and an optional
//! physics world, and keeps object transforms and bodies in step.

use std::sync::Arc;

use arcade2d_physics::{
    BodyRef, GroupKey, OwnerHandle, PhysicsError, PhysicsEvent, TileSource, World as PhysicsWorld,
    WorldConfig,
};
use log::debug;
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use crate::entity::{BodyTemplate, GameObject};
use crate::tilemap::Tilemap;

new_key_type! {
    /// Key to a game object in the world
    pub struct ObjectKey;
}

impl ObjectKey {
    /// Handle the physics world stores for this object
    pub fn owner_handle(self) -> OwnerHandle {
        OwnerHandle(self.data().as_ffi())
    }

    pub fn from_owner_handle(owner: OwnerHandle) -> Self {
        KeyData::from_ffi(owner.0).into()
    }
}

/// The world containing all game objects
///
/// Objects with a physics body are moved by the physics world; every other
/// object is left alone.
pub struct GameWorld {
    objects: SlotMap<ObjectKey, GameObject>,
    /// Optional physics simulation (None = no physics)
    physics_world: Option<PhysicsWorld>,
    tilemaps: Vec<Arc<Tilemap>>,
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl GameWorld {
    /// Create a new empty world without physics
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
            physics_world: None,
            tilemaps: Vec::new(),
        }
    }

    /// Enable physics for this world
    pub fn with_physics(mut self, config: WorldConfig) -> Result<Self, PhysicsError> {
        self.physics_world = Some(PhysicsWorld::new(config)?);
        Ok(self)
    }

    /// Get the physics world (if enabled)
    pub fn physics(&self) -> Option<&PhysicsWorld> {
        self.physics_world.as_ref()
    }

    /// Get mutable physics world (if enabled)
    pub fn physics_mut(&mut self) -> Option<&mut PhysicsWorld> {
        self.physics_world.as_mut()
    }

    fn physics_or_err(&mut self) -> Result<&mut PhysicsWorld, PhysicsError> {
        self.physics_world
            .as_mut()
            .ok_or_else(|| PhysicsError::InvalidConfig("physics is not enabled".to_string()))
    }

    // --- Objects ---

    /// Add an object to the world, returning its key
    pub fn add_object(&mut self, object: GameObject) -> ObjectKey {
        self.objects.insert(object)
    }

    pub fn get(&self, key: ObjectKey) -> Option<&GameObject> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut GameObject> {
        self.objects.get_mut(key)
    }

    /// Find the first object with the given name
    pub fn get_by_name(&self, name: &str) -> Option<(ObjectKey, &GameObject)> {
        self.objects
            .iter()
            .find(|(_, object)| object.name.as_deref() == Some(name))
    }

    /// Keys of every object carrying `tag`
    pub fn objects_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = ObjectKey> + 'a {
        self.objects
            .iter()
            .filter(move |(_, object)| object.has_tag(tag))
            .map(|(key, _)| key)
    }

    /// Object that owns a physics body, if it is still alive
    pub fn object_for_owner(&self, owner: OwnerHandle) -> Option<ObjectKey> {
        let key = ObjectKey::from_owner_handle(owner);
        self.objects.contains_key(key).then_some(key)
    }

    /// Remove an object, destroying its physics body
    pub fn remove_object(&mut self, key: ObjectKey) -> Option<GameObject> {
        let object = self.objects.remove(key)?;
        if let (Some(body), Some(physics)) = (object.physics_body, self.physics_world.as_mut()) {
            physics.destroy_body(body);
        }
        Some(object)
    }

    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object and tile layer
    ///
    /// Bodies are destroyed; they leave the physics world at the end of the
    /// next update.
    pub fn clear(&mut self) {
        if let Some(physics) = self.physics_world.as_mut() {
            for body in self.objects.values().filter_map(|o| o.physics_body) {
                physics.destroy_body(body);
            }
        }
        self.objects.clear();
        self.tilemaps.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &GameObject)> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectKey, &mut GameObject)> {
        self.objects.iter_mut()
    }

    pub fn has_dirty_objects(&self) -> bool {
        self.objects.values().any(GameObject::is_dirty)
    }

    // --- Physics bodies ---

    /// Give an object a physics body built from `template`
    ///
    /// Any body the object already has is destroyed first.
    pub fn enable_body(
        &mut self,
        key: ObjectKey,
        template: &BodyTemplate,
    ) -> Result<BodyRef, PhysicsError> {
        let object = self.objects.get(key).ok_or(PhysicsError::MissingBody)?;
        let transform = object.owner_transform();
        let previous = object.physics_body;
        let owner = key.owner_handle();

        let physics = self.physics_or_err()?;
        if let Some(previous) = previous {
            physics.destroy_body(previous);
        }
        let body = if template.is_static {
            BodyRef::Static(physics.add_static_body(template.build_static_body(owner, &transform)))
        } else {
            BodyRef::Dynamic(physics.add_body(template.build_body(owner, &transform)))
        };

        if let Some(object) = self.objects.get_mut(key) {
            object.physics_body = Some(body);
        }
        Ok(body)
    }

    /// Stop simulating an object's body without destroying it
    pub fn disable_body(&mut self, key: ObjectKey) -> bool {
        let Some(body) = self.objects.get(key).and_then(|o| o.physics_body) else {
            return false;
        };
        self.physics_world
            .as_mut()
            .map_or(false, |physics| physics.disable_body(body))
    }

    /// Put every body of the objects tagged `tag` in a new physics group
    pub fn tag_group(&mut self, tag: &str) -> Result<GroupKey, PhysicsError> {
        let members: Vec<BodyRef> = self
            .objects
            .values()
            .filter(|object| object.has_tag(tag))
            .filter_map(|object| object.physics_body)
            .collect();
        let physics = self.physics_or_err()?;
        let group = physics.add_group(tag);
        for body in members {
            physics.group_add(group, body)?;
        }
        debug!("Group '{}' created from tagged objects", tag);
        Ok(group)
    }

    // --- Tile layers ---

    /// Add a tile layer, returning the shared handle colliders use
    pub fn add_tilemap(&mut self, tilemap: Tilemap) -> Arc<Tilemap> {
        let tilemap = Arc::new(tilemap);
        self.tilemaps.push(Arc::clone(&tilemap));
        tilemap
    }

    pub fn tilemaps(&self) -> &[Arc<Tilemap>] {
        &self.tilemaps
    }

    /// A tile layer as a collider target
    pub fn tile_source(&self, index: usize) -> Option<Arc<dyn TileSource>> {
        self.tilemaps
            .get(index)
            .map(|map| Arc::clone(map) as Arc<dyn TileSource>)
    }

    // --- Frame update ---

    /// Advance physics by one frame and move objects with their bodies
    ///
    /// This method:
    /// 1. Pushes object transforms into their bodies (static bodies only when dirty)
    /// 2. Updates the physics world
    /// 3. Applies the resulting movement back to the objects
    /// 4. Drops references to bodies destroyed during the frame
    ///
    /// Returns the events queued during the frame; the physics queue is left
    /// empty.
    pub fn update(&mut self, time: f32, delta: f32) -> Result<Vec<PhysicsEvent>, PhysicsError> {
        let Some(physics) = self.physics_world.as_mut() else {
            return Ok(Vec::new());
        };

        for object in self.objects.values_mut() {
            match object.physics_body {
                Some(BodyRef::Dynamic(key)) => {
                    if let Some(body) = physics.body_mut(key) {
                        body.update_from_owner(&object.owner_transform());
                    }
                }
                Some(BodyRef::Static(key)) if object.is_dirty() => {
                    if let Some(body) = physics.static_body_mut(key) {
                        body.update_from_owner(&object.owner_transform());
                    }
                }
                _ => {}
            }
            object.clear_dirty();
        }

        physics.update(time, delta)?;

        for sync in physics.post_update() {
            let key = ObjectKey::from_owner_handle(sync.owner);
            if let Some(object) = self.objects.get_mut(key) {
                object.transform.translate(sync.delta);
                if sync.rotation_delta != 0.0 {
                    object.transform.rotate(sync.rotation_delta);
                }
            }
        }

        for object in self.objects.values_mut() {
            if let Some(body) = object.physics_body {
                if physics.arcade_body(body).is_none() {
                    object.physics_body = None;
                }
            }
        }
        Ok(physics.drain_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transform2D;
    use arcade2d_math::{Rect, Vec2};
    use arcade2d_physics::ArcadeBody;

    fn crate_at(x: f32, y: f32) -> GameObject {
        GameObject::new(Vec2::new(32.0, 32.0))
            .with_transform(Transform2D::from_position(Vec2::new(x, y)))
    }

    fn no_gravity() -> WorldConfig {
        WorldConfig {
            bounds: Rect::new(0.0, 0.0, 10_000.0, 10_000.0),
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_world_new() {
        let world = GameWorld::new();
        assert!(world.is_empty());
        assert!(world.physics().is_none());
    }

    #[test]
    fn test_add_and_lookup() {
        let mut world = GameWorld::new();
        let key = world.add_object(crate_at(0.0, 0.0).with_name("box").with_tag("crate"));
        world.add_object(crate_at(10.0, 0.0).with_tag("crate"));

        assert_eq!(world.object_count(), 2);
        assert_eq!(world.get_by_name("box").map(|(k, _)| k), Some(key));
        assert_eq!(world.objects_with_tag("crate").count(), 2);
        assert!(world.get_by_name("missing").is_none());
    }

    #[test]
    fn test_owner_handle_round_trip() {
        let mut world = GameWorld::new();
        let key = world.add_object(crate_at(0.0, 0.0));
        assert_eq!(world.object_for_owner(key.owner_handle()), Some(key));

        world.remove_object(key);
        assert_eq!(world.object_for_owner(key.owner_handle()), None);
    }

    #[test]
    fn test_enable_body_requires_physics() {
        let mut world = GameWorld::new();
        let key = world.add_object(crate_at(0.0, 0.0));
        let result = world.enable_body(key, &BodyTemplate::default());
        assert!(matches!(result, Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_enable_body_missing_object() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        let key = world.add_object(crate_at(0.0, 0.0));
        world.remove_object(key);
        assert_eq!(
            world.enable_body(key, &BodyTemplate::default()),
            Err(PhysicsError::MissingBody)
        );
    }

    #[test]
    fn test_update_moves_object_with_body() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        let key = world.add_object(crate_at(100.0, 100.0));
        world
            .enable_body(key, &BodyTemplate::default().with_velocity(Vec2::new(60.0, 0.0)))
            .unwrap();

        world.update(0.0, 1.0 / 60.0).unwrap();

        let object = world.get(key).unwrap();
        assert!((object.transform.position.x - 101.0).abs() < 0.001);
        assert_eq!(object.transform.position.y, 100.0);
    }

    #[test]
    fn test_object_without_body_is_untouched() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        let moving = world.add_object(crate_at(0.0, 0.0));
        world
            .enable_body(moving, &BodyTemplate::default().with_velocity(Vec2::new(60.0, 0.0)))
            .unwrap();
        let still = world.add_object(crate_at(500.0, 500.0));

        world.update(0.0, 1.0 / 60.0).unwrap();

        assert_eq!(world.get(still).unwrap().transform.position, Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_moved_static_body_follows_object() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        let key = world.add_object(crate_at(100.0, 100.0));
        let body = world.enable_body(key, &BodyTemplate::fixed()).unwrap();
        // Something dynamic so the physics world steps
        let other = world.add_object(crate_at(1000.0, 1000.0));
        world.enable_body(other, &BodyTemplate::default()).unwrap();

        world.get_mut(key).unwrap().set_position(Vec2::new(200.0, 100.0));
        world.update(0.0, 1.0 / 60.0).unwrap();

        let physics = world.physics().unwrap();
        let static_body = physics.arcade_body(body).unwrap();
        assert_eq!(static_body.position(), Vec2::new(184.0, 84.0));
    }

    #[test]
    fn test_remove_object_destroys_body() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        let key = world.add_object(crate_at(0.0, 0.0));
        let body = world.enable_body(key, &BodyTemplate::default()).unwrap();

        world.remove_object(key);
        world.update(0.0, 1.0 / 60.0).unwrap();

        assert!(world.physics().unwrap().arcade_body(body).is_none());
    }

    #[test]
    fn test_tag_group() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        for x in [0.0, 100.0, 200.0] {
            let key = world.add_object(crate_at(x, 0.0).with_tag("coin"));
            world.enable_body(key, &BodyTemplate::default()).unwrap();
        }
        // Tagged but without a body
        world.add_object(crate_at(300.0, 0.0).with_tag("coin"));

        let group = world.tag_group("coin").unwrap();
        assert_eq!(world.physics().unwrap().group(group).unwrap().len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        let key = world.add_object(crate_at(0.0, 0.0));
        world.enable_body(key, &BodyTemplate::default()).unwrap();
        world.add_tilemap(Tilemap::new(4, 4, 16.0, 16.0));

        world.clear();
        world.update(0.0, 1.0 / 60.0).unwrap();

        assert!(world.is_empty());
        assert!(world.tilemaps().is_empty());
        assert_eq!(world.physics().unwrap().body_count(), 0);
    }

    #[test]
    fn test_update_drains_events() {
        let mut world = GameWorld::new().with_physics(no_gravity()).unwrap();
        let key = world.add_object(crate_at(0.0, 0.0));
        world.enable_body(key, &BodyTemplate::default()).unwrap();

        for _ in 0..3 {
            let events = world.update(0.0, 1.0 / 60.0).unwrap();
            assert_eq!(events.len(), 1);
            assert!(matches!(events[0], PhysicsEvent::WorldStep { .. }));
        }
        assert!(world.physics().unwrap().events().is_empty());
    }

    #[test]
    fn test_update_without_physics_has_no_events() {
        let mut world = GameWorld::new();
        world.add_object(crate_at(0.0, 0.0));
        assert!(world.update(0.0, 1.0 / 60.0).unwrap().is_empty());
    }
}
