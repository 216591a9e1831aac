//! Scene serialization
//!
//! Provides the Scene struct for loading/saving scenes from RON files and
//! ActiveScene, the running instance of a scene.
//! Scenes contain object templates, physics settings, an optional tile layer
//! and the colliders to create between tagged objects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use arcade2d_physics::{
    Collider, ColliderTarget, GroupKey, PhysicsError, PhysicsEvent, WorldConfig,
};
use log::{debug, info};

use crate::entity::GameObjectTemplate;
use crate::tilemap::TilemapTemplate;
use crate::world::GameWorld;

/// A collider between tagged objects, created when a scene is instantiated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderTemplate {
    /// Tag of the first set of objects
    pub tag: String,
    /// Tag of the second set; with neither this nor `with_tilemap` the set
    /// collides with itself
    #[serde(default)]
    pub with_tag: Option<String>,
    /// Collide the first set with the scene's tile layer
    #[serde(default)]
    pub with_tilemap: bool,
    /// Report overlaps without separating
    #[serde(default)]
    pub overlap_only: bool,
}

impl ColliderTemplate {
    pub fn between(tag: impl Into<String>, with_tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            with_tag: Some(with_tag.into()),
            with_tilemap: false,
            overlap_only: false,
        }
    }

    pub fn with_tilemap(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            with_tag: None,
            with_tilemap: true,
            overlap_only: false,
        }
    }

    pub fn overlapping(mut self) -> Self {
        self.overlap_only = true;
        self
    }
}

/// A serializable scene containing object templates
///
/// Scenes are loaded from RON files and contain all the data needed
/// to populate a game world: objects, physics settings, tiles and colliders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Object templates in this scene
    pub objects: Vec<GameObjectTemplate>,
    /// Physics settings; `None` runs the scene without physics unless
    /// an object needs a body
    #[serde(default)]
    pub physics: Option<WorldConfig>,
    #[serde(default)]
    pub tilemap: Option<TilemapTemplate>,
    #[serde(default)]
    pub colliders: Vec<ColliderTemplate>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            physics: None,
            tilemap: None,
            colliders: Vec::new(),
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Add an object template to this scene
    pub fn add_object(&mut self, object: GameObjectTemplate) {
        self.objects.push(object);
    }

    pub fn add_collider(&mut self, collider: ColliderTemplate) {
        self.colliders.push(collider);
    }

    /// Set the physics settings for this scene
    pub fn with_physics(mut self, config: WorldConfig) -> Self {
        self.physics = Some(config);
        self
    }

    pub fn with_tilemap(mut self, tilemap: TilemapTemplate) -> Self {
        self.tilemap = Some(tilemap);
        self
    }

    /// Whether instantiating this scene needs a physics world
    pub fn needs_physics(&self) -> bool {
        self.physics.is_some()
            || !self.colliders.is_empty()
            || self.objects.iter().any(|o| o.body.is_some())
    }
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

/// A running scene
///
/// ActiveScene wraps a GameWorld instantiated from a Scene template (or
/// created programmatically).
pub struct ActiveScene {
    /// Scene name (from template or custom)
    pub name: String,
    /// The live world with objects and physics
    pub world: GameWorld,
}

impl ActiveScene {
    /// Create a new empty active scene with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world: GameWorld::new(),
        }
    }

    /// Create with physics enabled
    pub fn with_physics(mut self, config: WorldConfig) -> Result<Self, PhysicsError> {
        self.world = self.world.with_physics(config)?;
        Ok(self)
    }

    /// Create an active scene from a Scene template
    ///
    /// `physics_config` overrides the template's physics settings. Objects
    /// get their bodies, then tagged objects are grouped and the template's
    /// colliders are registered in order.
    pub fn from_template(
        template: &Scene,
        physics_config: Option<WorldConfig>,
    ) -> Result<Self, PhysicsError> {
        let config = physics_config.or_else(|| template.physics.clone());
        let mut world = match config {
            Some(config) => GameWorld::new().with_physics(config)?,
            None if template.needs_physics() => GameWorld::new().with_physics(WorldConfig::default())?,
            None => GameWorld::new(),
        };

        for object_template in &template.objects {
            let key = world.add_object(object_template.to_game_object());
            if let Some(ref body) = object_template.body {
                world.enable_body(key, body)?;
            }
        }

        if let Some(ref tilemap) = template.tilemap {
            world.add_tilemap(tilemap.to_tilemap());
        }

        let mut groups: HashMap<String, GroupKey> = HashMap::new();
        for (index, collider) in template.colliders.iter().enumerate() {
            let object1 = ColliderTarget::Group(group_for(&mut world, &mut groups, &collider.tag)?);
            let object2 = if collider.with_tilemap {
                let tiles = world.tile_source(0).ok_or_else(|| {
                    PhysicsError::InvalidConfig(format!(
                        "collider {} needs a tilemap but scene '{}' has none",
                        index, template.name
                    ))
                })?;
                Some(ColliderTarget::Tiles(tiles))
            } else if let Some(ref other) = collider.with_tag {
                Some(ColliderTarget::Group(group_for(&mut world, &mut groups, other)?))
            } else {
                None
            };

            let name = match (&collider.with_tag, collider.with_tilemap) {
                (_, true) => format!("{}-tilemap", collider.tag),
                (Some(other), false) => format!("{}-{}", collider.tag, other),
                (None, false) => collider.tag.clone(),
            };
            let entry = Collider::new(object1, object2)
                .with_name(name)
                .with_overlap_only(collider.overlap_only);
            if let Some(physics) = world.physics_mut() {
                physics.add_collider(entry);
            }
        }

        info!(
            "Instantiated scene '{}' with {} objects and {} colliders",
            template.name,
            world.object_count(),
            template.colliders.len()
        );
        Ok(Self {
            name: template.name.clone(),
            world,
        })
    }

    /// Update the scene (steps physics and syncs objects)
    ///
    /// Returns the physics events raised during the frame.
    pub fn update(&mut self, time: f32, delta: f32) -> Result<Vec<PhysicsEvent>, PhysicsError> {
        self.world.update(time, delta)
    }
}

fn group_for(
    world: &mut GameWorld,
    groups: &mut HashMap<String, GroupKey>,
    tag: &str,
) -> Result<GroupKey, PhysicsError> {
    if let Some(&group) = groups.get(tag) {
        return Ok(group);
    }
    let group = world.tag_group(tag)?;
    debug!("Tag '{}' mapped to a physics group", tag);
    groups.insert(tag.to_string(), group);
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BodyTemplate;
    use crate::Transform2D;
    use arcade2d_math::Vec2;

    fn platform_scene() -> Scene {
        let mut scene = Scene::new("Platforms").with_physics(WorldConfig {
            gravity: Vec2::new(0.0, 300.0),
            ..WorldConfig::default()
        });
        scene.add_object(
            GameObjectTemplate::new(
                Vec2::new(32.0, 32.0),
                Transform2D::from_position(Vec2::new(100.0, 50.0)),
            )
            .with_name("player")
            .with_tag("player")
            .with_body(BodyTemplate::default()),
        );
        scene.add_object(
            GameObjectTemplate::new(
                Vec2::new(400.0, 32.0),
                Transform2D::from_position(Vec2::new(200.0, 116.0)),
            )
            .with_name("ground")
            .with_tag("ground")
            .with_body(BodyTemplate::fixed()),
        );
        scene.add_collider(ColliderTemplate::between("player", "ground"));
        scene
    }

    #[test]
    fn test_scene_new() {
        let scene = Scene::new("Test Scene");
        assert_eq!(scene.name, "Test Scene");
        assert!(scene.objects.is_empty());
        assert!(scene.physics.is_none());
        assert!(!scene.needs_physics());
    }

    #[test]
    fn test_needs_physics() {
        let mut scene = Scene::new("Test");
        scene.add_object(GameObjectTemplate::new(Vec2::ONE, Transform2D::identity()));
        assert!(!scene.needs_physics());

        scene.add_object(
            GameObjectTemplate::new(Vec2::ONE, Transform2D::identity())
                .with_body(BodyTemplate::default()),
        );
        assert!(scene.needs_physics());
    }

    #[test]
    fn test_scene_serialization() {
        let scene = platform_scene();

        let pretty = ron::ser::PrettyConfig::new().struct_names(true);
        let serialized = ron::ser::to_string_pretty(&scene, pretty).unwrap();
        assert!(serialized.contains("Platforms"));
        assert!(serialized.contains("player"));

        let deserialized: Scene = ron::from_str(&serialized).unwrap();
        assert_eq!(deserialized.name, "Platforms");
        assert_eq!(deserialized.objects.len(), 2);
        assert_eq!(deserialized.colliders, scene.colliders);
        assert_eq!(deserialized.physics, scene.physics);
    }

    #[test]
    fn test_parse_scene_file_format() {
        let scene_ron = r#"
Scene(
    name: "Tiles",
    objects: [
        GameObjectTemplate(
            name: Some("ball"),
            tags: ["ball"],
            transform: Transform2D(
                position: Vec2(x: 24.0, y: 8.0),
            ),
            size: Vec2(x: 16.0, y: 16.0),
            body: Some(BodyTemplate(
                circle: Some(8.0),
                bounce: Vec2(x: 0.5, y: 0.5),
            )),
        ),
    ],
    physics: Some(WorldConfig(
        gravity: Vec2(x: 0.0, y: 200.0),
        fps: 30.0,
    )),
    tilemap: Some(TilemapTemplate(
        tile_width: 16.0,
        tile_height: 16.0,
        rows: [
            [-1, -1, -1],
            [1, 1, 1],
        ],
    )),
    colliders: [
        ColliderTemplate(tag: "ball", with_tilemap: true),
    ],
)
"#;
        let scene: Scene = ron::from_str(scene_ron).unwrap();
        assert_eq!(scene.name, "Tiles");
        assert_eq!(scene.objects.len(), 1);

        let ball = &scene.objects[0];
        assert_eq!(ball.name, Some("ball".to_string()));
        assert_eq!(ball.transform.scale, Vec2::ONE);
        let body = ball.body.as_ref().unwrap();
        assert_eq!(body.circle, Some(8.0));
        assert_eq!(body.mass, 1.0);

        let physics = scene.physics.as_ref().unwrap();
        assert_eq!(physics.fps, 30.0);
        assert!(physics.use_tree);

        let tilemap = scene.tilemap.as_ref().unwrap();
        assert_eq!(tilemap.rows.len(), 2);
        assert!(scene.colliders[0].with_tilemap);
        assert!(!scene.colliders[0].overlap_only);
    }

    #[test]
    fn test_scene_load_missing_file() {
        let result = Scene::load("/nonexistent/scene.ron");
        assert!(matches!(result, Err(SceneLoadError::Io(_))));
    }

    #[test]
    fn test_scene_error_display() {
        let err = SceneLoadError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(format!("{}", err), "IO error: missing");
    }

    // --- ActiveScene tests ---

    #[test]
    fn test_active_scene_new() {
        let scene = ActiveScene::new("Test Scene");
        assert_eq!(scene.name, "Test Scene");
        assert!(scene.world.is_empty());
        assert!(scene.world.physics().is_none());
    }

    #[test]
    fn test_active_scene_from_template() {
        let active = ActiveScene::from_template(&platform_scene(), None).unwrap();

        assert_eq!(active.name, "Platforms");
        assert_eq!(active.world.object_count(), 2);
        let physics = active.world.physics().unwrap();
        assert_eq!(physics.gravity(), Vec2::new(0.0, 300.0));
        assert_eq!(physics.body_count(), 1);
        assert_eq!(physics.static_body_count(), 1);
        assert_eq!(physics.collider_count(), 1);

        let (_, player) = active.world.get_by_name("player").unwrap();
        assert!(player.physics_body.is_some());
    }

    #[test]
    fn test_active_scene_from_template_override_physics() {
        let config = WorldConfig {
            gravity: Vec2::new(0.0, 50.0),
            ..WorldConfig::default()
        };
        let active = ActiveScene::from_template(&platform_scene(), Some(config)).unwrap();
        assert_eq!(active.world.physics().unwrap().gravity(), Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_active_scene_missing_tilemap() {
        let mut scene = Scene::new("No tiles");
        scene.add_collider(ColliderTemplate::with_tilemap("ball"));
        let result = ActiveScene::from_template(&scene, None);
        assert!(matches!(result, Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_active_scene_invalid_physics() {
        let scene = Scene::new("Bad").with_physics(WorldConfig {
            fps: 0.0,
            ..WorldConfig::default()
        });
        assert!(ActiveScene::from_template(&scene, None).is_err());
    }

    #[test]
    fn test_active_scene_update_lands_player() {
        let mut active = ActiveScene::from_template(&platform_scene(), None).unwrap();

        for _ in 0..120 {
            active.update(0.0, 1.0 / 60.0).unwrap();
        }

        // Ground top is at 100; the player's centre rests 16px above it
        let (_, player) = active.world.get_by_name("player").unwrap();
        assert!((player.transform.position.y - 84.0).abs() < 0.5, "y = {}", player.transform.position.y);
    }
}
