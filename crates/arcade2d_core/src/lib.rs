//! Core game-object types for Arcade2D
//!
//! This crate connects game objects to the arcade physics world:
//!
//! - [`Transform2D`] - Position, rotation, scale and origin in 2D
//! - [`GameObject`] - An object in a scene with transform, frame size and optional body
//! - [`GameWorld`] - Container for all objects, tile layers and the physics world
//! - [`ObjectKey`] - Generational key to an object in the world
//! - [`Tilemap`] - Grid tile layer bodies can collide with
//! - [`GameObjectTemplate`] / [`BodyTemplate`] - Serializable object and body settings
//! - [`Scene`] - Loadable/saveable scene template
//! - [`ActiveScene`] - A running scene

mod transform;
mod entity;
mod tilemap;
mod world;
mod scene;

pub use transform::Transform2D;
pub use entity::{BodyTemplate, DirtyFlags, GameObject, GameObjectTemplate};
pub use tilemap::{Tilemap, TilemapTemplate, EMPTY_TILE};
pub use world::{GameWorld, ObjectKey};
pub use scene::{ActiveScene, ColliderTemplate, Scene, SceneLoadError, SceneSaveError};

// Re-export commonly used types from arcade2d_math for convenience
pub use arcade2d_math::{Rect, Vec2};

// Re-export physics types for convenient access through arcade2d_core
pub use arcade2d_physics::{
    BodyRef, PhysicsError, PhysicsEvent, World as PhysicsWorld, WorldConfig,
};
