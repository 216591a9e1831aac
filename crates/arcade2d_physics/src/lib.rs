//! Arcade-style 2D physics for Arcade2D
//!
//! This crate provides axis-aligned rigid-body simulation, including:
//! - Dynamic and static bodies (rectangles and circles)
//! - Fixed-step integration with gravity, drag and velocity limits
//! - Narrow-phase separation for rectangles, circles and tiles
//! - An R-tree broad phase
//! - Persistent colliders with process/collide callbacks
//! - World-bounds clamping and queued events

pub mod body;
pub mod collider;
pub mod collision;
pub mod edges;
pub mod error;
pub mod events;
pub mod external;
pub mod motion;
pub mod spatial;
pub mod static_body;
pub mod tile;
pub mod world;

// Re-export commonly used types
pub use body::{
    ArcadeBody, Body, BodyKey, BodyKind, BodyRef, BodySync, OwnerHandle, OwnerTransform, MIN_MASS,
};
pub use collider::{
    CollideCallback, Collider, ColliderKey, ColliderTarget, CollisionPair, Group, GroupKey,
    ProcessCallback,
};
pub use collision::{separate_bodies, separate_circle, separate_x, separate_y, CircleOutcome};
pub use edges::{CollisionEdges, Edge, EdgeState, Facing};
pub use error::PhysicsError;
pub use events::PhysicsEvent;
pub use external::{ExternalBodyDesc, ExternalBodyId, ExternalBodyState, ExternalEngine};
pub use spatial::SpatialIndex;
pub use static_body::{StaticBody, StaticBodyKey};
pub use tile::{interesting_faces, separate_tile, Faces, Tile, TileSource};
pub use world::{World, WorldConfig};
