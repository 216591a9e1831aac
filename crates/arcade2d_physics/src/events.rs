//! World events
//!
//! Events are queued during a step and drained by the caller afterwards.

use crate::body::{BodyKey, BodyRef};
use crate::edges::EdgeState;
use crate::tile::Tile;

/// Something that happened during a world update
#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsEvent {
    /// Two bodies were separated; emitted if either has `on_collide`
    Collide { body1: BodyRef, body2: BodyRef },
    /// Two bodies overlapped; emitted if either has `on_overlap`
    Overlap { body1: BodyRef, body2: BodyRef },
    /// A body hit the world bounds; `edges` are the edges it was blocked on
    WorldBounds { body: BodyKey, edges: EdgeState },
    /// A body was separated from a tile
    TileCollide { body: BodyKey, tile: Tile },
    /// A body overlapped a tile
    TileOverlap { body: BodyKey, tile: Tile },
    Pause,
    Resume,
    /// One fixed step completed
    WorldStep { delta: f32 },
}
