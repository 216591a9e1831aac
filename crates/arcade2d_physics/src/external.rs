//! Facade for a full rigid-body engine living outside this crate
//!
//! Games that need rotating collision shapes or joints hand those objects to
//! another engine. Only the boundary is described here: an implementation
//! creates, queries and destroys its own bodies.

use arcade2d_math::Vec2;

/// Opaque handle issued by an external engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExternalBodyId(pub u64);

/// What to create in the external engine
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExternalBodyDesc {
    pub position: Vec2,
    pub size: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    pub is_static: bool,
}

impl ExternalBodyDesc {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            rotation: 0.0,
            is_static: false,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}

/// Pose reported back by the external engine
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExternalBodyState {
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
}

/// Trait an external physics engine implements
pub trait ExternalEngine: Send + Sync {
    /// Human-readable engine name
    fn name(&self) -> &str;

    fn create_body(&mut self, desc: &ExternalBodyDesc) -> ExternalBodyId;

    /// `None` if the id is unknown or was destroyed
    fn body_state(&self, id: ExternalBodyId) -> Option<ExternalBodyState>;

    /// Returns whether the body existed
    fn destroy_body(&mut self, id: ExternalBodyId) -> bool;
}
