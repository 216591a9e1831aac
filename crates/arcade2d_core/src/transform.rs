//! 2D Transform (position, rotation, scale, origin)
//!
//! A Transform2D places a game object in the world. The origin is the
//! normalized point of the object's frame that sits at `position`.

use arcade2d_math::Vec2;
use serde::{Deserialize, Serialize};

/// A 2D transform with position, rotation, per-axis scale and origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform2D {
    /// Position in world space
    pub position: Vec2,
    /// Rotation in degrees, clockwise (y grows downward)
    pub rotation: f32,
    /// Scale factor per axis
    pub scale: Vec2,
    /// Normalized origin within the frame; (0.5, 0.5) is the centre
    pub origin: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// Create an identity transform with a centred origin
    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            origin: Vec2::new(0.5, 0.5),
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Origin in pixels for a frame of the given size
    #[inline]
    pub fn display_origin(&self, frame_size: Vec2) -> Vec2 {
        self.origin.component_mul(frame_size)
    }

    /// Transform a point from local space to world space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let scaled = p.component_mul(self.scale);
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let rotated = Vec2::new(scaled.x * cos - scaled.y * sin, scaled.x * sin + scaled.y * cos);
        rotated + self.position
    }

    /// Translate the transform by an offset
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Rotate by `degrees`, keeping the angle in (-180, 180]
    pub fn rotate(&mut self, degrees: f32) {
        let mut rotation = (self.rotation + degrees) % 360.0;
        if rotation > 180.0 {
            rotation -= 360.0;
        } else if rotation <= -180.0 {
            rotation += 360.0;
        }
        self.rotation = rotation;
    }
}
