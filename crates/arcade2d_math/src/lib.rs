//! 2D Mathematics Library
//!
//! This crate provides the small set of math types the arcade2d engine is built on.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D vector with x, y components
//! - [`Rect`] - Axis-aligned rectangle (top-left origin, y grows downward)
//!
//! ## Helpers
//!
//! Scalar helpers used by the integrator and separation code live in [`scalar`].

mod vec2;
mod rect;
pub mod scalar;

pub use vec2::Vec2;
pub use rect::Rect;
pub use scalar::{angle_between, distance_between, fuzzy_equal, fuzzy_greater_than, fuzzy_less_than, EPSILON};
