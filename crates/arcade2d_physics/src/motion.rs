//! Velocity integration
//!
//! Gravity, acceleration and drag are applied per axis, then velocity is
//! clamped to the body's limits. Drag only applies on an axis with no
//! acceleration.

use arcade2d_math::{fuzzy_equal, Vec2};

use crate::body::Body;

/// Snap threshold for linear drag
const LINEAR_DRAG_EPSILON: f32 = 0.01;
/// Snap threshold for damping
const DAMPING_EPSILON: f32 = 0.001;
/// Snap threshold for angular drag
const ANGULAR_DRAG_EPSILON: f32 = 0.1;

/// Update the body's linear velocity for a step of `delta` seconds
pub fn compute_velocity(body: &mut Body, world_gravity: Vec2, delta: f32) {
    let mut velocity = body.velocity;

    if body.allow_gravity {
        velocity += (world_gravity + body.gravity) * delta;
    }

    let allow_drag = body.allow_drag;
    let drag = if body.use_damping {
        Vec2::new(body.drag.x.powf(delta), body.drag.y.powf(delta))
    } else {
        body.drag * delta
    };

    let mut damped = false;
    if body.acceleration.x != 0.0 {
        velocity.x += body.acceleration.x * delta;
    } else if allow_drag && body.drag.x != 0.0 {
        if body.use_damping {
            velocity.x *= drag.x;
            damped = true;
        } else {
            velocity.x = toward_zero(velocity.x, drag.x, LINEAR_DRAG_EPSILON);
        }
    }

    if body.acceleration.y != 0.0 {
        velocity.y += body.acceleration.y * delta;
    } else if allow_drag && body.drag.y != 0.0 {
        if body.use_damping {
            velocity.y *= drag.y;
            damped = true;
        } else {
            velocity.y = toward_zero(velocity.y, drag.y, LINEAR_DRAG_EPSILON);
        }
    }

    if damped && fuzzy_equal(velocity.length(), 0.0, DAMPING_EPSILON) {
        velocity = Vec2::ZERO;
    }

    velocity.x = velocity.x.clamp(-body.max_velocity.x, body.max_velocity.x);
    velocity.y = velocity.y.clamp(-body.max_velocity.y, body.max_velocity.y);

    if body.max_speed >= 0.0 && velocity.length() > body.max_speed {
        velocity = velocity.with_length(body.max_speed);
    }

    body.velocity = velocity;
}

/// Update the cosmetic rotation for a step of `delta` seconds
pub fn compute_angular_velocity(body: &mut Body, delta: f32) {
    let mut velocity = body.angular_velocity;

    if body.angular_acceleration != 0.0 {
        velocity += body.angular_acceleration * delta;
    } else if body.allow_drag && body.angular_drag != 0.0 {
        velocity = toward_zero(velocity, body.angular_drag * delta, ANGULAR_DRAG_EPSILON);
    }

    body.angular_velocity = velocity.clamp(-body.max_angular, body.max_angular);
    body.rotation += body.angular_velocity * delta;
}

/// Reduce `value` by `amount` toward zero without crossing it
fn toward_zero(value: f32, amount: f32, epsilon: f32) -> f32 {
    let reduced = if value > 0.0 {
        (value - amount).max(0.0)
    } else {
        (value + amount).min(0.0)
    };
    if reduced.abs() < epsilon {
        0.0
    } else {
        reduced
    }
}
