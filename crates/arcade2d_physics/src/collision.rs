//! Narrow-phase overlap tests and separation
//!
//! Separation is split per axis. [`get_overlap_x`] / [`get_overlap_y`]
//! measure the penetration using the bodies' per-step deltas and set the
//! touching flags; [`separate_x`] / [`separate_y`] then push the bodies apart
//! and exchange velocity. Circles take a separate path along the line
//! between centres.

use arcade2d_math::{Vec2, EPSILON};

use crate::body::{ArcadeBody, BodyKind};
use crate::edges::Edge;

/// Separation axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    fn unit(self) -> Vec2 {
        match self {
            Axis::X => Vec2::X,
            Axis::Y => Vec2::Y,
        }
    }

    fn with(self, mut v: Vec2, value: f32) -> Vec2 {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
        v
    }

    fn perpendicular(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Left or top edge
    fn low_edge(self) -> Edge {
        match self {
            Axis::X => Edge::Left,
            Axis::Y => Edge::Up,
        }
    }

    /// Right or bottom edge
    fn high_edge(self) -> Edge {
        match self {
            Axis::X => Edge::Right,
            Axis::Y => Edge::Down,
        }
    }

    fn low(self, body: &dyn ArcadeBody) -> f32 {
        self.of(body.position())
    }

    fn high(self, body: &dyn ArcadeBody) -> f32 {
        match self {
            Axis::X => body.right(),
            Axis::Y => body.bottom(),
        }
    }

    fn size(self, body: &dyn ArcadeBody) -> f32 {
        match self {
            Axis::X => body.width(),
            Axis::Y => body.height(),
        }
    }

    fn set_overlap(self, body: &mut dyn ArcadeBody, overlap: f32) {
        match self {
            Axis::X => body.set_overlap_x(overlap),
            Axis::Y => body.set_overlap_y(overlap),
        }
    }

    fn custom_separate(self, body: &dyn ArcadeBody) -> bool {
        match self {
            Axis::X => body.custom_separate_x(),
            Axis::Y => body.custom_separate_y(),
        }
    }
}

/// Whether two bodies overlap
///
/// Rectangles that only share an edge do not intersect; circles that touch
/// do.
pub fn intersects(b1: &dyn ArcadeBody, b2: &dyn ArcadeBody) -> bool {
    match (b1.is_circle(), b2.is_circle()) {
        (false, false) => b1.bounds().intersects(&b2.bounds()),
        (true, true) => b1.center().distance(b2.center()) <= b1.radius() + b2.radius(),
        (true, false) => b2.bounds().intersects_circle(b1.center(), b1.radius()),
        (false, true) => b1.bounds().intersects_circle(b2.center(), b2.radius()),
    }
}

fn get_overlap(
    axis: Axis,
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
    bias: f32,
) -> f32 {
    let d1 = axis.of(b1.delta());
    let d2 = axis.of(b2.delta());
    let max_overlap = d1.abs() + d2.abs() + bias;
    let (low, high) = (axis.low_edge(), axis.high_edge());
    let mut overlap = 0.0;

    if d1 == d2 {
        // No relative motion on this axis
        b1.set_embedded(true);
        b2.set_embedded(true);
    } else if d1 > d2 {
        // b1 moving into b2 from the low side
        overlap = axis.high(b1) - axis.low(b2);
        if (overlap > max_overlap && !overlap_only)
            || !b1.check_collision().allows(high)
            || !b2.check_collision().allows(low)
        {
            overlap = 0.0;
        } else {
            b1.touching_mut().set(high);
            b2.touching_mut().set(low);
            if !overlap_only {
                if b2.kind() == BodyKind::Static {
                    b1.blocked_mut().set(high);
                }
                if b1.kind() == BodyKind::Static {
                    b2.blocked_mut().set(low);
                }
            }
        }
    } else if d1 < d2 {
        // b1 moving into b2 from the high side
        overlap = axis.low(b1) - axis.size(b2) - axis.low(b2);
        if (-overlap > max_overlap && !overlap_only)
            || !b1.check_collision().allows(low)
            || !b2.check_collision().allows(high)
        {
            overlap = 0.0;
        } else {
            b1.touching_mut().set(low);
            b2.touching_mut().set(high);
            if !overlap_only {
                if b2.kind() == BodyKind::Static {
                    b1.blocked_mut().set(low);
                }
                if b1.kind() == BodyKind::Static {
                    b2.blocked_mut().set(high);
                }
            }
        }
    }

    axis.set_overlap(b1, overlap);
    axis.set_overlap(b2, overlap);
    overlap
}

/// Signed horizontal penetration of two intersecting bodies
///
/// Positive when `b1` entered from the left. Zero when the penetration
/// exceeds what the bodies could have moved this step plus `bias`, when a
/// relevant edge has collision disabled, or when both bodies moved the same
/// distance on the axis (both are then marked embedded).
pub fn get_overlap_x(
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
    bias: f32,
) -> f32 {
    get_overlap(Axis::X, b1, b2, overlap_only, bias)
}

/// Signed vertical penetration; positive when `b1` entered from above
pub fn get_overlap_y(
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
    bias: f32,
) -> f32 {
    get_overlap(Axis::Y, b1, b2, overlap_only, bias)
}

/// Separate two bodies horizontally
///
/// `overlap` may be supplied by the caller; otherwise it is measured with
/// [`get_overlap_x`]. Returns whether the bodies overlapped.
pub fn separate_x(
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
    bias: f32,
    overlap: Option<f32>,
) -> bool {
    separate_axis(Axis::X, b1, b2, overlap_only, bias, overlap)
}

/// Separate two bodies vertically
pub fn separate_y(
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
    bias: f32,
    overlap: Option<f32>,
) -> bool {
    separate_axis(Axis::Y, b1, b2, overlap_only, bias, overlap)
}

fn separate_axis(
    axis: Axis,
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
    bias: f32,
    overlap: Option<f32>,
) -> bool {
    let overlap = match overlap {
        Some(overlap) => overlap,
        None => get_overlap(axis, b1, b2, overlap_only, bias),
    };

    if overlap_only
        || overlap == 0.0
        || (b1.immovable() && b2.immovable())
        || axis.custom_separate(b1)
        || axis.custom_separate(b2)
    {
        return overlap != 0.0 || (b1.embedded() && b2.embedded());
    }

    resolve_axis(axis, b1, b2, overlap.abs());
    true
}

/// Push-out and velocity response for one axis
///
/// `overlap` is the unsigned penetration.
fn resolve_axis(axis: Axis, b1: &mut dyn ArcadeBody, b2: &mut dyn ArcadeBody, overlap: f32) {
    // b1 sits on the low side of b2 when its high edge is closer to b2's low edge
    let b1_low = (axis.high(b1) - axis.low(b2)).abs() <= (axis.high(b2) - axis.low(b1)).abs();
    let dir1 = if b1_low { -1.0 } else { 1.0 };
    let dir2 = -dir1;
    // Edge of each body that faces the other
    let (facing1, facing2) = if b1_low {
        (axis.high_edge(), axis.low_edge())
    } else {
        (axis.low_edge(), axis.high_edge())
    };

    let v1 = axis.of(b1.velocity());
    let v2 = axis.of(b2.velocity());
    let d1 = axis.of(b1.delta());
    let d2 = axis.of(b2.delta());
    let full1 = v2 - v1 * axis.of(b1.bounce());
    let full2 = v1 - v2 * axis.of(b2.bounce());
    let approaching = if b1_low { v1 > v2 } else { v1 < v2 };

    let movable1 = !b1.immovable();
    let movable2 = !b2.immovable();

    if movable1 && movable2 {
        // A body moving into a partner that is already blocked takes the whole correction
        let toward1 = if b1_low { d1 > 0.0 } else { d1 < 0.0 };
        let toward2 = if b1_low { d2 < 0.0 } else { d2 > 0.0 };
        if toward1 && b2.blocked().get(facing1) {
            push(axis, b1, dir1 * overlap, full1, facing1);
            return;
        }
        if toward2 && b1.blocked().get(facing2) {
            push(axis, b2, dir2 * overlap, full2, facing2);
            return;
        }

        match (b1.pushable(), b2.pushable()) {
            (true, true) => {
                let m1 = b1.mass();
                let m2 = b2.mass();
                let total = m1 + m2;
                b1.translate(axis.unit() * (dir1 * overlap * m2 / total));
                b2.translate(axis.unit() * (dir2 * overlap * m1 / total));

                if approaching {
                    let e1 = axis.of(b1.bounce());
                    let e2 = axis.of(b2.bounce());
                    let momentum = m1 * v1 + m2 * v2;
                    let nv1 = (momentum + m2 * e1 * (v2 - v1)) / total;
                    let nv2 = (momentum + m1 * e2 * (v1 - v2)) / total;
                    b1.set_velocity(axis.with(b1.velocity(), nv1));
                    b2.set_velocity(axis.with(b2.velocity(), nv2));
                }
            }
            (true, false) => push(axis, b1, dir1 * overlap, full1, facing1),
            (false, true) => push(axis, b2, dir2 * overlap, full2, facing2),
            (false, false) => {
                let half = overlap * 0.5;
                b1.translate(axis.unit() * (dir1 * half));
                b2.translate(axis.unit() * (dir2 * half));
                if approaching {
                    b1.set_velocity(axis.with(b1.velocity(), 0.0));
                    b2.set_velocity(axis.with(b2.velocity(), 0.0));
                }
                b1.blocked_mut().set(facing1);
                b2.blocked_mut().set(facing2);
            }
        }
    } else if movable1 {
        push(axis, b1, dir1 * overlap, full1, facing1);
        ride(axis, b2, b1);
    } else if movable2 {
        push(axis, b2, dir2 * overlap, full2, facing2);
        ride(axis, b1, b2);
    }
}

/// Move `body` by `amount` along the axis and give it `velocity`, scaled by
/// its slide factor, marking the facing edge as blocked
fn push(axis: Axis, body: &mut dyn ArcadeBody, amount: f32, velocity: f32, blocked: Edge) {
    body.translate(axis.unit() * amount);
    let kept = velocity * axis.of(body.slide_factor());
    body.set_velocity(axis.with(body.velocity(), kept));
    body.blocked_mut().set(blocked);
}

/// Carry `rider` along with the perpendicular motion of `carrier`
fn ride(axis: Axis, carrier: &dyn ArcadeBody, rider: &mut dyn ArcadeBody) {
    if !carrier.moves() {
        return;
    }
    let perpendicular = axis.perpendicular();
    let moved = perpendicular.of(carrier.position() - carrier.prev());
    let shift = moved * perpendicular.of(carrier.friction());
    if shift != 0.0 {
        rider.translate(perpendicular.unit() * shift);
        rider.refresh_delta();
    }
}

/// Result of the circle path
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CircleOutcome {
    /// Handled; whether the bodies overlapped
    Resolved(bool),
    /// A circle against the face of a rectangle: use the AABB path
    Fallback,
}

/// Separate two bodies where at least one is a circle
///
/// Circle-circle pairs are pushed apart along the line between centres.
/// A circle against a rectangle is handled here only when the circle centre
/// lies in one of the rectangle's corner regions.
pub fn separate_circle(
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
) -> CircleOutcome {
    let (overlap, normal) = if b1.is_circle() && b2.is_circle() {
        let overlap = b1.radius() + b2.radius() - b1.center().distance(b2.center());
        (overlap, b2.center() - b1.center())
    } else {
        let (circle, rect, sign): (&dyn ArcadeBody, &dyn ArcadeBody, f32) = if b1.is_circle() {
            (&*b1, &*b2, 1.0)
        } else {
            (&*b2, &*b1, -1.0)
        };
        let c = circle.center();
        let corner_x = if c.x < rect.left() {
            Some(rect.left())
        } else if c.x > rect.right() {
            Some(rect.right())
        } else {
            None
        };
        let corner_y = if c.y < rect.top() {
            Some(rect.top())
        } else if c.y > rect.bottom() {
            Some(rect.bottom())
        } else {
            None
        };
        match (corner_x, corner_y) {
            (Some(x), Some(y)) => {
                let corner = Vec2::new(x, y);
                let overlap = circle.radius() - c.distance(corner);
                // Normal points from b1 toward b2
                (overlap, (corner - c) * sign)
            }
            _ => return CircleOutcome::Fallback,
        }
    };

    b1.set_overlap_r(overlap);
    b2.set_overlap_r(overlap);
    if overlap <= 0.0 {
        return CircleOutcome::Resolved(false);
    }

    let normal = if normal.is_zero() { Vec2::X } else { normal.normalized() };

    if b1.delta() == b2.delta() {
        b1.set_embedded(true);
        b2.set_embedded(true);
    }
    set_circle_touching(b1, b2, normal);

    if overlap_only
        || (b1.immovable() && b2.immovable())
        || b1.custom_separate_x()
        || b2.custom_separate_x()
        || b1.custom_separate_y()
        || b2.custom_separate_y()
    {
        return CircleOutcome::Resolved(true);
    }

    let movable1 = !b1.immovable() && b1.pushable();
    let movable2 = !b2.immovable() && b2.pushable();

    let v1 = b1.velocity();
    let v2 = b2.velocity();
    let v1n = v1.dot(normal);
    let v2n = v2.dot(normal);
    if v1n > v2n {
        // Restitution exchange along the normal; the tangential part is kept
        let e1 = bounce_along(b1, normal);
        let e2 = bounce_along(b2, normal);
        if movable1 && movable2 {
            let m1 = b1.mass();
            let m2 = b2.mass();
            let total = m1 + m2;
            let momentum = m1 * v1n + m2 * v2n;
            let nv1 = (momentum + m2 * e1 * (v2n - v1n)) / total;
            let nv2 = (momentum + m1 * e2 * (v1n - v2n)) / total;
            b1.set_velocity(v1 + normal * (nv1 - v1n));
            b2.set_velocity(v2 + normal * (nv2 - v2n));
        } else if movable1 {
            b1.set_velocity(v1 + normal * (v2n - v1n * e1 - v1n));
        } else if movable2 {
            b2.set_velocity(v2 + normal * (v1n - v2n * e2 - v2n));
        }
    }

    let share = if movable1 && movable2 { overlap * 0.5 } else { overlap };
    let correction = normal * (share + EPSILON);
    if movable1 {
        b1.translate(-correction);
    }
    if movable2 {
        b2.translate(correction);
    }

    CircleOutcome::Resolved(true)
}

/// Body bounce projected onto a unit normal
fn bounce_along(body: &dyn ArcadeBody, normal: Vec2) -> f32 {
    let bounce = body.bounce();
    bounce.x * normal.x.abs() + bounce.y * normal.y.abs()
}

fn set_circle_touching(b1: &mut dyn ArcadeBody, b2: &mut dyn ArcadeBody, normal: Vec2) {
    if normal.x > EPSILON {
        b1.touching_mut().set(Edge::Right);
        b2.touching_mut().set(Edge::Left);
    } else if normal.x < -EPSILON {
        b1.touching_mut().set(Edge::Left);
        b2.touching_mut().set(Edge::Right);
    }
    if normal.y > EPSILON {
        b1.touching_mut().set(Edge::Down);
        b2.touching_mut().set(Edge::Up);
    } else if normal.y < -EPSILON {
        b1.touching_mut().set(Edge::Up);
        b2.touching_mut().set(Edge::Down);
    }
}

/// Full separation of an intersecting pair
///
/// `x_first` selects the axis order; the second axis only runs if the
/// bodies still intersect after the first. Returns whether they collided.
pub fn separate_bodies(
    b1: &mut dyn ArcadeBody,
    b2: &mut dyn ArcadeBody,
    overlap_only: bool,
    bias: f32,
    x_first: bool,
) -> bool {
    if b1.is_circle() || b2.is_circle() {
        if let CircleOutcome::Resolved(result) = separate_circle(b1, b2, overlap_only) {
            return result;
        }
    }

    if overlap_only {
        let x = separate_x(b1, b2, true, bias, None);
        let y = separate_y(b1, b2, true, bias, None);
        return x || y || intersects(b1, b2);
    }

    let (first, second) = if x_first {
        (Axis::X, Axis::Y)
    } else {
        (Axis::Y, Axis::X)
    };

    let result1 = separate_axis(first, b1, b2, false, bias, None);
    let result2 = if intersects(b1, b2) {
        separate_axis(second, b1, b2, false, bias, None)
    } else {
        false
    };
    result1 || result2
}
