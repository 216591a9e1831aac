//! Body vs tile collision
//!
//! Tiles are static rectangles supplied by a [`TileSource`]. Only the
//! "interesting" faces of a tile (those not covered by a solid neighbour)
//! take part in separation, which keeps bodies from catching on the seams
//! between adjacent tiles.

use arcade2d_math::Rect;
use bitflags::bitflags;

use crate::body::{ArcadeBody, Body};
use crate::edges::Edge;

bitflags! {
    /// Set of tile faces
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Faces: u8 {
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
        const VERTICAL = Self::TOP.bits() | Self::BOTTOM.bits();
        const ALL = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

/// A colliding tile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    /// Column in the layer
    pub x: i32,
    /// Row in the layer
    pub y: i32,
    /// World-space rectangle
    pub bounds: Rect,
    /// Faces exposed to collision
    pub faces: Faces,
    /// Sides the tile collides on
    pub collides: Faces,
}

impl Tile {
    /// A solid tile colliding on every side with every face exposed
    pub fn solid(x: i32, y: i32, bounds: Rect) -> Self {
        Self {
            x,
            y,
            bounds,
            faces: Faces::ALL,
            collides: Faces::ALL,
        }
    }

    pub fn with_faces(mut self, faces: Faces) -> Self {
        self.faces = faces;
        self
    }

    pub fn with_collides(mut self, collides: Faces) -> Self {
        self.collides = collides;
        self
    }
}

/// Layer of tiles a body can collide against
pub trait TileSource {
    /// Colliding tiles whose bounds intersect `area`
    fn tiles_in_rect(&self, area: Rect) -> Vec<Tile>;
}

/// Faces of the tile at (x, y) that are not covered by a solid neighbour
pub fn interesting_faces<F>(is_solid: F, x: i32, y: i32) -> Faces
where
    F: Fn(i32, i32) -> bool,
{
    let mut faces = Faces::empty();
    if !is_solid(x, y - 1) {
        faces |= Faces::TOP;
    }
    if !is_solid(x, y + 1) {
        faces |= Faces::BOTTOM;
    }
    if !is_solid(x - 1, y) {
        faces |= Faces::LEFT;
    }
    if !is_solid(x + 1, y) {
        faces |= Faces::RIGHT;
    }
    faces
}

/// Strict rectangle overlap between a tile and a body
pub fn tile_intersects_body(bounds: &Rect, body: &Body) -> bool {
    bounds.intersects(&body.bounds())
}

/// Separate a body from a single tile
///
/// The axis the body moved further on is resolved first; when it moved on
/// both axes against a tile exposing both kinds of face, the axis with the
/// smaller penetration goes first. Returns whether the body was separated
/// (or, with custom separation, would have been).
pub fn separate_tile(body: &mut Body, tile: &Tile, tile_bias: f32) -> bool {
    let face_horizontal = tile.faces.intersects(Faces::HORIZONTAL);
    let face_vertical = tile.faces.intersects(Faces::VERTICAL);
    if !face_horizontal && !face_vertical {
        return false;
    }

    let bounds = tile.bounds;
    let (mut min_x, mut min_y) = (0.0, 1.0);
    let dx = body.delta_x();
    let dy = body.delta_y();

    if dx.abs() > dy.abs() {
        min_x = -1.0;
    } else if dx.abs() < dy.abs() {
        min_y = -1.0;
    }

    if dx != 0.0 && dy != 0.0 && face_horizontal && face_vertical {
        min_x = (body.left() - bounds.right())
            .abs()
            .min((body.right() - bounds.left()).abs());
        min_y = (body.top() - bounds.bottom())
            .abs()
            .min((body.bottom() - bounds.top()).abs());
    }

    let mut ox = 0.0;
    let mut oy = 0.0;

    if min_x < min_y {
        if face_horizontal {
            ox = tile_check_x(body, tile, tile_bias);
            if ox != 0.0 && !tile_intersects_body(&bounds, body) {
                return true;
            }
        }
        if face_vertical {
            oy = tile_check_y(body, tile, tile_bias);
        }
    } else {
        if face_vertical {
            oy = tile_check_y(body, tile, tile_bias);
            if oy != 0.0 && !tile_intersects_body(&bounds, body) {
                return true;
            }
        }
        if face_horizontal {
            ox = tile_check_x(body, tile, tile_bias);
        }
    }

    ox != 0.0 || oy != 0.0
}

/// Horizontal penetration into a tile, separating unless custom separation is set
pub fn tile_check_x(body: &mut Body, tile: &Tile, tile_bias: f32) -> f32 {
    let bounds = tile.bounds;
    let dx = body.delta_x();
    let mut ox = 0.0;

    if dx < 0.0
        && tile.collides.contains(Faces::RIGHT)
        && body.check_collision.allows(Edge::Left)
    {
        if tile.faces.contains(Faces::RIGHT) && body.left() < bounds.right() {
            ox = body.left() - bounds.right();
            if ox < -tile_bias {
                ox = 0.0;
            }
        }
    } else if dx > 0.0
        && tile.collides.contains(Faces::LEFT)
        && body.check_collision.allows(Edge::Right)
    {
        if tile.faces.contains(Faces::LEFT) && body.right() > bounds.left() {
            ox = body.right() - bounds.left();
            if ox > tile_bias {
                ox = 0.0;
            }
        }
    }

    if ox != 0.0 {
        if body.custom_separate_x {
            body.set_overlap_x(ox);
        } else {
            process_tile_separation_x(body, ox);
        }
    }
    ox
}

/// Vertical penetration into a tile, separating unless custom separation is set
pub fn tile_check_y(body: &mut Body, tile: &Tile, tile_bias: f32) -> f32 {
    let bounds = tile.bounds;
    let dy = body.delta_y();
    let mut oy = 0.0;

    if dy < 0.0
        && tile.collides.contains(Faces::BOTTOM)
        && body.check_collision.allows(Edge::Up)
    {
        if tile.faces.contains(Faces::BOTTOM) && body.top() < bounds.bottom() {
            oy = body.top() - bounds.bottom();
            if oy < -tile_bias {
                oy = 0.0;
            }
        }
    } else if dy > 0.0
        && tile.collides.contains(Faces::TOP)
        && body.check_collision.allows(Edge::Down)
    {
        if tile.faces.contains(Faces::TOP) && body.bottom() > bounds.top() {
            oy = body.bottom() - bounds.top();
            if oy > tile_bias {
                oy = 0.0;
            }
        }
    }

    if oy != 0.0 {
        if body.custom_separate_y {
            body.set_overlap_y(oy);
        } else {
            process_tile_separation_y(body, oy);
        }
    }
    oy
}

/// Push a body out of a tile horizontally by `x` and respond with its bounce
pub fn process_tile_separation_x(body: &mut Body, x: f32) {
    if x < 0.0 {
        body.blocked_mut().set(Edge::Left);
        body.touching_mut().set(Edge::Left);
    } else if x > 0.0 {
        body.blocked_mut().set(Edge::Right);
        body.touching_mut().set(Edge::Right);
    }

    body.translate(arcade2d_math::Vec2::new(-x, 0.0));
    body.refresh_delta();

    let bounce = body.bounce().x;
    body.velocity.x = if bounce == 0.0 { 0.0 } else { -body.velocity.x * bounce };
}

/// Push a body out of a tile vertically by `y` and respond with its bounce
pub fn process_tile_separation_y(body: &mut Body, y: f32) {
    if y < 0.0 {
        body.blocked_mut().set(Edge::Up);
        body.touching_mut().set(Edge::Up);
    } else if y > 0.0 {
        body.blocked_mut().set(Edge::Down);
        body.touching_mut().set(Edge::Down);
    }

    body.translate(arcade2d_math::Vec2::new(0.0, -y));
    body.refresh_delta();

    let bounce = body.bounce().y;
    body.velocity.y = if bounce == 0.0 { 0.0 } else { -body.velocity.y * bounce };
}
