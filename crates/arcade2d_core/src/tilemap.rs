//! Grid tile layers
//!
//! A Tilemap stores tile indices on a regular grid and exposes the colliding
//! ones to the physics world through [`TileSource`].

use std::collections::HashSet;

use arcade2d_math::{Rect, Vec2};
use arcade2d_physics::{interesting_faces, Tile, TileSource};
use serde::{Deserialize, Serialize};

/// Index of an empty cell
pub const EMPTY_TILE: i32 = -1;

/// A rectangular grid of tiles
#[derive(Clone, Debug)]
pub struct Tilemap {
    /// World position of the top-left corner of cell (0, 0)
    pub origin: Vec2,
    tile_width: f32,
    tile_height: f32,
    width: i32,
    height: i32,
    tiles: Vec<i32>,
    collision: HashSet<i32>,
}

impl Tilemap {
    /// Create an empty map of `width` x `height` cells
    pub fn new(width: usize, height: usize, tile_width: f32, tile_height: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            tile_width: tile_width.max(1.0),
            tile_height: tile_height.max(1.0),
            width: width as i32,
            height: height as i32,
            tiles: vec![EMPTY_TILE; width * height],
            collision: HashSet::new(),
        }
    }

    /// Build a map from rows of tile indices; short rows are padded with empty cells
    pub fn from_rows(rows: &[Vec<i32>], tile_width: f32, tile_height: f32) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut map = Self::new(width, rows.len(), tile_width, tile_height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &index) in row.iter().enumerate() {
                map.set_tile(x as i32, y as i32, index);
            }
        }
        map
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn tile_size(&self) -> Vec2 {
        Vec2::new(self.tile_width, self.tile_height)
    }

    fn cell(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Set the tile index at a cell; returns false outside the map
    pub fn set_tile(&mut self, x: i32, y: i32, index: i32) -> bool {
        match self.cell(x, y) {
            Some(cell) => {
                self.tiles[cell] = index.max(EMPTY_TILE);
                true
            }
            None => false,
        }
    }

    /// Clear a cell
    pub fn remove_tile(&mut self, x: i32, y: i32) -> bool {
        self.set_tile(x, y, EMPTY_TILE)
    }

    /// Tile index at a cell, `None` for empty or out-of-range cells
    pub fn tile_at(&self, x: i32, y: i32) -> Option<i32> {
        self.cell(x, y)
            .map(|cell| self.tiles[cell])
            .filter(|&index| index != EMPTY_TILE)
    }

    /// Mark tile indices as colliding
    pub fn set_collision(&mut self, indices: impl IntoIterator<Item = i32>) {
        self.collision.extend(indices);
    }

    /// Mark every index in `start..=stop` as colliding
    pub fn set_collision_between(&mut self, start: i32, stop: i32) {
        self.collision.extend(start..=stop);
    }

    pub fn clear_collision(&mut self) {
        self.collision.clear();
    }

    /// Whether the cell holds a colliding tile
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y)
            .map_or(false, |index| self.collision.contains(&index))
    }

    /// Number of colliding tiles in the map
    pub fn solid_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|index| self.collision.contains(index))
            .count()
    }

    /// Cell containing a world point
    pub fn world_to_tile(&self, point: Vec2) -> (i32, i32) {
        let local = point - self.origin;
        (
            (local.x / self.tile_width).floor() as i32,
            (local.y / self.tile_height).floor() as i32,
        )
    }

    /// World rectangle covered by a cell
    pub fn tile_bounds(&self, x: i32, y: i32) -> Rect {
        Rect::new(
            self.origin.x + x as f32 * self.tile_width,
            self.origin.y + y as f32 * self.tile_height,
            self.tile_width,
            self.tile_height,
        )
    }

    /// World rectangle covered by the whole map
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.width as f32 * self.tile_width,
            self.height as f32 * self.tile_height,
        )
    }
}

impl TileSource for Tilemap {
    fn tiles_in_rect(&self, area: Rect) -> Vec<Tile> {
        let (x0, y0) = self.world_to_tile(area.min());
        let (x1, y1) = self.world_to_tile(area.max());
        let (x0, x1) = (x0.max(0), x1.min(self.width - 1));
        let (y0, y1) = (y0.max(0), y1.min(self.height - 1));

        let mut tiles = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                if !self.is_solid(x, y) {
                    continue;
                }
                let bounds = self.tile_bounds(x, y);
                if !bounds.intersects(&area) {
                    continue;
                }
                let faces = interesting_faces(|tx, ty| self.is_solid(tx, ty), x, y);
                tiles.push(Tile::solid(x, y, bounds).with_faces(faces));
            }
        }
        tiles
    }
}

/// Serializable tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilemapTemplate {
    pub tile_width: f32,
    pub tile_height: f32,
    #[serde(default)]
    pub origin: Vec2,
    /// Tile indices, one row per entry; -1 is empty
    pub rows: Vec<Vec<i32>>,
    /// Colliding indices; empty means every non-empty tile collides
    #[serde(default)]
    pub collision: Vec<i32>,
}

impl TilemapTemplate {
    pub fn to_tilemap(&self) -> Tilemap {
        let mut map =
            Tilemap::from_rows(&self.rows, self.tile_width, self.tile_height).with_origin(self.origin);
        if self.collision.is_empty() {
            let used: HashSet<i32> = self
                .rows
                .iter()
                .flatten()
                .copied()
                .filter(|&index| index != EMPTY_TILE)
                .collect();
            map.set_collision(used);
        } else {
            map.set_collision(self.collision.iter().copied());
        }
        map
    }
}
