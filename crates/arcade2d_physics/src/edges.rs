//! Per-edge contact state
//!
//! Bodies track which of their four edges are touching something, which are
//! blocked by an immovable obstacle, and which are allowed to collide at all.
//! Each is a small struct with one named flag per edge.

use serde::{Deserialize, Serialize};

/// One of the four edges of an axis-aligned body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Up,
    Down,
    Left,
    Right,
}

/// Contact flags for one step: `touching`, `was_touching` and `blocked`
///
/// `none` is true exactly when no edge flag is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeState {
    pub none: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl EdgeState {
    /// No edge in contact
    pub const CLEAR: Self = Self {
        none: true,
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Mark an edge as in contact
    pub fn set(&mut self, edge: Edge) {
        self.none = false;
        match edge {
            Edge::Up => self.up = true,
            Edge::Down => self.down = true,
            Edge::Left => self.left = true,
            Edge::Right => self.right = true,
        }
    }

    /// Check a single edge
    pub fn get(&self, edge: Edge) -> bool {
        match edge {
            Edge::Up => self.up,
            Edge::Down => self.down,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    /// Reset to [`EdgeState::CLEAR`]
    pub fn clear(&mut self) {
        *self = Self::CLEAR;
    }

    /// True if any edge is set
    pub fn any(&self) -> bool {
        !self.none
    }
}

impl Default for EdgeState {
    fn default() -> Self {
        Self::CLEAR
    }
}

/// Which edges may collide
///
/// Used both per body and for the world bounds. `none` disables collision
/// entirely regardless of the edge flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionEdges {
    pub none: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionEdges {
    /// All four edges collide
    pub const ALL: Self = Self {
        none: false,
        up: true,
        down: true,
        left: true,
        right: true,
    };

    /// Build from individual edge flags
    pub const fn new(left: bool, right: bool, up: bool, down: bool) -> Self {
        Self {
            none: false,
            up,
            down,
            left,
            right,
        }
    }

    /// Check a single edge, taking `none` into account
    pub fn allows(&self, edge: Edge) -> bool {
        if self.none {
            return false;
        }
        match edge {
            Edge::Up => self.up,
            Edge::Down => self.down,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }
}

impl Default for CollisionEdges {
    fn default() -> Self {
        Self::ALL
    }
}

/// Direction the body last moved in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_state_set_and_clear() {
        let mut state = EdgeState::default();
        assert!(state.none);
        assert!(!state.any());

        state.set(Edge::Down);
        assert!(!state.none);
        assert!(state.down);
        assert!(state.get(Edge::Down));
        assert!(!state.get(Edge::Up));

        state.clear();
        assert_eq!(state, EdgeState::CLEAR);
    }

    #[test]
    fn test_collision_edges_none_overrides() {
        let mut edges = CollisionEdges::ALL;
        assert!(edges.allows(Edge::Left));

        edges.none = true;
        assert!(!edges.allows(Edge::Left));
        assert!(!edges.allows(Edge::Up));
    }

    #[test]
    fn test_collision_edges_new() {
        let edges = CollisionEdges::new(true, false, true, false);
        assert!(edges.allows(Edge::Left));
        assert!(!edges.allows(Edge::Right));
        assert!(edges.allows(Edge::Up));
        assert!(!edges.allows(Edge::Down));
    }
}
