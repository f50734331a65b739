//! Background grid for MPM simulation
//!
//! Sparse node storage over a 128x128 domain, with active-bounds tracking
//! and per-step zero / garbage-collection passes.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::math::{Real, Vector, inv_exact};

/// Grid dimensions (128x128 nodes)
pub const GRID_RESOLUTION: usize = 128;

#[derive(Clone)]
pub struct GridNode {
    /// Accumulates momentum during P2G, holds velocity after the grid update.
    pub velocity: Vector,
    pub mass: Real,
    /// Internal force accumulated from particle stresses.
    pub force: Vector,
}

impl GridNode {
    #[inline(always)]
    pub fn zeroed() -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: 0.0,
            force: Vec2::ZERO,
        }
    }

    #[inline(always)]
    pub fn zero(&mut self) {
        self.velocity = Vec2::ZERO;
        self.mass = 0.0;
        self.force = Vec2::ZERO;
    }
}

pub struct Grid {
    nodes: HashMap<(i32, i32), GridNode>,
    active_bounds: Option<(IVec2, IVec2)>, // min, max for optimization
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            active_bounds: None,
        }
    }

    /// Uniform node spacing, in world units.
    #[inline(always)]
    pub fn cell_width(&self) -> Real {
        1.0
    }

    /// Get node at coordinates (read-only)
    pub fn get_node(&self, coord: IVec2) -> Option<&GridNode> {
        self.nodes.get(&(coord.x, coord.y))
    }

    /// Get node at coordinates, creating if needed
    pub fn get_node_mut(&mut self, coord: IVec2) -> &mut GridNode {
        if let Some((min, max)) = &mut self.active_bounds {
            min.x = min.x.min(coord.x);
            min.y = min.y.min(coord.y);
            max.x = max.x.max(coord.x);
            max.y = max.y.max(coord.y);
        } else {
            self.active_bounds = Some((coord, coord));
        }

        self.nodes
            .entry((coord.x, coord.y))
            .or_insert_with(GridNode::zeroed)
    }

    /// Iterator over active nodes (coordinates and node data)
    pub fn iter_active_nodes(&self) -> impl Iterator<Item = ((i32, i32), &GridNode)> {
        self.nodes.iter().map(|(&coords, node)| (coords, node))
    }

    /// Mutable iterator over active nodes
    pub fn iter_active_nodes_mut(&mut self) -> impl Iterator<Item = ((i32, i32), &mut GridNode)> {
        self.nodes.iter_mut().map(|(&coords, node)| (coords, node))
    }

    /// Zero all active nodes
    pub fn zero_active_nodes(&mut self) {
        for node in self.nodes.values_mut() {
            node.zero();
        }
    }

    /// Get count of active nodes
    pub fn active_node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn active_bounds(&self) -> Option<(IVec2, IVec2)> {
        self.active_bounds
    }

    /// Clear empty nodes (garbage collection)
    pub fn cleanup_empty_nodes(&mut self) {
        self.nodes.retain(|_, node| node.mass > 0.0);

        // Recalculate bounds
        if self.nodes.is_empty() {
            self.active_bounds = None;
        } else {
            let mut min = IVec2::new(i32::MAX, i32::MAX);
            let mut max = IVec2::new(i32::MIN, i32::MIN);

            for &(x, y) in self.nodes.keys() {
                min.x = min.x.min(x);
                min.y = min.y.min(y);
                max.x = max.x.max(x);
                max.y = max.y.max(y);
            }

            self.active_bounds = Some((min, max));
        }
    }

    /// Total mass currently held on the grid.
    pub fn total_mass(&self) -> Real {
        self.nodes.values().map(|node| node.mass).sum()
    }

    /// Divide accumulated momentum by mass and integrate forces and gravity,
    /// then clamp node velocities at the domain walls.
    pub fn integrate_velocities(&mut self, gravity: Vector, dt: Real, boundary: BoundaryHandling) {
        for (coords, node) in self.iter_active_nodes_mut() {
            if node.mass > 0.0 {
                let inv_mass = inv_exact(node.mass);
                node.velocity *= inv_mass;
                node.velocity += (node.force * inv_mass + gravity) * dt;

                let coord = IVec2::new(coords.0, coords.1);
                apply_boundary_conditions(node, coord, boundary);
            }
        }
    }
}

// Coordinate-based bounds checking (sparse grid compatible)
#[inline(always)]
pub fn is_valid_grid_coord(coord: IVec2) -> bool {
    coord.x >= 0
        && coord.x < GRID_RESOLUTION as i32
        && coord.y >= 0
        && coord.y < GRID_RESOLUTION as i32
}

// Boundary handling modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryHandling {
    Stick, // Particles stick to walls
    Slip,  // Particles slide along walls
    None,  // No boundary (open world)
}

// Coordinate-based boundary conditions at the domain walls
#[inline(always)]
pub fn apply_boundary_conditions(node: &mut GridNode, coord: IVec2, boundary_type: BoundaryHandling) {
    let near_x = coord.x < 2 || coord.x > GRID_RESOLUTION as i32 - 3;
    let near_y = coord.y < 2 || coord.y > GRID_RESOLUTION as i32 - 3;

    if !(near_x || near_y) {
        return;
    }

    match boundary_type {
        BoundaryHandling::Stick => {
            node.velocity = Vec2::ZERO;
        }
        BoundaryHandling::Slip => {
            if near_x {
                node.velocity.x = 0.0; // Allow Y sliding
            }
            if near_y {
                node.velocity.y = 0.0; // Allow X sliding
            }
        }
        BoundaryHandling::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_are_created_on_write_and_tracked_in_bounds() {
        let mut grid = Grid::new();
        assert_eq!(grid.active_node_count(), 0);
        assert!(grid.active_bounds().is_none());

        grid.get_node_mut(IVec2::new(3, 7)).mass = 1.0;
        grid.get_node_mut(IVec2::new(5, 2)).mass = 2.0;

        assert_eq!(grid.active_node_count(), 2);
        let (min, max) = grid.active_bounds().unwrap();
        assert_eq!(min, IVec2::new(3, 2));
        assert_eq!(max, IVec2::new(5, 7));
    }

    #[test]
    fn cleanup_drops_massless_nodes() {
        let mut grid = Grid::new();
        grid.get_node_mut(IVec2::new(1, 1)).mass = 1.0;
        grid.get_node_mut(IVec2::new(2, 2)); // stays massless

        grid.cleanup_empty_nodes();
        assert_eq!(grid.active_node_count(), 1);
        assert!(grid.get_node(IVec2::new(2, 2)).is_none());
    }

    #[test]
    fn zero_clears_node_state_but_keeps_nodes() {
        let mut grid = Grid::new();
        let node = grid.get_node_mut(IVec2::new(4, 4));
        node.mass = 2.0;
        node.velocity = Vec2::new(1.0, -1.0);
        node.force = Vec2::new(0.5, 0.5);

        grid.zero_active_nodes();
        let node = grid.get_node(IVec2::new(4, 4)).unwrap();
        assert_eq!(node.mass, 0.0);
        assert_eq!(node.velocity, Vec2::ZERO);
        assert_eq!(node.force, Vec2::ZERO);
    }

    #[test]
    fn slip_walls_zero_only_the_normal_component() {
        let mut node = GridNode::zeroed();
        node.mass = 1.0;
        node.velocity = Vec2::new(3.0, -2.0);
        apply_boundary_conditions(&mut node, IVec2::new(1, 50), BoundaryHandling::Slip);
        assert_eq!(node.velocity, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn integrate_velocities_applies_gravity() {
        let mut grid = Grid::new();
        let node = grid.get_node_mut(IVec2::new(50, 50));
        node.mass = 2.0;
        node.velocity = Vec2::new(2.0, 0.0); // momentum, not velocity, pre-update

        grid.integrate_velocities(Vec2::new(0.0, -10.0), 0.1, BoundaryHandling::None);
        let node = grid.get_node(IVec2::new(50, 50)).unwrap();
        assert!((node.velocity.x - 1.0).abs() < 1e-6);
        assert!((node.velocity.y + 1.0).abs() < 1e-6);
    }
}
