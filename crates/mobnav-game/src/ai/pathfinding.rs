//! Bounded breadth-first grid search plus shared heading/distance helpers.

use std::collections::{HashSet, VecDeque};

use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::grid::{Cell, GridClassifier};

/// Neighbor offsets: the four axis-aligned horizontal moves, each at dy -1, 0, +1.
pub const NEIGHBOR_OFFSETS: [(i32, i32, i32); 12] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
    (1, 1, 0),
    (-1, 1, 0),
    (0, 1, 1),
    (0, 1, -1),
    (1, -1, 0),
    (-1, -1, 0),
    (0, -1, 1),
    (0, -1, -1),
];

/// Limits for escalated path searches.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Most cells a single search may visit.
    pub node_budget: usize,
    /// Ticks without progress before a chasing mob runs a search.
    pub stuck_ticks: u64,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            node_budget: 512,
            stuck_ticks: 40,
        }
    }
}

/// Why a search produced no path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoPath {
    #[error("node budget of {budget} exhausted after visiting {visited} cells")]
    BudgetExhausted { visited: usize, budget: usize },

    #[error("goal unreachable: frontier emptied after {visited} cells")]
    Unreachable { visited: usize },
}

/// A cell and the index of its predecessor in the search arena.
struct SearchNode {
    cell: Cell,
    parent: Option<usize>,
}

/// Find a path of standable cells from `start` to `goal`, both inclusive.
///
/// The start cell is expanded even if it is not standable. At most
/// `node_budget` distinct cells are ever visited; hitting the budget fails the
/// search instead of returning a partial path.
pub fn find_path(
    grid: &GridClassifier<'_>,
    start: Cell,
    goal: Cell,
    node_budget: usize,
) -> Result<Vec<Cell>, NoPath> {
    if node_budget == 0 {
        return Err(NoPath::BudgetExhausted {
            visited: 0,
            budget: 0,
        });
    }

    let mut nodes = vec![SearchNode {
        cell: start,
        parent: None,
    }];
    let mut visited = HashSet::from([start]);
    let mut frontier = VecDeque::from([0usize]);

    while let Some(index) = frontier.pop_front() {
        let cell = nodes[index].cell;
        if cell == goal {
            return Ok(reconstruct(&nodes, index));
        }

        for (dx, dy, dz) in NEIGHBOR_OFFSETS {
            let next = cell.offset(dx, dy, dz);
            if visited.contains(&next) || !grid.standable(next) {
                continue;
            }
            if visited.len() >= node_budget {
                debug!(?start, ?goal, node_budget, "path search exhausted its budget");
                return Err(NoPath::BudgetExhausted {
                    visited: visited.len(),
                    budget: node_budget,
                });
            }
            visited.insert(next);
            nodes.push(SearchNode {
                cell: next,
                parent: Some(index),
            });
            frontier.push_back(nodes.len() - 1);
        }
    }

    debug!(?start, ?goal, visited = visited.len(), "path search frontier emptied");
    Err(NoPath::Unreachable {
        visited: visited.len(),
    })
}

fn reconstruct(nodes: &[SearchNode], mut index: usize) -> Vec<Cell> {
    let mut path = vec![nodes[index].cell];
    while let Some(parent) = nodes[index].parent {
        path.push(nodes[parent].cell);
        index = parent;
    }
    path.reverse();
    path
}

/// Steering heading in degrees for a horizontal direction.
///
/// `atan2(dz, dx)` shifted by -90 so that 0 faces +Z and -90 faces +X.
pub fn heading_degrees(dx: f32, dz: f32) -> f32 {
    dz.atan2(dx).to_degrees() - 90.0
}

/// Compute the yaw angle (0..360 degrees) from one position facing another.
///
/// Convention: 0 = south (+Z), 90 = west (-X), 180 = north (-Z), 270 = east (+X).
pub fn yaw_toward(from_x: f32, from_z: f32, to_x: f32, to_z: f32) -> f32 {
    normalize_yaw(heading_degrees(to_x - from_x, to_z - from_z))
}

/// Wrap a yaw in degrees into `0..360`.
pub fn normalize_yaw(yaw: f32) -> f32 {
    let wrapped = yaw.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit horizontal direction for a yaw in degrees (inverse of [`heading_degrees`]).
pub fn direction_from_yaw(yaw: f32) -> Vec3 {
    let radians = (yaw + 90.0).to_radians();
    Vec3::new(radians.cos(), 0.0, radians.sin())
}

/// Distance between two positions in the XZ plane.
pub fn distance_xz(x1: f32, z1: f32, x2: f32, z2: f32) -> f32 {
    let dx = x2 - x1;
    let dz = z2 - z1;
    (dx * dx + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::grid::test_support::*;

    fn assert_connected(path: &[Cell]) {
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let horizontal = (a.x - b.x).abs() + (a.z - b.z).abs();
            assert_eq!(horizontal, 1, "{a:?} -> {b:?} is not one horizontal step");
            assert!((a.y - b.y).abs() <= 1, "{a:?} -> {b:?} changes Y by more than 1");
        }
    }

    #[test]
    fn flat_path_is_shortest_in_steps() {
        let (world, registry) = flat_world();
        let grid = GridClassifier::new(&world, &registry);
        let start = Cell::new(0, 0, 0);
        let goal = Cell::new(3, 0, 4);
        let path = find_path(&grid, start, goal, 1000).unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len() - 1, 7);
        assert_connected(&path);
    }

    #[test]
    fn search_is_deterministic() {
        let (world, registry) = flat_world();
        let grid = GridClassifier::new(&world, &registry);
        let a = find_path(&grid, Cell::new(-5, 0, 2), Cell::new(6, 0, -3), 2000).unwrap();
        let b = find_path(&grid, Cell::new(-5, 0, 2), Cell::new(6, 0, -3), 2000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn start_equals_goal() {
        let (world, registry) = flat_world();
        let grid = GridClassifier::new(&world, &registry);
        let path = find_path(&grid, Cell::new(1, 0, 1), Cell::new(1, 0, 1), 1).unwrap();
        assert_eq!(path, vec![Cell::new(1, 0, 1)]);
    }

    #[test]
    fn start_need_not_be_standable() {
        let (world, registry) = flat_world();
        let grid = GridClassifier::new(&world, &registry);
        // Mob hovering one block above the surface
        let start = Cell::new(0, 1, 0);
        assert!(!grid.standable(start));
        let path = find_path(&grid, start, Cell::new(2, 0, 0), 500).unwrap();
        assert_eq!(path.len() - 1, 2);
        assert_eq!(path[1], Cell::new(1, 0, 0));
    }

    #[test]
    fn climbs_single_steps() {
        let (mut world, registry) = flat_world();
        // A two-step staircase along +X
        world.set_block(1, 0, 0, STONE).unwrap();
        world.fill((2, 0, 0), (2, 1, 0), STONE).unwrap();
        let grid = GridClassifier::new(&world, &registry);
        let path = find_path(&grid, Cell::new(0, 0, 0), Cell::new(2, 2, 0), 500).unwrap();
        assert_eq!(
            path,
            vec![Cell::new(0, 0, 0), Cell::new(1, 1, 0), Cell::new(2, 2, 0)]
        );
    }

    #[test]
    fn routes_around_wall() {
        let (mut world, registry) = flat_world();
        // Two-high wall at x = 2 spanning z = -3..=3
        world.fill((2, 0, -3), (2, 1, 3), STONE).unwrap();
        let grid = GridClassifier::new(&world, &registry);
        let path = find_path(&grid, Cell::new(0, 0, 0), Cell::new(4, 0, 0), 5000).unwrap();
        assert_connected(&path);
        assert!(path.iter().all(|c| !(c.x == 2 && (-3..=3).contains(&c.z))));
        // Around the wall end: 4 (x) + 2 * 4 (z detour out and back)
        assert_eq!(path.len() - 1, 12);
    }

    #[test]
    fn walled_off_goal_fails_within_budget() {
        let (mut world, registry) = flat_world();
        // Enclose the goal at (20, 0, 0) in a sealed stone box
        world.fill((18, 0, -2), (22, 2, 2), STONE).unwrap();
        world.clear((19, 0, -1), (21, 1, 1)).unwrap();
        let grid = GridClassifier::new(&world, &registry);
        let result = find_path(&grid, Cell::new(0, 0, 0), Cell::new(20, 0, 0), 50);
        assert_eq!(
            result,
            Err(NoPath::BudgetExhausted {
                visited: 50,
                budget: 50
            })
        );
    }

    #[test]
    fn visits_never_exceed_budget_on_open_grid() {
        let (world, registry) = flat_world();
        let grid = GridClassifier::new(&world, &registry);
        // Goal far outside the loaded terrain: the search can only run out of budget
        for budget in [1, 7, 100, 1000, 4000] {
            match find_path(&grid, Cell::new(0, 0, 0), Cell::new(500, 0, 0), budget) {
                Err(NoPath::BudgetExhausted { visited, budget: b }) => {
                    assert_eq!(b, budget);
                    assert!(visited <= budget, "visited {visited} with budget {budget}");
                }
                other => panic!("budget {budget}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn enclosed_start_empties_frontier() {
        let (mut world, registry) = flat_world();
        world.fill((-1, 0, -1), (1, 2, 1), STONE).unwrap();
        world.set_block(0, 0, 0, 0).unwrap();
        world.set_block(0, 1, 0, 0).unwrap();
        let grid = GridClassifier::new(&world, &registry);
        let result = find_path(&grid, Cell::new(0, 0, 0), Cell::new(5, 0, 0), 500);
        assert_eq!(result, Err(NoPath::Unreachable { visited: 1 }));
    }

    #[test]
    fn zero_budget_fails_immediately() {
        let (world, registry) = flat_world();
        let grid = GridClassifier::new(&world, &registry);
        let result = find_path(&grid, Cell::new(0, 0, 0), Cell::new(0, 0, 0), 0);
        assert_eq!(
            result,
            Err(NoPath::BudgetExhausted {
                visited: 0,
                budget: 0
            })
        );
    }

    #[test]
    fn yaw_south() {
        // Facing +Z = yaw 0 (south)
        let yaw = yaw_toward(0.0, 0.0, 0.0, 10.0);
        assert!(yaw.abs() < 0.1 || (yaw - 360.0).abs() < 0.1);
    }

    #[test]
    fn yaw_west() {
        let yaw = yaw_toward(0.0, 0.0, -10.0, 0.0);
        assert!((yaw - 90.0).abs() < 0.1);
    }

    #[test]
    fn yaw_north() {
        let yaw = yaw_toward(0.0, 0.0, 0.0, -10.0);
        assert!((yaw - 180.0).abs() < 0.1);
    }

    #[test]
    fn yaw_east() {
        let yaw = yaw_toward(0.0, 0.0, 10.0, 0.0);
        assert!((yaw - 270.0).abs() < 0.1);
    }

    #[test]
    fn heading_toward_positive_x() {
        assert!((heading_degrees(10.0, 0.0) + 90.0).abs() < 0.001);
    }

    #[test]
    fn direction_inverts_heading() {
        for (dx, dz) in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.6, -0.8)] {
            let dir = direction_from_yaw(heading_degrees(dx, dz));
            assert!((dir.x - dx).abs() < 0.001, "dx {dx} -> {dir:?}");
            assert!((dir.z - dz).abs() < 0.001, "dz {dz} -> {dir:?}");
        }
    }

    #[test]
    fn normalize_wraps_into_range() {
        assert!((normalize_yaw(-90.0) - 270.0).abs() < 0.001);
        assert!((normalize_yaw(450.0) - 90.0).abs() < 0.001);
        assert_eq!(normalize_yaw(0.0), 0.0);
        let tiny = normalize_yaw(-1e-6);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn distance_xz_basic() {
        assert!((distance_xz(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 0.001);
        assert!(distance_xz(1.0, 1.0, 1.0, 1.0).abs() < 0.001);
    }
}
