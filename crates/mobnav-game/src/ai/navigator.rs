//! Per-mob steering controller.
//!
//! Converts a navigation goal into a heading plus forward/jump intent each
//! tick. Walks straight at the goal when the line of sight is clear and no
//! drop lies ahead, otherwise follows a greedily chosen neighboring cell.

use bevy_ecs::prelude::Component;
use glam::Vec3;
use serde::Deserialize;
use tracing::trace;

use super::grid::{Cell, GridClassifier};
use super::pathfinding::{distance_xz, heading_degrees};

/// Tunable steering constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Horizontal distance at which the goal counts as reached.
    pub arrival_threshold: f32,
    /// Horizontal distance at which a cached waypoint counts as reached.
    pub waypoint_tolerance: f32,
    /// Sample points along the eye-to-goal line of sight.
    pub line_of_sight_samples: u32,
    /// How far ahead the drop probe looks (blocks).
    pub probe_distance: f32,
    /// Spacing between drop probe points (blocks).
    pub probe_step: f32,
    /// Largest drop (in blocks) the direct approach may walk off.
    pub max_safe_drop: i32,
    /// Cells scanned below a probe point before the drop counts as bottomless.
    pub drop_scan_depth: i32,
    /// Distance ahead at which a step-up obstruction triggers a jump.
    pub jump_probe_distance: f32,
    /// Goal height above the agent (blocks) at which climbing is rewarded.
    pub high_goal_threshold: f32,
    /// Score bonus for climbing toward a high goal.
    pub climb_reward: f32,
    /// Score penalty for climbing otherwise.
    pub climb_penalty: f32,
    /// Score penalty for descending.
    pub descend_penalty: f32,
    /// Score penalty for descending while the goal is high above.
    pub descend_penalty_goal_above: f32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 0.5,
            waypoint_tolerance: 0.35,
            line_of_sight_samples: 12,
            probe_distance: 1.0,
            probe_step: 0.5,
            max_safe_drop: 1,
            drop_scan_depth: 4,
            jump_probe_distance: 1.0,
            high_goal_threshold: 2.0,
            climb_reward: 2.0,
            climb_penalty: 0.5,
            descend_penalty: 1.0,
            descend_penalty_goal_above: 3.0,
        }
    }
}

/// The agent state steering reads. Positions are feet positions.
#[derive(Debug, Clone, Copy)]
pub struct SteeringAgent {
    pub position: Vec3,
    pub eye_height: f32,
}

/// How the last steering result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteeringMode {
    /// No goal set.
    #[default]
    Idle,
    /// Goal reached this call; the goal has been cleared.
    Arrived,
    /// Walking straight at the goal.
    Direct,
    /// Walking toward a greedy local waypoint.
    Waypoint,
    /// No usable waypoint; pushing straight at the goal anyway.
    Fallback,
    /// Unsafe drop ahead and no usable waypoint; holding position.
    Halted,
}

/// Verdict on walking straight at the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectApproach {
    Clear,
    /// Eye-level line of sight is blocked.
    Obstructed,
    /// The ground ahead drops more than `max_safe_drop`.
    UnsafeDrop,
}

/// Desired orientation and movement intent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringResult {
    pub mode: SteeringMode,
    /// Target yaw in degrees, `None` when the agent should keep its heading.
    pub yaw: Option<f32>,
    pub forward: bool,
    pub jump: bool,
}

impl SteeringResult {
    fn at_rest(mode: SteeringMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn is_moving(&self) -> bool {
        self.forward
    }
}

/// Steering controller owning a single navigation goal and a cached waypoint.
#[derive(Component, Debug, Default)]
pub struct PathNavigator {
    config: NavigatorConfig,
    goal: Option<Vec3>,
    waypoint: Option<Vec3>,
    last_mode: SteeringMode,
}

impl PathNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Set a new goal. Any cached waypoint belonged to the old goal and is dropped.
    pub fn set_goal(&mut self, goal: Vec3) {
        self.goal = Some(goal);
        self.waypoint = None;
    }

    /// Cancel navigation.
    pub fn clear(&mut self) {
        self.goal = None;
        self.waypoint = None;
    }

    pub fn has_goal(&self) -> bool {
        self.goal.is_some()
    }

    pub fn goal(&self) -> Option<Vec3> {
        self.goal
    }

    pub fn waypoint(&self) -> Option<Vec3> {
        self.waypoint
    }

    /// Mode of the most recent [`PathNavigator::steer`] call.
    pub fn last_mode(&self) -> SteeringMode {
        self.last_mode
    }

    /// Compute this tick's steering. Never touches the agent itself.
    pub fn steer(&mut self, agent: &SteeringAgent, grid: &GridClassifier<'_>) -> SteeringResult {
        let result = self.compute(agent, grid);
        self.last_mode = result.mode;
        trace!(
            mode = ?result.mode,
            yaw = ?result.yaw,
            jump = result.jump,
            waypoint = ?self.waypoint,
            "steer"
        );
        result
    }

    fn compute(&mut self, agent: &SteeringAgent, grid: &GridClassifier<'_>) -> SteeringResult {
        let Some(goal) = self.goal else {
            return SteeringResult::at_rest(SteeringMode::Idle);
        };
        let pos = agent.position;

        if distance_xz(pos.x, pos.z, goal.x, goal.z) <= self.config.arrival_threshold {
            self.clear();
            return SteeringResult::at_rest(SteeringMode::Arrived);
        }

        let approach = self.direct_approach(agent, goal, grid);
        if approach == DirectApproach::Clear {
            self.waypoint = None;
            return self.steer_toward(pos, goal, grid, SteeringMode::Direct);
        }

        let waypoint_reached = self
            .waypoint
            .map(|w| distance_xz(pos.x, pos.z, w.x, w.z) <= self.config.waypoint_tolerance)
            .unwrap_or(true);
        if waypoint_reached {
            self.waypoint = self.pick_waypoint(pos, goal, grid);
        }

        match (self.waypoint, approach) {
            (Some(waypoint), _) => self.steer_toward(pos, waypoint, grid, SteeringMode::Waypoint),
            // Never push off a ledge the probe just found
            (None, DirectApproach::UnsafeDrop) => SteeringResult {
                mode: SteeringMode::Halted,
                yaw: Some(heading_degrees(goal.x - pos.x, goal.z - pos.z)),
                forward: false,
                jump: false,
            },
            (None, _) => self.steer_toward(pos, goal, grid, SteeringMode::Fallback),
        }
    }

    /// Whether the agent may walk straight at the goal. A drop ahead wins over
    /// a blocked line of sight.
    fn direct_approach(
        &self,
        agent: &SteeringAgent,
        goal: Vec3,
        grid: &GridClassifier<'_>,
    ) -> DirectApproach {
        if self.unsafe_drop_ahead(agent.position, goal, grid) {
            return DirectApproach::UnsafeDrop;
        }
        let eye = agent.position + Vec3::Y * agent.eye_height;
        let target_eye = goal + Vec3::Y * agent.eye_height;
        let samples = self.config.line_of_sight_samples.max(1);
        for i in 1..=samples {
            let cell = Cell::containing(eye.lerp(target_eye, i as f32 / samples as f32));
            if grid.solid(cell) || grid.solid(cell.above()) {
                return DirectApproach::Obstructed;
            }
        }
        DirectApproach::Clear
    }

    /// Probe the ground between the agent and (at most) the goal for drops
    /// deeper than `max_safe_drop`.
    fn unsafe_drop_ahead(&self, pos: Vec3, goal: Vec3, grid: &GridClassifier<'_>) -> bool {
        let Some(dir) = horizontal_direction(pos, goal) else {
            return false;
        };
        let reach = self
            .config
            .probe_distance
            .min(distance_xz(pos.x, pos.z, goal.x, goal.z));
        let step = self.config.probe_step.max(0.1);
        let feet_y = pos.y.floor() as i32;

        let mut along = step;
        while along <= reach + f32::EPSILON {
            let probe = pos + dir * along;
            let cell = Cell::new(probe.x.floor() as i32, feet_y, probe.z.floor() as i32);
            if self.drop_below(cell, grid) > self.config.max_safe_drop {
                return true;
            }
            along += step;
        }
        false
    }

    /// Empty cells between `cell` (feet level) and the first solid cell below.
    /// A solid `cell` is a step up, not a drop.
    fn drop_below(&self, cell: Cell, grid: &GridClassifier<'_>) -> i32 {
        if grid.solid(cell) {
            return 0;
        }
        (0..self.config.drop_scan_depth)
            .find(|depth| grid.solid(cell.offset(0, -1 - depth, 0)))
            .unwrap_or(i32::MAX)
    }

    /// Best standable neighbor of the agent's cell by distance-to-goal plus a
    /// vertical transition term.
    fn pick_waypoint(&self, pos: Vec3, goal: Vec3, grid: &GridClassifier<'_>) -> Option<Vec3> {
        let origin = Cell::containing(pos);
        let goal_cell = Cell::containing(goal);
        let goal_above = goal.y - pos.y >= self.config.high_goal_threshold;

        let mut best: Option<(f32, Cell)> = None;
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                for dy in [0, 1, -1] {
                    let candidate = origin.offset(dx, dy, dz);
                    if !grid.standable(candidate) {
                        continue;
                    }
                    let score = candidate.manhattan(goal_cell) as f32
                        + self.vertical_penalty(dy, goal_above);
                    if best.map_or(true, |(best_score, _)| score < best_score) {
                        best = Some((score, candidate));
                    }
                }
            }
        }
        best.map(|(_, cell)| cell.floor_center())
    }

    fn vertical_penalty(&self, dy: i32, goal_above: bool) -> f32 {
        match (dy.signum(), goal_above) {
            (0, _) => 0.0,
            (1, true) => -self.config.climb_reward,
            (1, false) => self.config.climb_penalty,
            (_, true) => self.config.descend_penalty_goal_above,
            (_, false) => self.config.descend_penalty,
        }
    }

    fn steer_toward(
        &self,
        pos: Vec3,
        target: Vec3,
        grid: &GridClassifier<'_>,
        mode: SteeringMode,
    ) -> SteeringResult {
        let jump = horizontal_direction(pos, target)
            .map(|dir| self.step_up_ahead(pos, dir, grid))
            .unwrap_or(false);
        SteeringResult {
            mode,
            yaw: Some(heading_degrees(target.x - pos.x, target.z - pos.z)),
            forward: true,
            jump,
        }
    }

    /// One-block obstruction at foot height with two clear cells above it,
    /// while the agent stands on solid ground.
    fn step_up_ahead(&self, pos: Vec3, dir: Vec3, grid: &GridClassifier<'_>) -> bool {
        let here = Cell::containing(pos);
        let probe = pos + dir * self.config.jump_probe_distance;
        let ahead = Cell::new(probe.x.floor() as i32, here.y, probe.z.floor() as i32);
        if ahead == here {
            return false;
        }
        grid.solid(ahead)
            && !grid.solid(ahead.above())
            && !grid.solid(ahead.offset(0, 2, 0))
            && grid.solid(here.below())
    }
}

/// Unit XZ direction from `from` to `to`, `None` when they coincide horizontally.
fn horizontal_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let dir = flat.normalize_or_zero();
    (dir != Vec3::ZERO).then_some(dir)
}
