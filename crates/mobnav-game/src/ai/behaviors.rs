//! Behavior implementations for mob AI.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use super::behavior::{Behavior, BehaviorContext, BehaviorOutput};
use super::grid::{Cell, GridClassifier};
use super::navigator::{PathNavigator, SteeringMode};
use super::pathfinding::{self, PathfindingConfig};

/// Vertical offsets tried, in order, when looking for a standable cell in a column.
const COLUMN_SEARCH: [i32; 7] = [0, 1, -1, 2, -2, 3, -3];

/// First standable cell in the column at `(x, z)` near height `y`.
fn standable_near(grid: &GridClassifier<'_>, x: f32, z: f32, y: i32) -> Option<Cell> {
    let column = Cell::new(x.floor() as i32, y, z.floor() as i32);
    COLUMN_SEARCH
        .iter()
        .map(|&dy| column.offset(0, dy, 0))
        .find(|&cell| grid.standable(cell))
}

fn in_liquid(ctx: &BehaviorContext<'_>) -> bool {
    ctx.grid.liquid(ctx.mob_cell())
}

fn look_toward(from: Vec3, to: Vec3) -> (f32, f32) {
    let yaw = pathfinding::yaw_toward(from.x, from.z, to.x, to.z);
    (yaw, yaw)
}

// ---------------------------------------------------------------------------
// Float: swim up while submerged
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Float;

impl Float {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for Float {
    fn name(&self) -> &'static str {
        "float"
    }

    fn can_start(&self, ctx: &BehaviorContext<'_>) -> bool {
        let eye = ctx.mob_position + Vec3::Y * ctx.mob_eye_height;
        in_liquid(ctx) || ctx.grid.liquid(Cell::containing(eye))
    }

    fn tick(&mut self, _ctx: &BehaviorContext<'_>, _nav: &mut PathNavigator) -> BehaviorOutput {
        BehaviorOutput {
            jump: true,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// RandomStroll: wander to a random standable cell
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RandomStroll {
    /// Maximum horizontal offset of a destination (blocks).
    radius: i32,
    /// Current stroll destination, if any.
    goal: Option<Cell>,
    /// Tick when the mob can pick a new destination.
    cooldown_until: u64,
    /// Tick when the current stroll started.
    started_tick: u64,
    /// Give up on a destination after this many ticks.
    timeout: u64,
}

impl Default for RandomStroll {
    fn default() -> Self {
        Self {
            radius: 10,
            goal: None,
            cooldown_until: 0,
            started_tick: 0,
            timeout: 200,
        }
    }
}

impl RandomStroll {
    pub fn new() -> Self {
        Self::default()
    }

    fn pick_destination(&self, ctx: &BehaviorContext<'_>) -> Option<Cell> {
        let mut rng = rand::thread_rng();
        let origin = ctx.mob_cell();
        (0..10).find_map(|_| {
            let dx = rng.gen_range(-self.radius..=self.radius);
            let dz = rng.gen_range(-self.radius..=self.radius);
            if dx == 0 && dz == 0 {
                return None;
            }
            standable_near(
                &ctx.grid,
                (origin.x + dx) as f32,
                (origin.z + dz) as f32,
                origin.y,
            )
        })
    }

    fn rest(&mut self, current_tick: u64) {
        self.goal = None;
        self.cooldown_until = current_tick + rand::thread_rng().gen_range(40..120);
    }
}

impl Behavior for RandomStroll {
    fn name(&self) -> &'static str {
        "random_stroll"
    }

    fn can_start(&self, ctx: &BehaviorContext<'_>) -> bool {
        ctx.mob_on_ground && ctx.current_tick >= self.cooldown_until && !in_liquid(ctx)
    }

    fn should_continue(&self, ctx: &BehaviorContext<'_>) -> bool {
        self.goal.is_some() && !in_liquid(ctx)
    }

    fn start(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) {
        self.started_tick = ctx.current_tick;
        match self.pick_destination(ctx) {
            Some(cell) => {
                self.goal = Some(cell);
                nav.set_goal(cell.floor_center());
            }
            None => self.rest(ctx.current_tick),
        }
    }

    fn tick(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) -> BehaviorOutput {
        if self.goal.is_some()
            && (!nav.has_goal()
                || ctx.current_tick.saturating_sub(self.started_tick) >= self.timeout)
        {
            self.rest(ctx.current_tick);
        }
        BehaviorOutput::default()
    }

    fn stop(&mut self) {
        self.goal = None;
    }
}

// ---------------------------------------------------------------------------
// LookAtPlayer: face the nearest player for a while
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LookAtPlayer {
    /// Maximum detection range (blocks).
    range: f32,
    /// Tick when the current look ends.
    look_until: u64,
    /// Tick when the previous look ended.
    last_end: Option<u64>,
    /// Ticks to wait between looks.
    cooldown: u64,
}

impl LookAtPlayer {
    pub fn new(range: f32) -> Self {
        Self {
            range,
            look_until: 0,
            last_end: None,
            cooldown: 60,
        }
    }

    fn player_in_range(&self, ctx: &BehaviorContext<'_>) -> bool {
        ctx.nearest_player
            .map(|(_, _, dist, _)| dist <= self.range)
            .unwrap_or(false)
    }
}

impl Behavior for LookAtPlayer {
    fn name(&self) -> &'static str {
        "look_at_player"
    }

    fn can_start(&self, ctx: &BehaviorContext<'_>) -> bool {
        let rested = self
            .last_end
            .map_or(true, |end| ctx.current_tick >= end + self.cooldown);
        rested && self.player_in_range(ctx)
    }

    fn should_continue(&self, ctx: &BehaviorContext<'_>) -> bool {
        ctx.current_tick < self.look_until && self.player_in_range(ctx)
    }

    fn start(&mut self, ctx: &BehaviorContext<'_>, _nav: &mut PathNavigator) {
        self.look_until = ctx.current_tick + rand::thread_rng().gen_range(40..80);
    }

    fn tick(&mut self, ctx: &BehaviorContext<'_>, _nav: &mut PathNavigator) -> BehaviorOutput {
        match ctx.nearest_player {
            Some((_, _, _, target)) => BehaviorOutput {
                look_at: Some(look_toward(ctx.mob_position, target)),
                ..Default::default()
            },
            None => BehaviorOutput::default(),
        }
    }

    fn stop(&mut self) {
        self.last_end = Some(self.look_until);
    }
}

// ---------------------------------------------------------------------------
// Panic: flee after taking damage (passive mobs)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Panic {
    /// Duration of panic in ticks.
    duration: u64,
    /// Speed multiplier during panic.
    speed_mult: f32,
    /// How far away each flee destination is (blocks).
    flee_distance: f32,
    /// Tick when panic started.
    start_tick: u64,
}

impl Default for Panic {
    fn default() -> Self {
        Self {
            duration: 60,
            speed_mult: 1.25,
            flee_distance: 8.0,
            start_tick: 0,
        }
    }
}

impl Panic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_mult
    }

    /// Head away from the nearest player, or somewhere random without one.
    fn flee(&self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) {
        let mut rng = rand::thread_rng();
        let pos = ctx.mob_position;
        let away = ctx
            .nearest_player
            .map(|(_, _, _, player)| Vec3::new(pos.x - player.x, 0.0, pos.z - player.z))
            .filter(|v| v.length_squared() > 1e-4)
            .map(Vec3::normalize)
            .unwrap_or_else(|| {
                let yaw: f32 = rng.gen_range(0.0..360.0);
                pathfinding::direction_from_yaw(yaw)
            });
        let jitter = Vec3::new(rng.gen_range(-2.0..2.0), 0.0, rng.gen_range(-2.0..2.0));
        let target = pos + away * self.flee_distance + jitter;

        let goal = standable_near(&ctx.grid, target.x, target.z, ctx.mob_cell().y)
            .map(Cell::floor_center)
            .unwrap_or(Vec3::new(target.x, pos.y, target.z));
        nav.set_goal(goal);
    }
}

impl Behavior for Panic {
    fn name(&self) -> &'static str {
        "panic"
    }

    fn can_start(&self, ctx: &BehaviorContext<'_>) -> bool {
        !ctx.is_hostile()
            && ctx
                .last_damage_tick
                .map(|t| ctx.current_tick.saturating_sub(t) < self.duration)
                .unwrap_or(false)
    }

    fn should_continue(&self, ctx: &BehaviorContext<'_>) -> bool {
        ctx.current_tick.saturating_sub(self.start_tick) < self.duration
    }

    fn start(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) {
        self.start_tick = ctx.current_tick;
        self.flee(ctx, nav);
    }

    fn tick(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) -> BehaviorOutput {
        if !nav.has_goal() {
            self.flee(ctx, nav);
        }
        BehaviorOutput {
            jump: in_liquid(ctx),
            speed_multiplier: Some(self.speed_mult),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// MeleeAttack: chase and hit the nearest player
// ---------------------------------------------------------------------------

/// Horizontal distance gain that counts as progress toward the target.
const PROGRESS_EPSILON: f32 = 0.5;
/// Target height above the mob at which a failed search abandons the chase.
const GIVE_UP_HEIGHT: f32 = 2.0;
/// Target movement (blocks) that invalidates a followed path or direct goal.
const RETARGET_DISTANCE: f32 = 3.0;
/// Stuck-time divisor while the navigator is halted or pushing blindly at the goal.
const BLOCKED_PATIENCE_DIVISOR: u64 = 4;

#[derive(Debug)]
pub struct MeleeAttack {
    /// Ticks between attacks.
    attack_interval: u64,
    /// Tick of last attack.
    last_attack_tick: Option<u64>,
    /// Attack reach (blocks).
    reach: f32,
    /// Players beyond this horizontal distance are ignored.
    follow_range: f32,
    search: PathfindingConfig,
    /// Remaining cells of an escalated path.
    path: VecDeque<Cell>,
    /// Final cell of the path being followed.
    path_end: Option<Cell>,
    /// Closest horizontal distance to the target so far.
    best_distance: f32,
    /// Tick of the last measurable progress.
    progress_tick: u64,
    /// Set when a failed search abandons the chase.
    gave_up: bool,
    /// No new chase starts before this tick.
    retry_after: u64,
}

impl MeleeAttack {
    pub fn new(attack_interval: u64, search: PathfindingConfig) -> Self {
        Self {
            attack_interval,
            last_attack_tick: None,
            reach: 2.0,
            follow_range: 16.0,
            search,
            path: VecDeque::new(),
            path_end: None,
            best_distance: f32::MAX,
            progress_tick: 0,
            gave_up: false,
            retry_after: 0,
        }
    }

    /// Number of path cells still to walk.
    pub fn remaining_path(&self) -> usize {
        self.path.len()
    }

    fn following_path(&self) -> bool {
        self.path_end.is_some()
    }

    fn abandon_path(&mut self) {
        self.path.clear();
        self.path_end = None;
    }

    fn escalate(&mut self, ctx: &BehaviorContext<'_>, target: Vec3, nav: &mut PathNavigator) {
        self.progress_tick = ctx.current_tick;
        let start = ctx.mob_cell();
        let goal = Cell::containing(target);
        match pathfinding::find_path(&ctx.grid, start, goal, self.search.node_budget) {
            Ok(path) => {
                debug!(?start, ?goal, steps = path.len() - 1, "chase escalated to path search");
                self.path = path.into_iter().skip(1).collect();
                self.path_end = Some(goal);
                self.best_distance = f32::MAX;
                nav.clear();
            }
            Err(err) => {
                debug!(?start, ?goal, %err, "chase path search failed");
                self.abandon_path();
                if target.y - ctx.mob_position.y >= GIVE_UP_HEIGHT {
                    self.gave_up = true;
                    self.retry_after = ctx.current_tick + self.search.stuck_ticks * 2;
                }
            }
        }
    }

    /// Walk the path one cell at a time, handing each cell to the navigator.
    fn follow_path(&mut self, ctx: &BehaviorContext<'_>, target: Vec3, nav: &mut PathNavigator) {
        let target_moved = self
            .path_end
            .map(|end| end.floor_center().distance(target) > RETARGET_DISTANCE)
            .unwrap_or(false);
        if target_moved {
            self.abandon_path();
            return;
        }
        if nav.has_goal() {
            return;
        }
        match self.path.pop_front() {
            Some(cell) => {
                nav.set_goal(cell.floor_center());
                self.progress_tick = ctx.current_tick;
            }
            None => self.abandon_path(),
        }
    }
}

impl Behavior for MeleeAttack {
    fn name(&self) -> &'static str {
        "melee_attack"
    }

    fn can_start(&self, ctx: &BehaviorContext<'_>) -> bool {
        ctx.is_hostile()
            && ctx.current_tick >= self.retry_after
            && ctx
                .nearest_player
                .map(|(_, _, dist, _)| dist <= self.follow_range)
                .unwrap_or(false)
    }

    fn should_continue(&self, ctx: &BehaviorContext<'_>) -> bool {
        !self.gave_up
            && ctx
                .nearest_player
                .map(|(_, _, dist, _)| dist <= self.follow_range * 1.5)
                .unwrap_or(false)
    }

    fn start(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) {
        self.abandon_path();
        self.gave_up = false;
        self.best_distance = f32::MAX;
        self.progress_tick = ctx.current_tick;
        if let Some((_, _, _, target)) = ctx.nearest_player {
            nav.set_goal(target);
        }
    }

    fn tick(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) -> BehaviorOutput {
        let Some((_, target_id, dist, target)) = ctx.nearest_player else {
            return BehaviorOutput::default();
        };
        let pos = ctx.mob_position;

        let mut output = BehaviorOutput {
            look_at: Some(look_toward(pos, target)),
            jump: in_liquid(ctx),
            ..Default::default()
        };

        let in_reach = dist <= self.reach && (target.y - pos.y).abs() < self.reach;
        let rested = self
            .last_attack_tick
            .map_or(true, |t| ctx.current_tick.saturating_sub(t) >= self.attack_interval);
        if in_reach && rested {
            output.attack = Some(target_id);
            self.last_attack_tick = Some(ctx.current_tick);
        }

        if dist < self.best_distance - PROGRESS_EPSILON {
            self.best_distance = dist;
            self.progress_tick = ctx.current_tick;
        }
        // A halted or blind-pushing navigator will not make progress on its own
        let blocked = !self.following_path()
            && matches!(ctx.navigation, SteeringMode::Halted | SteeringMode::Fallback);
        let patience = if blocked {
            self.search.stuck_ticks / BLOCKED_PATIENCE_DIVISOR
        } else {
            self.search.stuck_ticks
        };
        if !in_reach && ctx.current_tick.saturating_sub(self.progress_tick) >= patience {
            self.escalate(ctx, target, nav);
            if self.gave_up {
                nav.clear();
                return output;
            }
        }

        if self.following_path() {
            self.follow_path(ctx, target, nav);
        }
        if !self.following_path() {
            let stale = nav
                .goal()
                .map_or(true, |goal| goal.distance(target) > 1.0);
            if stale {
                nav.set_goal(target);
            }
        }
        output
    }

    fn stop(&mut self) {
        self.abandon_path();
    }
}

// ---------------------------------------------------------------------------
// BuildUp: pillar up toward a target out of reach above
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct BuildUp {
    /// Block placed under the mob.
    block_id: u32,
    /// Horizontal distance within which the mob builds instead of chasing.
    reach: f32,
    /// Blocks placed per activation at most.
    max_blocks: u32,
    /// Blocks placed in this activation.
    placed: u32,
    /// Feet cell the mob last jumped from.
    jump_cell: Option<Cell>,
    started_tick: u64,
    /// Ticks before giving up on the current pillar.
    timeout: u64,
}

impl BuildUp {
    pub fn new(block_id: u32) -> Self {
        Self {
            block_id,
            reach: 3.0,
            max_blocks: 4,
            placed: 0,
            jump_cell: None,
            started_tick: 0,
            timeout: 100,
        }
    }

    pub fn placed(&self) -> u32 {
        self.placed
    }

    /// Height of the nearest player above the mob, if within building reach.
    fn target_height(&self, ctx: &BehaviorContext<'_>) -> Option<f32> {
        ctx.nearest_player
            .filter(|(_, _, dist, _)| *dist <= self.reach)
            .map(|(_, _, _, target)| target.y - ctx.mob_position.y)
    }

    fn headroom(ctx: &BehaviorContext<'_>) -> bool {
        !ctx.grid.solid(ctx.mob_cell().offset(0, 2, 0))
    }
}

impl Behavior for BuildUp {
    fn name(&self) -> &'static str {
        "build_up"
    }

    fn can_start(&self, ctx: &BehaviorContext<'_>) -> bool {
        ctx.is_hostile()
            && ctx.mob_on_ground
            && !in_liquid(ctx)
            && Self::headroom(ctx)
            && self
                .target_height(ctx)
                .map_or(false, |h| h >= GIVE_UP_HEIGHT)
    }

    fn should_continue(&self, ctx: &BehaviorContext<'_>) -> bool {
        self.placed < self.max_blocks
            && ctx.current_tick.saturating_sub(self.started_tick) < self.timeout
            && Self::headroom(ctx)
            && self.target_height(ctx).map_or(false, |h| h > 1.0)
    }

    fn start(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) {
        nav.clear();
        self.placed = 0;
        self.jump_cell = None;
        self.started_tick = ctx.current_tick;
    }

    fn tick(&mut self, ctx: &BehaviorContext<'_>, _nav: &mut PathNavigator) -> BehaviorOutput {
        let mut output = BehaviorOutput {
            look_at: ctx
                .nearest_player
                .map(|(_, _, _, target)| look_toward(ctx.mob_position, target)),
            ..Default::default()
        };

        if ctx.mob_on_ground {
            self.jump_cell = Some(ctx.mob_cell());
            output.jump = true;
        } else if let Some(cell) = self.jump_cell {
            // Feet have cleared the cell jumped from
            if ctx.mob_position.y >= cell.y as f32 + 1.0 && !ctx.grid.solid(cell) {
                debug!(?cell, block = self.block_id, "placing block underfoot");
                output.place_block = Some((cell, self.block_id));
                self.placed += 1;
                self.jump_cell = None;
            }
        }
        output
    }

    fn stop(&mut self) {
        self.jump_cell = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::behavior::test_support::{ctx_at, player_at};
    use crate::ai::grid::test_support::*;
    use crate::mob_registry::MobCategory;

    fn hostile(ctx: &mut BehaviorContext<'_>) {
        ctx.mob_category = MobCategory::Hostile;
    }

    // Float

    #[test]
    fn float_in_water() {
        let (mut world, registry) = flat_world();
        world.set_block(0, 0, 0, WATER).unwrap();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        let mut float = Float::new();
        assert!(float.can_start(&ctx));
        assert!(float.tick(&ctx, &mut PathNavigator::default()).jump);
    }

    #[test]
    fn float_on_land() {
        let (world, registry) = flat_world();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        assert!(!Float::new().can_start(&ctx));
    }

    // RandomStroll

    #[test]
    fn stroll_can_start_when_ready() {
        let (world, registry) = flat_world();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        assert!(RandomStroll::new().can_start(&ctx));
    }

    #[test]
    fn stroll_cant_start_during_cooldown() {
        let (world, registry) = flat_world();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        let mut stroll = RandomStroll::new();
        stroll.cooldown_until = 200;
        assert!(!stroll.can_start(&ctx));
    }

    #[test]
    fn stroll_start_targets_standable_cell() {
        let (world, registry) = flat_world();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        let mut stroll = RandomStroll::new();
        let mut nav = PathNavigator::default();
        stroll.start(&ctx, &mut nav);

        let cell = stroll.goal.expect("flat ground always has a destination");
        assert!(ctx.grid.standable(cell));
        assert!((cell.x).abs() <= 10 && (cell.z).abs() <= 10);
        assert_eq!(nav.goal(), Some(cell.floor_center()));
        assert!(stroll.should_continue(&ctx));
    }

    #[test]
    fn stroll_rests_after_arrival() {
        let (world, registry) = flat_world();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        let mut stroll = RandomStroll::new();
        let mut nav = PathNavigator::default();
        stroll.start(&ctx, &mut nav);

        // The navigator clears its goal on arrival
        nav.clear();
        stroll.tick(&ctx, &mut nav);
        assert!(!stroll.should_continue(&ctx));
        assert!(stroll.cooldown_until >= ctx.current_tick + 40);
    }

    #[test]
    fn stroll_gives_up_in_water() {
        let (mut world, registry) = flat_world();
        world.set_block(0, 0, 0, WATER).unwrap();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        let mut stroll = RandomStroll::new();
        stroll.goal = Some(Cell::new(3, 0, 3));
        assert!(!stroll.should_continue(&ctx));
        assert!(!stroll.can_start(&ctx));
    }

    // LookAtPlayer

    #[test]
    fn look_at_player_within_range() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(5.5, 0.0, 0.5)));
        assert!(LookAtPlayer::new(8.0).can_start(&ctx));
    }

    #[test]
    fn look_at_player_out_of_range() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(20.5, 0.0, 0.5)));
        assert!(!LookAtPlayer::new(8.0).can_start(&ctx));
    }

    #[test]
    fn look_at_player_faces_player() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(5.5, 0.0, 0.5)));
        let mut look = LookAtPlayer::new(8.0);
        let output = look.tick(&ctx, &mut PathNavigator::default());
        let (yaw, head_yaw) = output.look_at.unwrap();
        // +X is yaw 270
        assert!((yaw - 270.0).abs() < 0.1);
        assert_eq!(yaw, head_yaw);
    }

    #[test]
    fn look_at_player_expires_and_rests() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(3.5, 0.0, 0.5)));
        let mut look = LookAtPlayer::new(8.0);
        let mut nav = PathNavigator::default();
        look.start(&ctx, &mut nav);
        assert!(look.should_continue(&ctx));

        ctx.current_tick += 80;
        assert!(!look.should_continue(&ctx));
        look.stop();
        assert!(!look.can_start(&ctx));
        ctx.current_tick += 60;
        assert!(look.can_start(&ctx));
    }

    // Panic

    #[test]
    fn panic_starts_after_damage() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        ctx.last_damage_tick = Some(80);
        assert!(Panic::new().can_start(&ctx));
    }

    #[test]
    fn panic_not_for_hostile() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.last_damage_tick = Some(80);
        assert!(!Panic::new().can_start(&ctx));
    }

    #[test]
    fn panic_stops_after_timeout() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        let mut panic = Panic::new();
        panic.start_tick = 10;
        ctx.current_tick = 200;
        assert!(!panic.should_continue(&ctx));
    }

    #[test]
    fn panic_flees_away_from_player() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        ctx.last_damage_tick = Some(99);
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(-4.5, 0.0, 0.5)));
        let mut panic = Panic::new();
        let mut nav = PathNavigator::default();
        panic.start(&ctx, &mut nav);

        let goal = nav.goal().unwrap();
        assert!(goal.x > 4.0, "fled toward the player: {goal:?}");
        assert_eq!(goal.y, 0.0);

        let output = panic.tick(&ctx, &mut nav);
        assert_eq!(output.speed_multiplier, Some(panic.speed_multiplier()));
    }

    #[test]
    fn panic_picks_new_destination_on_arrival() {
        let (world, registry) = flat_world();
        let ctx = ctx_at(GridClassifier::new(&world, &registry));
        let mut panic = Panic::new();
        let mut nav = PathNavigator::default();
        panic.start(&ctx, &mut nav);
        nav.clear();
        panic.tick(&ctx, &mut nav);
        assert!(nav.has_goal());
    }

    // MeleeAttack

    fn melee() -> MeleeAttack {
        MeleeAttack::new(20, PathfindingConfig::default())
    }

    #[test]
    fn melee_needs_hostile_mob_and_player() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(5.5, 0.0, 0.5)));
        assert!(!melee().can_start(&ctx));
        hostile(&mut ctx);
        assert!(melee().can_start(&ctx));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(30.5, 0.0, 0.5)));
        assert!(!melee().can_start(&ctx));
    }

    #[test]
    fn melee_start_targets_player() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        let player = Vec3::new(5.5, 0.0, 0.5);
        ctx.nearest_player = Some(player_at(1, &ctx, player));
        let mut nav = PathNavigator::default();
        melee().start(&ctx, &mut nav);
        assert_eq!(nav.goal(), Some(player));
    }

    #[test]
    fn melee_attacks_in_range() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(7, &ctx, Vec3::new(1.5, 0.0, 0.5)));
        let mut attack = melee();
        let output = attack.tick(&ctx, &mut PathNavigator::default());
        assert_eq!(output.attack, Some(7));
    }

    #[test]
    fn melee_cooldown_respected() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(7, &ctx, Vec3::new(1.5, 0.0, 0.5)));
        let mut attack = melee();
        attack.last_attack_tick = Some(90);
        let output = attack.tick(&ctx, &mut PathNavigator::default());
        assert_eq!(output.attack, None);
    }

    #[test]
    fn melee_escalates_to_search_when_stuck() {
        let (mut world, registry) = flat_world();
        world.fill((2, 0, -3), (2, 1, 3), STONE).unwrap();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(4.5, 0.0, 0.5)));
        let mut attack = melee();
        let mut nav = PathNavigator::default();
        attack.start(&ctx, &mut nav);
        attack.tick(&ctx, &mut nav);
        assert_eq!(attack.remaining_path(), 0);

        // No progress for `stuck_ticks`
        ctx.current_tick += PathfindingConfig::default().stuck_ticks;
        attack.tick(&ctx, &mut nav);

        // 12 steps around the wall end, the first already handed to the navigator
        assert_eq!(attack.remaining_path(), 11);
        let first = nav.goal().unwrap();
        let step = Cell::containing(first);
        assert_eq!(step.manhattan(Cell::new(0, 0, 0)), 1);
        assert!(attack.should_continue(&ctx));
    }

    #[test]
    fn melee_escalates_sooner_when_navigator_is_blocked() {
        let (mut world, registry) = flat_world();
        world.fill((2, 0, -3), (2, 1, 3), STONE).unwrap();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(4.5, 0.0, 0.5)));
        let stuck_ticks = PathfindingConfig::default().stuck_ticks;

        let mut steering = melee();
        let mut nav = PathNavigator::default();
        steering.start(&ctx, &mut nav);
        steering.tick(&ctx, &mut nav);
        ctx.current_tick += stuck_ticks / 4;
        ctx.navigation = SteeringMode::Waypoint;
        steering.tick(&ctx, &mut nav);
        assert_eq!(steering.remaining_path(), 0);

        let mut blocked = melee();
        let mut nav = PathNavigator::default();
        ctx.current_tick = 100;
        blocked.start(&ctx, &mut nav);
        blocked.tick(&ctx, &mut nav);
        ctx.current_tick += stuck_ticks / 4;
        ctx.navigation = SteeringMode::Halted;
        blocked.tick(&ctx, &mut nav);
        assert_eq!(blocked.remaining_path(), 11);
    }

    #[test]
    fn melee_follows_path_cell_by_cell() {
        let (mut world, registry) = flat_world();
        world.fill((2, 0, -3), (2, 1, 3), STONE).unwrap();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(4.5, 0.0, 0.5)));
        let mut attack = melee();
        let mut nav = PathNavigator::default();
        attack.start(&ctx, &mut nav);
        attack.tick(&ctx, &mut nav);
        ctx.current_tick += 40;
        attack.tick(&ctx, &mut nav);
        let first = nav.goal().unwrap();

        // Still walking: the goal is kept
        ctx.current_tick += 1;
        attack.tick(&ctx, &mut nav);
        assert_eq!(nav.goal(), Some(first));

        // Arrived at the first cell: the next one is handed over
        nav.clear();
        ctx.mob_position = first;
        ctx.current_tick += 1;
        attack.tick(&ctx, &mut nav);
        assert_eq!(attack.remaining_path(), 10);
        let second = Cell::containing(nav.goal().unwrap());
        assert_eq!(second.manhattan(Cell::containing(first)), 1);
    }

    #[test]
    fn melee_gives_up_on_unreachable_high_target() {
        let (mut world, registry) = flat_world();
        // Player on top of a three-high pillar
        world.fill((3, 0, 0), (3, 2, 0), STONE).unwrap();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(3.5, 3.0, 0.5)));
        let mut attack = melee();
        let mut nav = PathNavigator::default();
        attack.start(&ctx, &mut nav);
        attack.tick(&ctx, &mut nav);

        ctx.current_tick += 40;
        attack.tick(&ctx, &mut nav);
        assert!(!attack.should_continue(&ctx));
        assert!(!nav.has_goal());
        // Cooling down before the next chase
        assert!(!attack.can_start(&ctx));
    }

    // BuildUp

    #[test]
    fn build_up_needs_high_nearby_target() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        let build = BuildUp::new(STONE);

        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(1.5, 0.0, 0.5)));
        assert!(!build.can_start(&ctx));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(1.5, 3.0, 0.5)));
        assert!(build.can_start(&ctx));
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(9.5, 3.0, 0.5)));
        assert!(!build.can_start(&ctx));
    }

    #[test]
    fn build_up_jumps_then_places_underfoot() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(1.5, 3.0, 0.5)));
        let mut build = BuildUp::new(STONE);
        let mut nav = PathNavigator::default();
        nav.set_goal(Vec3::new(9.0, 0.0, 9.0));
        build.start(&ctx, &mut nav);
        assert!(!nav.has_goal());

        let output = build.tick(&ctx, &mut nav);
        assert!(output.jump);
        assert_eq!(output.place_block, None);

        // Rising, not yet clear of the cell
        ctx.mob_on_ground = false;
        ctx.mob_position.y = 0.75;
        assert_eq!(build.tick(&ctx, &mut nav).place_block, None);

        ctx.mob_position.y = 1.05;
        let output = build.tick(&ctx, &mut nav);
        assert_eq!(output.place_block, Some((Cell::new(0, 0, 0), STONE)));
        assert_eq!(build.placed(), 1);

        // Only one block per jump
        assert_eq!(build.tick(&ctx, &mut nav).place_block, None);
    }

    #[test]
    fn build_up_stops_when_level_with_target() {
        let (world, registry) = flat_world();
        let mut ctx = ctx_at(GridClassifier::new(&world, &registry));
        hostile(&mut ctx);
        ctx.nearest_player = Some(player_at(1, &ctx, Vec3::new(1.5, 3.0, 0.5)));
        let mut build = BuildUp::new(STONE);
        build.start(&ctx, &mut PathNavigator::default());
        assert!(build.should_continue(&ctx));

        ctx.mob_position.y = 2.0;
        assert!(!build.should_continue(&ctx));
    }

    #[test]
    fn helpers_find_standable_in_column() {
        let (mut world, registry) = flat_world();
        world.fill((4, 0, 4), (4, 1, 4), STONE).unwrap();
        let grid = GridClassifier::new(&world, &registry);
        assert_eq!(standable_near(&grid, 4.2, 4.7, 0), Some(Cell::new(4, 2, 4)));
        assert_eq!(standable_near(&grid, 1.0, 1.0, 2), Some(Cell::new(1, 0, 1)));
    }
}
