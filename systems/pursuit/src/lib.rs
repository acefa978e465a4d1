#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit agent that hunts, searches for and chases the player through the maze.
//!
//! The agent owns its position exclusively. Each frame the session runner calls
//! [`PursuitAgent::update`] with the elapsed time, the player position, an
//! optional line of sight predicate, the installed grid and the collision
//! volumes of the closed dynamic obstacles. The agent answers with events.

mod tuning;

use std::time::Duration;

use glam::Vec2;
use maze_escape_core::{
    Aabb, AgentSnapshot, Event, LineOfSight, PursuitState, WallGrid, WorldPoint,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub use tuning::Tuning;

const CARDINAL_DIRECTIONS: [Vec2; 4] = [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y];

/// Monster state machine driving the chase.
#[derive(Debug)]
pub struct PursuitAgent {
    tuning: Tuning,
    position: WorldPoint,
    heading: f32,
    state: PursuitState,
    stunned: bool,
    stun_remaining: Duration,
    shock_intensity: f32,
    since_seen: Duration,
    wander_direction: Vec2,
    wander_timer: Duration,
    caught: bool,
    rng: ChaCha8Rng,
}

impl PursuitAgent {
    /// Creates a hunting agent at the provided position.
    #[must_use]
    pub fn new(position: WorldPoint, tuning: Tuning, rng_seed: u64) -> Self {
        Self {
            tuning,
            position,
            heading: 0.0,
            state: PursuitState::Hunting,
            stunned: false,
            stun_remaining: Duration::ZERO,
            shock_intensity: 0.0,
            since_seen: Duration::ZERO,
            wander_direction: Vec2::ZERO,
            wander_timer: Duration::ZERO,
            caught: false,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Current agent position.
    #[must_use]
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    /// Current behavioural state.
    #[must_use]
    pub fn state(&self) -> PursuitState {
        self.state
    }

    /// Reports whether the agent is stunned.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.stunned
    }

    /// Reports whether the agent already caught the player.
    #[must_use]
    pub fn has_caught(&self) -> bool {
        self.caught
    }

    /// Movement speed implied by the current state, zero while stunned.
    #[must_use]
    pub fn speed(&self) -> f32 {
        if self.stunned {
            return 0.0;
        }
        match self.state {
            PursuitState::Hunting => self.tuning.hunt_speed,
            PursuitState::Searching => {
                self.tuning.search_speed * self.tuning.search_speed_multiplier
            }
            PursuitState::Chasing => self.tuning.chase_speed,
        }
    }

    /// Captures a read-only view of the agent for adapters.
    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.position,
            heading: self.heading,
            state: self.state,
            stunned: self.stunned,
            shock_intensity: self.shock_intensity,
            speed: self.speed(),
        }
    }

    /// Freezes the agent for the provided duration.
    pub fn stun(&mut self, duration: Duration) {
        self.stunned = true;
        self.stun_remaining = duration;
        self.shock_intensity = 1.0;
        debug!(?duration, "agent stunned");
    }

    /// Advances the agent by one frame.
    ///
    /// Without a sight predicate the agent assumes it always sees the player
    /// and chases directly.
    pub fn update(
        &mut self,
        dt: Duration,
        player: WorldPoint,
        sight: Option<&dyn LineOfSight>,
        grid: &WallGrid,
        obstacles: &[Aabb],
        out: &mut Vec<Event>,
    ) {
        if self.caught {
            return;
        }

        if self.stunned {
            self.stun_remaining = self.stun_remaining.saturating_sub(dt);
            self.shock_intensity = self.stun_remaining.as_secs_f32().min(1.0);
            if self.stun_remaining.is_zero() {
                self.stunned = false;
                self.shock_intensity = 0.0;
                debug!("agent recovered");
                out.push(Event::AgentRecovered);
            }
            return;
        }

        let has_line_of_sight = sight.map_or(true, |sight| sight.is_clear(self.position, player));
        self.transition(dt, player, has_line_of_sight, out);

        match self.state {
            PursuitState::Chasing | PursuitState::Hunting => {
                self.approach(dt, player, grid, obstacles);
            }
            PursuitState::Searching => self.wander(dt, grid, obstacles),
        }

        if self.position.distance_to(player) < self.tuning.kill_radius {
            self.caught = true;
            debug!(agent = ?self.position, ?player, "player caught");
            out.push(Event::PlayerCaught {
                agent: self.position,
                player,
            });
        }
    }

    fn transition(
        &mut self,
        dt: Duration,
        player: WorldPoint,
        has_line_of_sight: bool,
        out: &mut Vec<Event>,
    ) {
        let previous = self.state;
        let next = if has_line_of_sight {
            self.since_seen = Duration::ZERO;
            PursuitState::Chasing
        } else if previous == PursuitState::Chasing && self.keeps_chasing(dt) {
            PursuitState::Chasing
        } else if self.position.distance_to(player) > self.tuning.search_range {
            PursuitState::Hunting
        } else {
            PursuitState::Searching
        };

        if next != previous {
            self.state = next;
            debug!(from = previous.label(), to = next.label(), "agent state changed");
            out.push(Event::AgentStateChanged {
                from: previous,
                to: next,
            });
        }
    }

    fn keeps_chasing(&mut self, dt: Duration) -> bool {
        self.since_seen = self.since_seen.saturating_add(dt);
        self.since_seen <= self.tuning.sight_persistence()
    }

    fn approach(&mut self, dt: Duration, player: WorldPoint, grid: &WallGrid, obstacles: &[Aabb]) {
        let direction = Vec2::new(
            player.x() - self.position.x(),
            player.z() - self.position.z(),
        )
        .normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }
        self.heading = direction.y.atan2(direction.x);

        let step = direction * self.speed() * dt.as_secs_f32();
        let radius = self.tuning.body_radius;

        let along_x = self.position.offset(step.x, 0.0);
        if !check_collision(grid, obstacles, along_x, radius) {
            self.position = along_x;
        }
        let along_z = self.position.offset(0.0, step.y);
        if !check_collision(grid, obstacles, along_z, radius) {
            self.position = along_z;
        }
    }

    fn wander(&mut self, dt: Duration, grid: &WallGrid, obstacles: &[Aabb]) {
        self.wander_timer = self.wander_timer.saturating_sub(dt);
        if self.wander_timer.is_zero() {
            let choice = self.rng.gen_range(0..CARDINAL_DIRECTIONS.len());
            self.wander_direction = CARDINAL_DIRECTIONS[choice];
            let (min, max) = self.tuning.wander_interval();
            let interval = if max > min {
                self.rng.gen_range(min..max)
            } else {
                min
            };
            self.wander_timer = Duration::try_from_secs_f32(interval).unwrap_or(Duration::MAX);
        }

        let step = self.wander_direction * self.speed() * dt.as_secs_f32();
        let candidate = self.position.offset(step.x, step.y);
        if check_collision(grid, obstacles, candidate, self.tuning.body_radius) {
            self.wander_timer = Duration::ZERO;
            return;
        }
        self.position = candidate;
        if self.wander_direction != Vec2::ZERO {
            self.heading = self.wander_direction.y.atan2(self.wander_direction.x);
        }
    }
}

/// Reports whether a body of the provided radius centred on `point` collides.
///
/// The centre and the four diagonal corners are tested against the static
/// walls, then the square footprint against each obstacle volume.
#[must_use]
pub fn check_collision(
    grid: &WallGrid,
    obstacles: &[Aabb],
    point: WorldPoint,
    radius: f32,
) -> bool {
    let samples = [
        point,
        point.offset(radius, radius),
        point.offset(radius, -radius),
        point.offset(-radius, radius),
        point.offset(-radius, -radius),
    ];
    if samples.iter().any(|sample| grid.is_wall_at_world(*sample)) {
        return true;
    }

    let footprint = Aabb::from_center(point, radius);
    obstacles.iter().any(|volume| volume.intersects(&footprint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::MazeLayout;

    fn open_grid(size: u32) -> WallGrid {
        let mut layout = MazeLayout::filled(size, size);
        for row in 1..size - 1 {
            for column in 1..size - 1 {
                layout.set_wall(maze_escape_core::CellCoord::new(column, row), false);
            }
        }
        WallGrid::new(layout, 4.0).expect("valid cell length")
    }

    #[test]
    fn speed_follows_state() {
        let mut agent = PursuitAgent::new(WorldPoint::default(), Tuning::default(), 1);
        assert_eq!(agent.speed(), 5.0);
        agent.state = PursuitState::Chasing;
        assert_eq!(agent.speed(), 8.0);
        agent.state = PursuitState::Searching;
        assert!((agent.speed() - 8.4).abs() < 1e-5);
        agent.stun(Duration::from_secs(1));
        assert_eq!(agent.speed(), 0.0);
    }

    #[test]
    fn collision_reports_walls_and_obstacles() {
        let grid = open_grid(7);
        assert!(!check_collision(&grid, &[], WorldPoint::default(), 0.6));
        assert!(check_collision(&grid, &[], WorldPoint::new(-9.8, 0.0), 0.6));

        let door = Aabb::from_center(WorldPoint::new(2.0, 0.0), 1.0);
        assert!(check_collision(&grid, &[door], WorldPoint::default(), 1.5));
        assert!(!check_collision(&grid, &[door], WorldPoint::default(), 0.6));
    }

    #[test]
    fn searching_agent_picks_cardinal_direction() {
        let grid = open_grid(11);
        let mut agent = PursuitAgent::new(WorldPoint::default(), Tuning::default(), 9);
        agent.state = PursuitState::Searching;
        agent.wander(Duration::from_millis(100), &grid, &[]);

        let moved = agent.position;
        let axis_aligned = moved.x() == 0.0 || moved.z() == 0.0;
        assert!(axis_aligned, "wander step {moved:?} is not cardinal");
        assert!((moved.distance_to(WorldPoint::default()) - 0.84).abs() < 1e-4);
        assert!(agent.wander_timer >= Duration::from_millis(400));
    }

    #[test]
    fn blocked_wander_step_resets_timer() {
        let grid = open_grid(3);
        let mut agent = PursuitAgent::new(WorldPoint::default(), Tuning::default(), 4);
        agent.state = PursuitState::Searching;
        agent.wander(Duration::from_secs(1), &grid, &[]);

        assert_eq!(agent.position, WorldPoint::default());
        assert!(agent.wander_timer.is_zero());
    }
}
