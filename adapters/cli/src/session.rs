//! Headless session runner that wires the world, the spawning system and the
//! pursuit agent together with a scripted player.

use std::time::Duration;

use anyhow::{bail, Result};
use glam::Vec2;
use maze_escape_core::{
    AgentSnapshot, CellCoord, Command, Event, MazeLayout, PursuitState, SessionOutcome, WorldPoint,
};
use maze_escape_system_pursuit::{check_collision, PursuitAgent};
use maze_escape_system_spawning::{Config as SpawningConfig, Spawning};
use maze_escape_world::{apply, query, NavigationField, World};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Collision half extent of the scripted player.
const PLAYER_RADIUS: f32 = 0.3;
/// Distance under which the scripted player counts as standing on a waypoint.
const WAYPOINT_TOLERANCE: f32 = 1e-3;
/// Minimum time between jumps so a toggled trigger obstacle can finish opening.
const JUMP_COOLDOWN: Duration = Duration::from_millis(1500);
/// Mixed into the maze seed so placement and maze streams differ.
const SPAWNING_SEED_SALT: u64 = 0x5350_4157;
const AGENT_SEED_SALT: u64 = 0x4147_4e54;

/// Summary of a finished or interrupted session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SessionReport {
    pub(crate) outcome: Option<SessionOutcome>,
    pub(crate) elapsed: Duration,
    pub(crate) ticks: u64,
    pub(crate) state_changes: Vec<(Duration, PursuitState)>,
    pub(crate) charm_uses: u32,
    pub(crate) obstacles: usize,
    pub(crate) agent: AgentSnapshot,
    pub(crate) player: WorldPoint,
}

/// One running game: authoritative world plus the agent chasing the player.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    agent: PursuitAgent,
    navigation: NavigationField,
    waypoint: Option<CellCoord>,
    last_jump: Option<Duration>,
    frame: Duration,
    autopilot_speed: f32,
    charm_distance: f32,
    elapsed: Duration,
    state_changes: Vec<(Duration, PursuitState)>,
    charm_uses: u32,
}

impl Session {
    /// Installs the layout and places obstacles, the relic and the agent.
    pub(crate) fn new(layout: MazeLayout, cell_length: f32, config: &AppConfig) -> Result<Self> {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::InstallMaze {
                layout,
                cell_length,
            },
            &mut events,
        );
        if !events
            .iter()
            .any(|event| matches!(event, Event::MazeInstalled { .. }))
        {
            bail!("maze could not be installed with cell length {cell_length}");
        }

        let seed = config.maze.seed;
        let mut spawning = Spawning::new(SpawningConfig::new(
            seed ^ SPAWNING_SEED_SALT,
            config.spawning.obstacle_probability,
        ));
        let mut commands = Vec::new();
        spawning.handle(&events, query::grid(&world), &mut commands);
        let mut placed = Vec::new();
        for command in commands {
            apply(&mut world, command, &mut placed);
        }

        let player = query::player_position(&world);
        let volumes = query::obstacle_volumes(&world);
        let Some(start) = spawning.place_agent(query::grid(&world), &volumes, player) else {
            bail!("maze has no free cell for the pursuit agent");
        };

        let mut navigation = NavigationField::default();
        if let Some(relic) = query::relic_cell(&world) {
            navigation.rebuild(query::grid(&world), &[relic]);
        }

        let tick_rate = config.simulation.tick_rate.max(1);
        info!(
            obstacles = volumes.len(),
            relic = ?query::relic_cell(&world),
            agent = ?start,
            "session ready"
        );

        Ok(Self {
            world,
            agent: PursuitAgent::new(start, config.agent, seed ^ AGENT_SEED_SALT),
            navigation,
            waypoint: None,
            last_jump: None,
            frame: Duration::from_secs(1) / tick_rate,
            autopilot_speed: config.simulation.autopilot_speed,
            charm_distance: config.simulation.charm_distance,
            elapsed: Duration::ZERO,
            state_changes: Vec::new(),
            charm_uses: 0,
        })
    }

    /// Read access to the world for rendering.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Current view of the pursuit agent.
    pub(crate) fn agent(&self) -> AgentSnapshot {
        self.agent.snapshot()
    }

    /// Runs frames until the session ends or the time limit passes.
    pub(crate) fn run(&mut self, time_limit: Duration) -> SessionReport {
        while self.elapsed < time_limit && query::session_outcome(&self.world).is_none() {
            self.step();
        }

        let report = SessionReport {
            outcome: query::session_outcome(&self.world),
            elapsed: self.elapsed,
            ticks: query::tick_index(&self.world),
            state_changes: self.state_changes.clone(),
            charm_uses: self.charm_uses,
            obstacles: query::obstacle_view(&self.world).len(),
            agent: self.agent.snapshot(),
            player: query::player_position(&self.world),
        };
        info!(outcome = ?report.outcome, elapsed = ?report.elapsed, "session finished");
        report
    }

    /// Advances the session by a single frame.
    pub(crate) fn step(&mut self) {
        let dt = self.frame;
        self.elapsed = self.elapsed.saturating_add(dt);
        let mut events = Vec::new();
        apply(&mut self.world, Command::Tick { dt }, &mut events);

        self.drive_player(dt, &mut events);
        self.consider_charm(&mut events);

        let mut agent_events = Vec::new();
        {
            let grid = query::grid(&self.world);
            let sight = query::sightline(&self.world);
            let volumes = query::obstacle_volumes(&self.world);
            let player = query::player_position(&self.world);
            self.agent
                .update(dt, player, Some(&sight), grid, &volumes, &mut agent_events);
        }

        for event in &agent_events {
            match event {
                Event::AgentStateChanged { to, .. } => self.state_changes.push((self.elapsed, *to)),
                Event::PlayerCaught { .. } => {
                    apply(&mut self.world, Command::ReportCaught, &mut events);
                }
                _ => {}
            }
        }
        events.extend(agent_events);

        for event in &events {
            debug!(?event, "frame event");
        }
    }

    fn drive_player(&mut self, dt: Duration, events: &mut Vec<Event>) {
        if query::session_outcome(&self.world).is_some() {
            return;
        }
        let grid = query::grid(&self.world);
        let player = query::player_position(&self.world);

        let waypoint = match self.waypoint {
            Some(cell) if player.distance_to(grid.to_world(cell)) > WAYPOINT_TOLERANCE => cell,
            _ => {
                let Some(current) = grid.cell_at(player) else {
                    return;
                };
                let next = self.navigation.next_step(current).unwrap_or(current);
                self.waypoint = Some(next);
                next
            }
        };

        let target = grid.to_world(waypoint);
        let offset = Vec2::new(target.x() - player.x(), target.z() - player.z());
        let travel = (self.autopilot_speed * dt.as_secs_f32()).min(offset.length());
        let step = offset.normalize_or_zero() * travel;
        let position = player.offset(step.x, step.y);

        let volumes = query::obstacle_volumes(&self.world);
        if check_collision(grid, &volumes, position, PLAYER_RADIUS) {
            let rested = self
                .last_jump
                .map_or(true, |at| self.elapsed.saturating_sub(at) >= JUMP_COOLDOWN);
            if rested {
                self.last_jump = Some(self.elapsed);
                apply(&mut self.world, Command::PlayerJumped, events);
            }
            return;
        }
        if step != Vec2::ZERO {
            apply(&mut self.world, Command::MovePlayer { position }, events);
        }
    }

    fn consider_charm(&mut self, events: &mut Vec<Event>) {
        if query::session_outcome(&self.world).is_some()
            || !query::charm_remaining(&self.world).is_zero()
        {
            return;
        }
        let agent = self.agent.snapshot();
        let player = query::player_position(&self.world);
        if agent.state != PursuitState::Chasing
            || agent.stunned
            || agent.position.distance_to(player) > self.charm_distance
        {
            return;
        }

        let first = events.len();
        apply(&mut self.world, Command::UseCharm, events);
        for event in &events[first..] {
            if let Event::CharmActivated { stun_duration } = event {
                self.agent.stun(*stun_duration);
                self.charm_uses += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_system_maze_generation::{Config as MazeConfig, MazeGenerator};

    fn session(seed: u64) -> Session {
        let mut config = AppConfig::default();
        config.maze.seed = seed;
        let layout = MazeGenerator::new(MazeConfig::new(seed))
            .generate(21, 21)
            .expect("valid dimensions");
        Session::new(layout, 4.0, &config).expect("session starts")
    }

    #[test]
    fn session_places_relic_and_agent() {
        let session = session(3);
        assert!(query::relic_cell(session.world()).is_some());
        let agent = session.agent();
        let player = query::player_position(session.world());
        assert!(agent.position.distance_to(player) > 15.0);
    }

    #[test]
    fn sessions_replay_identically() {
        let first = session(8).run(Duration::from_secs(30));
        let second = session(8).run(Duration::from_secs(30));
        assert_eq!(first, second);
    }

    #[test]
    fn session_stops_at_time_limit_or_outcome() {
        let report = session(12).run(Duration::from_secs(5));
        assert!(report.outcome.is_some() || report.elapsed >= Duration::from_secs(5));
        let frame = Duration::from_secs(1) / 30;
        let ticks = u32::try_from(report.ticks).expect("tick count fits");
        assert_eq!(report.elapsed, frame * ticks);
    }

    #[test]
    fn invalid_cell_length_fails_to_start() {
        let layout = MazeGenerator::new(MazeConfig::new(1))
            .generate(9, 9)
            .expect("valid dimensions");
        let error = Session::new(layout, -1.0, &AppConfig::default()).expect_err("rejected");
        assert!(error.to_string().contains("could not be installed"));
    }

    #[test]
    fn autopilot_walks_toward_relic() {
        let mut session = session(21);
        let relic = query::relic_cell(session.world()).expect("relic placed");
        let grid = query::grid(session.world());
        let mut field = NavigationField::default();
        field.rebuild(grid, &[relic]);
        let start = grid
            .cell_at(query::player_position(session.world()))
            .and_then(|cell| field.distance(cell))
            .expect("spawn reachable");

        for _ in 0..60 {
            session.step();
        }

        let grid = query::grid(session.world());
        let now = grid
            .cell_at(query::player_position(session.world()))
            .and_then(|cell| field.distance(cell))
            .expect("player inside the maze");
        assert!(
            now < start || query::session_outcome(session.world()).is_some(),
            "player should make progress: {start} -> {now}"
        );
    }
}
