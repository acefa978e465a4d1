#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Maze Escape.
//!
//! The world owns the installed wall grid, the player's position, the dynamic
//! obstacles, the relic and the stun charm. It never owns the pursuit agent:
//! the agent reads the grid and the obstacle volumes through [`query`] and
//! reports back through the same command surface as every adapter.

mod charm;
mod navigation;
mod obstacles;
mod sightline;

use maze_escape_core::{
    CellCoord, Command, Event, MazeLayout, PlacementError, SessionOutcome, WallGrid, WorldPoint,
    WELCOME_BANNER,
};
use tracing::{debug, info, warn};

use crate::{charm::Charm, obstacles::ObstacleRegistry};

pub use navigation::NavigationField;
pub use sightline::GridSightline;

/// Distance at which the player picks up the relic.
const RELIC_PICKUP_RADIUS: f32 = 1.5;

/// Represents the authoritative Maze Escape session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: WallGrid,
    spawn: CellCoord,
    player: WorldPoint,
    obstacles: ObstacleRegistry,
    relic: Option<CellCoord>,
    charm: Charm,
    outcome: Option<SessionOutcome>,
    tick_index: u64,
}

impl World {
    /// Creates an empty world that waits for a maze to be installed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: WallGrid::unconfigured(),
            spawn: CellCoord::new(0, 0),
            player: WorldPoint::default(),
            obstacles: ObstacleRegistry::new(),
            relic: None,
            charm: Charm::default(),
            outcome: None,
            tick_index: 0,
        }
    }

    fn install(&mut self, grid: WallGrid, out_events: &mut Vec<Event>) {
        let columns = grid.layout().columns();
        let rows = grid.layout().rows();
        let spawn = CellCoord::new(columns / 2, rows / 2);

        self.grid = grid;
        clear_spawn(self.grid.layout_mut(), spawn);
        self.spawn = spawn;
        self.player = self.grid.to_world(spawn);
        self.obstacles.clear();
        self.relic = None;
        self.charm = Charm::default();
        self.outcome = None;
        self.tick_index = 0;

        info!(columns, rows, ?spawn, "maze installed");
        out_events.push(Event::MazeInstalled {
            columns,
            rows,
            spawn,
        });
    }

    fn validate_obstacle_cell(&self, cell: CellCoord) -> Result<(), PlacementError> {
        let layout = self.grid.layout();
        if !layout.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if layout.is_border(cell) {
            return Err(PlacementError::Border);
        }
        if !layout.is_wall(cell) || self.obstacles.contains_cell(cell) {
            return Err(PlacementError::NotWall);
        }
        Ok(())
    }

    fn end_session(&mut self, outcome: SessionOutcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        info!(?outcome, tick = self.tick_index, "session ended");
        out_events.push(Event::SessionEnded { outcome });
    }

    fn relic_within_reach(&self) -> bool {
        self.relic.is_some_and(|cell| {
            self.player.distance_to(self.grid.to_world(cell)) < RELIC_PICKUP_RADIUS
        })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() && !matches!(command, Command::InstallMaze { .. }) {
        if let Command::PlaceObstacle { cell, .. } = command {
            out_events.push(Event::ObstaclePlacementRejected {
                cell,
                reason: PlacementError::SessionOver,
            });
        }
        return;
    }

    match command {
        Command::InstallMaze {
            layout,
            cell_length,
        } => match WallGrid::new(layout, cell_length) {
            Ok(grid) => world.install(grid, out_events),
            Err(error) => warn!(%error, "ignoring maze installation"),
        },
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.charm.recharge(dt);
            world.obstacles.advance(dt, world.player, out_events);
        }
        Command::MovePlayer { position } => {
            let from = world.player;
            world.player = position;
            out_events.push(Event::PlayerMoved { from, to: position });

            if world.relic_within_reach() {
                world.relic = None;
                out_events.push(Event::RelicCollected);
                world.end_session(SessionOutcome::Escaped, out_events);
            }
        }
        Command::PlayerJumped => {
            let toggled = world.obstacles.toggle_triggers_near(world.player);
            debug!(toggled, "player jumped");
        }
        Command::PlaceObstacle { cell, kind } => match world.validate_obstacle_cell(cell) {
            Ok(()) => {
                world.grid.layout_mut().set_wall(cell, false);
                let bounds = world.grid.cell_bounds(cell);
                let obstacle = world.obstacles.insert(cell, kind, bounds);
                debug!(?cell, ?kind, obstacle = obstacle.get(), "obstacle placed");
                out_events.push(Event::ObstaclePlaced {
                    obstacle,
                    cell,
                    kind,
                });
            }
            Err(reason) => {
                warn!(?cell, ?reason, "obstacle placement rejected");
                out_events.push(Event::ObstaclePlacementRejected { cell, reason });
            }
        },
        Command::PlaceRelic { cell } => {
            if world.grid.layout().is_wall(cell) {
                warn!(?cell, "ignoring relic placement on a wall cell");
                return;
            }
            world.relic = Some(cell);
            debug!(?cell, "relic placed");
            out_events.push(Event::RelicPlaced { cell });
        }
        Command::UseCharm => match world.charm.activate() {
            Ok(stun_duration) => {
                debug!(?stun_duration, "charm activated");
                out_events.push(Event::CharmActivated { stun_duration });
            }
            Err(remaining) => out_events.push(Event::CharmRecharging { remaining }),
        },
        Command::ReportCaught => world.end_session(SessionOutcome::Caught, out_events),
    }
}

/// Opens the spawn and its north and south neighbours; the outer ring stays wall.
fn clear_spawn(layout: &mut MazeLayout, spawn: CellCoord) {
    let north = spawn.row().checked_sub(1);
    let south = spawn.row().checked_add(1);
    let cells = [Some(spawn.row()), north, south]
        .into_iter()
        .flatten()
        .map(|row| CellCoord::new(spawn.column(), row));
    for cell in cells {
        if layout.contains(cell) && !layout.is_border(cell) {
            layout.set_wall(cell, false);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{GridSightline, World};
    use maze_escape_core::{
        Aabb, CellCoord, ObstacleId, ObstacleKind, SessionOutcome, WallGrid, WorldPoint,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the installed wall grid.
    #[must_use]
    pub fn grid(world: &World) -> &WallGrid {
        &world.grid
    }

    /// Cell the player spawned in when the maze was installed.
    #[must_use]
    pub fn spawn_cell(world: &World) -> CellCoord {
        world.spawn
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(world: &World) -> WorldPoint {
        world.player
    }

    /// Collision volumes of the obstacles that currently block movement.
    #[must_use]
    pub fn obstacle_volumes(world: &World) -> Vec<Aabb> {
        world.obstacles.blocking_volumes()
    }

    /// Static-wall line of sight predicate over the installed grid.
    #[must_use]
    pub fn sightline(world: &World) -> GridSightline<'_> {
        GridSightline::new(&world.grid)
    }

    /// Captures a read-only view of every dynamic obstacle ordered by identifier.
    #[must_use]
    pub fn obstacle_view(world: &World) -> Vec<ObstacleSnapshot> {
        world
            .obstacles
            .iter()
            .map(|obstacle| ObstacleSnapshot {
                id: obstacle.id,
                kind: obstacle.kind,
                cell: obstacle.cell,
                transition: obstacle.transition,
                blocking: obstacle.is_blocking(),
            })
            .collect()
    }

    /// Cell hosting the relic, if one is placed and not yet collected.
    #[must_use]
    pub fn relic_cell(world: &World) -> Option<CellCoord> {
        world.relic
    }

    /// Cooldown left before the stun charm can fire again.
    #[must_use]
    pub fn charm_remaining(world: &World) -> Duration {
        world.charm.remaining()
    }

    /// Outcome of the session once it ended.
    #[must_use]
    pub fn session_outcome(world: &World) -> Option<SessionOutcome> {
        world.outcome
    }

    /// Number of ticks processed since the maze was installed.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Immutable representation of a single dynamic obstacle.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ObstacleSnapshot {
        /// Identifier allocated to the obstacle.
        pub id: ObstacleId,
        /// Opening behaviour of the obstacle.
        pub kind: ObstacleKind,
        /// Cell covered by the obstacle.
        pub cell: CellCoord,
        /// Opening progress from 0 (closed) to 1 (open).
        pub transition: f32,
        /// Indicates whether the obstacle currently blocks movement.
        pub blocking: bool,
    }
}
