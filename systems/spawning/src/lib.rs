#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that places obstacles, the relic and the agent.

use maze_escape_core::{Aabb, CellCoord, Command, Event, ObstacleKind, WallGrid, WorldPoint};
use maze_escape_world::NavigationField;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const RELIC_ATTEMPTS: usize = 50;
/// Minimum relic distance from the spawn measured in cells.
const RELIC_MIN_CELLS: f32 = 8.0;
const AGENT_ATTEMPTS: usize = 100;
/// Attempt after which the agent accepts the relaxed minimum distance.
const AGENT_RELAXED_AFTER: usize = 90;
const AGENT_MIN_DISTANCE: f32 = 18.0;
const AGENT_MAX_DISTANCE: f32 = 26.0;
const AGENT_RELAXED_DISTANCE: f32 = 15.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    obstacle_probability: f64,
}

impl Config {
    /// Creates a new configuration using the provided seed and obstacle chance.
    #[must_use]
    pub fn new(rng_seed: u64, obstacle_probability: f64) -> Self {
        Self {
            rng_seed,
            obstacle_probability: if obstacle_probability.is_nan() {
                0.0
            } else {
                obstacle_probability.clamp(0.0, 1.0)
            },
        }
    }
}

/// Pure system that reacts to maze installation with placement commands.
#[derive(Debug)]
pub struct Spawning {
    obstacle_probability: f64,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            obstacle_probability: config.obstacle_probability,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and the installed grid to emit placement commands.
    pub fn handle(&mut self, events: &[Event], grid: &WallGrid, out: &mut Vec<Command>) {
        for event in events {
            if let Event::MazeInstalled { spawn, .. } = event {
                self.place_obstacles(grid, out);
                if let Some(cell) = self.select_relic_cell(grid, *spawn) {
                    out.push(Command::PlaceRelic { cell });
                }
            }
        }
    }

    /// Picks a starting position for the pursuit agent away from the player.
    ///
    /// Cells covered by the provided obstacle volumes are never chosen. Returns
    /// `None` only when the grid has no free path cell.
    pub fn place_agent(
        &mut self,
        grid: &WallGrid,
        obstacles: &[Aabb],
        player: WorldPoint,
    ) -> Option<WorldPoint> {
        let candidates: Vec<WorldPoint> = grid
            .layout()
            .open_cells()
            .map(|cell| grid.to_world(cell))
            .filter(|center| {
                let point = Aabb::from_center(*center, 0.0);
                !obstacles.iter().any(|volume| volume.intersects(&point))
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }

        for attempt in 0..AGENT_ATTEMPTS {
            let candidate = candidates[self.rng.gen_range(0..candidates.len())];
            let distance = candidate.distance_to(player);
            let preferred = distance > AGENT_MIN_DISTANCE && distance < AGENT_MAX_DISTANCE;
            let relaxed = attempt >= AGENT_RELAXED_AFTER && distance > AGENT_RELAXED_DISTANCE;
            if preferred || relaxed {
                debug!(attempt, distance, "agent placed");
                return Some(candidate);
            }
        }

        let farthest = candidates.into_iter().max_by(|left, right| {
            left.distance_to(player).total_cmp(&right.distance_to(player))
        });
        debug!(?farthest, "agent placed on farthest cell");
        farthest
    }

    fn place_obstacles(&mut self, grid: &WallGrid, out: &mut Vec<Command>) {
        let layout = grid.layout();
        for row in 1..layout.rows().saturating_sub(1) {
            for column in 1..layout.columns().saturating_sub(1) {
                let cell = CellCoord::new(column, row);
                if !layout.is_wall(cell) || !joins_opposite_paths(grid, cell) {
                    continue;
                }
                if !self.rng.gen_bool(self.obstacle_probability) {
                    continue;
                }
                let kind = if self.rng.gen_bool(0.5) {
                    ObstacleKind::Proximity
                } else {
                    ObstacleKind::Trigger
                };
                out.push(Command::PlaceObstacle { cell, kind });
            }
        }
    }

    fn select_relic_cell(&mut self, grid: &WallGrid, spawn: CellCoord) -> Option<CellCoord> {
        let layout = grid.layout();
        let (columns, rows) = (layout.columns(), layout.rows());
        if columns > 2 && rows > 2 {
            for attempt in 0..RELIC_ATTEMPTS {
                let cell = CellCoord::new(
                    self.rng.gen_range(1..columns - 1),
                    self.rng.gen_range(1..rows - 1),
                );
                if !layout.is_wall(cell) && cell.euclidean_distance(spawn) > RELIC_MIN_CELLS {
                    debug!(attempt, ?cell, "relic cell selected");
                    return Some(cell);
                }
            }
        }

        let mut field = NavigationField::default();
        field.rebuild(grid, &[spawn]);
        let farthest = field
            .reachable_cells()
            .max_by_key(|cell| (field.distance(*cell), std::cmp::Reverse(*cell)));
        debug!(?farthest, "relic falls back to farthest reachable cell");
        farthest
    }
}

/// Reports whether a wall cell separates two path cells on opposite sides.
fn joins_opposite_paths(grid: &WallGrid, cell: CellCoord) -> bool {
    let layout = grid.layout();
    let (column, row) = (cell.column(), cell.row());
    let open = |column: Option<u32>, row: Option<u32>| match (column, row) {
        (Some(column), Some(row)) => !layout.is_wall(CellCoord::new(column, row)),
        _ => false,
    };

    let horizontal =
        open(column.checked_sub(1), Some(row)) && open(column.checked_add(1), Some(row));
    let vertical =
        open(Some(column), row.checked_sub(1)) && open(Some(column), row.checked_add(1));
    horizontal || vertical
}
