#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches or, in the case
//! of the pursuit agent, with events describing its own state changes.

mod grid;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use grid::{Aabb, MazeLayout, WallGrid};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Escape.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a freshly generated maze and resets the session around it.
    InstallMaze {
        /// Wall layout produced by the maze generator.
        layout: MazeLayout,
        /// Side length of each square cell measured in world units.
        cell_length: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports the player's new position on the horizontal plane.
    MovePlayer {
        /// World position the player moved to.
        position: WorldPoint,
    },
    /// Reports that the player jumped, toggling nearby trigger obstacles.
    PlayerJumped,
    /// Converts an interior wall cell into a dynamic obstacle.
    PlaceObstacle {
        /// Wall cell that should become openable.
        cell: CellCoord,
        /// Opening behaviour of the obstacle.
        kind: ObstacleKind,
    },
    /// Places the relic the player must reach to escape.
    PlaceRelic {
        /// Path cell that hosts the relic.
        cell: CellCoord,
    },
    /// Requests activation of the stun charm.
    UseCharm,
    /// Reports that the pursuit agent caught the player.
    ReportCaught,
}

/// Events broadcast by the world and the pursuit agent.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a maze was installed and the session reset.
    MazeInstalled {
        /// Number of columns in the installed grid.
        columns: u32,
        /// Number of rows in the installed grid.
        rows: u32,
        /// Cell the player spawns in.
        spawn: CellCoord,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: WorldPoint,
        /// Position after the move.
        to: WorldPoint,
    },
    /// Confirms that a dynamic obstacle was registered.
    ObstaclePlaced {
        /// Identifier allocated to the obstacle.
        obstacle: ObstacleId,
        /// Cell covered by the obstacle.
        cell: CellCoord,
        /// Opening behaviour of the obstacle.
        kind: ObstacleKind,
    },
    /// Reports that an obstacle placement request was rejected.
    ObstaclePlacementRejected {
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that an obstacle opened far enough to stop blocking movement.
    ObstacleOpened {
        /// Identifier of the obstacle.
        obstacle: ObstacleId,
    },
    /// Announces that an obstacle closed far enough to block movement again.
    ObstacleClosed {
        /// Identifier of the obstacle.
        obstacle: ObstacleId,
    },
    /// Confirms that the relic was placed.
    RelicPlaced {
        /// Cell hosting the relic.
        cell: CellCoord,
    },
    /// Reports that the player reached the relic.
    RelicCollected,
    /// Reports that the stun charm fired.
    CharmActivated {
        /// Stun duration that should be applied to the pursuit agent.
        stun_duration: Duration,
    },
    /// Reports that the stun charm is still recharging.
    CharmRecharging {
        /// Cooldown left before the charm can fire again.
        remaining: Duration,
    },
    /// Announces that the pursuit agent changed behavioural state.
    AgentStateChanged {
        /// State before the transition.
        from: PursuitState,
        /// State after the transition.
        to: PursuitState,
    },
    /// Announces that the pursuit agent recovered from a stun.
    AgentRecovered,
    /// Terminal event raised when the pursuit agent reaches the player.
    PlayerCaught {
        /// Agent position at the time of the catch.
        agent: WorldPoint,
        /// Player position at the time of the catch.
        player: WorldPoint,
    },
    /// Announces that the session ended.
    SessionEnded {
        /// How the session ended.
        outcome: SessionOutcome,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the straight-line distance between two cells measured in cells.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f32 {
        let columns = self.column().abs_diff(other.column()) as f32;
        let rows = self.row().abs_diff(other.row()) as f32;
        (columns * columns + rows * rows).sqrt()
    }
}

/// Point on the horizontal plane of the world.
///
/// The game world is three dimensional, but every rule in the simulation
/// resolves on the ground plane. Heights only matter to external raycasters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    z: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Position along the world X axis.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Position along the world Z axis.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Returns a copy translated by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Straight-line distance to another point.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Behavioural states of the pursuit agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuitState {
    /// Target unseen and beyond search range; heads straight for the player.
    Hunting,
    /// Target unseen but within search range; wanders in frantic bursts.
    Searching,
    /// Target in sight, or lost for less than the persistence window.
    Chasing,
}

impl PursuitState {
    /// Lowercase label used in logs and adapter output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hunting => "hunting",
            Self::Searching => "searching",
            Self::Chasing => "chasing",
        }
    }
}

/// Read-only snapshot of the pursuit agent used by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Current agent position.
    pub position: WorldPoint,
    /// Facing angle in radians measured from the X axis toward the Z axis.
    pub heading: f32,
    /// Behavioural state.
    pub state: PursuitState,
    /// Whether the agent is currently stunned.
    pub stunned: bool,
    /// Decaying 0..=1 intensity of the stun shock for presentation code.
    pub shock_intensity: f32,
    /// Movement speed implied by the current state.
    pub speed: f32,
}

/// Unique identifier assigned to a dynamic obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opening behaviour of a dynamic obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Slides open while the player stands nearby.
    Proximity,
    /// Toggles whenever the player jumps nearby.
    Trigger,
}

/// Reasons an obstacle placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the installed grid.
    OutOfBounds,
    /// The requested cell lies on the outer border of the grid.
    Border,
    /// The requested cell is not a wall.
    NotWall,
    /// The session already ended.
    SessionOver,
}

/// Final outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The pursuit agent reached the player.
    Caught,
    /// The player reached the relic.
    Escaped,
}

/// Predicate answering whether an unobstructed straight path joins two points.
///
/// Implementations consider static geometry only. Openable obstacles never
/// occlude sight.
pub trait LineOfSight {
    /// Returns `true` when nothing static blocks the segment between the points.
    fn is_clear(&self, from: WorldPoint, to: WorldPoint) -> bool;
}

impl<F> LineOfSight for F
where
    F: Fn(WorldPoint, WorldPoint) -> bool,
{
    fn is_clear(&self, from: WorldPoint, to: WorldPoint) -> bool {
        self(from, to)
    }
}

/// Caller contract violations reported by constructors and generators.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Grid dimensions too small to hold a walled perimeter around a cell.
    #[error("maze dimensions {columns}x{rows} are degenerate; both sides must be at least 3")]
    DegenerateDimensions {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Cell length that is not a finite positive number.
    #[error("cell length {0} must be finite and greater than zero")]
    InvalidCellLength(f32),
}
