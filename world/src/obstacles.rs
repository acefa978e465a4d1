//! Authoritative dynamic obstacle state management utilities.

use std::{collections::BTreeMap, time::Duration};

use maze_escape_core::{Aabb, CellCoord, Event, ObstacleId, ObstacleKind, WorldPoint};

/// Player distance below which proximity obstacles slide open.
const PROXIMITY_OPEN_RADIUS: f32 = 5.0;
/// Player distance below which a jump toggles trigger obstacles.
const TRIGGER_RADIUS: f32 = 8.0;
/// Fraction of the full opening travelled per second.
const OPENING_RATE: f32 = 2.0;
/// Obstacles stop blocking once they opened past this fraction.
const BLOCKING_THRESHOLD: f32 = 0.8;

/// State of a single openable obstacle stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct ObstacleState {
    pub(crate) id: ObstacleId,
    pub(crate) kind: ObstacleKind,
    pub(crate) cell: CellCoord,
    pub(crate) bounds: Aabb,
    /// Latched open request for trigger obstacles.
    toggled_open: bool,
    /// 0 when fully closed, 1 when fully open.
    pub(crate) transition: f32,
}

impl ObstacleState {
    pub(crate) fn is_blocking(&self) -> bool {
        self.transition < BLOCKING_THRESHOLD
    }

    fn wants_open(&self, player: WorldPoint) -> bool {
        match self.kind {
            ObstacleKind::Proximity => {
                player.distance_to(self.bounds.center()) < PROXIMITY_OPEN_RADIUS
            }
            ObstacleKind::Trigger => self.toggled_open,
        }
    }
}

/// Registry that stores obstacles and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ObstacleRegistry {
    entries: BTreeMap<ObstacleId, ObstacleState>,
    next_obstacle_id: ObstacleId,
}

impl ObstacleRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_obstacle_id: ObstacleId::new(0),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_obstacle_id = ObstacleId::new(0);
    }

    pub(crate) fn contains_cell(&self, cell: CellCoord) -> bool {
        self.entries.values().any(|obstacle| obstacle.cell == cell)
    }

    /// Registers a fully closed obstacle covering the provided bounds.
    pub(crate) fn insert(
        &mut self,
        cell: CellCoord,
        kind: ObstacleKind,
        bounds: Aabb,
    ) -> ObstacleId {
        let id = self.next_obstacle_id;
        self.next_obstacle_id = ObstacleId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            ObstacleState {
                id,
                kind,
                cell,
                bounds,
                toggled_open: false,
                transition: 0.0,
            },
        );
        id
    }

    /// Flips every trigger obstacle within reach of the jumping player.
    pub(crate) fn toggle_triggers_near(&mut self, player: WorldPoint) -> usize {
        let mut toggled = 0;
        for obstacle in self.entries.values_mut() {
            if obstacle.kind == ObstacleKind::Trigger
                && player.distance_to(obstacle.bounds.center()) < TRIGGER_RADIUS
            {
                obstacle.toggled_open = !obstacle.toggled_open;
                toggled += 1;
            }
        }
        toggled
    }

    /// Animates every obstacle toward its requested state.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        player: WorldPoint,
        out_events: &mut Vec<Event>,
    ) {
        let step = dt.as_secs_f32() * OPENING_RATE;
        for obstacle in self.entries.values_mut() {
            let was_blocking = obstacle.is_blocking();
            obstacle.transition = if obstacle.wants_open(player) {
                (obstacle.transition + step).min(1.0)
            } else {
                (obstacle.transition - step).max(0.0)
            };

            match (was_blocking, obstacle.is_blocking()) {
                (true, false) => out_events.push(Event::ObstacleOpened {
                    obstacle: obstacle.id,
                }),
                (false, true) => out_events.push(Event::ObstacleClosed {
                    obstacle: obstacle.id,
                }),
                _ => {}
            }
        }
    }

    /// Bounds of the obstacles that currently block movement.
    pub(crate) fn blocking_volumes(&self) -> Vec<Aabb> {
        self.entries
            .values()
            .filter(|obstacle| obstacle.is_blocking())
            .map(|obstacle| obstacle.bounds)
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ObstacleState> {
        self.entries.values()
    }
}
