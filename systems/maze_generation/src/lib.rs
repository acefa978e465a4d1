#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded maze generator combining a randomized backtracker with room carving.

use std::ops::RangeInclusive;

use maze_escape_core::{CellCoord, ConfigurationError, MazeLayout};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Offsets to the cells two steps away that the backtracker may carve into.
const CARVE_OFFSETS: [(i64, i64); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];
/// Number of rooms carved after the corridors are laid out.
const ROOM_COUNT: RangeInclusive<u32> = 3..=6;
/// Side length of a carved room, chosen per axis.
const ROOM_SIDE: RangeInclusive<u32> = 2..=3;
/// Smallest dimension that leaves an interior cell to carve from.
const MINIMUM_DIMENSION: u32 = 3;

/// Configuration parameters required to construct the maze generator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }

    /// Seed used to initialise the generator's random stream.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Produces perfect mazes opened up with a handful of rooms.
///
/// Generators built from the same [`Config`] yield the same sequence of
/// layouts.
#[derive(Debug)]
pub struct MazeGenerator {
    rng: ChaCha8Rng,
}

impl MazeGenerator {
    /// Creates a new generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Generates a layout with the provided dimensions.
    ///
    /// The border is always wall and every path cell is reachable from
    /// `(1, 1)`. Dimensions below three are rejected.
    pub fn generate(&mut self, columns: u32, rows: u32) -> Result<MazeLayout, ConfigurationError> {
        if columns < MINIMUM_DIMENSION || rows < MINIMUM_DIMENSION {
            return Err(ConfigurationError::DegenerateDimensions { columns, rows });
        }

        let mut layout = MazeLayout::filled(columns, rows);
        self.carve_corridors(&mut layout);
        let rooms = self.carve_rooms(&mut layout);
        debug!(columns, rows, rooms, "maze generated");
        Ok(layout)
    }

    fn carve_corridors(&mut self, layout: &mut MazeLayout) {
        let start = CellCoord::new(1, 1);
        layout.set_wall(start, false);
        let mut stack = vec![self.frame(start)];

        while let Some(frame) = stack.last_mut() {
            let Some(&(dx, dz)) = frame.offsets.get(frame.next) else {
                let _ = stack.pop();
                continue;
            };
            frame.next += 1;
            let cell = frame.cell;

            let Some(target) = interior_offset(layout, cell, dx, dz) else {
                continue;
            };
            if !layout.is_wall(target) {
                continue;
            }

            if let Some(between) = interior_offset(layout, cell, dx / 2, dz / 2) {
                layout.set_wall(between, false);
            }
            layout.set_wall(target, false);
            let next = self.frame(target);
            stack.push(next);
        }
    }

    fn frame(&mut self, cell: CellCoord) -> Frame {
        let mut offsets = CARVE_OFFSETS;
        offsets.shuffle(&mut self.rng);
        Frame {
            cell,
            offsets,
            next: 0,
        }
    }

    fn carve_rooms(&mut self, layout: &mut MazeLayout) -> u32 {
        let count = self.rng.gen_range(ROOM_COUNT);
        let mut carved = 0;

        for _ in 0..count {
            let width = self.rng.gen_range(ROOM_SIDE);
            let height = self.rng.gen_range(ROOM_SIDE);
            let (Some(max_column), Some(max_row)) = (
                layout.columns().checked_sub(width + 2),
                layout.rows().checked_sub(height + 2),
            ) else {
                continue;
            };
            if max_column < 1 || max_row < 1 {
                continue;
            }

            let left = self.rng.gen_range(1..=max_column);
            let top = self.rng.gen_range(1..=max_row);
            for row in top..top + height {
                for column in left..left + width {
                    layout.set_wall(CellCoord::new(column, row), false);
                }
            }
            carved += 1;
        }

        carved
    }
}

/// Pending neighbour visits of a single cell on the backtracking stack.
#[derive(Debug)]
struct Frame {
    cell: CellCoord,
    offsets: [(i64, i64); 4],
    next: usize,
}

/// Offsets the cell, keeping the result strictly inside the border.
fn interior_offset(layout: &MazeLayout, cell: CellCoord, dx: i64, dz: i64) -> Option<CellCoord> {
    let column = i64::from(cell.column()) + dx;
    let row = i64::from(cell.row()) + dz;
    let inside = |value: i64, size: u32| value >= 1 && value < i64::from(size) - 1;
    if !inside(column, layout.columns()) || !inside(row, layout.rows()) {
        return None;
    }
    Some(CellCoord::new(
        u32::try_from(column).ok()?,
        u32::try_from(row).ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_maze_opens_single_cell() {
        let mut generator = MazeGenerator::new(Config::new(7));
        let layout = generator.generate(3, 3).expect("three is the minimum");

        let open: Vec<CellCoord> = layout.open_cells().collect();
        assert_eq!(open, vec![CellCoord::new(1, 1)]);
    }

    #[test]
    fn interior_offset_rejects_border_cells() {
        let layout = MazeLayout::filled(7, 7);
        assert_eq!(
            interior_offset(&layout, CellCoord::new(1, 1), 2, 0),
            Some(CellCoord::new(3, 1))
        );
        assert_eq!(interior_offset(&layout, CellCoord::new(5, 1), 2, 0), None);
        assert_eq!(interior_offset(&layout, CellCoord::new(1, 1), 0, -2), None);
    }

    #[test]
    fn rooms_never_touch_the_border() {
        let mut generator = MazeGenerator::new(Config::new(99));
        let mut layout = MazeLayout::filled(9, 9);
        for _ in 0..32 {
            let _ = generator.carve_rooms(&mut layout);
        }

        for cell in layout.open_cells() {
            assert!(!layout.is_border(cell), "{cell:?} touches the border");
        }
    }
}
