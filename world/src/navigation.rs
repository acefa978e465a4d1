//! Breadth-first navigation field over the walkable maze cells.

use std::collections::VecDeque;

use maze_escape_core::{CellCoord, WallGrid};

/// Dense cardinal-step distance grid seeded from a set of source cells.
///
/// Distances default to `u16::MAX` for walls and for cells the sources cannot
/// reach so callers can distinguish them from walkable tiles.
#[derive(Clone, Debug, Default)]
pub struct NavigationField {
    width: u32,
    height: u32,
    distances: Vec<u16>,
}

impl NavigationField {
    /// Rebuilds the distances from the provided sources across the grid's path cells.
    pub fn rebuild(&mut self, grid: &WallGrid, sources: &[CellCoord]) {
        let layout = grid.layout();
        self.rebuild_with(layout.columns(), layout.rows(), sources, |cell| {
            layout.is_wall(cell)
        });
    }

    fn rebuild_with<F>(&mut self, width: u32, height: u32, sources: &[CellCoord], is_blocked: F)
    where
        F: Fn(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;
        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        let mut queue = VecDeque::new();
        for &source in sources {
            if source.column() >= width || source.row() >= height || is_blocked(source) {
                continue;
            }

            if let Some(index) = index(width_usize, source) {
                if self.distances[index] == 0 {
                    continue;
                }
                self.distances[index] = 0;
                queue.push_back(source);
            }
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(width_usize, cell) else {
                continue;
            };
            let current_distance = self.distances[current_index];
            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }
            let next_distance = current_distance + 1;

            for neighbor in neighbors(cell, width, height) {
                if is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = index(width_usize, neighbor) else {
                    continue;
                };
                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }
                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Width of the field in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the field in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Step distance to the nearest source, `u16::MAX` when unreachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u16> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        index(width, cell).and_then(|offset| self.distances.get(offset).copied())
    }

    /// Neighbouring cell that moves one step closer to the nearest source.
    ///
    /// Ties resolve to the smallest column, then the smallest row. Sources and
    /// unreachable cells yield `None`.
    #[must_use]
    pub fn next_step(&self, cell: CellCoord) -> Option<CellCoord> {
        let current = self.distance(cell)?;
        if current == 0 || current == u16::MAX {
            return None;
        }

        neighbors(cell, self.width, self.height)
            .filter_map(|neighbor| {
                let distance = self.distance(neighbor)?;
                (distance < current).then_some((
                    distance,
                    neighbor.column(),
                    neighbor.row(),
                    neighbor,
                ))
            })
            .min_by_key(|&(distance, column, row, _)| (distance, column, row))
            .map(|(_, _, _, neighbor)| neighbor)
    }

    /// Cells reachable from at least one source, in row-major order.
    pub fn reachable_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let width = self.width.max(1);
        self.distances
            .iter()
            .enumerate()
            .filter(|(_, distance)| **distance != u16::MAX)
            .filter_map(move |(offset, _)| {
                let offset = u32::try_from(offset).ok()?;
                Some(CellCoord::new(offset % width, offset / width))
            })
    }
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
