//! Static-wall line of sight traced cell by cell along the segment.

use maze_escape_core::{CellCoord, LineOfSight, WallGrid, WorldPoint};

/// Line of sight predicate that only considers the static maze walls.
///
/// Every cell the segment passes through is visited in order, so a segment
/// clipping the corner of a wall cell is blocked. Dynamic obstacle cells are
/// path cells in the layout, so open and closed doors alike let the view
/// through.
#[derive(Clone, Copy, Debug)]
pub struct GridSightline<'a> {
    grid: &'a WallGrid,
}

impl<'a> GridSightline<'a> {
    /// Creates a sightline predicate over the provided grid.
    #[must_use]
    pub const fn new(grid: &'a WallGrid) -> Self {
        Self { grid }
    }

    fn is_wall(&self, (column, row): (i64, i64)) -> bool {
        match (u32::try_from(column), u32::try_from(row)) {
            (Ok(column), Ok(row)) => self.grid.layout().is_wall(CellCoord::new(column, row)),
            _ => true,
        }
    }

    /// Continuous grid-space coordinates of a world point.
    fn grid_space(&self, point: WorldPoint) -> (f32, f32) {
        let layout = self.grid.layout();
        let length = self.grid.cell_length();
        (
            point.x() / length + layout.columns() as f32 / 2.0,
            point.z() / length + layout.rows() as f32 / 2.0,
        )
    }
}

/// Per-axis traversal state: step direction, parameter of the next cell
/// boundary and parameter distance between boundaries.
fn axis_walk(origin: f32, delta: f32, cell: i64) -> (i64, f32, f32) {
    if delta > 0.0 {
        (1, ((cell + 1) as f32 - origin) / delta, 1.0 / delta)
    } else if delta < 0.0 {
        (-1, (origin - cell as f32) / -delta, -1.0 / delta)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    }
}

impl LineOfSight for GridSightline<'_> {
    fn is_clear(&self, from: WorldPoint, to: WorldPoint) -> bool {
        let (x0, z0) = self.grid_space(from);
        let (x1, z1) = self.grid_space(to);
        if !(x0.is_finite() && z0.is_finite() && x1.is_finite() && z1.is_finite()) {
            return false;
        }

        let mut cell = self.grid.to_grid(from);
        let end = self.grid.to_grid(to);
        let (step_x, mut next_x, delta_x) = axis_walk(x0, x1 - x0, cell.0);
        let (step_z, mut next_z, delta_z) = axis_walk(z0, z1 - z0, cell.1);

        let crossings = (end.0 - cell.0).abs() + (end.1 - cell.1).abs();
        for _ in 0..=crossings {
            if self.is_wall(cell) {
                return false;
            }
            if cell == end || next_x.min(next_z) > 1.0 {
                return true;
            }
            if next_x < next_z {
                cell.0 += step_x;
                next_x += delta_x;
            } else {
                cell.1 += step_z;
                next_z += delta_z;
            }
        }
        !self.is_wall(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_escape_core::MazeLayout;

    fn corridor_grid() -> WallGrid {
        let rows = ["#######", "#.....#", "#.###.#", "#.....#", "#######"];
        let walls = rows
            .iter()
            .flat_map(|row| row.chars().map(|glyph| glyph == '#'))
            .collect();
        let layout = MazeLayout::from_walls(7, 5, walls).expect("consistent layout");
        WallGrid::new(layout, 4.0).expect("valid cell length")
    }

    #[test]
    fn straight_corridor_is_clear() {
        let grid = corridor_grid();
        let sight = GridSightline::new(&grid);
        let from = grid.to_world(CellCoord::new(1, 1));
        let to = grid.to_world(CellCoord::new(5, 1));
        assert!(sight.is_clear(from, to));
    }

    #[test]
    fn wall_between_points_blocks_view() {
        let grid = corridor_grid();
        let sight = GridSightline::new(&grid);
        let from = grid.to_world(CellCoord::new(3, 1));
        let to = grid.to_world(CellCoord::new(3, 3));
        assert!(!sight.is_clear(from, to));
    }

    #[test]
    fn identical_points_on_path_are_clear() {
        let grid = corridor_grid();
        let sight = GridSightline::new(&grid);
        let point = grid.to_world(CellCoord::new(1, 3));
        assert!(sight.is_clear(point, point));
    }

    #[test]
    fn segment_clipping_a_wall_corner_is_blocked() {
        let mut layout = MazeLayout::filled(8, 8);
        for row in 1..7 {
            for column in 1..7 {
                layout.set_wall(CellCoord::new(column, row), false);
            }
        }
        layout.set_wall(CellCoord::new(4, 4), true);
        let grid = WallGrid::new(layout, 4.0).expect("valid cell length");
        let sight = GridSightline::new(&grid);

        assert!(grid.is_wall_at_world(WorldPoint::new(0.25, 0.25)));
        assert!(!sight.is_clear(WorldPoint::new(-5.0, 5.5), WorldPoint::new(5.5, -5.0)));
        assert!(sight.is_clear(WorldPoint::new(-5.0, 5.5), WorldPoint::new(-5.0, -5.0)));
    }

    #[test]
    fn endpoint_inside_a_wall_is_blocked() {
        let grid = corridor_grid();
        let sight = GridSightline::new(&grid);
        let from = grid.to_world(CellCoord::new(1, 1));
        let to = grid.to_world(CellCoord::new(3, 2));
        assert!(!sight.is_clear(from, to));
    }
}
