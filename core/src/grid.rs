//! Wall layouts and the mapping between grid cells and world space.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, ConfigurationError, WorldPoint};

/// Dense row-major matrix of wall flags.
///
/// Cells outside the layout always report as walls, so nothing can leave the
/// play area through an indexing mistake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLayout {
    columns: u32,
    rows: u32,
    walls: Vec<bool>,
}

impl MazeLayout {
    /// Creates a layout in which every cell is a wall.
    #[must_use]
    pub fn filled(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            walls: vec![true; capacity],
        }
    }

    /// Builds a layout from row-major wall flags.
    ///
    /// Returns `None` when the flag count does not match the dimensions.
    #[must_use]
    pub fn from_walls(columns: u32, rows: u32, walls: Vec<bool>) -> Option<Self> {
        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).ok()?;
        (walls.len() == expected).then_some(Self {
            columns,
            rows,
            walls,
        })
    }

    /// Number of columns in the layout.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the layout.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the layout.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell lies on the outermost ring of the layout.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 == self.columns
            || cell.row() + 1 == self.rows
    }

    /// Whether the cell is a wall. Out-of-range cells are walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(true)
    }

    /// Overwrites a single cell. Out-of-range cells are ignored.
    pub fn set_wall(&mut self, cell: CellCoord, wall: bool) {
        if let Some(slot) = self.index(cell).and_then(|index| self.walls.get_mut(index)) {
            *slot = wall;
        }
    }

    /// Row-major wall flags.
    #[must_use]
    pub fn walls(&self) -> &[bool] {
        &self.walls
    }

    /// Iterates over every path cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, wall)| !**wall)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % columns, index / columns))
            })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Wall layout anchored in world space.
///
/// The grid is centred on the world origin: column `c` spans
/// `[(c - columns/2) * cell_length, (c + 1 - columns/2) * cell_length)` along X,
/// and rows map onto Z the same way.
#[derive(Clone, Debug, PartialEq)]
pub struct WallGrid {
    layout: MazeLayout,
    cell_length: f32,
}

impl WallGrid {
    /// Anchors a layout in world space using the provided cell length.
    pub fn new(layout: MazeLayout, cell_length: f32) -> Result<Self, ConfigurationError> {
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(ConfigurationError::InvalidCellLength(cell_length));
        }
        Ok(Self {
            layout,
            cell_length,
        })
    }

    /// Grid without any cells; every query reports a wall.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            layout: MazeLayout::filled(0, 0),
            cell_length: 1.0,
        }
    }

    /// Underlying wall layout.
    #[must_use]
    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    /// Mutable access to the layout for setup steps that open cells.
    pub fn layout_mut(&mut self) -> &mut MazeLayout {
        &mut self.layout
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Centre of the provided cell in world space.
    #[must_use]
    pub fn to_world(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            axis_to_world(cell.column(), self.layout.columns(), self.cell_length),
            axis_to_world(cell.row(), self.layout.rows(), self.cell_length),
        )
    }

    /// Raw grid indices containing the point; may fall outside the grid.
    #[must_use]
    pub fn to_grid(&self, point: WorldPoint) -> (i64, i64) {
        (
            axis_to_grid(point.x(), self.layout.columns(), self.cell_length),
            axis_to_grid(point.z(), self.layout.rows(), self.cell_length),
        )
    }

    /// Cell containing the point, or `None` when the point lies outside the grid.
    #[must_use]
    pub fn cell_at(&self, point: WorldPoint) -> Option<CellCoord> {
        let (column, row) = self.to_grid(point);
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        let cell = CellCoord::new(column, row);
        self.layout.contains(cell).then_some(cell)
    }

    /// Whether the point lies inside a wall. Points outside the grid are walls.
    #[must_use]
    pub fn is_wall_at_world(&self, point: WorldPoint) -> bool {
        self.cell_at(point).map_or(true, |cell| self.layout.is_wall(cell))
    }

    /// World-space bounds covered by a single cell.
    #[must_use]
    pub fn cell_bounds(&self, cell: CellCoord) -> Aabb {
        Aabb::from_center(self.to_world(cell), self.cell_length * 0.5)
    }
}

fn axis_to_world(index: u32, count: u32, cell_length: f32) -> f32 {
    (index as f32 - count as f32 / 2.0 + 0.5) * cell_length
}

fn axis_to_grid(coordinate: f32, count: u32, cell_length: f32) -> i64 {
    (coordinate / cell_length + count as f32 / 2.0).floor() as i64
}

/// Axis-aligned rectangle on the horizontal plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: WorldPoint,
    max: WorldPoint,
}

impl Aabb {
    /// Creates a rectangle from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: WorldPoint, b: WorldPoint) -> Self {
        Self {
            min: WorldPoint::new(a.x().min(b.x()), a.z().min(b.z())),
            max: WorldPoint::new(a.x().max(b.x()), a.z().max(b.z())),
        }
    }

    /// Creates a square centred on the point.
    #[must_use]
    pub fn from_center(center: WorldPoint, half_extent: f32) -> Self {
        Self::from_corners(
            center.offset(-half_extent, -half_extent),
            center.offset(half_extent, half_extent),
        )
    }

    /// Corner with the smallest coordinates.
    #[must_use]
    pub const fn min(&self) -> WorldPoint {
        self.min
    }

    /// Corner with the largest coordinates.
    #[must_use]
    pub const fn max(&self) -> WorldPoint {
        self.max
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            (self.min.x() + self.max.x()) * 0.5,
            (self.min.z() + self.max.z()) * 0.5,
        )
    }

    /// Whether two rectangles overlap. Touching edges count as overlap.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x() <= other.max.x()
            && self.max.x() >= other.min.x()
            && self.min.z() <= other.max.z()
            && self.max.z() >= other.min.z()
    }
}
