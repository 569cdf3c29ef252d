//! Static occupancy grid describing the maze walls.

use glam::Vec3;
use maze_escape_core::CellCoord;

use crate::config::ConfigError;

/// Occupancy of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Solid cell that participates in collision queries.
    Wall,
    /// Walkable cell.
    Open,
}

impl Cell {
    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' | '1' => Some(Self::Wall),
            '.' | '0' | ' ' => Some(Self::Open),
            _ => None,
        }
    }
}

/// Dense row-major occupancy grid.
///
/// Cell `(row, column)` is centred on `(column * cell_size, 0, row * cell_size)`
/// and spans half a cell in every horizontal direction. The grid is immutable
/// once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct MazeGrid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<Cell>,
}

impl MazeGrid {
    /// Creates a grid from explicit dimensions and row-major cells.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_size: f32,
        cells: Vec<Cell>,
    ) -> Result<Self, ConfigError> {
        if columns == 0 || rows == 0 {
            return Err(ConfigError::EmptyLayout);
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "maze.cell_size",
                value: cell_size,
            });
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX);
        if cells.len() != expected {
            return Err(ConfigError::DimensionMismatch {
                expected,
                found: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cell_size,
            cells,
        })
    }

    /// Parses a textual layout where `#`/`1` mark walls and `.`/`0`/space mark open cells.
    pub fn from_layout<S>(layout: &[S], cell_size: f32) -> Result<Self, ConfigError>
    where
        S: AsRef<str>,
    {
        let expected = layout.first().map_or(0, |row| row.as_ref().chars().count());
        if expected == 0 {
            return Err(ConfigError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(expected * layout.len());
        for (row_index, row) in layout.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(ConfigError::RaggedLayout {
                    row: row_index,
                    expected,
                    found,
                });
            }

            for (column_index, glyph) in row.chars().enumerate() {
                let cell = Cell::from_glyph(glyph).ok_or(ConfigError::UnknownGlyph {
                    glyph,
                    row: row_index,
                    column: column_index,
                })?;
                cells.push(cell);
            }
        }

        let columns = u32::try_from(expected).map_err(|_| ConfigError::EmptyLayout)?;
        let rows = u32::try_from(layout.len()).map_err(|_| ConfigError::EmptyLayout)?;
        Self::new(columns, rows, cell_size, cells)
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Row-major cell storage.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell at `(row, column)` is solid.
    ///
    /// Anything outside the grid is solid, so agents can never leave the maze
    /// envelope.
    #[must_use]
    pub fn is_wall(&self, row: i64, column: i64) -> bool {
        if row < 0
            || column < 0
            || row >= i64::from(self.rows)
            || column >= i64::from(self.columns)
        {
            return true;
        }

        let Ok(row) = usize::try_from(row) else {
            return true;
        };
        let Ok(column) = usize::try_from(column) else {
            return true;
        };
        let width = self.columns as usize;
        self.cells
            .get(row * width + column)
            .map_or(true, |cell| *cell == Cell::Wall)
    }

    /// Reports whether the provided cell coordinate is solid.
    #[must_use]
    pub fn is_wall_cell(&self, cell: CellCoord) -> bool {
        self.is_wall(i64::from(cell.row()), i64::from(cell.column()))
    }

    /// World-space centre of the provided cell at ground height.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(
            cell.column() as f32 * self.cell_size,
            0.0,
            cell.row() as f32 * self.cell_size,
        )
    }

    /// Tests a disc of `radius` centred on `(x, z)` against the wall cells.
    ///
    /// Each candidate wall is treated as an axis-aligned square; the disc
    /// collides when the squared distance to the closest point on the square is
    /// strictly below `radius²`. Only cells within reach of the disc are
    /// visited, and cells outside the grid count as walls. Non-finite inputs
    /// always collide.
    #[must_use]
    pub fn collides(&self, x: f32, z: f32, radius: f32) -> bool {
        if !(x.is_finite() && z.is_finite() && radius.is_finite()) {
            return true;
        }

        let radius = radius.max(0.0);
        let radius_squared = radius * radius;
        let reach = radius / self.cell_size + 0.5;
        let column_center = x / self.cell_size;
        let row_center = z / self.cell_size;
        let columns = self.columns as f32;
        let rows = self.rows as f32;

        // A centre beyond the outer cell edges sits inside out-of-bounds wall.
        if column_center < -0.5
            || row_center < -0.5
            || column_center > columns - 0.5
            || row_center > rows - 0.5
        {
            return radius_squared > 0.0;
        }

        // Cells past one ring of out-of-bounds wall cannot be closer than it.
        let first_column = (column_center - reach).floor().max(-1.0) as i64;
        let last_column = (column_center + reach).ceil().min(columns) as i64;
        let first_row = (row_center - reach).floor().max(-1.0) as i64;
        let last_row = (row_center + reach).ceil().min(rows) as i64;

        let half = self.cell_size / 2.0;

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                if !self.is_wall(row, column) {
                    continue;
                }

                let center_x = column as f32 * self.cell_size;
                let center_z = row as f32 * self.cell_size;
                let closest_x = x.clamp(center_x - half, center_x + half);
                let closest_z = z.clamp(center_z - half, center_z + half);
                let dx = x - closest_x;
                let dz = z - closest_z;
                if dx * dx + dz * dz < radius_squared {
                    return true;
                }
            }
        }

        false
    }

    /// World-space centres of every wall cell in row-major order.
    #[must_use]
    pub fn wall_positions(&self) -> Vec<Vec3> {
        let width = self.columns as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Wall)
            .map(|(index, _)| {
                let row = index / width;
                let column = index % width;
                Vec3::new(
                    column as f32 * self.cell_size,
                    0.0,
                    row as f32 * self.cell_size,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(columns: usize, rows: usize) -> Vec<String> {
        (0..rows)
            .map(|row| {
                (0..columns)
                    .map(|column| {
                        if row == 0 || column == 0 || row + 1 == rows || column + 1 == columns {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn out_of_bounds_queries_report_walls() {
        let grid = MazeGrid::from_layout(&ring(4, 3), 1.0).expect("valid layout");

        assert!(grid.is_wall(-1, 1));
        assert!(grid.is_wall(1, -1));
        assert!(grid.is_wall(3, 1));
        assert!(grid.is_wall(1, 4));
        assert!(grid.is_wall(i64::MAX, i64::MIN));
        assert!(!grid.is_wall(1, 1));
    }

    #[test]
    fn collides_uses_closest_point_on_cell_square() {
        let grid = MazeGrid::from_layout(&["#.", ".."], 1.0).expect("valid layout");

        // Wall (0, 0) spans [-0.5, 0.5] on both axes.
        assert!(grid.collides(0.0, 0.0, 0.1));
        assert!(grid.collides(0.6, 0.0, 0.15));
        assert!(!grid.collides(1.0, 1.0, 0.3));
        // Touching exactly is not a collision.
        assert!(!grid.collides(0.75, 0.0, 0.25));
    }

    #[test]
    fn zero_radius_disc_never_collides() {
        let grid = MazeGrid::from_layout(&["...", ".#.", "..."], 1.0).expect("valid layout");

        assert!(!grid.collides(0.0, 0.0, 0.0));
        assert!(grid.collides(1.0, 0.6, 0.2));
    }

    #[test]
    fn leaving_the_envelope_counts_as_collision() {
        let grid = MazeGrid::from_layout(&["..", ".."], 1.0).expect("valid layout");

        assert!(!grid.collides(0.5, 0.5, 0.2));
        assert!(grid.collides(-0.4, 0.5, 0.2));
        assert!(grid.collides(f32::NAN, 0.0, 0.2));
    }

    #[test]
    fn far_away_points_collide_with_the_envelope() {
        let grid = MazeGrid::from_layout(&ring(3, 3), 1.0).expect("valid layout");

        assert!(grid.collides(1e20, 1.0, 0.15));
        assert!(grid.collides(1.0, -1e20, 0.15));
        assert!(grid.collides(-3.0e38, 3.0e38, 0.15));
        assert!(grid.collides(1.0, 1.0, 1e20));
        assert!(!grid.collides(1.0, 1.0, 0.15));
    }

    #[test]
    fn wall_positions_enumerate_row_major_centres() {
        let grid = MazeGrid::from_layout(&["#.", ".#"], 2.0).expect("valid layout");

        assert_eq!(
            grid.wall_positions(),
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 2.0)]
        );
    }

    #[test]
    fn malformed_layouts_fail_fast() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            MazeGrid::from_layout(&empty, 1.0),
            Err(ConfigError::EmptyLayout)
        ));
        assert!(matches!(
            MazeGrid::from_layout(&["##", "#"], 1.0),
            Err(ConfigError::RaggedLayout {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            MazeGrid::from_layout(&["#x"], 1.0),
            Err(ConfigError::UnknownGlyph { glyph: 'x', .. })
        ));
        assert!(matches!(
            MazeGrid::from_layout(&["#."], 0.0),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            MazeGrid::new(2, 2, 1.0, vec![Cell::Open; 3]),
            Err(ConfigError::DimensionMismatch {
                expected: 4,
                found: 3
            })
        ));
    }
}
