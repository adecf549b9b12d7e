#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for stimulus placement.

use stimulus_grid_core::{
    in_exclusion_zone, CellCoord, CellLabel, Command, ConfigError, Event, GridDimensions,
    OccupationError,
};
use tracing::debug;

/// Single addressable grid position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coord: CellCoord,
    label: CellLabel,
    occupied: bool,
}

impl Cell {
    fn reserved_for(coord: CellCoord, dimensions: GridDimensions) -> Self {
        Self {
            coord,
            label: coord.label(),
            occupied: dimensions.is_reserved(coord),
        }
    }

    /// Column and row of the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Human-readable identifier such as `"3D"`.
    #[must_use]
    pub const fn label(&self) -> &CellLabel {
        &self.label
    }

    /// Reports whether the cell is unavailable for new stimuli.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupied
    }
}

/// Dense occupancy grid owned by a single experiment session.
///
/// Cells are stored in row-major order. Occupancy only grows between resets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimensions: GridDimensions,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid with the border and middle column reserved.
    #[must_use]
    pub fn new(dimensions: GridDimensions) -> Self {
        let cells = dimensions
            .cells()
            .map(|coord| Cell::reserved_for(coord, dimensions))
            .collect();
        Self { dimensions, cells }
    }

    fn reset(&mut self) {
        let dimensions = self.dimensions;
        for cell in &mut self.cells {
            cell.occupied = dimensions.is_reserved(cell.coord);
        }
        debug!(
            columns = dimensions.columns(),
            rows = dimensions.rows(),
            "grid reset"
        );
    }

    fn occupy_exclusion_zone(&mut self, selected: CellCoord) -> u32 {
        let mut newly_occupied = 0;
        for cell in &mut self.cells {
            if !cell.occupied && in_exclusion_zone(selected, cell.coord) {
                cell.occupied = true;
                newly_occupied += 1;
            }
        }
        debug!(cell = %selected.label(), newly_occupied, "cell occupied");
        newly_occupied
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GridDimensions::STANDARD)
    }
}

/// Validates the dimensions and creates a grid in its reserved configuration.
pub fn create_grid(columns: u32, rows: u32) -> Result<Grid, ConfigError> {
    Ok(Grid::new(GridDimensions::new(columns, rows)?))
}

/// Discards all placement-induced occupancy.
///
/// Shorthand for applying [`Command::ResetGrid`] when the event is not needed.
pub fn reset_grid(grid: &mut Grid) {
    let mut events = Vec::with_capacity(1);
    apply(grid, Command::ResetGrid, &mut events);
}

/// Applies the provided command to the grid, mutating state deterministically.
///
/// Each command is applied in full before this function returns.
pub fn apply(grid: &mut Grid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { dimensions } => {
            *grid = Grid::new(dimensions);
            out_events.push(Event::GridConfigured { dimensions });
        }
        Command::ResetGrid => {
            grid.reset();
            out_events.push(Event::GridReset);
        }
        Command::OccupyCell { cell } => {
            if !grid.dimensions.contains(cell) {
                out_events.push(Event::OccupationRejected {
                    cell,
                    reason: OccupationError::OutOfBounds,
                });
                return;
            }

            let newly_occupied = grid.occupy_exclusion_zone(cell);
            out_events.push(Event::CellOccupied {
                cell,
                newly_occupied,
            });
        }
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use super::{Cell, Grid};
    use stimulus_grid_core::{CellCoord, GridDimensions};

    /// Dimensions the grid was configured with.
    #[must_use]
    pub fn dimensions(grid: &Grid) -> GridDimensions {
        grid.dimensions
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(grid: &Grid) -> &[Cell] {
        &grid.cells
    }

    /// Looks up a single cell.
    #[must_use]
    pub fn cell(grid: &Grid, coord: CellCoord) -> Option<&Cell> {
        grid.dimensions
            .index(coord)
            .and_then(|index| grid.cells.get(index))
    }

    /// Reports whether the cell is occupied. Cells outside the grid count as occupied.
    #[must_use]
    pub fn is_occupied(grid: &Grid, coord: CellCoord) -> bool {
        cell(grid, coord).map_or(true, Cell::is_occupied)
    }

    /// Number of cells that can still host a stimulus.
    #[must_use]
    pub fn free_cell_count(grid: &Grid) -> usize {
        grid.cells.iter().filter(|cell| !cell.occupied).count()
    }

    /// Exposes a read-only view of the occupancy state.
    #[must_use]
    pub fn occupancy_view(grid: &Grid) -> OccupancyView<'_> {
        OccupancyView { grid }
    }

    /// Read-only view into the dense occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        grid: &'a Grid,
    }

    impl<'a> OccupancyView<'a> {
        /// Reports whether the cell can host a new stimulus.
        #[must_use]
        pub fn is_free(&self, coord: CellCoord) -> bool {
            !is_occupied(self.grid, coord)
        }

        /// Enumerates the free cells in row-major order.
        #[must_use]
        pub fn free_cells(&self) -> Vec<CellCoord> {
            self.grid
                .cells
                .iter()
                .filter(|cell| !cell.occupied)
                .map(Cell::coord)
                .collect()
        }

        /// Returns an iterator over the occupancy flag of every cell.
        pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
            self.grid.cells.iter().map(Cell::is_occupied)
        }

        /// Provides the dimensions of the underlying grid.
        #[must_use]
        pub fn dimensions(&self) -> GridDimensions {
            self.grid.dimensions
        }
    }
}
