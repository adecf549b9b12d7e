#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the stimulus grid workspace.
//!
//! This crate defines the vocabulary that connects the authoritative grid, the
//! placement and session systems, and adapters. Adapters and systems submit
//! [`Command`] values describing desired grid mutations, the world executes
//! them through its `apply` entry point and reports the outcome as [`Event`]
//! values. Geometry ([`CellSize`]), stimulus descriptions ([`Stimulus`]) and the
//! exclusion rule ([`in_exclusion_zone`]) live here so every crate agrees on
//! them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest number of columns or rows a grid may have.
///
/// Anything smaller lets the border and middle-column reservations collide and
/// leaves no free interior.
pub const GRID_MINIMUM_EXTENT: u32 = 3;

/// Column or row distance covered by the "+"-shaped exclusion band.
pub const AXIS_EXCLUSION_REACH: u32 = 2;

/// Diagonal distance covered by the exclusion ring around a selected cell.
pub const DIAGONAL_EXCLUSION_REACH: u32 = 1;

/// Commands that express all permissible grid mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the grid with new dimensions in its reserved configuration.
    ConfigureGrid {
        /// Dimensions the rebuilt grid should use.
        dimensions: GridDimensions,
    },
    /// Returns every cell to the border/middle-column reservation.
    ResetGrid,
    /// Marks the provided cell and its exclusion neighbourhood as occupied.
    OccupyCell {
        /// Cell chosen to host a stimulus.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the grid was rebuilt with new dimensions.
    GridConfigured {
        /// Dimensions of the rebuilt grid.
        dimensions: GridDimensions,
    },
    /// Confirms that placement-induced occupancy was discarded.
    GridReset,
    /// Confirms that a cell and its neighbourhood were occupied.
    CellOccupied {
        /// Cell that anchored the exclusion neighbourhood.
        cell: CellCoord,
        /// Number of cells that switched from free to occupied.
        newly_occupied: u32,
    },
    /// Reports that an occupation request was rejected.
    OccupationRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: OccupationError,
    },
}

/// Reasons an occupation request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupationError {
    /// The requested cell lies outside the configured grid.
    OutOfBounds,
}

/// Precondition violations detected while configuring the grid or display.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid is too small for the reserved cells to leave a usable interior.
    #[error(
        "grid must be at least {}x{} cells, got {columns}x{rows}",
        GRID_MINIMUM_EXTENT,
        GRID_MINIMUM_EXTENT
    )]
    GridTooSmall {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// The display area has a non-positive or non-finite side.
    #[error("display area must be positive and finite, got {width}x{height}")]
    InvalidDisplayArea {
        /// Requested display width in pixels.
        width: f32,
        /// Requested display height in pixels.
        height: f32,
    },
    /// A trial asked for zero stimuli.
    #[error("stimulus count must be at least one")]
    InvalidCount,
    /// Segments must be non-empty and fit inside a block.
    #[error("segment size {segment_size} does not fit block size {block_size}")]
    InvalidBlockLayout {
        /// Requested number of trials per block.
        block_size: u32,
        /// Requested number of trials per segment.
        segment_size: u32,
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

    /// Absolute column distance between two cells.
    #[must_use]
    pub const fn column_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column)
    }

    /// Absolute row distance between two cells.
    #[must_use]
    pub const fn row_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row)
    }

    /// Human-readable label of the cell, e.g. `"1A"` for the origin.
    #[must_use]
    pub fn label(self) -> CellLabel {
        CellLabel::for_cell(self)
    }
}

/// Human-readable cell identifier: 1-based column number followed by row letters.
///
/// Rows beyond `Z` continue as `AA`, `AB`, ... so labels stay unique on tall
/// grids. Digits never appear in the row part, so the split is unambiguous.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellLabel(String);

impl CellLabel {
    /// Builds the label for the provided cell.
    #[must_use]
    pub fn for_cell(cell: CellCoord) -> Self {
        let column = u64::from(cell.column()) + 1;
        Self(format!("{column}{}", row_letters(cell.row())))
    }

    /// Borrows the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn row_letters(row: u32) -> String {
    let mut letters = Vec::new();
    let mut remaining = row;
    loop {
        letters.push(char::from(b'A' + (remaining % 26) as u8));
        if remaining < 26 {
            break;
        }
        remaining = remaining / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Validated number of columns and rows laid out in a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GridDimensions {
    columns: u32,
    rows: u32,
}

impl GridDimensions {
    /// Layout used by the memory experiment: 11 columns by 6 rows.
    pub const STANDARD: Self = Self {
        columns: 11,
        rows: 6,
    };

    /// Validates the provided dimensions.
    ///
    /// Both extents must be at least [`GRID_MINIMUM_EXTENT`].
    pub fn new(columns: u32, rows: u32) -> Result<Self, ConfigError> {
        if columns < GRID_MINIMUM_EXTENT || rows < GRID_MINIMUM_EXTENT {
            return Err(ConfigError::GridTooSmall { columns, rows });
        }
        Ok(Self { columns, rows })
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

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Column that divides the grid into a left and a right half.
    #[must_use]
    pub const fn middle_column(&self) -> u32 {
        self.columns / 2
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is structurally unusable.
    ///
    /// Border cells and the middle column are reserved in the initial state.
    #[must_use]
    pub const fn is_reserved(&self, cell: CellCoord) -> bool {
        let column = cell.column();
        let row = cell.row();
        column == 0
            || column == self.columns - 1
            || row == 0
            || row == self.rows - 1
            || column == self.middle_column()
    }

    /// Row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Iterates every cell coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }
}

/// Reports whether `candidate` falls inside the exclusion neighbourhood of `selected`.
///
/// The neighbourhood is a "+"-shaped band reaching [`AXIS_EXCLUSION_REACH`]
/// cells along the row and the column, plus the ring of diagonal neighbours at
/// [`DIAGONAL_EXCLUSION_REACH`]. The selected cell itself is always included.
#[must_use]
pub const fn in_exclusion_zone(selected: CellCoord, candidate: CellCoord) -> bool {
    let column_distance = selected.column_distance(candidate);
    let row_distance = selected.row_distance(candidate);

    (row_distance == 0 && column_distance <= AXIS_EXCLUSION_REACH)
        || (column_distance == 0 && row_distance <= AXIS_EXCLUSION_REACH)
        || (column_distance == DIAGONAL_EXCLUSION_REACH && row_distance == DIAGONAL_EXCLUSION_REACH)
}

/// Pixel area that the grid is laid over.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DisplayArea {
    width: f32,
    height: f32,
}

impl DisplayArea {
    /// Validates the provided display size measured in pixels.
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        let valid = |side: f32| side.is_finite() && side > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ConfigError::InvalidDisplayArea { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width of the display in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the display in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Pixel size of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CellSize {
    width: f32,
    height: f32,
}

impl CellSize {
    /// Divides the display area evenly across the grid.
    #[must_use]
    pub fn compute(display: DisplayArea, dimensions: GridDimensions) -> Self {
        Self {
            width: display.width() / dimensions.columns() as f32,
            height: display.height() / dimensions.rows() as f32,
        }
    }

    /// Width of a cell in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of a cell in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Pixel-space centre of the provided cell.
    #[must_use]
    pub fn center_of(&self, cell: CellCoord) -> (f32, f32) {
        (
            cell.column() as f32 * self.width + self.width / 2.0,
            cell.row() as f32 * self.height + self.height / 2.0,
        )
    }

    /// Radius of a stimulus drawn inside a cell.
    #[must_use]
    pub fn stimulus_radius(&self) -> f32 {
        self.width.min(self.height) / 4.0
    }
}

/// Validates raw inputs and computes the resulting [`CellSize`].
pub fn compute_cell_size(
    display_width: f32,
    display_height: f32,
    columns: u32,
    rows: u32,
) -> Result<CellSize, ConfigError> {
    let display = DisplayArea::new(display_width, display_height)?;
    let dimensions = GridDimensions::new(columns, rows)?;
    Ok(CellSize::compute(display, dimensions))
}

/// RGB colour applied to a stimulus outline or fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StimulusColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl StimulusColor {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl fmt::Display for StimulusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Shapes a stimulus can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    /// Filled circle with a coloured outline.
    Circle,
}

/// Placement result describing a single stimulus in pixel space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    /// Shape of the stimulus.
    pub kind: StimulusKind,
    /// Grid cell that hosts the stimulus.
    pub cell: CellCoord,
    /// Human-readable label of the hosting cell.
    pub label: CellLabel,
    /// Horizontal pixel coordinate of the stimulus centre.
    pub center_x: f32,
    /// Vertical pixel coordinate of the stimulus centre.
    pub center_y: f32,
    /// Radius of the stimulus in pixels.
    pub radius: f32,
    /// Colour of the outline.
    pub line_color: StimulusColor,
    /// Colour of the fill.
    pub fill_color: StimulusColor,
}

impl Stimulus {
    /// Builds a circle stimulus centred inside the provided cell.
    #[must_use]
    pub fn circle(
        cell: CellCoord,
        size: CellSize,
        line_color: StimulusColor,
        fill_color: StimulusColor,
    ) -> Self {
        let (center_x, center_y) = size.center_of(cell);
        Self {
            kind: StimulusKind::Circle,
            cell,
            label: cell.label(),
            center_x,
            center_y,
            radius: size.stimulus_radius(),
            line_color,
            fill_color,
        }
    }
}
