#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trial bookkeeping around the placement system.
//!
//! A [`Session`] owns one grid for the lifetime of an experiment run. Every
//! trial places stimuli, captures a [`TrialRecord`], resets the grid and then
//! advances the [`TrialCounters`] according to the [`BlockLayout`].

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use stimulus_grid_core::{
    CellLabel, CellSize, ConfigError, DisplayArea, GridDimensions, Stimulus,
};
use stimulus_grid_system_placement::Placement;
use stimulus_grid_world::{self as world, Grid};
use tracing::info;

/// Number of trials that make up one block.
pub const DEFAULT_BLOCK_SIZE: u32 = 96;

/// Number of trials that make up one segment of a block.
pub const DEFAULT_SEGMENT_SIZE: u32 = 32;

/// Position of the current trial within the experiment. All counters are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TrialCounters {
    trial_in_block: u32,
    trial_overall: u32,
    segment: u32,
    block: u32,
}

impl Default for TrialCounters {
    fn default() -> Self {
        Self {
            trial_in_block: 1,
            trial_overall: 1,
            segment: 1,
            block: 1,
        }
    }
}

impl TrialCounters {
    /// Trial number within the current block.
    #[must_use]
    pub const fn trial_in_block(&self) -> u32 {
        self.trial_in_block
    }

    /// Trial number across the whole session.
    #[must_use]
    pub const fn trial_overall(&self) -> u32 {
        self.trial_overall
    }

    /// Segment number within the current block.
    #[must_use]
    pub const fn segment(&self) -> u32 {
        self.segment
    }

    /// Current block number.
    #[must_use]
    pub const fn block(&self) -> u32 {
        self.block
    }

    /// Advances both the in-block and the overall trial number.
    pub fn increment_trial(&mut self) {
        self.trial_in_block = self.trial_in_block.saturating_add(1);
        self.trial_overall = self.trial_overall.saturating_add(1);
    }

    /// Starts a new block: trial and segment restart at 1.
    pub fn reset_block(&mut self) {
        self.trial_in_block = 1;
        self.segment = 1;
        self.block = self.block.saturating_add(1);
    }

    /// Advances to the next segment of the current block.
    pub fn increment_segment(&mut self) {
        self.segment = self.segment.saturating_add(1);
    }

    /// Restarts the in-block trial number.
    pub fn reset_trial_in_block(&mut self) {
        self.trial_in_block = 1;
    }
}

/// How many trials form a segment and a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    block_size: u32,
    segment_size: u32,
}

impl BlockLayout {
    /// Validates the layout. Segments must be non-empty and no longer than a block.
    pub fn new(block_size: u32, segment_size: u32) -> Result<Self, ConfigError> {
        if segment_size == 0 || segment_size > block_size {
            return Err(ConfigError::InvalidBlockLayout {
                block_size,
                segment_size,
            });
        }
        Ok(Self {
            block_size,
            segment_size,
        })
    }

    /// Trials per block.
    #[must_use]
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Trials per segment.
    #[must_use]
    pub const fn segment_size(&self) -> u32 {
        self.segment_size
    }

    fn advance(&self, counters: &mut TrialCounters) {
        let completed = counters.trial_in_block();
        counters.increment_trial();
        if completed >= self.block_size {
            counters.reset_block();
        } else if completed % self.segment_size == 0 {
            counters.increment_segment();
        }
    }
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}

/// Data captured for one stimulus of a trial.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StimulusRecord {
    /// Label of the cell hosting the stimulus.
    pub position: CellLabel,
    /// Horizontal pixel coordinate of the centre.
    pub center_x: f32,
    /// Vertical pixel coordinate of the centre.
    pub center_y: f32,
    /// Radius in pixels.
    pub radius: f32,
    /// Outline colour as `rgb(r, g, b)`.
    pub line_color: String,
    /// Fill colour as `rgb(r, g, b)`.
    pub fill_color: String,
}

impl From<&Stimulus> for StimulusRecord {
    fn from(stimulus: &Stimulus) -> Self {
        Self {
            position: stimulus.label.clone(),
            center_x: stimulus.center_x,
            center_y: stimulus.center_y,
            radius: stimulus.radius,
            line_color: stimulus.line_color.to_string(),
            fill_color: stimulus.fill_color.to_string(),
        }
    }
}

/// Flat record describing a finished trial.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialRecord {
    /// Whether the trial belonged to the practice phase.
    pub practice: bool,
    /// Block the trial belonged to.
    pub block_number: u32,
    /// Segment the trial belonged to.
    pub segment_number: u32,
    /// Trial number within the block.
    pub trial_number_this_block: u32,
    /// Trial number across the session.
    pub trial_number_overall: u32,
    /// Number of stimuli that were requested.
    pub n_stimuli: usize,
    /// Number of stimuli that fit on the grid.
    pub n_placed: usize,
    /// Labels of every occupied stimulus position, in placement order.
    pub all_positions: Vec<CellLabel>,
    /// Fill colours of every stimulus, in placement order.
    pub all_colors: Vec<String>,
    /// Full per-stimulus data.
    pub stimuli: Vec<StimulusRecord>,
}

impl TrialRecord {
    /// Captures the record for a trial that placed `stimuli`.
    #[must_use]
    pub fn capture(
        counters: TrialCounters,
        practice: bool,
        requested: usize,
        stimuli: &[Stimulus],
    ) -> Self {
        Self {
            practice,
            block_number: counters.block(),
            segment_number: counters.segment(),
            trial_number_this_block: counters.trial_in_block(),
            trial_number_overall: counters.trial_overall(),
            n_stimuli: requested,
            n_placed: stimuli.len(),
            all_positions: stimuli.iter().map(|stimulus| stimulus.label.clone()).collect(),
            all_colors: stimuli
                .iter()
                .map(|stimulus| stimulus.fill_color.to_string())
                .collect(),
            stimuli: stimuli.iter().map(StimulusRecord::from).collect(),
        }
    }
}

/// Result of running one trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialOutcome {
    /// Stimuli placed during the trial.
    pub stimuli: Vec<Stimulus>,
    /// Record captured for the trial.
    pub record: TrialRecord,
}

/// Experiment session owning the grid, the placement system and the counters.
#[derive(Debug)]
pub struct Session<R = ChaCha8Rng> {
    grid: Grid,
    cell_size: CellSize,
    placement: Placement<R>,
    layout: BlockLayout,
    counters: TrialCounters,
}

impl<R: Rng> Session<R> {
    /// Creates a session whose grid is laid over the provided display area.
    #[must_use]
    pub fn new(
        dimensions: GridDimensions,
        display: DisplayArea,
        placement: Placement<R>,
        layout: BlockLayout,
    ) -> Self {
        Self {
            grid: Grid::new(dimensions),
            cell_size: CellSize::compute(display, dimensions),
            placement,
            layout,
            counters: TrialCounters::default(),
        }
    }

    /// Places up to `count` stimuli, records the trial and resets the grid.
    ///
    /// Practice trials are recorded with the current counters but do not
    /// advance them.
    pub fn run_trial(&mut self, count: usize, practice: bool) -> TrialOutcome {
        let stimuli = self
            .placement
            .generate_stimuli(&mut self.grid, count, self.cell_size);
        let record = TrialRecord::capture(self.counters, practice, count, &stimuli);
        world::reset_grid(&mut self.grid);

        info!(
            block = record.block_number,
            segment = record.segment_number,
            trial = record.trial_number_this_block,
            practice,
            requested = count,
            placed = stimuli.len(),
            "trial finished"
        );

        if !practice {
            self.layout.advance(&mut self.counters);
        }
        TrialOutcome { stimuli, record }
    }

    /// Counters that the next trial will be recorded with.
    #[must_use]
    pub const fn counters(&self) -> TrialCounters {
        self.counters
    }

    /// Grid owned by the session.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Pixel size of a grid cell.
    #[must_use]
    pub const fn cell_size(&self) -> CellSize {
        self.cell_size
    }
}
