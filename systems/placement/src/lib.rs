#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Constrained random placement of stimuli on the experiment grid.
//!
//! The system picks free cells uniformly at random from a read-only
//! [`OccupancyView`], asks the world to occupy each pick together with its
//! exclusion neighbourhood, and decorates every placed stimulus with two random
//! colours. All randomness flows through a caller-supplied [`Rng`], so seeded
//! generators replay identical layouts.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stimulus_grid_core::{CellCoord, CellSize, Command, Event, Stimulus, StimulusColor};
use stimulus_grid_world::{
    self as world,
    query::{self, OccupancyView},
    Grid,
};
use tracing::warn;

/// Configuration parameters required to construct the placement system.
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

    /// Seed that drives cell choice and colour generation.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Placement system that owns the random source used for every decision.
#[derive(Debug)]
pub struct Placement<R = ChaCha8Rng> {
    rng: R,
}

impl Placement {
    /// Creates a placement system seeded from the configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(config.rng_seed))
    }
}

impl<R: Rng> Placement<R> {
    /// Creates a placement system driven by the provided random source.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Picks a free cell and occupies it together with its exclusion neighbourhood.
    ///
    /// Returns `None` when the grid has no free cell left. That is a capacity
    /// limit, not a failure.
    pub fn select_and_occupy(&mut self, grid: &mut Grid) -> Option<CellCoord> {
        let cell = select_free_cell(query::occupancy_view(grid), &mut self.rng)?;

        let mut events = Vec::with_capacity(1);
        world::apply(grid, Command::OccupyCell { cell }, &mut events);
        debug_assert!(
            matches!(events.as_slice(), [Event::CellOccupied { .. }]),
            "free cells always lie inside the grid"
        );
        Some(cell)
    }

    /// Places up to `count` circle stimuli, stopping early once the grid is full.
    ///
    /// Callers must be prepared to receive fewer stimuli than requested.
    pub fn generate_stimuli(
        &mut self,
        grid: &mut Grid,
        count: usize,
        cell_size: CellSize,
    ) -> Vec<Stimulus> {
        let mut stimuli = Vec::with_capacity(count.min(query::free_cell_count(grid)));
        for _ in 0..count {
            let Some(cell) = self.select_and_occupy(grid) else {
                break;
            };
            let line_color = self.random_color();
            let fill_color = self.random_color();
            stimuli.push(Stimulus::circle(cell, cell_size, line_color, fill_color));
        }

        if stimuli.len() < count {
            warn!(
                requested = count,
                placed = stimuli.len(),
                "grid ran out of free cells"
            );
        }
        stimuli
    }

    /// Draws a colour with independently uniform channels.
    pub fn random_color(&mut self) -> StimulusColor {
        random_color(&mut self.rng)
    }
}

/// Chooses one free cell uniformly at random, if any remain.
pub fn select_free_cell<R>(occupancy: OccupancyView<'_>, rng: &mut R) -> Option<CellCoord>
where
    R: Rng + ?Sized,
{
    occupancy.free_cells().choose(rng).copied()
}

/// Draws an RGB colour whose channels are independent and uniform over `0..=255`.
pub fn random_color<R>(rng: &mut R) -> StimulusColor
where
    R: Rng + ?Sized,
{
    let red = rng.gen::<u8>();
    let green = rng.gen::<u8>();
    let blue = rng.gen::<u8>();
    StimulusColor::from_rgb(red, green, blue)
}
