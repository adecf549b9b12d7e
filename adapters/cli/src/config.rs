//! Experiment configuration loaded from TOML and refined by command-line flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use stimulus_grid_core::{ConfigError, DisplayArea, GridDimensions};
use stimulus_grid_system_session::{BlockLayout, DEFAULT_BLOCK_SIZE, DEFAULT_SEGMENT_SIZE};

/// Command-line flags that take precedence over the configuration file.
#[derive(Clone, Debug, Default, Args)]
pub(crate) struct Overrides {
    /// Number of grid columns.
    #[arg(long)]
    pub(crate) columns: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    pub(crate) rows: Option<u32>,
    /// Display width in pixels.
    #[arg(long)]
    pub(crate) width: Option<f32>,
    /// Display height in pixels.
    #[arg(long)]
    pub(crate) height: Option<f32>,
    /// Number of stimuli requested per trial.
    #[arg(long)]
    pub(crate) count: Option<usize>,
    /// Number of trials to run.
    #[arg(long)]
    pub(crate) trials: Option<u32>,
    /// Mark every trial as a practice trial.
    #[arg(long)]
    pub(crate) practice: bool,
    /// Seed for reproducible layouts. Drawn from OS entropy when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

/// Contents of the TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Grid layout.
    pub(crate) grid: GridSection,
    /// Display the grid is laid over.
    pub(crate) display: DisplaySection,
    /// Trial parameters.
    pub(crate) session: SessionSection,
}

/// `[grid]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridSection {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            columns: GridDimensions::STANDARD.columns(),
            rows: GridDimensions::STANDARD.rows(),
        }
    }
}

/// `[display]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DisplaySection {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// `[session]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionSection {
    pub(crate) count: usize,
    pub(crate) trials: u32,
    pub(crate) practice: bool,
    pub(crate) seed: Option<u64>,
    pub(crate) block_size: u32,
    pub(crate) segment_size: u32,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            count: 6,
            trials: 1,
            practice: false,
            seed: None,
            block_size: DEFAULT_BLOCK_SIZE,
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}

impl FileConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid experiment config toml")
    }

    /// Layers command-line overrides on top of the file values.
    #[must_use]
    pub(crate) fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(columns) = overrides.columns {
            self.grid.columns = columns;
        }
        if let Some(rows) = overrides.rows {
            self.grid.rows = rows;
        }
        if let Some(width) = overrides.width {
            self.display.width = width;
        }
        if let Some(height) = overrides.height {
            self.display.height = height;
        }
        if let Some(count) = overrides.count {
            self.session.count = count;
        }
        if let Some(trials) = overrides.trials {
            self.session.trials = trials;
        }
        if overrides.practice {
            self.session.practice = true;
        }
        if overrides.seed.is_some() {
            self.session.seed = overrides.seed;
        }
        self
    }

    /// Validates every value and produces the settings used to run the session.
    pub(crate) fn resolve(&self) -> Result<Settings, ConfigError> {
        if self.session.count == 0 {
            return Err(ConfigError::InvalidCount);
        }
        Ok(Settings {
            dimensions: GridDimensions::new(self.grid.columns, self.grid.rows)?,
            display: DisplayArea::new(self.display.width, self.display.height)?,
            layout: BlockLayout::new(self.session.block_size, self.session.segment_size)?,
            count: self.session.count,
            trials: self.session.trials,
            practice: self.session.practice,
            seed: self.session.seed,
        })
    }
}

/// Validated settings for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) dimensions: GridDimensions,
    pub(crate) display: DisplayArea,
    pub(crate) layout: BlockLayout,
    pub(crate) count: usize,
    pub(crate) trials: u32,
    pub(crate) practice: bool,
    pub(crate) seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_experiment_defaults() {
        let config = FileConfig::parse("").expect("empty config parses");
        assert_eq!(config, FileConfig::default());

        let settings = config.resolve().expect("defaults are valid");
        assert_eq!(settings.dimensions, GridDimensions::STANDARD);
        assert_eq!(settings.layout, BlockLayout::default());
        assert_eq!(settings.count, 6);
        assert_eq!(settings.trials, 1);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = FileConfig::parse(
            r#"
            [grid]
            columns = 9

            [session]
            count = 4
            seed = 17
            "#,
        )
        .expect("config parses");

        assert_eq!(config.grid.columns, 9);
        assert_eq!(config.grid.rows, 6);
        assert_eq!(config.display, DisplaySection::default());
        assert_eq!(config.session.count, 4);
        assert_eq!(config.session.seed, Some(17));
        assert_eq!(config.session.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = FileConfig::parse(
            r#"
            [grid]
            colums = 9
            "#,
        );
        assert!(error.is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let config = FileConfig::parse(
            r#"
            [display]
            width = 800.0
            height = 600.0

            [session]
            trials = 3
            seed = 1
            "#,
        )
        .expect("config parses");
        let overrides = Overrides {
            height: Some(480.0),
            trials: Some(10),
            practice: true,
            seed: Some(99),
            ..Overrides::default()
        };

        let settings = config
            .with_overrides(&overrides)
            .resolve()
            .expect("settings are valid");

        assert_eq!(settings.display.width(), 800.0);
        assert_eq!(settings.display.height(), 480.0);
        assert_eq!(settings.trials, 10);
        assert!(settings.practice);
        assert_eq!(settings.seed, Some(99));
    }

    #[test]
    fn invalid_values_fail_fast() {
        let small_grid = FileConfig::default().with_overrides(&Overrides {
            rows: Some(2),
            ..Overrides::default()
        });
        assert_eq!(
            small_grid.resolve(),
            Err(ConfigError::GridTooSmall {
                columns: 11,
                rows: 2
            })
        );

        let no_stimuli = FileConfig::default().with_overrides(&Overrides {
            count: Some(0),
            ..Overrides::default()
        });
        assert_eq!(no_stimuli.resolve(), Err(ConfigError::InvalidCount));

        let flat_display = FileConfig::default().with_overrides(&Overrides {
            width: Some(0.0),
            ..Overrides::default()
        });
        assert!(flat_display.resolve().is_err());
    }
}
