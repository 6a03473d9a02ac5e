//! Engine constants and the TOML session configuration
//!
//! Every field of [`SessionConfig`] has a default, so an empty file (or no
//! file at all) describes the stock game: a 3-slot staging row below a 10x5
//! board and the built-in item catalog.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::io::error::{Result, SlotGridError, invalid_configuration};
use crate::math::geometry::Vec2;
use crate::services::catalog::LevelStats;
use crate::services::pool::PoolSettings;
use crate::spatial::cell::PreviewPalette;
use crate::spatial::layout::LayoutSpec;

// Respawn policy
/// Staging-to-board transfers needed before a respawn is considered
pub const TRANSFER_THRESHOLD: u32 = 3;
/// Distinct items the board must hold before a respawn may run
pub const MIN_BOARD_ITEMS: usize = 3;
/// Items spawned into the staging row per batch
pub const RESPAWN_BATCH_SIZE: usize = 3;

// Grid shapes
/// Slots in the staging row
pub const DEFAULT_STAGING_CELLS: usize = 3;
/// Board columns
pub const DEFAULT_BOARD_COLUMNS: usize = 10;
/// Board rows
pub const DEFAULT_BOARD_ROWS: usize = 5;
/// Edge length of a square cell in canvas pixels
pub const DEFAULT_CELL_SIZE: f32 = 100.0;
/// Vertical gap between the board and the staging row
pub const STAGING_MARGIN: f32 = 40.0;

// Pools
/// Instances pre-warmed per item kind
pub const DEFAULT_POOL_INITIAL_SIZE: usize = 3;
/// Cap on instances per item kind
pub const DEFAULT_POOL_MAX_SIZE: usize = 100;

// Simulation driver
/// Fixed seed for reproducible sessions
pub const DEFAULT_SEED: u64 = 42;
/// Scripted drags performed by the CLI
pub const DEFAULT_ROUNDS: usize = 200;
/// Simulated frame length in seconds
pub const FRAME_SECONDS: f32 = 1.0 / 60.0;
/// Pointer-move samples per scripted drag
pub const DRAG_STEPS: usize = 6;

// Output settings
/// Pixels per cell edge in exported board snapshots
pub const SNAPSHOT_CELL_PIXELS: u32 = 24;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 50;

/// Staging row placement and shape
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Number of slots
    pub cells: usize,
    /// Canvas position of the row's top-left corner; `None` centers it below the board
    pub top_left: Option<Vec2>,
    /// Stacking order for hit tests
    pub z_index: i32,
    /// Cell size, spacing and padding
    pub layout: LayoutSpec,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            cells: DEFAULT_STAGING_CELLS,
            top_left: None,
            z_index: 1,
            layout: LayoutSpec::default(),
        }
    }
}

/// Board placement and shape
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of columns
    pub columns: usize,
    /// Number of rows
    pub rows: usize,
    /// Canvas position of the board's top-left corner
    pub top_left: Vec2,
    /// Stacking order for hit tests
    pub z_index: i32,
    /// Cell size, spacing and padding
    pub layout: LayoutSpec,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_BOARD_COLUMNS,
            rows: DEFAULT_BOARD_ROWS,
            top_left: Vec2::ZERO,
            z_index: 0,
            layout: LayoutSpec::default(),
        }
    }
}

/// Transfer counting and batch respawn settings
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    /// Transfers needed before the board gate is checked
    pub threshold: u32,
    /// Distinct board items required for a cycle to run
    pub min_board_items: usize,
    /// Items spawned per batch
    pub batch_size: usize,
    /// Delay between the gate opening and the cycle running
    pub delay_secs: f32,
    /// Delay before cleared staging items return to their pool
    pub despawn_delay_secs: f32,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            threshold: TRANSFER_THRESHOLD,
            min_board_items: MIN_BOARD_ITEMS,
            batch_size: RESPAWN_BATCH_SIZE,
            delay_secs: 0.0,
            despawn_delay_secs: 0.0,
        }
    }
}

/// One authored item kind
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemConfig {
    /// Numeric kind, unique across the catalog
    pub kind: u16,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Footprint rows, `#` solid and `.` empty
    #[serde(default = "single_cell")]
    pub footprint: Vec<String>,
    /// Per-level stats
    #[serde(default)]
    pub levels: Vec<LevelStats>,
}

fn single_cell() -> Vec<String> {
    vec![String::from("#")]
}

/// Complete session configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Staging row
    pub staging: StagingConfig,
    /// Board
    pub board: BoardConfig,
    /// Respawn policy
    pub respawn: RespawnConfig,
    /// Pool sizes applied to every item kind
    pub pool: PoolSettings,
    /// Preview colors shared by both grids
    pub palette: PreviewPalette,
    /// Item catalog; empty means the built-in catalog
    pub items: Vec<ItemConfig>,
}

impl SessionConfig {
    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML for this
    /// schema, or fails [`SessionConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SlotGridError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse and validate TOML text; `origin` is only used in error messages
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not match the schema or fails
    /// [`SessionConfig::validate`].
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| SlotGridError::ConfigParse {
            path: PathBuf::from(origin),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        if self.staging.cells == 0 {
            return Err(invalid_configuration(
                "staging.cells",
                &self.staging.cells,
                &"must be at least 1",
            ));
        }
        if self.board.columns == 0 {
            return Err(invalid_configuration(
                "board.columns",
                &self.board.columns,
                &"must be at least 1",
            ));
        }
        if self.board.rows == 0 {
            return Err(invalid_configuration(
                "board.rows",
                &self.board.rows,
                &"must be at least 1",
            ));
        }
        validate_layout("staging.layout.cell_size", &self.staging.layout)?;
        validate_layout("board.layout.cell_size", &self.board.layout)?;

        if self.respawn.threshold == 0 {
            return Err(invalid_configuration(
                "respawn.threshold",
                &self.respawn.threshold,
                &"must be at least 1",
            ));
        }
        if self.respawn.batch_size == 0 {
            return Err(invalid_configuration(
                "respawn.batch_size",
                &self.respawn.batch_size,
                &"must be at least 1",
            ));
        }
        for (field, value) in [
            ("respawn.delay_secs", self.respawn.delay_secs),
            ("respawn.despawn_delay_secs", self.respawn.despawn_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid_configuration(
                    field,
                    &value,
                    &"must be a finite, non-negative number of seconds",
                ));
            }
            if Duration::try_from_secs_f32(value).is_err() {
                return Err(invalid_configuration(
                    field,
                    &value,
                    &"is too large to represent as a duration",
                ));
            }
        }

        if self.pool.max_size != 0 && self.pool.initial_size > self.pool.max_size {
            return Err(invalid_configuration(
                "pool.initial_size",
                &self.pool.initial_size,
                &format!("exceeds pool.max_size ({})", self.pool.max_size),
            ));
        }

        let mut kinds = BTreeSet::new();
        for item in &self.items {
            if !kinds.insert(item.kind) {
                return Err(invalid_configuration(
                    "items.kind",
                    &item.kind,
                    &"duplicate item kind",
                ));
            }
        }
        Ok(())
    }
}

fn validate_layout(field: &'static str, layout: &LayoutSpec) -> Result<()> {
    let size = layout.cell_size;
    if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
        return Err(invalid_configuration(
            field,
            &format!("{}x{}", size.x, size.y),
            &"cell size must be positive",
        ));
    }
    Ok(())
}
