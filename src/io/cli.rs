//! Command-line interface for running scripted drag sessions

use crate::algorithm::bot::{BotSettings, DragBot};
use crate::algorithm::session::{Session, SessionStats};
use crate::io::configuration::{DEFAULT_ROUNDS, DEFAULT_SEED, SNAPSHOT_CELL_PIXELS, SessionConfig};
use crate::io::error::Result;
use crate::io::image::export_board_as_png;
use crate::io::progress::ProgressManager;
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "slotgrid")]
#[command(
    author,
    version,
    about = "Simulate drag-and-drop play on a staging row and an item board"
)]
/// Command-line arguments for the simulation driver
pub struct Cli {
    /// TOML session configuration; built-in defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Random seed for reproducible sessions
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of scripted drags to perform
    #[arg(short, long, default_value_t = DEFAULT_ROUNDS)]
    pub rounds: usize,

    /// Write a PNG of the final board here
    #[arg(long, value_name = "PNG")]
    pub snapshot: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Configuration from `--config`, or the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_config(&self) -> Result<SessionConfig> {
        self.config
            .as_deref()
            .map_or_else(|| Ok(SessionConfig::default()), SessionConfig::load)
    }
}

/// What a finished simulation produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSummary {
    /// Drags the bot actually performed
    pub rounds_played: usize,
    /// Rounds skipped because nothing could be picked up
    pub idle_rounds: usize,
    /// Session totals at the end of the run
    pub stats: SessionStats,
    /// Distinct items left on the board
    pub board_items: usize,
}

/// Drives a session with a scripted bot and reports the result
pub struct SimulationRunner {
    cli: Cli,
    progress_manager: ProgressManager,
}

impl SimulationRunner {
    /// Create a runner for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = if cli.should_show_progress() {
            ProgressManager::new(cli.rounds)
        } else {
            ProgressManager::hidden(cli.rounds)
        };
        Self {
            cli,
            progress_manager,
        }
    }

    /// Run every round, then export the snapshot if requested
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the snapshot
    /// cannot be written.
    pub fn run(&mut self) -> Result<SimulationSummary> {
        let start_time = Instant::now();
        let config = self.cli.load_config()?;
        let mut session = Session::from_config(&config, self.cli.seed)?;
        let settings = BotSettings::default();
        let mut bot = DragBot::new(self.cli.seed.wrapping_add(1), settings);

        // Let the initial spawn run before the first press
        session.tick(Duration::ZERO);

        let mut rounds_played = 0;
        let mut idle_rounds = 0;
        for _ in 0..self.cli.rounds {
            if bot.perform(&mut session).is_some() {
                rounds_played += 1;
            } else {
                idle_rounds += 1;
                session.tick(settings.frame);
            }
            self.progress_manager.advance(&session.stats());
        }
        self.progress_manager.finish();

        if let Some(path) = &self.cli.snapshot {
            if let Some(board) = session.board().and_then(|grid| grid.as_coordinate()) {
                export_board_as_png(board, session.pool(), SNAPSHOT_CELL_PIXELS, path)?;
                info!(path = %path.display(), "board snapshot written");
            } else {
                warn!("no board to snapshot");
            }
        }

        session.shutdown();
        let stats = session.stats();
        let summary = SimulationSummary {
            rounds_played,
            idle_rounds,
            stats,
            board_items: session.board().map_or(0, |grid| grid.unique_item_count()),
        };
        info!(
            rounds = rounds_played,
            idle = idle_rounds,
            placements = stats.placements,
            reverts = stats.reverts,
            floats = stats.floats,
            transfers = stats.transfers,
            respawns = stats.respawn_cycles,
            board_items = summary.board_items,
            elapsed = ?start_time.elapsed(),
            "simulation finished"
        );
        Ok(summary)
    }
}
