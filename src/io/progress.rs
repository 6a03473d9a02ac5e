//! Progress display for simulation rounds

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use crate::algorithm::session::SessionStats;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static ROUND_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Single bar tracking scripted drags
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Visible bar over `rounds` drags
    pub fn new(rounds: usize) -> Self {
        let bar = ProgressBar::new(rounds as u64);
        bar.set_style(ROUND_STYLE.clone());
        Self { bar }
    }

    /// Bar that draws nothing, for quiet runs and tests
    pub fn hidden(rounds: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(rounds as u64), ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Record a finished round and show the running totals
    pub fn advance(&self, stats: &SessionStats) {
        self.bar.inc(1);
        self.bar.set_message(format!(
            "placed {} reverted {} respawns {}",
            stats.placements, stats.reverts, stats.respawn_cycles
        ));
    }

    /// Rounds recorded so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Close the bar, leaving the final line on screen
    pub fn finish(&self) {
        self.bar.finish();
    }
}
