//! Scripted pointer input for driving a session without a UI
//!
//! The bot presses on an item, sweeps the pointer toward a target cell in a
//! few jittered steps while frames tick, and releases. Most drags move a
//! staging item onto the board; some rearrange the board and some are thrown
//! at empty canvas to exercise the revert path.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::algorithm::drag::DropOutcome;
use crate::algorithm::session::Session;
use crate::io::configuration::{DRAG_STEPS, FRAME_SECONDS};
use crate::math::geometry::Vec2;
use crate::spatial::cell::CellCoord;
use crate::spatial::item::ItemId;

/// Tunables for scripted drags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotSettings {
    /// Pointer-move samples between press and release
    pub steps: usize,
    /// Maximum random offset added to every sample, in screen pixels
    pub jitter_px: f32,
    /// Chance of picking an item already on the board
    pub rearrange_rate: f64,
    /// Chance of releasing over empty canvas
    pub miss_rate: f64,
    /// Simulated time between samples
    pub frame: Duration,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            steps: DRAG_STEPS,
            jitter_px: 2.0,
            rearrange_rate: 0.15,
            miss_rate: 0.05,
            frame: Duration::from_secs_f32(FRAME_SECONDS),
        }
    }
}

/// Press and release points of one drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPlan {
    /// Item the bot means to pick up
    pub item: ItemId,
    /// Screen point of the press
    pub from: Vec2,
    /// Screen point of the release
    pub to: Vec2,
}

/// Result of one scripted drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragReport {
    /// Item that was actually picked up
    pub item: ItemId,
    /// How the drop resolved
    pub outcome: Option<DropOutcome>,
}

/// Seeded pointer script
#[derive(Debug, Clone)]
pub struct DragBot {
    rng: StdRng,
    settings: BotSettings,
}

impl DragBot {
    /// Bot with its own random stream
    pub fn new(seed: u64, settings: BotSettings) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            settings,
        }
    }

    /// Current tunables
    pub const fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Choose an item and a release point; `None` when no item is on any grid
    pub fn plan(&mut self, session: &Session) -> Option<DragPlan> {
        let staged = session.staging().map(|grid| grid.items()).unwrap_or_default();
        let placed = session.board().map(|grid| grid.items()).unwrap_or_default();

        let rearrange = staged.is_empty()
            || self
                .rng
                .random_bool(self.settings.rearrange_rate.clamp(0.0, 1.0));
        let candidates = if rearrange && !placed.is_empty() {
            &placed
        } else {
            &staged
        };
        let item = *candidates.choose(&mut self.rng)?;
        let from = session.item_screen_center(item)?;

        let to = if self.rng.random_bool(self.settings.miss_rate.clamp(0.0, 1.0)) {
            Vec2::new(-1000.0, -1000.0)
        } else {
            let board = session.board()?;
            let (columns, rows) = board.dimensions();
            let cell = CellCoord::new(
                self.rng.random_range(0..columns.max(1)) as i32,
                self.rng.random_range(0..rows.max(1)) as i32,
            );
            session.cell_screen_center(session.board_id(), cell)?
        };
        Some(DragPlan { item, from, to })
    }

    /// Plan and play one drag against `session`
    pub fn perform(&mut self, session: &mut Session) -> Option<DragReport> {
        let plan = self.plan(session)?;
        self.play(session, plan)
    }

    /// Play a planned drag: press, sweep with jitter while ticking, release
    pub fn play(&mut self, session: &mut Session, plan: DragPlan) -> Option<DragReport> {
        let item = session.pointer_down(plan.from)?;
        let steps = self.settings.steps.max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let point = plan.from + (plan.to - plan.from) * t + self.jitter();
            session.pointer_move(point);
            session.tick(self.settings.frame);
        }
        let outcome = session.pointer_up(plan.to);
        trace!(%item, ?outcome, "scripted drag finished");
        Some(DragReport { item, outcome })
    }

    fn jitter(&mut self) -> Vec2 {
        let amount = self.settings.jitter_px.max(0.0);
        if amount <= f32::EPSILON {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.rng.random_range(-amount..=amount),
            self.rng.random_range(-amount..=amount),
        )
    }
}
