//! Transfer counting and the batch respawn gate
//!
//! Every staging-to-board transfer bumps a counter. Once the counter reaches
//! its threshold each further transfer checks the board: with enough distinct
//! items a respawn cycle clears the staging row and refills it. The counter
//! is never clamped while the board gate stays closed and only resets when a
//! cycle completes.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::io::configuration::RespawnConfig;
use crate::services::catalog::{ItemCatalog, ItemKind};
use crate::services::events::EventBus;
use crate::services::pool::ObjectPool;
use crate::spatial::grid::Grid;
use crate::spatial::item::{Item, ItemId};

/// Counts qualifying transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCounter {
    count: u32,
    threshold: u32,
}

impl TransferCounter {
    /// Zeroed counter; a zero threshold is treated as one
    pub fn new(threshold: u32) -> Self {
        Self {
            count: 0,
            threshold: threshold.max(1),
        }
    }

    /// Transfers since the last completed cycle
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Transfers needed before the board gate is checked
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Count one transfer and return the new total
    pub const fn record(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Whether the threshold has been reached
    pub const fn is_ready(&self) -> bool {
        self.count >= self.threshold
    }

    /// Back to zero
    pub const fn reset(&mut self) {
        self.count = 0;
    }
}

/// What a transfer led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnDecision {
    /// Below the threshold
    Counting {
        /// Counter after this transfer
        count: u32,
    },
    /// Threshold reached but the board holds too few distinct items
    Blocked {
        /// Counter after this transfer
        count: u32,
        /// Distinct items currently on the board
        board_items: usize,
    },
    /// A cycle is already scheduled; the transfer was only counted
    Pending,
    /// Run a cycle now, or schedule it after [`RespawnPolicy::delay`]
    Trigger,
}

/// Respawn gate and cycle bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct RespawnPolicy {
    counter: TransferCounter,
    min_board_items: usize,
    batch_size: usize,
    delay: Duration,
    despawn_delay: Duration,
    pending: bool,
    cycles: u64,
}

impl Default for RespawnPolicy {
    fn default() -> Self {
        Self::from_config(&RespawnConfig::default())
    }
}

impl RespawnPolicy {
    /// Policy from validated configuration
    pub fn from_config(config: &RespawnConfig) -> Self {
        Self {
            counter: TransferCounter::new(config.threshold),
            min_board_items: config.min_board_items,
            batch_size: config.batch_size.max(1),
            delay: seconds(config.delay_secs),
            despawn_delay: seconds(config.despawn_delay_secs),
            pending: false,
            cycles: 0,
        }
    }

    /// Transfer counter
    pub const fn counter(&self) -> &TransferCounter {
        &self.counter
    }

    /// Items spawned per batch
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Delay between the gate opening and the cycle running
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Delay before cleared staging items return to their pool
    pub const fn despawn_delay(&self) -> Duration {
        self.despawn_delay
    }

    /// Whether a scheduled cycle has not run yet
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Completed cycles
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Count a staging-to-board transfer and decide whether to respawn
    pub fn on_transfer(&mut self, board_items: usize) -> RespawnDecision {
        let count = self.counter.record();
        if self.pending {
            return RespawnDecision::Pending;
        }
        if !self.counter.is_ready() {
            return RespawnDecision::Counting { count };
        }
        if board_items < self.min_board_items {
            debug!(
                count,
                board_items,
                required = self.min_board_items,
                "respawn deferred until the board fills up"
            );
            return RespawnDecision::Blocked { count, board_items };
        }
        RespawnDecision::Trigger
    }

    /// Record that a cycle has been scheduled
    pub const fn mark_pending(&mut self) {
        self.pending = true;
    }

    /// Forget a scheduled cycle that was cancelled
    pub const fn clear_pending(&mut self) {
        self.pending = false;
    }

    /// Record a completed cycle: counter back to zero
    pub fn complete_cycle(&mut self) {
        self.counter.reset();
        self.pending = false;
        self.cycles += 1;
        info!(cycle = self.cycles, "respawn cycle completed");
    }
}

// Unvalidated values saturate instead of panicking
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::MAX)
}

/// Fill empty staging slots with random catalog items
///
/// For each of `count` slots the first empty cell is taken; spawning stops as
/// soon as the row is full. A kind whose pool refuses the acquire is skipped.
/// Returns the spawned ids in placement order.
pub fn spawn_batch<R: Rng + ?Sized>(
    staging: &mut Grid,
    catalog: &ItemCatalog,
    pool: &mut ObjectPool<ItemKind, Item>,
    count: usize,
    rng: &mut R,
    bus: &mut EventBus,
) -> Vec<ItemId> {
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(cell) = staging.first_empty_cell() else {
            break;
        };
        let Some(kind) = catalog.random_kind(rng) else {
            break;
        };
        let Some(id) = pool.acquire(kind) else {
            continue;
        };
        let Some(item) = pool.get_mut(id) else {
            continue;
        };
        if staging.try_place(item, cell, bus) {
            spawned.push(id);
        } else {
            pool.release(id);
        }
    }
    debug!(grid = %staging.id(), spawned = spawned.len(), requested = count, "batch spawned");
    spawned
}
