//! Application wiring: one staging row, one board, pools, events and timers
//!
//! The session owns every collaborator and is driven from outside through
//! pointer events and frame ticks. Grid events are drained after each handler
//! returns, so a drop finishes its own grid mutation before a respawn cycle
//! can touch the staging row.

use std::fmt;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::algorithm::drag::{DragContext, DragController, DropOutcome, Hover};
use crate::algorithm::respawn::{RespawnDecision, RespawnPolicy, spawn_batch};
use crate::io::configuration::{STAGING_MARGIN, SessionConfig};
use crate::io::error::{Result, SlotGridError};
use crate::math::geometry::{Camera, OverlayCamera, Vec2};
use crate::services::catalog::{ItemCatalog, ItemKind};
use crate::services::events::{EventBus, GridEvent};
use crate::services::pool::{InstanceId, ObjectPool, PoolTask};
use crate::services::scheduler::Scheduler;
use crate::spatial::board::CoordinateGrid;
use crate::spatial::cell::CellCoord;
use crate::spatial::grid::{Grid, GridFrame, GridId, GridTag};
use crate::spatial::item::{Item, ItemId, Parent};
use crate::spatial::registry::GridRegistry;
use crate::spatial::staging::SingleRowGrid;

/// Who scheduled a task, for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOwner {
    /// Session startup work
    Session,
    /// The respawn policy
    Respawn,
    /// A pooled instance
    Instance(InstanceId),
}

impl From<InstanceId> for TaskOwner {
    fn from(id: InstanceId) -> Self {
        Self::Instance(id)
    }
}

/// Deferred work the session runs on tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTask {
    /// First batch spawn, once layout has settled
    InitialSpawn,
    /// Clear and refill the staging row
    RespawnCycle,
    /// Delayed pool work
    Pool(PoolTask),
}

impl From<PoolTask> for SessionTask {
    fn from(task: PoolTask) -> Self {
        Self::Pool(task)
    }
}

/// Running totals of a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Drops placed at the hovered anchor
    pub placements: u64,
    /// Drops put back where they started
    pub reverts: u64,
    /// Drops that left the item floating
    pub floats: u64,
    /// Transfer events between different grids
    pub transfers: u64,
    /// Completed respawn cycles
    pub respawn_cycles: u64,
    /// Items spawned into the staging row
    pub spawned: u64,
}

/// A running game board
pub struct Session {
    catalog: ItemCatalog,
    pool: ObjectPool<ItemKind, Item>,
    registry: GridRegistry,
    bus: EventBus,
    scheduler: Scheduler<TaskOwner, SessionTask>,
    drag: DragController,
    respawn: RespawnPolicy,
    camera: Box<dyn Camera>,
    rng: StdRng,
    staging: GridId,
    board: GridId,
    stats: SessionStats,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("staging", &self.staging)
            .field("board", &self.board)
            .field("active_items", &self.pool.active_count())
            .field("pending_tasks", &self.scheduler.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build every collaborator from configuration
    ///
    /// An empty item list selects the built-in catalog. The first batch spawn
    /// is scheduled for the first tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or an authored
    /// footprint fails to parse.
    pub fn from_config(config: &SessionConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let catalog = if config.items.is_empty() {
            ItemCatalog::builtin()?
        } else {
            ItemCatalog::from_config(&config.items)?
        };

        let definitions = catalog.clone();
        let mut pool = ObjectPool::new(move |kind: &ItemKind, id| {
            definitions
                .get(*kind)
                .map(|definition| Item::from_definition(id, definition))
        });
        for kind in catalog.kinds() {
            pool.register(kind, config.pool);
        }

        let mut registry = GridRegistry::new();
        let board_frame = GridFrame::fitted(
            registry.next_id(),
            GridTag::PlayerInventory,
            config.board.top_left,
            config.board.layout,
            config.board.columns,
            config.board.rows,
        )
        .with_z_index(config.board.z_index)
        .with_palette(config.palette);
        let board_rect = board_frame.rect;
        let board = registry.register(CoordinateGrid::new(
            board_frame,
            config.board.columns,
            config.board.rows,
        ));

        let staging_top_left = config.staging.top_left.unwrap_or_else(|| {
            let width = config
                .staging
                .layout
                .content_size(config.staging.cells, 1)
                .x;
            let board_top_left = board_rect.top_left();
            Vec2::new(
                board_top_left.x + (board_rect.size.x - width) * 0.5,
                board_top_left.y + board_rect.size.y + STAGING_MARGIN,
            )
        });
        let staging_frame = GridFrame::fitted(
            registry.next_id(),
            GridTag::PossibleItems,
            staging_top_left,
            config.staging.layout,
            config.staging.cells,
            1,
        )
        .with_z_index(config.staging.z_index)
        .with_palette(config.palette);
        let staging = registry.register(SingleRowGrid::new(staging_frame, config.staging.cells));

        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskOwner::Session, Duration::ZERO, SessionTask::InitialSpawn);

        info!(
            seed,
            kinds = catalog.len(),
            columns = config.board.columns,
            rows = config.board.rows,
            staging_cells = config.staging.cells,
            "session created"
        );

        Ok(Self {
            catalog,
            pool,
            registry,
            bus: EventBus::new(),
            scheduler,
            drag: DragController::new(),
            respawn: RespawnPolicy::from_config(&config.respawn),
            camera: Box::new(OverlayCamera),
            rng: StdRng::seed_from_u64(seed),
            staging,
            board,
            stats: SessionStats::default(),
        })
    }

    /// Replace the screen/canvas projection
    #[must_use]
    pub fn with_camera(mut self, camera: impl Camera + 'static) -> Self {
        self.camera = Box::new(camera);
        self
    }

    /// Press: pick the topmost item under the pointer and start dragging it
    pub fn pointer_down(&mut self, screen: Vec2) -> Option<ItemId> {
        if let Some(dragging) = self.drag.dragged_item() {
            warn!(item = %dragging, "pointer down while a drag is active");
            return None;
        }
        let id = self.item_under_pointer(screen)?;
        let item = self.pool.get_mut(id)?;
        let mut ctx = DragContext {
            registry: &mut self.registry,
            camera: self.camera.as_ref(),
            bus: &mut self.bus,
        };
        let started = self.drag.begin(item, screen, &mut ctx);
        self.route_events();
        started.then_some(id)
    }

    /// Move: follow the pointer with the dragged item and refresh the preview
    pub fn pointer_move(&mut self, screen: Vec2) -> Option<Hover> {
        let id = self.drag.dragged_item()?;
        let Some(item) = self.pool.get_mut(id) else {
            warn!(item = %id, "dragged item is no longer active, dropping the drag");
            self.drag = DragController::new();
            return None;
        };
        let mut ctx = DragContext {
            registry: &mut self.registry,
            camera: self.camera.as_ref(),
            bus: &mut self.bus,
        };
        self.drag.update(item, screen, &mut ctx)
    }

    /// Release: drop the dragged item where the pointer is
    pub fn pointer_up(&mut self, screen: Vec2) -> Option<DropOutcome> {
        let id = self.drag.dragged_item()?;
        let Some(item) = self.pool.get_mut(id) else {
            self.drag = DragController::new();
            return None;
        };
        let mut ctx = DragContext {
            registry: &mut self.registry,
            camera: self.camera.as_ref(),
            bus: &mut self.bus,
        };
        self.drag.update(item, screen, &mut ctx);
        let outcome = self.drag.end(item, &mut ctx);
        if let Some(outcome) = outcome {
            self.tally(outcome);
        }
        self.route_events();
        outcome
    }

    /// Abort the active drag as if released over nothing
    pub fn cancel_drag(&mut self) -> Option<DropOutcome> {
        let id = self.drag.dragged_item()?;
        let item = self.pool.get_mut(id)?;
        let mut ctx = DragContext {
            registry: &mut self.registry,
            camera: self.camera.as_ref(),
            bus: &mut self.bus,
        };
        let outcome = self.drag.cancel(item, &mut ctx);
        if let Some(outcome) = outcome {
            self.tally(outcome);
        }
        self.route_events();
        outcome
    }

    /// Acquire an item of `kind` and place it in `grid` at `anchor`
    ///
    /// Returns `Ok(None)` when the pool refuses or the placement is rejected;
    /// the instance goes back to its pool in that case.
    ///
    /// # Errors
    ///
    /// Returns [`SlotGridError::UnknownItemKind`] if the catalog has no such kind.
    pub fn spawn_item(
        &mut self,
        kind: ItemKind,
        grid: GridId,
        anchor: CellCoord,
    ) -> Result<Option<ItemId>> {
        if self.catalog.get(kind).is_none() {
            return Err(SlotGridError::UnknownItemKind { kind: kind.0 });
        }
        let Some(id) = self.pool.acquire(kind) else {
            return Ok(None);
        };
        let placed = match (self.registry.get_mut(grid), self.pool.get_mut(id)) {
            (Some(target), Some(item)) => target.try_place(item, anchor, &mut self.bus),
            _ => false,
        };
        if !placed {
            self.pool.release(id);
        }
        self.route_events();
        Ok(placed.then_some(id))
    }

    /// Advance time and run whatever came due; returns how many tasks ran
    pub fn tick(&mut self, dt: Duration) -> usize {
        let due = self.scheduler.advance(dt);
        let ran = due.len();
        for task in due {
            match task {
                SessionTask::InitialSpawn => {
                    let count = self.respawn.batch_size();
                    self.spawn_into_staging(count);
                }
                SessionTask::RespawnCycle => {
                    if self.respawn.is_pending() {
                        self.run_respawn_cycle();
                    }
                }
                SessionTask::Pool(task) => {
                    self.pool.run_task(task);
                }
            }
            self.route_events();
        }
        ran
    }

    /// Cancel every pending task and any active drag
    pub fn shutdown(&mut self) -> usize {
        self.cancel_drag();
        let cancelled = self.scheduler.cancel_all();
        self.respawn.clear_pending();
        info!(cancelled, "session shut down");
        cancelled
    }

    /// Running totals
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Live grids
    pub const fn registry(&self) -> &GridRegistry {
        &self.registry
    }

    /// Id of the staging row
    pub const fn staging_id(&self) -> GridId {
        self.staging
    }

    /// Id of the board
    pub const fn board_id(&self) -> GridId {
        self.board
    }

    /// The staging row
    pub fn staging(&self) -> Option<&Grid> {
        self.registry.get(self.staging)
    }

    /// The board
    pub fn board(&self) -> Option<&Grid> {
        self.registry.get(self.board)
    }

    /// Active item by id
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.pool.get(id)
    }

    /// Item pools
    pub const fn pool(&self) -> &ObjectPool<ItemKind, Item> {
        &self.pool
    }

    /// Item definitions
    pub const fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Respawn gate state
    pub const fn respawn(&self) -> &RespawnPolicy {
        &self.respawn
    }

    /// Tasks still waiting to run
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Item currently being dragged
    pub fn dragged_item(&self) -> Option<ItemId> {
        self.drag.dragged_item()
    }

    /// Event channel, for external listeners
    pub const fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Screen-space center of a cell, for scripted input
    pub fn cell_screen_center(&self, grid: GridId, cell: CellCoord) -> Option<Vec2> {
        let center = self.registry.get(grid)?.cell(cell)?.rect.center();
        self.camera.canvas_to_screen(center)
    }

    /// Screen-space center of an item's visual
    pub fn item_screen_center(&self, id: ItemId) -> Option<Vec2> {
        let center = self.pool.get(id)?.visual.rect.center();
        self.camera.canvas_to_screen(center)
    }

    // Items in grids stack like their grids; loose and dragged items sit on top
    fn item_under_pointer(&self, screen: Vec2) -> Option<ItemId> {
        let canvas = self.camera.screen_to_canvas(screen)?;
        self.pool
            .active_ids()
            .into_iter()
            .filter_map(|id| self.pool.get(id).map(|item| (id, item)))
            .filter(|(_, item)| item.hit(canvas))
            .max_by_key(|(id, item)| {
                let layer = match item.visual.parent {
                    Parent::ItemsRoot(grid) => self.registry.get(grid).map_or(i32::MIN, Grid::z_index),
                    Parent::Pool => i32::MIN,
                    Parent::Canvas | Parent::DragOverlay => i32::MAX,
                };
                (layer, *id)
            })
            .map(|(id, _)| id)
    }

    const fn tally(&mut self, outcome: DropOutcome) {
        match outcome {
            DropOutcome::Placed { .. } => self.stats.placements += 1,
            DropOutcome::Reverted { .. } => self.stats.reverts += 1,
            DropOutcome::Floating => self.stats.floats += 1,
        }
    }

    // Events raised while routing are picked up by the next pass of the loop
    fn route_events(&mut self) {
        loop {
            let events = self.bus.drain();
            if events.is_empty() {
                break;
            }
            for event in events {
                if let GridEvent::ItemTransferred { .. } = event {
                    self.stats.transfers += 1;
                }
                if event.is_staging_to_board() {
                    self.on_staging_transfer();
                }
            }
        }
    }

    fn on_staging_transfer(&mut self) {
        let board_items = self
            .registry
            .get(self.board)
            .map_or(0, Grid::unique_item_count);
        match self.respawn.on_transfer(board_items) {
            RespawnDecision::Trigger if self.respawn.delay().is_zero() => self.run_respawn_cycle(),
            RespawnDecision::Trigger => {
                self.scheduler.schedule(
                    TaskOwner::Respawn,
                    self.respawn.delay(),
                    SessionTask::RespawnCycle,
                );
                self.respawn.mark_pending();
                debug!(delay = ?self.respawn.delay(), "respawn cycle scheduled");
            }
            RespawnDecision::Counting { .. }
            | RespawnDecision::Blocked { .. }
            | RespawnDecision::Pending => {}
        }
    }

    fn run_respawn_cycle(&mut self) {
        let Some(staging) = self.registry.get_mut(self.staging) else {
            warn!(grid = %self.staging, "staging grid missing, respawn skipped");
            self.respawn.clear_pending();
            return;
        };
        let cleared = staging.clear_all(&mut self.pool, &mut self.bus);
        let despawn_delay = self.respawn.despawn_delay();
        for id in &cleared {
            if despawn_delay.is_zero() {
                self.pool.release(*id);
                continue;
            }
            if let Some(item) = self.pool.get_mut(*id) {
                item.visual.input_blocking = false;
            }
            if self
                .pool
                .release_after(*id, despawn_delay, &mut self.scheduler)
                .is_none()
            {
                self.pool.release(*id);
            }
        }

        let count = self.respawn.batch_size();
        let spawned = self.spawn_into_staging(count);
        self.respawn.complete_cycle();
        self.stats.respawn_cycles += 1;
        info!(
            cleared = cleared.len(),
            spawned,
            cycle = self.stats.respawn_cycles,
            "staging row respawned"
        );
    }

    fn spawn_into_staging(&mut self, count: usize) -> usize {
        let Some(staging) = self.registry.get_mut(self.staging) else {
            return 0;
        };
        let spawned = spawn_batch(
            staging,
            &self.catalog,
            &mut self.pool,
            count,
            &mut self.rng,
            &mut self.bus,
        )
        .len();
        self.stats.spawned += spawned as u64;
        spawned
    }
}
