//! Drag gesture state machine
//!
//! Idle -> Dragging -> (Placed | Reverted | Floating) -> Idle. A dragged item
//! occupies no grid cell: it is vacated on begin and only written back by the
//! drop, either at the hovered anchor or at the snapshot taken on begin.

use tracing::{debug, warn};

use crate::math::geometry::{Camera, Vec2, floor_to_index};
use crate::services::events::{EventBus, GridEvent};
use crate::spatial::cell::CellCoord;
use crate::spatial::grid::{Grid, GridId, GridKind};
use crate::spatial::item::{Item, ItemId, Parent};
use crate::spatial::registry::GridRegistry;

/// Collaborators a drag needs on every call
pub struct DragContext<'a> {
    /// Live grids
    pub registry: &'a mut GridRegistry,
    /// Screen to canvas projection
    pub camera: &'a dyn Camera,
    /// Event channel for placement and transfer events
    pub bus: &'a mut EventBus,
}

/// Grid and anchor currently under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hover {
    /// Hovered grid
    pub grid: GridId,
    /// Anchor the item would be placed at
    pub anchor: CellCoord,
}

/// How a drag ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Placed at the hovered anchor
    Placed {
        /// Receiving grid
        grid: GridId,
        /// Anchor used
        anchor: CellCoord,
    },
    /// Put back where the drag started
    Reverted {
        /// Original grid
        grid: GridId,
        /// Original anchor
        anchor: CellCoord,
    },
    /// Neither target accepted the item; it floats in its old container
    Floating,
}

impl DropOutcome {
    /// Grid holding the item after the drop
    pub const fn grid(&self) -> Option<GridId> {
        match *self {
            Self::Placed { grid, .. } | Self::Reverted { grid, .. } => Some(grid),
            Self::Floating => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    item: ItemId,
    original_pivot: Vec2,
    grab_fraction: Vec2,
    hover: Option<Hover>,
    sizing_grid: Option<GridId>,
}

/// Drives one drag at a time
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    /// Idle controller
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Whether a drag is in progress
    pub const fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Item being dragged
    pub fn dragged_item(&self) -> Option<ItemId> {
        self.active.as_ref().map(|drag| drag.item)
    }

    /// Last hover target
    pub fn hover(&self) -> Option<Hover> {
        self.active.as_ref().and_then(|drag| drag.hover)
    }

    /// Start dragging `item` from `screen`
    ///
    /// Snapshots the revert target, vacates the item's cells, lifts it to the
    /// drag overlay and stops it from intercepting its own drop. Returns
    /// `false` if another drag is already active.
    pub fn begin(&mut self, item: &mut Item, screen: Vec2, ctx: &mut DragContext<'_>) -> bool {
        if let Some(active) = &self.active {
            warn!(item = %item.id(), dragging = %active.item, "drag already in progress");
            return false;
        }

        let rect = item.visual.rect;
        let grab_fraction = ctx
            .camera
            .screen_to_canvas(screen)
            .filter(|_| rect.size.x > f32::EPSILON && rect.size.y > f32::EPSILON)
            .map_or(Vec2::HALF, |canvas| {
                let offset = canvas - rect.top_left();
                Vec2::new(offset.x / rect.size.x, offset.y / rect.size.y).clamp_scalar(0.0, 1.0)
            });

        if let Some(placement) = item.placement.begin_drag(item.visual.parent) {
            match ctx.registry.get_mut(placement.grid) {
                Some(grid) => grid.remove(item, ctx.bus),
                None => {
                    item.placement.clear_current(None);
                }
            }
        }

        item.visual.rect.set_pivot_preserving_position(Vec2::HALF);
        item.visual.parent = Parent::DragOverlay;
        item.visual.input_blocking = false;

        self.active = Some(ActiveDrag {
            item: item.id(),
            original_pivot: rect.pivot,
            grab_fraction,
            hover: None,
            sizing_grid: None,
        });
        debug!(item = %item.id(), "drag started");
        true
    }

    /// Follow the pointer: reposition, resolve the hover target and preview it
    pub fn update(&mut self, item: &mut Item, screen: Vec2, ctx: &mut DragContext<'_>) -> Option<Hover> {
        let active = self.active.as_mut().filter(|drag| drag.item == item.id())?;

        let canvas = ctx.camera.screen_to_canvas(screen);
        if let Some(canvas) = canvas {
            follow_pointer(item, canvas, active.grab_fraction);
        }

        let previous = active.hover;
        let target = ctx
            .registry
            .find_grid_under_pointer(screen, ctx.camera)
            .and_then(|id| {
                let grid = ctx.registry.get_mut(id)?;
                let pointer_cell = grid.screen_point_to_cell(screen, ctx.camera)?;
                if active.sizing_grid != Some(id) {
                    item.visual.rect.size = grid.drag_size_for(item);
                    if let Some(canvas) = canvas {
                        follow_pointer(item, canvas, active.grab_fraction);
                    }
                    active.sizing_grid = Some(id);
                }
                let anchor = compute_anchor(grid, item, pointer_cell, canvas);
                Some(Hover { grid: id, anchor })
            });

        if let Some(previous) = previous {
            if target.is_none_or(|hover| hover.grid != previous.grid) {
                if let Some(grid) = ctx.registry.get_mut(previous.grid) {
                    grid.clear_preview();
                }
            }
        }

        match target {
            Some(hover) => {
                if let Some(grid) = ctx.registry.get_mut(hover.grid) {
                    grid.preview_placement(item, hover.anchor);
                }
            }
            None => active.sizing_grid = None,
        }
        active.hover = target;
        target
    }

    /// Drop the item at the last hover target, falling back to the revert snapshot
    ///
    /// Returns `None` when `item` is not the dragged item.
    pub fn end(&mut self, item: &mut Item, ctx: &mut DragContext<'_>) -> Option<DropOutcome> {
        if self.dragged_item() != Some(item.id()) {
            return None;
        }
        let active = self.active.take()?;
        item.visual.input_blocking = true;

        if let Some(hover) = active.hover {
            if let Some(grid) = ctx.registry.get_mut(hover.grid) {
                grid.clear_preview();
                if grid.try_place(item, hover.anchor, ctx.bus) {
                    let to_kind = grid.kind();
                    publish_transfer(item, hover.grid, to_kind, ctx);
                    debug!(item = %item.id(), grid = %hover.grid, anchor = %hover.anchor, "drop placed");
                    return Some(DropOutcome::Placed {
                        grid: hover.grid,
                        anchor: hover.anchor,
                    });
                }
            }
        }

        let snapshot = item.placement.revert();
        if let Some((grid_id, anchor)) =
            snapshot.and_then(|snapshot| snapshot.grid.map(|grid| (grid, snapshot.anchor)))
        {
            if let Some(grid) = ctx.registry.get_mut(grid_id) {
                if grid.try_place(item, anchor, ctx.bus) {
                    debug!(item = %item.id(), grid = %grid_id, %anchor, "drop reverted");
                    return Some(DropOutcome::Reverted {
                        grid: grid_id,
                        anchor,
                    });
                }
            }
        }

        item.visual.parent = match snapshot.map(|snapshot| snapshot.parent) {
            Some(Parent::ItemsRoot(_) | Parent::DragOverlay) | None => Parent::Canvas,
            Some(parent) => parent,
        };
        item.visual.rect.set_pivot_preserving_position(active.original_pivot);
        debug!(item = %item.id(), "drop left item floating");
        Some(DropOutcome::Floating)
    }

    /// Abort the drag as if released over nothing
    pub fn cancel(&mut self, item: &mut Item, ctx: &mut DragContext<'_>) -> Option<DropOutcome> {
        let active = self.active.as_mut().filter(|drag| drag.item == item.id())?;
        if let Some(hover) = active.hover.take() {
            if let Some(grid) = ctx.registry.get_mut(hover.grid) {
                grid.clear_preview();
            }
        }
        self.end(item, ctx)
    }
}

// Keeps the grabbed point of the item under the pointer
fn follow_pointer(item: &mut Item, canvas: Vec2, grab_fraction: Vec2) {
    let rect = &mut item.visual.rect;
    let top_left = canvas - rect.size.scale(grab_fraction);
    rect.set_top_left(top_left);
}

/// Anchor that keeps the grabbed footprint cell under the pointer cell
///
/// Single-row grids use the pointer cell directly. For coordinate grids the
/// grab offset inside the item is converted to a local cell using the grid's
/// nominal step, clamped into the footprint, and subtracted. Without a canvas
/// point the footprint's center cell is used.
pub fn compute_anchor(
    grid: &Grid,
    item: &Item,
    pointer_cell: CellCoord,
    canvas: Option<Vec2>,
) -> CellCoord {
    if grid.kind() != GridKind::Coordinate {
        return pointer_cell;
    }
    let (width, height) = item.dimensions();
    let local = canvas.map_or(
        CellCoord::new((width / 2) as i32, (height / 2) as i32),
        |canvas| {
            let step = grid.layout().nominal_step();
            let from_top_left = canvas - item.visual.rect.top_left();
            CellCoord::new(
                floor_to_index(from_top_left.x / step.x).clamp(0, width as i32 - 1),
                floor_to_index(from_top_left.y / step.y).clamp(0, height as i32 - 1),
            )
        },
    );
    pointer_cell - local
}

fn publish_transfer(item: &Item, to: GridId, to_kind: GridKind, ctx: &mut DragContext<'_>) {
    let Some(from) = item.placement.revert_grid() else {
        return;
    };
    if from == to {
        return;
    }
    let Some(from_kind) = ctx.registry.get(from).map(Grid::kind) else {
        return;
    };
    ctx.bus.publish(GridEvent::ItemTransferred {
        from,
        from_kind,
        to,
        to_kind,
        item: item.id(),
    });
}
