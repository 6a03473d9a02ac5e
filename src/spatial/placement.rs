//! Per-item placement record
//!
//! The current placement is written only by the grid that owns the item; the
//! revert snapshot is written only when a drag begins.

use crate::spatial::cell::CellCoord;
use crate::spatial::grid::GridId;
use crate::spatial::item::Parent;

/// Where an item currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Owning grid
    pub grid: GridId,
    /// Anchor cell of the footprint
    pub anchor: CellCoord,
}

/// State captured at drag start to roll back a failed drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertSnapshot {
    /// Grid the item was in, if any
    pub grid: Option<GridId>,
    /// Anchor inside that grid
    pub anchor: CellCoord,
    /// Container the visual belonged to
    pub parent: Parent,
}

/// Placement state of one item instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPlacement {
    current: Option<Placement>,
    dimensions: (usize, usize),
    revert: Option<RevertSnapshot>,
}

impl ItemPlacement {
    /// Unplaced record with cached footprint dimensions
    pub const fn new(dimensions: (usize, usize)) -> Self {
        Self {
            current: None,
            dimensions,
            revert: None,
        }
    }

    /// Current placement, if placed
    pub const fn current(&self) -> Option<Placement> {
        self.current
    }

    /// Grid currently holding the item
    pub fn current_grid(&self) -> Option<GridId> {
        self.current.map(|placement| placement.grid)
    }

    /// Anchor in the current grid, or the origin when unplaced
    pub fn current_anchor(&self) -> CellCoord {
        self.current
            .map_or(CellCoord::ZERO, |placement| placement.anchor)
    }

    /// Placed iff a current grid is recorded
    pub const fn is_placed(&self) -> bool {
        self.current.is_some()
    }

    /// Cached footprint dimensions `(width, height)`
    pub const fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    /// Refresh the cached dimensions after the footprint changed
    pub const fn set_dimensions(&mut self, dimensions: (usize, usize)) {
        self.dimensions = dimensions;
    }

    /// Snapshot captured by the last drag start
    pub const fn revert(&self) -> Option<RevertSnapshot> {
        self.revert
    }

    /// Grid the last drag started from
    pub fn revert_grid(&self) -> Option<GridId> {
        self.revert.and_then(|snapshot| snapshot.grid)
    }

    /// Record a successful placement; grids call this
    pub const fn set_current(&mut self, grid: GridId, anchor: CellCoord) {
        self.current = Some(Placement { grid, anchor });
    }

    /// Clear the current placement
    ///
    /// With `Some(grid)`, only clears when the item is recorded in that grid,
    /// so a stale grid can never unplace an item that moved elsewhere.
    /// Returns whether anything was cleared.
    pub fn clear_current(&mut self, grid: Option<GridId>) -> bool {
        match (grid, self.current) {
            (Some(grid), Some(current)) if current.grid != grid => false,
            (_, None) => false,
            _ => {
                self.current = None;
                true
            }
        }
    }

    /// Snapshot the revert target; returns the placement the caller must vacate
    pub fn begin_drag(&mut self, parent: Parent) -> Option<Placement> {
        self.revert = Some(RevertSnapshot {
            grid: self.current_grid(),
            anchor: self.current_anchor(),
            parent,
        });
        self.current
    }

    /// Forget everything, used when an instance returns to its pool
    pub const fn reset(&mut self) {
        self.current = None;
        self.revert = None;
    }
}
