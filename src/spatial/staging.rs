//! Single-row staging grid
//!
//! Every item occupies exactly one slot here regardless of its authored
//! footprint, so the row can offer items of any shape side by side.

use tracing::{debug, warn};

use crate::math::geometry::{
    Camera, RectTransform, Vec2, floor_to_index, rectangle_contains_screen_point,
    screen_point_to_local_point,
};
use crate::services::events::{EventBus, GridEvent};
use crate::spatial::cell::{CellCoord, GridCell};
use crate::spatial::grid::{GridFrame, evict_occupant};
use crate::spatial::item::{Item, ItemId, ItemLookup, Parent};

/// One-dimensional grid with `N >= 1` slots
#[derive(Debug, Clone)]
pub struct SingleRowGrid {
    frame: GridFrame,
    occupancy: Vec<Option<ItemId>>,
    cells: Vec<GridCell>,
    preview: Vec<CellCoord>,
}

impl SingleRowGrid {
    /// Create a row of `cell_count` empty slots (clamped to at least one)
    pub fn new(frame: GridFrame, cell_count: usize) -> Self {
        if cell_count == 0 {
            warn!(grid = %frame.id, "single-row grid configured with no cells, using 1");
        }
        let cell_count = cell_count.max(1);
        let cells = (0..cell_count).map(|index| frame.make_cell(index, 0)).collect();
        Self {
            frame,
            occupancy: vec![None; cell_count],
            cells,
            preview: Vec::new(),
        }
    }

    /// Shared frame
    pub const fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// Number of slots
    pub fn cell_count(&self) -> usize {
        self.occupancy.len()
    }

    /// Size of one slot
    pub const fn cell_size(&self) -> Vec2 {
        self.frame.layout.cell_size
    }

    /// Reallocate the row, evicting every held item
    pub fn set_cell_count(
        &mut self,
        cell_count: usize,
        items: &mut dyn ItemLookup,
        bus: &mut EventBus,
    ) {
        if cell_count == 0 {
            warn!(grid = %self.frame.id, "single-row grid configured with no cells, using 1");
        }
        let cell_count = cell_count.max(1);
        self.clear_preview();
        self.clear_all(items, bus);
        self.occupancy = vec![None; cell_count];
        self.cells = (0..cell_count)
            .map(|index| self.frame.make_cell(index, 0))
            .collect();
    }

    /// Move or resize the grid rectangle; slots follow the new position
    pub fn set_rect(&mut self, rect: RectTransform) {
        self.frame.rect = rect;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.rect.set_top_left(self.frame.nominal_cell_top_left(index, 0));
        }
    }

    // Row component must be zero
    fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if cell.y != 0 || cell.x < 0 {
            return None;
        }
        let index = cell.x as usize;
        (index < self.occupancy.len()).then_some(index)
    }

    fn clamp_index(&self, x: i32) -> usize {
        let last = self.occupancy.len().saturating_sub(1);
        usize::try_from(x.max(0)).map_or(last, |index| index.min(last))
    }

    /// Place `item` in slot `anchor.x`; the row component must be zero
    pub fn try_place(&mut self, item: &mut Item, anchor: CellCoord, bus: &mut EventBus) -> bool {
        if !self.frame.admits(item) {
            return false;
        }
        let Some(index) = self.index_of(anchor) else {
            debug!(grid = %self.frame.id, item = %item.id(), %anchor, "slot out of range");
            return false;
        };
        if self.occupancy.get(index).is_some_and(Option::is_some) {
            debug!(grid = %self.frame.id, item = %item.id(), %anchor, "slot occupied");
            return false;
        }

        if let Some(slot) = self.occupancy.get_mut(index) {
            *slot = Some(item.id());
        }
        self.apply_item_visual(item, index);
        item.placement.set_current(self.frame.id, anchor);
        debug!(grid = %self.frame.id, item = %item.id(), %anchor, "placed in staging slot");
        bus.publish(GridEvent::ItemPlaced {
            grid: self.frame.id,
            item: item.id(),
        });
        true
    }

    /// Free the slot held by `item`
    pub fn remove(&mut self, item: &mut Item, bus: &mut EventBus) {
        let id = item.id();
        let mut cleared = false;
        if let Some(slot) = self.occupancy.iter_mut().find(|slot| **slot == Some(id)) {
            *slot = None;
            cleared = true;
        }
        let was_here = item.placement.current_grid() == Some(self.frame.id);
        item.placement.clear_current(Some(self.frame.id));
        if cleared || was_here {
            bus.publish(GridEvent::ItemRemoved {
                grid: self.frame.id,
                item: id,
            });
        }
    }

    /// Two-tier preview: the clamped target slot is valid if free, invalid if taken
    pub fn preview_placement(&mut self, _item: &Item, anchor: CellCoord) {
        self.clear_preview();
        let index = self.clamp_index(anchor.x);
        let occupied = self.occupancy.get(index).is_some_and(Option::is_some);
        let color = if occupied {
            self.frame.palette.invalid
        } else {
            self.frame.palette.valid
        };
        if let Some(cell) = self.cells.get_mut(index) {
            cell.set_color(color);
            self.preview.push(cell.coordinate());
        }
    }

    /// Restore previewed slots to their base color
    pub fn clear_preview(&mut self) {
        for coord in self.preview.drain(..) {
            if let Some(cell) = usize::try_from(coord.x)
                .ok()
                .and_then(|index| self.cells.get_mut(index))
            {
                cell.reset_color();
            }
        }
    }

    /// Slots currently colored by a preview
    pub fn preview_cells(&self) -> &[CellCoord] {
        &self.preview
    }

    /// Slot under a screen point, clamped into the row
    ///
    /// Measured from the left edge of slot 0 with a stride of
    /// `cell_width + spacing`.
    pub fn screen_point_to_cell(&self, screen: Vec2, camera: &dyn Camera) -> Option<CellCoord> {
        let rect = &self.frame.rect;
        if !rectangle_contains_screen_point(rect, screen, camera) {
            return None;
        }
        let local = screen_point_to_local_point(rect, screen, camera)?;
        let layout = &self.frame.layout;
        // Left edge rather than center of slot 0: any point inside a slot maps to that slot
        let start_x = rect.local_top_left().x + layout.padding.left;
        let step_x = layout.nominal_step().x;
        let index = floor_to_index((local.x - start_x) / step_x);
        Some(CellCoord::new(self.clamp_index(index) as i32, 0))
    }

    /// First free slot from the left
    pub fn first_empty_cell(&self) -> Option<CellCoord> {
        self.occupancy
            .iter()
            .position(Option::is_none)
            .map(|index| CellCoord::new(index as i32, 0))
    }

    /// Number of occupied slots
    pub fn item_count(&self) -> usize {
        self.occupancy.iter().filter(|slot| slot.is_some()).count()
    }

    /// Same as [`SingleRowGrid::item_count`]; every item holds one slot
    pub fn unique_item_count(&self) -> usize {
        self.item_count()
    }

    /// Item in slot `cell`
    pub fn occupant(&self, cell: CellCoord) -> Option<ItemId> {
        self.index_of(cell)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    /// Whether `item` holds a slot
    pub fn contains_item(&self, item: ItemId) -> bool {
        self.occupancy.contains(&Some(item))
    }

    /// Held items from left to right
    pub fn items(&self) -> Vec<ItemId> {
        self.occupancy.iter().flatten().copied().collect()
    }

    /// Empty every slot, returning the evicted items
    pub fn clear_all(&mut self, items: &mut dyn ItemLookup, bus: &mut EventBus) -> Vec<ItemId> {
        let evicted: Vec<ItemId> = self.occupancy.iter_mut().filter_map(Option::take).collect();
        for &id in &evicted {
            evict_occupant(self.frame.id, id, items, bus);
        }
        evicted
    }

    /// Items shrink to one slot while hovering the row
    pub const fn drag_size_for(&self, _item: &Item) -> Vec2 {
        self.frame.layout.cell_size
    }

    /// Slot visual at `coord`
    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        self.index_of(coord).and_then(|index| self.cells.get(index))
    }

    // Centered in its slot, one slot in size
    fn apply_item_visual(&self, item: &mut Item, index: usize) {
        let visual = &mut item.visual;
        visual.parent = Parent::ItemsRoot(self.frame.id);
        visual.rect.size = self.frame.layout.cell_size;
        visual.rect.pivot = Vec2::HALF;
        visual.rect.position = self.cells.get(index).map_or_else(
            || {
                self.frame.nominal_cell_top_left(index, 0) + self.frame.layout.cell_size * 0.5
            },
            |cell| cell.rect.center(),
        );
    }
}
