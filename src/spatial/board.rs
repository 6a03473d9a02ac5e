//! Coordinate (2-D) board grid
//!
//! Occupancy is an `ndarray::Array2` indexed `[column, row]` holding the id of
//! the item that owns each cell. Items occupy exactly their solid footprint
//! cells offset by the anchor; empty footprint cells are never claimed.

use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;
use tracing::{debug, warn};

use crate::math::geometry::{
    Camera, RectTransform, Vec2, rectangle_contains_screen_point, screen_point_to_local_point,
};
use crate::services::events::{EventBus, GridEvent};
use crate::spatial::cell::{CellCoord, Color, GridCell};
use crate::spatial::grid::{GridFrame, evict_occupant};
use crate::spatial::item::{Item, ItemId, ItemLookup, Parent};
use crate::spatial::layout::{LayoutMetricCache, LayoutMetrics};

/// Board grid of `columns` x `rows` cells
#[derive(Debug, Clone)]
pub struct CoordinateGrid {
    frame: GridFrame,
    columns: usize,
    rows: usize,
    occupancy: Array2<Option<ItemId>>,
    cells: HashMap<CellCoord, GridCell>,
    preview: Vec<CellCoord>,
    cache: LayoutMetricCache,
}

impl CoordinateGrid {
    /// Create an empty board; dimensions below one are clamped to one
    pub fn new(frame: GridFrame, columns: usize, rows: usize) -> Self {
        let (columns, rows) = clamp_dimensions(&frame, columns, rows);
        let mut grid = Self {
            frame,
            columns,
            rows,
            occupancy: Array2::from_elem((columns, rows), None),
            cells: HashMap::new(),
            preview: Vec::new(),
            cache: LayoutMetricCache::new(),
        };
        grid.assign_cells();
        grid
    }

    /// Shared frame
    pub const fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// Number of columns
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Read-only view of the occupancy store, indexed `[column, row]`
    pub const fn occupancy(&self) -> &Array2<Option<ItemId>> {
        &self.occupancy
    }

    /// Layout cache, exposed for hit/miss inspection
    pub const fn layout_cache(&self) -> &LayoutMetricCache {
        &self.cache
    }

    /// Reallocate the board, evicting every held item
    pub fn resize(
        &mut self,
        columns: usize,
        rows: usize,
        items: &mut dyn ItemLookup,
        bus: &mut EventBus,
    ) {
        let (columns, rows) = clamp_dimensions(&self.frame, columns, rows);
        self.clear_preview();
        self.clear_all(items, bus);
        self.columns = columns;
        self.rows = rows;
        self.occupancy = Array2::from_elem((columns, rows), None);
        self.assign_cells();
    }

    /// Move or resize the grid rectangle
    ///
    /// Cells are laid out again from the nominal metrics. The layout cache is
    /// invalidated only when the rectangle's dimensions change, since cached
    /// metrics are relative to the rectangle.
    pub fn set_rect(&mut self, rect: RectTransform) {
        let resized = self.frame.rect.size != rect.size;
        self.frame.rect = rect;
        for (coord, cell) in &mut self.cells {
            cell.rect = RectTransform::from_top_left(
                self.frame
                    .nominal_cell_top_left(coord.x as usize, coord.y as usize),
                self.frame.layout.cell_size,
            );
        }
        if resized {
            self.cache.invalidate();
        }
    }

    /// Record the rect the render layer actually produced for a cell
    ///
    /// Returns `false` when no cell exists at `coord`.
    pub fn apply_rendered_cell_rect(&mut self, coord: CellCoord, rect: RectTransform) -> bool {
        let Some(cell) = self.cells.get_mut(&coord) else {
            return false;
        };
        cell.rect = rect;
        self.cache.invalidate();
        true
    }

    /// Current metrics, recomputing them if a layout change was recorded
    pub fn layout_metrics(&mut self) -> Option<LayoutMetrics> {
        let rect = self.frame.rect;
        let cells = &self.cells;
        self.cache.get_or_compute(
            |coord| cells.get(&coord).map(|cell| rect.to_local(cell.rect.top_left())),
            self.frame.layout.nominal_step(),
        )
    }

    /// Whether `cell` lies inside `[0, columns) x [0, rows)`
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        self.index_of(cell).is_some()
    }

    fn index_of(&self, cell: CellCoord) -> Option<[usize; 2]> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (column, row) = (cell.x as usize, cell.y as usize);
        (column < self.columns && row < self.rows).then_some([column, row])
    }

    /// Place `item` with its footprint's top-left at `anchor`
    ///
    /// The bounding box must fit inside the board and no solid footprint cell
    /// may collide. Validation completes before anything is written.
    pub fn try_place(&mut self, item: &mut Item, anchor: CellCoord, bus: &mut EventBus) -> bool {
        if !self.frame.admits(item) {
            return false;
        }
        let (width, height) = item.footprint().dimensions();
        if anchor.x < 0
            || anchor.y < 0
            || anchor.x as usize + width > self.columns
            || anchor.y as usize + height > self.rows
        {
            debug!(grid = %self.frame.id, item = %item.id(), %anchor, "footprint out of bounds");
            return false;
        }

        let mut targets = Vec::with_capacity(width * height);
        for (x, y) in item.footprint().filled_cells() {
            let Some(index) = self.index_of(anchor + CellCoord::new(x, y)) else {
                return false;
            };
            if self.occupancy.get(index).is_some_and(Option::is_some) {
                debug!(grid = %self.frame.id, item = %item.id(), %anchor, "footprint collides");
                return false;
            }
            targets.push(index);
        }

        let id = item.id();
        for index in targets {
            if let Some(slot) = self.occupancy.get_mut(index) {
                *slot = Some(id);
            }
        }
        self.apply_item_visual(item, anchor);
        item.placement.set_current(self.frame.id, anchor);
        debug!(grid = %self.frame.id, item = %id, %anchor, "placed on board");
        bus.publish(GridEvent::ItemPlaced {
            grid: self.frame.id,
            item: id,
        });
        true
    }

    /// Clear every cell referencing `item`
    ///
    /// Scans the whole board instead of trusting the anchor, so irregular or
    /// stale footprints are always fully released.
    pub fn remove(&mut self, item: &mut Item, bus: &mut EventBus) {
        let id = item.id();
        let mut cleared = false;
        for slot in &mut self.occupancy {
            if *slot == Some(id) {
                *slot = None;
                cleared = true;
            }
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

    /// Color the footprint at `anchor` with the three-tier policy
    ///
    /// Any overhang: occupied in-bounds cells invalid, free ones blocked.
    /// Fully inside with a collision: every cell invalid. Otherwise valid.
    /// Cells outside the board are never colored.
    pub fn preview_placement(&mut self, item: &Item, anchor: CellCoord) {
        self.clear_preview();

        let mut any_out_of_bounds = false;
        let mut any_occupied = false;
        for (x, y) in item.footprint().filled_cells() {
            match self.index_of(anchor + CellCoord::new(x, y)) {
                None => any_out_of_bounds = true,
                Some(index) => {
                    any_occupied |= self.occupancy.get(index).is_some_and(Option::is_some);
                }
            }
        }

        let palette = self.frame.palette;
        for (x, y) in item.footprint().filled_cells() {
            let coord = anchor + CellCoord::new(x, y);
            let Some(index) = self.index_of(coord) else {
                continue;
            };
            let occupied = self.occupancy.get(index).is_some_and(Option::is_some);
            let color: Color = if any_out_of_bounds {
                if occupied {
                    palette.invalid
                } else {
                    palette.blocked
                }
            } else if any_occupied {
                palette.invalid
            } else {
                palette.valid
            };
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.set_color(color);
                self.preview.push(coord);
            }
        }
    }

    /// Restore previewed cells to their base color
    pub fn clear_preview(&mut self) {
        for coord in self.preview.drain(..) {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.reset_color();
            }
        }
    }

    /// Cells currently colored by a preview
    pub fn preview_cells(&self) -> &[CellCoord] {
        &self.preview
    }

    /// Cell under a screen point; may lie outside the board's bounds
    pub fn screen_point_to_cell(&mut self, screen: Vec2, camera: &dyn Camera) -> Option<CellCoord> {
        if !rectangle_contains_screen_point(&self.frame.rect, screen, camera) {
            return None;
        }
        let metrics = self.layout_metrics()?;
        let local = screen_point_to_local_point(&self.frame.rect, screen, camera)?;
        Some(metrics.cell_at(local))
    }

    /// First free cell scanning rows top to bottom, columns left to right
    pub fn first_empty_cell(&self) -> Option<CellCoord> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| (column, row)))
            .find(|&(column, row)| self.occupancy.get([column, row]).is_some_and(Option::is_none))
            .map(|(column, row)| CellCoord::new(column as i32, row as i32))
    }

    /// Number of distinct items on the board
    pub fn unique_item_count(&self) -> usize {
        self.occupancy.iter().flatten().collect::<BTreeSet<_>>().len()
    }

    /// Number of occupied cells
    pub fn occupied_cell_count(&self) -> usize {
        self.occupancy.iter().filter(|slot| slot.is_some()).count()
    }

    /// Item owning `cell`
    pub fn occupant(&self, cell: CellCoord) -> Option<ItemId> {
        self.index_of(cell)
            .and_then(|index| self.occupancy.get(index).copied().flatten())
    }

    /// Whether any cell is owned by `item`
    pub fn contains_item(&self, item: ItemId) -> bool {
        self.occupancy.iter().any(|slot| *slot == Some(item))
    }

    /// Distinct items in row-major order of their first cell
    pub fn items(&self) -> Vec<ItemId> {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                if let Some(Some(id)) = self.occupancy.get([column, row]) {
                    if seen.insert(*id) {
                        ordered.push(*id);
                    }
                }
            }
        }
        ordered
    }

    /// Empty the board, returning the evicted items
    pub fn clear_all(&mut self, items: &mut dyn ItemLookup, bus: &mut EventBus) -> Vec<ItemId> {
        let evicted = self.items();
        self.occupancy.fill(None);
        for &id in &evicted {
            evict_occupant(self.frame.id, id, items, bus);
        }
        evicted
    }

    /// Pixel span of the item's bounding box on this board
    pub fn drag_size_for(&self, item: &Item) -> Vec2 {
        let (width, height) = item.footprint().dimensions();
        self.frame.layout.span(width, height)
    }

    /// Cell visual at `coord`
    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        self.cells.get(&coord)
    }

    fn assign_cells(&mut self) {
        self.preview.clear();
        self.cells.clear();
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = self.frame.make_cell(column, row);
                self.cells.insert(cell.coordinate(), cell);
            }
        }
        self.cache.invalidate();
    }

    // Top-left pivot, spanning the footprint's bounding box including gaps
    fn apply_item_visual(&self, item: &mut Item, anchor: CellCoord) {
        let (width, height) = item.footprint().dimensions();
        let top_left = self.cells.get(&anchor).map_or_else(
            || self.frame.nominal_cell_top_left(anchor.x as usize, anchor.y as usize),
            |cell| cell.rect.top_left(),
        );
        let visual = &mut item.visual;
        visual.parent = Parent::ItemsRoot(self.frame.id);
        visual.rect = RectTransform::from_top_left(top_left, self.frame.layout.span(width, height));
    }
}

fn clamp_dimensions(frame: &GridFrame, columns: usize, rows: usize) -> (usize, usize) {
    if columns == 0 || rows == 0 {
        warn!(grid = %frame.id, columns, rows, "coordinate grid dimensions below 1, clamping");
    }
    (columns.max(1), rows.max(1))
}
