//! Grid contract shared by the staging row and the coordinate board
//!
//! [`Grid`] is a closed set of variants. Callers (the drag controller, the
//! registry, the session) only talk to the enum; each operation dispatches to
//! [`SingleRowGrid`] or [`CoordinateGrid`]. Placement is all-or-nothing: a
//! failed [`Grid::try_place`] leaves occupancy untouched and returns `false`.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::math::geometry::{Camera, RectTransform, Vec2, rectangle_contains_screen_point};
use crate::services::catalog::ItemKind;
use crate::services::events::{EventBus, GridEvent};
use crate::spatial::board::CoordinateGrid;
use crate::spatial::cell::{CellCoord, Color, GridCell, PreviewPalette};
use crate::spatial::item::{Item, ItemId, ItemLookup, Parent};
use crate::spatial::layout::LayoutSpec;
use crate::spatial::staging::SingleRowGrid;

/// Stable identity of a grid inside a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridId(pub u32);

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid#{}", self.0)
    }
}

/// Nominal classification used for lookup by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GridTag {
    /// Untagged; never entered in the tag table
    #[default]
    None,
    /// The 2-D board the player arranges items on
    PlayerInventory,
    /// The staging row offering freshly spawned items
    PossibleItems,
}

/// Topology of a grid variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridKind {
    /// One row, every item treated as 1x1
    SingleRow,
    /// Columns by rows, items occupy their footprint
    Coordinate,
}

/// Identity, placement on the canvas and presentation settings of a grid
#[derive(Debug, Clone)]
pub struct GridFrame {
    /// Registry identity
    pub id: GridId,
    /// Role tag
    pub tag: GridTag,
    /// Visual rectangle in canvas space
    pub rect: RectTransform,
    /// Stacking order for hit tests; higher is on top
    pub z_index: i32,
    /// Nominal cell size, spacing and padding
    pub layout: LayoutSpec,
    /// Preview colors
    pub palette: PreviewPalette,
    /// Color cells start with
    pub base_color: Color,
    accepted_kinds: Option<BTreeSet<ItemKind>>,
}

impl GridFrame {
    /// Frame with default layout, palette and no kind restriction
    pub fn new(id: GridId, tag: GridTag, rect: RectTransform) -> Self {
        Self {
            id,
            tag,
            rect,
            z_index: 0,
            layout: LayoutSpec::default(),
            palette: PreviewPalette::default(),
            base_color: Color::rgb(0.18, 0.18, 0.22),
            accepted_kinds: None,
        }
    }

    /// Frame whose rect exactly fits `columns` x `rows` cells at `top_left`
    pub fn fitted(
        id: GridId,
        tag: GridTag,
        top_left: Vec2,
        layout: LayoutSpec,
        columns: usize,
        rows: usize,
    ) -> Self {
        let size = layout.content_size(columns.max(1), rows.max(1));
        let mut frame = Self::new(id, tag, RectTransform::from_top_left(top_left, size));
        frame.layout = layout;
        frame
    }

    /// Set the stacking order
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Replace the nominal layout
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the preview palette
    #[must_use]
    pub fn with_palette(mut self, palette: PreviewPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Restrict the grid to a set of item kinds
    #[must_use]
    pub fn with_accepted_kinds<I: IntoIterator<Item = ItemKind>>(mut self, kinds: I) -> Self {
        self.accepted_kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Whether items of `kind` may be placed here
    pub fn accepts_kind(&self, kind: ItemKind) -> bool {
        self.accepted_kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&kind))
    }

    /// Top-left corner of a cell as laid out from the nominal metrics
    pub fn nominal_cell_top_left(&self, column: usize, row: usize) -> Vec2 {
        self.rect.top_left() + self.layout.cell_offset(column, row)
    }

    /// Build an unbound cell at the nominal position of `(column, row)`
    pub(crate) fn make_cell(&self, column: usize, row: usize) -> GridCell {
        let rect =
            RectTransform::from_top_left(self.nominal_cell_top_left(column, row), self.layout.cell_size);
        let mut cell = GridCell::new(self.base_color, rect);
        cell.bind(self.id, CellCoord::new(column as i32, row as i32));
        cell
    }

    /// Pre-checks shared by every variant before bounds and collision tests
    pub(crate) fn admits(&self, item: &Item) -> bool {
        if item.placement.is_placed() {
            debug!(grid = %self.id, item = %item.id(), "rejecting item that is already placed");
            return false;
        }
        if !self.accepts_kind(item.kind()) {
            debug!(grid = %self.id, item = %item.id(), kind = %item.kind(), "grid does not accept kind");
            return false;
        }
        true
    }
}

/// A grid of either topology
#[derive(Debug, Clone)]
pub enum Grid {
    /// Staging row
    SingleRow(SingleRowGrid),
    /// 2-D board
    Coordinate(CoordinateGrid),
}

impl From<SingleRowGrid> for Grid {
    fn from(grid: SingleRowGrid) -> Self {
        Self::SingleRow(grid)
    }
}

impl From<CoordinateGrid> for Grid {
    fn from(grid: CoordinateGrid) -> Self {
        Self::Coordinate(grid)
    }
}

impl Grid {
    /// Shared frame
    pub const fn frame(&self) -> &GridFrame {
        match self {
            Self::SingleRow(grid) => grid.frame(),
            Self::Coordinate(grid) => grid.frame(),
        }
    }

    /// Registry identity
    pub const fn id(&self) -> GridId {
        self.frame().id
    }

    /// Role tag
    pub const fn tag(&self) -> GridTag {
        self.frame().tag
    }

    /// Topology
    pub const fn kind(&self) -> GridKind {
        match self {
            Self::SingleRow(_) => GridKind::SingleRow,
            Self::Coordinate(_) => GridKind::Coordinate,
        }
    }

    /// Visual rectangle in canvas space
    pub const fn rect(&self) -> &RectTransform {
        &self.frame().rect
    }

    /// Stacking order for hit tests
    pub const fn z_index(&self) -> i32 {
        self.frame().z_index
    }

    /// Nominal layout settings
    pub const fn layout(&self) -> &LayoutSpec {
        &self.frame().layout
    }

    /// Move or resize the visual rectangle and lay the cells out again
    pub fn set_rect(&mut self, rect: RectTransform) {
        match self {
            Self::SingleRow(grid) => grid.set_rect(rect),
            Self::Coordinate(grid) => grid.set_rect(rect),
        }
    }

    /// Whether a screen point falls inside the grid's visual rectangle
    pub fn contains_screen_point(&self, screen: Vec2, camera: &dyn Camera) -> bool {
        rectangle_contains_screen_point(self.rect(), screen, camera)
    }

    /// Extension point for kind restrictions; accepts everything by default
    pub fn can_accept_item(&self, item: &Item) -> bool {
        self.frame().accepts_kind(item.kind())
    }

    /// Place `item` with its anchor at `anchor`, all-or-nothing
    pub fn try_place(&mut self, item: &mut Item, anchor: CellCoord, bus: &mut EventBus) -> bool {
        match self {
            Self::SingleRow(grid) => grid.try_place(item, anchor, bus),
            Self::Coordinate(grid) => grid.try_place(item, anchor, bus),
        }
    }

    /// Clear every cell owned by `item`; a no-op for items not held here
    pub fn remove(&mut self, item: &mut Item, bus: &mut EventBus) {
        match self {
            Self::SingleRow(grid) => grid.remove(item, bus),
            Self::Coordinate(grid) => grid.remove(item, bus),
        }
    }

    /// Color the in-bounds cells `item` would cover at `anchor`
    pub fn preview_placement(&mut self, item: &Item, anchor: CellCoord) {
        match self {
            Self::SingleRow(grid) => grid.preview_placement(item, anchor),
            Self::Coordinate(grid) => grid.preview_placement(item, anchor),
        }
    }

    /// Restore every previewed cell to its base color
    pub fn clear_preview(&mut self) {
        match self {
            Self::SingleRow(grid) => grid.clear_preview(),
            Self::Coordinate(grid) => grid.clear_preview(),
        }
    }

    /// Cells currently colored by a preview
    pub fn preview_cells(&self) -> &[CellCoord] {
        match self {
            Self::SingleRow(grid) => grid.preview_cells(),
            Self::Coordinate(grid) => grid.preview_cells(),
        }
    }

    /// Map a screen point to a logical cell
    ///
    /// `None` when the point lies outside the grid's rectangle or cannot be
    /// projected. Coordinate grids may return cells outside their bounds.
    pub fn screen_point_to_cell(&mut self, screen: Vec2, camera: &dyn Camera) -> Option<CellCoord> {
        match self {
            Self::SingleRow(grid) => grid.screen_point_to_cell(screen, camera),
            Self::Coordinate(grid) => grid.screen_point_to_cell(screen, camera),
        }
    }

    /// First free cell in row-major order
    pub fn first_empty_cell(&self) -> Option<CellCoord> {
        match self {
            Self::SingleRow(grid) => grid.first_empty_cell(),
            Self::Coordinate(grid) => grid.first_empty_cell(),
        }
    }

    /// Number of distinct items held
    pub fn item_count(&self) -> usize {
        match self {
            Self::SingleRow(grid) => grid.item_count(),
            Self::Coordinate(grid) => grid.unique_item_count(),
        }
    }

    /// Number of distinct items held, counting multi-cell items once
    pub fn unique_item_count(&self) -> usize {
        match self {
            Self::SingleRow(grid) => grid.unique_item_count(),
            Self::Coordinate(grid) => grid.unique_item_count(),
        }
    }

    /// Item owning `cell`, if any
    pub fn occupant(&self, cell: CellCoord) -> Option<ItemId> {
        match self {
            Self::SingleRow(grid) => grid.occupant(cell),
            Self::Coordinate(grid) => grid.occupant(cell),
        }
    }

    /// Whether any cell is owned by `item`
    pub fn contains_item(&self, item: ItemId) -> bool {
        match self {
            Self::SingleRow(grid) => grid.contains_item(item),
            Self::Coordinate(grid) => grid.contains_item(item),
        }
    }

    /// Distinct items held, in row-major order of their first cell
    pub fn items(&self) -> Vec<ItemId> {
        match self {
            Self::SingleRow(grid) => grid.items(),
            Self::Coordinate(grid) => grid.items(),
        }
    }

    /// Evict every item and return their ids for the caller to release
    pub fn clear_all(&mut self, items: &mut dyn ItemLookup, bus: &mut EventBus) -> Vec<ItemId> {
        match self {
            Self::SingleRow(grid) => grid.clear_all(items, bus),
            Self::Coordinate(grid) => grid.clear_all(items, bus),
        }
    }

    /// Pixel size an item should take while hovering this grid
    pub fn drag_size_for(&self, item: &Item) -> Vec2 {
        match self {
            Self::SingleRow(grid) => grid.drag_size_for(item),
            Self::Coordinate(grid) => grid.drag_size_for(item),
        }
    }

    /// Cell at a logical coordinate
    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        match self {
            Self::SingleRow(grid) => grid.cell(coord),
            Self::Coordinate(grid) => grid.cell(coord),
        }
    }

    /// Logical dimensions as `(columns, rows)`
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Self::SingleRow(grid) => (grid.cell_count(), 1),
            Self::Coordinate(grid) => (grid.columns(), grid.rows()),
        }
    }

    /// Staging variant, if this is one
    pub const fn as_single_row(&self) -> Option<&SingleRowGrid> {
        match self {
            Self::SingleRow(grid) => Some(grid),
            Self::Coordinate(_) => None,
        }
    }

    /// Mutable staging variant, if this is one
    pub const fn as_single_row_mut(&mut self) -> Option<&mut SingleRowGrid> {
        match self {
            Self::SingleRow(grid) => Some(grid),
            Self::Coordinate(_) => None,
        }
    }

    /// Board variant, if this is one
    pub const fn as_coordinate(&self) -> Option<&CoordinateGrid> {
        match self {
            Self::Coordinate(grid) => Some(grid),
            Self::SingleRow(_) => None,
        }
    }

    /// Mutable board variant, if this is one
    pub const fn as_coordinate_mut(&mut self) -> Option<&mut CoordinateGrid> {
        match self {
            Self::Coordinate(grid) => Some(grid),
            Self::SingleRow(_) => None,
        }
    }
}

/// Clear an evicted item's placement and announce the removal
///
/// Used by resize and `clear_all`; the item is left floating on the canvas.
pub(crate) fn evict_occupant(
    grid: GridId,
    id: ItemId,
    items: &mut dyn ItemLookup,
    bus: &mut EventBus,
) {
    if let Some(item) = items.item_mut(id) {
        item.placement.clear_current(Some(grid));
        if item.visual.parent == Parent::ItemsRoot(grid) {
            item.visual.parent = Parent::Canvas;
        }
    }
    bus.publish(GridEvent::ItemRemoved { grid, item: id });
}
