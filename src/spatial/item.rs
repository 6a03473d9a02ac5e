//! Item instances and the visual state a renderer reads from them

use std::collections::BTreeMap;

use crate::math::geometry::{RectTransform, Vec2};
use crate::services::catalog::{ItemDataProvider, ItemDefinition, ItemKind, LevelStats};
use crate::services::pool::{InstanceId, ObjectPool, Poolable};
use crate::spatial::footprint::Footprint;
use crate::spatial::grid::GridId;
use crate::spatial::placement::ItemPlacement;

/// Items are pooled, so their identity is the pool instance id
pub type ItemId = InstanceId;

/// Container an item's visual is parented to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parent {
    /// Inactive, parked in its pool
    #[default]
    Pool,
    /// Root of the canvas, not attached to any grid
    Canvas,
    /// Items overlay of a grid
    ItemsRoot(GridId),
    /// Top-level overlay that renders above every grid while dragging
    DragOverlay,
}

/// Visual state of an item on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemVisual {
    /// Current container
    pub parent: Parent,
    /// Rect in canvas space
    pub rect: RectTransform,
    /// Whether the item intercepts pointer hits
    pub input_blocking: bool,
}

impl Default for ItemVisual {
    fn default() -> Self {
        Self {
            parent: Parent::Pool,
            rect: RectTransform {
                size: Vec2::new(100.0, 100.0),
                ..RectTransform::default()
            },
            input_blocking: true,
        }
    }
}

/// One live item instance
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    level: u32,
    stats: Option<LevelStats>,
    footprint: Footprint,
    /// Placement record, written by grids and the drag controller
    pub placement: ItemPlacement,
    /// Visual state, written by grids and the drag controller
    pub visual: ItemVisual,
}

impl Item {
    /// Level-1 item with the given footprint and no stats
    pub fn new(id: ItemId, kind: ItemKind, footprint: Footprint) -> Self {
        Self {
            id,
            kind,
            level: 1,
            stats: None,
            placement: ItemPlacement::new(footprint.dimensions()),
            footprint,
            visual: ItemVisual::default(),
        }
    }

    /// Item at the definition's base level
    pub fn from_definition(id: ItemId, definition: &ItemDefinition) -> Self {
        let mut item = Self::new(id, definition.kind, definition.footprint.clone());
        item.level = definition.base_level();
        item.stats = definition.level_stats(item.level);
        item
    }

    /// Instance identity
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Item kind
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Current level
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Stats of the current level, if authored
    pub const fn stats(&self) -> Option<LevelStats> {
        self.stats
    }

    /// Occupancy footprint
    pub const fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Clamped footprint dimensions `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.footprint.dimensions()
    }

    /// Whether the item currently sits in a grid
    pub const fn is_placed(&self) -> bool {
        self.placement.is_placed()
    }

    /// Switch level and look up its stats; returns whether stats exist
    pub fn set_level(&mut self, level: u32, provider: &dyn ItemDataProvider) -> bool {
        self.level = level;
        self.stats = provider.level_stats(self.kind, level);
        self.stats.is_some()
    }

    /// Whether a canvas point lies on the item's visual
    pub fn hit(&self, canvas: Vec2) -> bool {
        self.visual.input_blocking && self.visual.rect.contains(canvas)
    }
}

impl Poolable for Item {
    fn on_spawn(&mut self) {
        self.placement.reset();
        self.placement.set_dimensions(self.footprint.dimensions());
        self.visual.parent = Parent::Canvas;
        self.visual.input_blocking = true;
    }

    fn on_despawn(&mut self) {
        self.placement.reset();
        self.visual.parent = Parent::Pool;
    }
}

/// Resolves item ids to live items
///
/// Grids only store ids; whenever they must touch several items at once
/// (clearing, resizing) they go through this lookup.
pub trait ItemLookup {
    /// Item by id, if live
    fn item(&self, id: ItemId) -> Option<&Item>;

    /// Mutable item by id, if live
    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item>;
}

impl ItemLookup for BTreeMap<ItemId, Item> {
    fn item(&self, id: ItemId) -> Option<&Item> {
        self.get(&id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.get_mut(&id)
    }
}

impl ItemLookup for ObjectPool<ItemKind, Item> {
    fn item(&self, id: ItemId) -> Option<&Item> {
        self.get(id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.get_mut(id)
    }
}
