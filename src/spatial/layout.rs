//! Nominal cell layout and metrics derived from rendered cells

use serde::Deserialize;

use crate::math::geometry::{Vec2, floor_to_index};
use crate::spatial::cell::CellCoord;

/// Inner padding between a grid rect's edges and its first cells
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Padding {
    /// Left inset in canvas pixels
    pub left: f32,
    /// Right inset in canvas pixels
    pub right: f32,
    /// Top inset in canvas pixels
    pub top: f32,
    /// Bottom inset in canvas pixels
    pub bottom: f32,
}

/// Nominal layout configuration for a grid's cells
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutSpec {
    /// Size of one cell
    pub cell_size: Vec2,
    /// Gap between neighboring cells
    pub spacing: Vec2,
    /// Inset from the grid rect
    pub padding: Padding,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            cell_size: Vec2::new(100.0, 100.0),
            spacing: Vec2::ZERO,
            padding: Padding::default(),
        }
    }
}

impl LayoutSpec {
    /// Distance between neighboring cell origins, at least one pixel per axis
    pub fn nominal_step(&self) -> Vec2 {
        (self.cell_size + self.spacing).abs().max_scalar(1.0)
    }

    /// Pixel span of a `width` x `height` block of cells including inner gaps
    pub fn span(&self, width: usize, height: usize) -> Vec2 {
        let gaps_x = width.saturating_sub(1) as f32;
        let gaps_y = height.saturating_sub(1) as f32;
        Vec2::new(
            width as f32 * self.cell_size.x + gaps_x * self.spacing.x,
            height as f32 * self.cell_size.y + gaps_y * self.spacing.y,
        )
    }

    /// Offset of a cell's top-left corner from the grid rect's top-left corner
    pub fn cell_offset(&self, column: usize, row: usize) -> Vec2 {
        Vec2::new(
            self.padding.left + column as f32 * (self.cell_size.x + self.spacing.x),
            self.padding.top + row as f32 * (self.cell_size.y + self.spacing.y),
        )
    }

    /// Size of the rect needed to hold `columns` x `rows` cells plus padding
    pub fn content_size(&self, columns: usize, rows: usize) -> Vec2 {
        self.span(columns, rows)
            + Vec2::new(
                self.padding.left + self.padding.right,
                self.padding.top + self.padding.bottom,
            )
    }
}

/// Derived geometry used to map grid-local points to cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Grid-local position of cell (0,0)'s top-left corner
    pub origin: Vec2,
    /// Distance between neighboring cell origins
    pub step: Vec2,
    /// Reciprocal of `step`
    pub inv_step: Vec2,
}

impl LayoutMetrics {
    /// Build metrics from an origin and step, clamping the step to one pixel
    pub fn new(origin: Vec2, step: Vec2) -> Self {
        let step = step.abs().max_scalar(1.0);
        Self {
            origin,
            step,
            inv_step: Vec2::new(1.0 / step.x, 1.0 / step.y),
        }
    }

    /// Cell containing a grid-local point; may lie outside the grid's bounds
    pub fn cell_at(&self, local: Vec2) -> CellCoord {
        let delta = local - self.origin;
        CellCoord::new(
            floor_to_index(delta.x * self.inv_step.x),
            floor_to_index(delta.y * self.inv_step.y),
        )
    }
}

/// Recompute counters for the layout cache
#[derive(Default, Debug, Clone, Copy)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: usize,
    /// Lookups that triggered a recompute
    pub misses: usize,
}

/// Lazily recomputed layout metrics for a coordinate grid
///
/// Marked dirty whenever the grid's rect dimensions or cell geometry change.
/// The next lookup re-derives the origin from the rendered rect of cell (0,0)
/// and the steps from cells (1,0) and (0,1), falling back to the nominal
/// step when a neighbor is missing.
#[derive(Debug, Clone)]
pub struct LayoutMetricCache {
    dirty: bool,
    metrics: Option<LayoutMetrics>,
    /// Hit/miss counters
    pub stats: CacheStats,
}

impl Default for LayoutMetricCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutMetricCache {
    /// Create a cache that recomputes on first use
    pub const fn new() -> Self {
        Self {
            dirty: true,
            metrics: None,
            stats: CacheStats { hits: 0, misses: 0 },
        }
    }

    /// Force a recompute on the next lookup
    pub const fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether the next lookup will recompute
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return cached metrics, recomputing first if dirty
    ///
    /// `cell_top_left` yields the grid-local top-left corner of a rendered
    /// cell, or `None` when that cell does not exist. Without cell (0,0) the
    /// cache stays invalid and lookups return `None` until the next
    /// invalidation.
    pub fn get_or_compute<F>(&mut self, cell_top_left: F, nominal_step: Vec2) -> Option<LayoutMetrics>
    where
        F: Fn(CellCoord) -> Option<Vec2>,
    {
        if !self.dirty {
            self.stats.hits += 1;
            return self.metrics;
        }

        self.stats.misses += 1;
        self.dirty = false;
        self.metrics = None;

        let origin = cell_top_left(CellCoord::new(0, 0))?;
        let step_x = cell_top_left(CellCoord::new(1, 0))
            .map_or(nominal_step.x, |right| (right.x - origin.x).abs());
        let step_y = cell_top_left(CellCoord::new(0, 1))
            .map_or(nominal_step.y, |below| (below.y - origin.y).abs());

        self.metrics = Some(LayoutMetrics::new(origin, Vec2::new(step_x, step_y)));
        self.metrics
    }

    /// Last computed metrics without triggering a recompute
    pub const fn peek(&self) -> Option<LayoutMetrics> {
        self.metrics
    }
}
