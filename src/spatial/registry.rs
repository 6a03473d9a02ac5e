//! Registry of live grids and pointer hit testing

use std::collections::HashMap;

use tracing::{info, warn};

use crate::math::geometry::{Camera, Vec2};
use crate::spatial::grid::{Grid, GridId, GridTag};

/// Owns every live grid in registration order
#[derive(Debug, Default)]
pub struct GridRegistry {
    grids: Vec<Grid>,
    tags: HashMap<GridTag, GridId>,
    next_id: u32,
}

impl GridRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh id for a grid about to be built
    pub const fn next_id(&mut self) -> GridId {
        let id = GridId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a grid and index its tag
    ///
    /// A grid whose id is already registered replaces the old one in place.
    /// On tag collision the newest grid wins and a warning is logged.
    pub fn register(&mut self, grid: impl Into<Grid>) -> GridId {
        let grid = grid.into();
        let id = grid.id();
        let tag = grid.tag();
        self.next_id = self.next_id.max(id.0.saturating_add(1));

        if let Some(existing) = self.grids.iter_mut().find(|existing| existing.id() == id) {
            warn!(grid = %id, "grid id registered twice, replacing");
            let old_tag = existing.tag();
            *existing = grid;
            if old_tag != tag && self.tags.get(&old_tag) == Some(&id) {
                self.tags.remove(&old_tag);
            }
        } else {
            self.grids.push(grid);
        }

        if tag != GridTag::None {
            if let Some(previous) = self.tags.insert(tag, id) {
                if previous != id {
                    warn!(?tag, %previous, replacement = %id, "grid tag registered twice, last one wins");
                }
            }
        }
        info!(grid = %id, ?tag, total = self.grids.len(), "grid registered");
        id
    }

    /// Remove a grid, returning it
    ///
    /// The tag entry is dropped only while it still points at this grid.
    pub fn unregister(&mut self, id: GridId) -> Option<Grid> {
        let index = self.grids.iter().position(|grid| grid.id() == id)?;
        let grid = self.grids.remove(index);
        if self.tags.get(&grid.tag()) == Some(&id) {
            self.tags.remove(&grid.tag());
        }
        info!(grid = %id, total = self.grids.len(), "grid unregistered");
        Some(grid)
    }

    /// Grid by id
    pub fn get(&self, id: GridId) -> Option<&Grid> {
        self.grids.iter().find(|grid| grid.id() == id)
    }

    /// Mutable grid by id
    pub fn get_mut(&mut self, id: GridId) -> Option<&mut Grid> {
        self.grids.iter_mut().find(|grid| grid.id() == id)
    }

    /// Grid registered under `tag`
    pub fn by_tag(&self, tag: GridTag) -> Option<&Grid> {
        self.tags.get(&tag).and_then(|&id| self.get(id))
    }

    /// Mutable grid registered under `tag`
    pub fn by_tag_mut(&mut self, tag: GridTag) -> Option<&mut Grid> {
        let id = *self.tags.get(&tag)?;
        self.get_mut(id)
    }

    /// Id registered under `tag`
    pub fn id_for_tag(&self, tag: GridTag) -> Option<GridId> {
        self.tags.get(&tag).copied()
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: GridId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live grids
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// True when no grids are registered
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Grids in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Grid> {
        self.grids.iter()
    }

    /// Mutable grids in registration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Grid> {
        self.grids.iter_mut()
    }

    /// Topmost grid whose rectangle contains a screen point
    ///
    /// Highest `z_index` wins; among equal `z_index` the earliest registration
    /// wins, so overlapping grids always resolve the same way.
    pub fn find_grid_under_pointer(&self, screen: Vec2, camera: &dyn Camera) -> Option<GridId> {
        let mut best: Option<&Grid> = None;
        for grid in &self.grids {
            if !grid.contains_screen_point(screen, camera) {
                continue;
            }
            if best.is_none_or(|current| grid.z_index() > current.z_index()) {
                best = Some(grid);
            }
        }
        best.map(Grid::id)
    }
}
