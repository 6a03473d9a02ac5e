//! Spatial data structures for shaped items and the grids that hold them
//!
//! This module contains:
//! - Footprints and per-item placement state
//! - Cells, layouts and the cached layout metrics
//! - The single-row and coordinate grid variants and their registry

/// Two-dimensional board with polyomino collision
pub mod board;
/// Cell coordinates, colors and per-cell visual state
pub mod cell;
/// Item occupancy footprints
pub mod footprint;
/// Grid identity, shared frame and the sealed grid variant set
pub mod grid;
/// Item instances and their visual state
pub mod item;
/// Nominal cell layout and the layout metric cache
pub mod layout;
/// Per-item placement record and revert snapshot
pub mod placement;
/// Registry of live grids and pointer hit testing
pub mod registry;
/// Single-row staging grid
pub mod staging;

pub use grid::{Grid, GridId, GridKind, GridTag};
