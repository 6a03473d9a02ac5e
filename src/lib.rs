//! Placement engine for drag-and-drop inventory grids
//!
//! Shaped items live in one of two grid topologies: a single-row staging grid
//! and a two-dimensional board. The engine validates placements against
//! per-item footprints, previews drops while dragging, and counts transfers
//! from the staging row to the board to trigger batched respawns.

#![forbid(unsafe_code)]

/// Drag controller, respawn policy, session wiring and scripted input
pub mod algorithm;
/// Input/output operations, configuration and error handling
pub mod io;
/// Screen, canvas and local coordinate geometry
pub mod math;
/// Event bus, object pools, item catalog and deferred tasks
pub mod services;
/// Footprints, cells, layouts and the grid variants
pub mod spatial;

pub use io::error::{Result, SlotGridError};
