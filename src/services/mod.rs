//! Collaborators the grids and the drag controller depend on

/// Item kinds, footprints and leveled stats
pub mod catalog;
/// Publish/subscribe channel for grid events
pub mod events;
/// Keyed object pools with bounded growth
pub mod pool;
/// Deferred, cancellable tasks keyed to elapsed time
pub mod scheduler;
