//! Coordinate geometry shared by grids and the drag controller

/// Vectors, rect transforms, cameras and screen-space conversions
pub mod geometry;
