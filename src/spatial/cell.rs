//! Addressable grid slots and their preview coloring

use serde::Deserialize;
use std::fmt;
use std::ops::{Add, Sub};

use crate::math::geometry::RectTransform;
use crate::spatial::grid::GridId;

/// Logical cell coordinate; column `x`, row `y`, origin top-left
///
/// Signed so that anchors partially outside a grid remain representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column index
    pub x: i32,
    /// Row index
    pub y: i32,
}

impl CellCoord {
    /// Origin cell
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for CellCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for CellCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Linear RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    #[serde(default = "opaque")]
    pub a: f32,
}

const fn opaque() -> f32 {
    1.0
}

impl Color {
    /// Opaque color from RGB components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Quantize to 8-bit RGBA
    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }
}

/// Colors used while previewing a placement
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreviewPalette {
    /// Fully in bounds and free
    pub valid: Color,
    /// Free cell of a footprint that overhangs the grid
    pub blocked: Color,
    /// Colliding cell, or any cell of a fully in-bounds colliding footprint
    pub invalid: Color,
}

impl Default for PreviewPalette {
    fn default() -> Self {
        Self {
            valid: Color::rgb(0.2, 0.9, 0.2),
            blocked: Color::rgb(0.95, 0.85, 0.2),
            invalid: Color::rgb(0.95, 0.25, 0.25),
        }
    }
}

/// A single visual grid slot
///
/// Knows its owning grid and logical coordinate. Preview coloring captures the
/// pre-existing base color on first use so it can be restored later. Nothing
/// here touches occupancy.
#[derive(Debug, Clone)]
pub struct GridCell {
    grid: Option<GridId>,
    coordinate: CellCoord,
    color: Color,
    base_color: Option<Color>,
    /// Rendered rect in canvas space
    pub rect: RectTransform,
}

impl GridCell {
    /// Unbound cell with an initial color and rendered rect
    pub const fn new(color: Color, rect: RectTransform) -> Self {
        Self {
            grid: None,
            coordinate: CellCoord::ZERO,
            color,
            base_color: None,
            rect,
        }
    }

    /// Associate the cell with its grid and logical coordinate
    pub const fn bind(&mut self, grid: GridId, coordinate: CellCoord) {
        self.grid = Some(grid);
        self.coordinate = coordinate;
    }

    /// Owning grid, if bound
    pub const fn grid(&self) -> Option<GridId> {
        self.grid
    }

    /// Logical coordinate inside the owning grid
    pub const fn coordinate(&self) -> CellCoord {
        self.coordinate
    }

    /// Currently displayed color
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Base color captured by the first [`GridCell::set_color`], if any
    pub const fn base_color(&self) -> Option<Color> {
        self.base_color
    }

    /// Overwrite the displayed color, capturing the base color once
    pub const fn set_color(&mut self, color: Color) {
        if self.base_color.is_none() {
            self.base_color = Some(self.color);
        }
        self.color = color;
    }

    /// Restore the captured base color; no-op if never colored
    pub const fn reset_color(&mut self) {
        if let Some(base) = self.base_color {
            self.color = base;
        }
    }
}
