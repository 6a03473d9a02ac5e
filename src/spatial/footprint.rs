//! Item occupancy footprints over a rectangular bounding box
//!
//! A footprint is a row-major bitmap (origin top-left) describing which cells
//! of an item's bounding box are solid. Width and height are public because
//! authoring tools edit them independently of the mask; every read and write
//! re-validates the mask length, and a missing or mis-sized mask reads as a
//! solid rectangle.

use bitvec::prelude::*;
use std::fmt;

use crate::io::error::{Result, invalid_footprint};

/// Occupancy bitmap for a multi-cell item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Footprint {
    /// Bounding box width in cells (values below 1 read as 1)
    pub width: usize,
    /// Bounding box height in cells (values below 1 read as 1)
    pub height: usize,
    mask: Option<BitVec>,
}

impl Default for Footprint {
    fn default() -> Self {
        Self::rectangle(1, 1)
    }
}

impl Footprint {
    /// Solid rectangle with no authored mask
    pub const fn rectangle(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            mask: None,
        }
    }

    /// Parse authored rows such as `["#.", "##"]`
    ///
    /// `#`, `X`, `x` and `1` mark solid cells; `.`, `_`, `0` and spaces mark
    /// empty ones. All rows must have the same width.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows, a row is empty, row widths differ,
    /// or a row contains an unrecognized glyph.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(invalid_footprint(0, &"footprint has no rows"));
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(invalid_footprint(0, &"footprint row is empty"));
        }

        let mut mask = BitVec::with_capacity(width * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(invalid_footprint(
                    row_index,
                    &format!("expected {width} cells, found {}", row.chars().count()),
                ));
            }
            for glyph in row.chars() {
                let filled = match glyph {
                    '#' | 'X' | 'x' | '1' => true,
                    '.' | '_' | '0' | ' ' => false,
                    other => {
                        return Err(invalid_footprint(
                            row_index,
                            &format!("unrecognized glyph '{other}'"),
                        ));
                    }
                };
                mask.push(filled);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            mask: Some(mask),
        })
    }

    /// Effective `(width, height)`, each clamped to at least one cell
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width.max(1), self.height.max(1))
    }

    /// Number of cells in the bounding box
    pub fn cell_count(&self) -> usize {
        let (width, height) = self.dimensions();
        width * height
    }

    /// True when an authored mask exists and matches the bounding box
    pub fn has_valid_mask(&self) -> bool {
        self.mask
            .as_ref()
            .is_some_and(|mask| mask.len() == self.cell_count())
    }

    /// Whether the local cell `(x, y)` is solid
    ///
    /// Cells outside the bounding box are never solid. Without a valid mask
    /// every in-box cell is solid.
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        let Some(index) = self.index_of(x, y) else {
            return false;
        };
        if !self.has_valid_mask() {
            return true;
        }
        self.mask
            .as_ref()
            .and_then(|mask| mask.get(index).as_deref().copied())
            .unwrap_or(true)
    }

    /// Set a local cell, allocating or resizing the mask first
    ///
    /// Out-of-range writes are ignored.
    pub fn set_filled(&mut self, x: i32, y: i32, value: bool) {
        self.ensure_mask(true);
        let Some(index) = self.index_of(x, y) else {
            return;
        };
        if let Some(mask) = self.mask.as_mut() {
            mask.set(index, value);
        }
    }

    /// Set every cell of the bounding box
    pub fn fill_all(&mut self, value: bool) {
        self.ensure_mask(true);
        if let Some(mask) = self.mask.as_mut() {
            mask.fill(value);
        }
    }

    /// Reinitialize the bounding box to a new size with every cell solid
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.mask = Some(bitvec![1; self.width * self.height]);
    }

    /// Drop the authored mask so the footprint reads as a solid rectangle
    pub fn make_rect(&mut self) {
        self.mask = None;
    }

    /// Copy of the authored mask, if one is valid
    pub fn mask_copy(&self) -> Option<BitVec> {
        if self.has_valid_mask() {
            self.mask.clone()
        } else {
            None
        }
    }

    /// Iterate solid local cells in row-major order
    pub fn filled_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (width, height) = self.dimensions();
        (0..height as i32).flat_map(move |y| {
            (0..width as i32).filter_map(move |x| self.is_filled(x, y).then_some((x, y)))
        })
    }

    /// Number of solid cells
    pub fn filled_count(&self) -> usize {
        self.filled_cells().count()
    }

    // Re-validates the clamped dimensions, then allocates a mask sized to them
    fn ensure_mask(&mut self, default_fill: bool) {
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        let expected = self.width * self.height;
        if self.mask.as_ref().is_none_or(|mask| mask.len() != expected) {
            self.mask = Some(if default_fill {
                bitvec![1; expected]
            } else {
                bitvec![0; expected]
            });
        }
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let (width, height) = self.dimensions();
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < width && y < height).then_some(y * width + x)
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        for y in 0..height as i32 {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..width as i32 {
                write!(f, "{}", if self.is_filled(x, y) { '#' } else { '.' })?;
            }
        }
        Ok(())
    }
}
