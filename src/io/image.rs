//! PNG snapshot of a board's occupancy
//!
//! Each cell becomes a square block; occupied cells take a color derived from
//! the occupant's kind, empty cells the background. A one-pixel gutter keeps
//! neighbouring cells apart.

use std::fs;
use std::path::Path;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::io::error::{Result, SlotGridError};
use crate::services::catalog::ItemKind;
use crate::spatial::board::CoordinateGrid;
use crate::spatial::cell::CellCoord;
use crate::spatial::item::ItemLookup;

const BACKGROUND: Rgba<u8> = Rgba([38, 38, 46, 255]);
const GUTTER: Rgba<u8> = Rgba([18, 18, 22, 255]);
const UNKNOWN_OCCUPANT: Rgba<u8> = Rgba([255, 0, 255, 255]);

const KIND_COLORS: [[u8; 4]; 8] = [
    [230, 90, 80, 255],
    [90, 170, 230, 255],
    [240, 200, 70, 255],
    [110, 200, 120, 255],
    [180, 120, 220, 255],
    [240, 140, 60, 255],
    [80, 210, 200, 255],
    [210, 210, 210, 255],
];

/// Stable display color for an item kind
pub fn kind_color(kind: ItemKind) -> Rgba<u8> {
    let index = usize::from(kind.0) % KIND_COLORS.len();
    Rgba(KIND_COLORS.get(index).copied().unwrap_or([255, 255, 255, 255]))
}

/// Rasterize the board, `cell_pixels` pixels per cell edge (at least 2)
pub fn render_board(board: &CoordinateGrid, items: &dyn ItemLookup, cell_pixels: u32) -> RgbaImage {
    let cell_pixels = cell_pixels.max(2);
    let width = board.columns() as u32 * cell_pixels;
    let height = board.rows() as u32 * cell_pixels;

    ImageBuffer::from_fn(width, height, |x, y| {
        let local_x = x % cell_pixels;
        let local_y = y % cell_pixels;
        if local_x == cell_pixels - 1 || local_y == cell_pixels - 1 {
            return GUTTER;
        }
        let cell = CellCoord::new((x / cell_pixels) as i32, (y / cell_pixels) as i32);
        board.occupant(cell).map_or(BACKGROUND, |id| {
            items
                .item(id)
                .map_or(UNKNOWN_OCCUPANT, |item| kind_color(item.kind()))
        })
    })
}

/// Write the board snapshot to `output_path`, creating parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or saved to the specified path
pub fn export_board_as_png(
    board: &CoordinateGrid,
    items: &dyn ItemLookup,
    cell_pixels: u32,
    output_path: &Path,
) -> Result<()> {
    let img = render_board(board, items, cell_pixels);

    if let Some(parent) = output_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SlotGridError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source,
        })?;
    }

    img.save(output_path)
        .map_err(|source| SlotGridError::ImageExport {
            path: output_path.to_path_buf(),
            source,
        })?;

    Ok(())
}
