//! Tests for the coordinate board: footprint placement, previews and layout

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use slotgrid::math::geometry::{OverlayCamera, RectTransform, Vec2};
    use slotgrid::services::catalog::ItemKind;
    use slotgrid::services::events::{EventBus, GridEvent};
    use slotgrid::services::pool::InstanceId;
    use slotgrid::spatial::board::CoordinateGrid;
    use slotgrid::spatial::cell::{CellCoord, PreviewPalette};
    use slotgrid::spatial::footprint::Footprint;
    use slotgrid::spatial::grid::{GridFrame, GridId, GridTag};
    use slotgrid::spatial::item::{Item, ItemId, Parent};
    use slotgrid::spatial::layout::LayoutSpec;

    const BOARD: GridId = GridId(0);

    fn board(columns: usize, rows: usize) -> CoordinateGrid {
        let frame = GridFrame::fitted(
            BOARD,
            GridTag::PlayerInventory,
            Vec2::ZERO,
            LayoutSpec::default(),
            columns,
            rows,
        );
        CoordinateGrid::new(frame, columns, rows)
    }

    fn l_shape(id: u32) -> Item {
        let Ok(footprint) = Footprint::from_rows(&["#.", "##"]) else {
            unreachable!("L shape parses");
        };
        Item::new(InstanceId(id), ItemKind(4), footprint)
    }

    fn block(id: u32, width: usize, height: usize) -> Item {
        Item::new(InstanceId(id), ItemKind(1), Footprint::rectangle(width, height))
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    // Tests that only solid footprint cells are claimed
    // Verified by claiming the whole bounding box
    #[test]
    fn test_l_shape_leaves_gap_free() {
        let mut grid = board(5, 5);
        let mut bus = EventBus::new();
        let mut bow = l_shape(0);
        assert!(grid.try_place(&mut bow, CellCoord::new(2, 2), &mut bus));

        for cell in [CellCoord::new(2, 2), CellCoord::new(2, 3), CellCoord::new(3, 3)] {
            assert_eq!(grid.occupant(cell), Some(bow.id()));
        }
        assert_eq!(grid.occupant(CellCoord::new(3, 2)), None);
        assert_eq!(grid.occupied_cell_count(), 3);
        assert_eq!(grid.unique_item_count(), 1);

        let mut dagger = block(1, 1, 1);
        assert!(grid.try_place(&mut dagger, CellCoord::new(3, 2), &mut bus));
        assert_eq!(grid.unique_item_count(), 2);
        assert_eq!(grid.items(), vec![bow.id(), dagger.id()]);
    }

    // Tests bounds checks on the full bounding box
    // Verified by checking only solid cells against the bounds
    #[test]
    fn test_out_of_bounds_rejected() {
        let mut grid = board(3, 3);
        let mut bus = EventBus::new();
        let mut square = block(0, 2, 2);
        assert!(!grid.try_place(&mut square, CellCoord::new(2, 0), &mut bus));
        assert!(!grid.try_place(&mut square, CellCoord::new(0, 2), &mut bus));
        assert!(!grid.try_place(&mut square, CellCoord::new(-1, 0), &mut bus));
        assert_eq!(grid.occupied_cell_count(), 0);
        assert_eq!(bus.pending_len(), 0);
        assert!(grid.try_place(&mut square, CellCoord::new(1, 1), &mut bus));
    }

    // Tests that a colliding placement leaves occupancy untouched
    // Verified by writing cells while validating
    #[test]
    fn test_try_place_is_all_or_nothing() {
        let mut grid = board(4, 4);
        let mut bus = EventBus::new();
        let mut dagger = block(0, 1, 1);
        let mut square = block(1, 2, 2);
        assert!(grid.try_place(&mut dagger, CellCoord::new(1, 1), &mut bus));
        let before = grid.occupancy().clone();

        for anchor in [CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(0, 1)] {
            assert!(!grid.try_place(&mut square, anchor, &mut bus));
            assert_eq!(grid.occupancy(), &before);
        }
        assert!(!square.is_placed());
    }

    // Tests that every free in-bounds anchor accepts a single cell
    // Verified by off-by-one in the right-edge bounds check
    #[test]
    fn test_try_place_succeeds_iff_free_and_in_bounds() {
        let mut grid = board(3, 2);
        let mut bus = EventBus::new();
        let mut blocker = block(100, 1, 1);
        assert!(grid.try_place(&mut blocker, CellCoord::new(1, 0), &mut bus));

        for y in -1..3 {
            for x in -1..4 {
                let anchor = CellCoord::new(x, y);
                let mut candidate = block(0, 1, 1);
                let expected = grid.in_bounds(anchor) && grid.occupant(anchor).is_none();
                let placed = grid.try_place(&mut candidate, anchor, &mut bus);
                assert_eq!(placed, expected, "anchor {anchor}");
                if placed {
                    grid.remove(&mut candidate, &mut bus);
                }
            }
        }
    }

    // Tests removal scans the whole board and is idempotent
    // Verified by clearing only the anchor cell
    #[test]
    fn test_remove_is_idempotent() {
        let mut grid = board(5, 5);
        let mut bus = EventBus::new();
        let mut bow = l_shape(0);
        assert!(grid.try_place(&mut bow, CellCoord::new(0, 0), &mut bus));
        bus.drain();

        grid.remove(&mut bow, &mut bus);
        grid.remove(&mut bow, &mut bus);
        assert_eq!(grid.occupied_cell_count(), 0);
        assert_eq!(
            bus.drain(),
            vec![GridEvent::ItemRemoved {
                grid: BOARD,
                item: bow.id(),
            }]
        );
    }

    // Tests the valid and invalid tiers when fully inside the board
    // Verified by coloring only the colliding cell invalid
    #[test]
    fn test_preview_inside_board() {
        let mut grid = board(4, 4);
        let mut bus = EventBus::new();
        let palette = PreviewPalette::default();
        let mut dagger = block(0, 1, 1);
        let square = block(1, 2, 2);

        grid.preview_placement(&square, CellCoord::new(2, 2));
        assert_eq!(grid.preview_cells().len(), 4);
        assert!(grid
            .preview_cells()
            .iter()
            .all(|&coord| grid.cell(coord).is_some_and(|cell| cell.color() == palette.valid)));

        assert!(grid.try_place(&mut dagger, CellCoord::new(1, 1), &mut bus));
        grid.preview_placement(&square, CellCoord::new(0, 0));
        assert_eq!(grid.preview_cells().len(), 4);
        assert!(grid
            .preview_cells()
            .iter()
            .all(|&coord| grid.cell(coord).is_some_and(|cell| cell.color() == palette.invalid)));
        assert!(grid
            .cell(CellCoord::new(2, 2))
            .is_some_and(|cell| cell.color() == grid.frame().base_color));
    }

    // Tests that an overhanging preview uses blocked and invalid only
    // Verified by coloring overhanging free cells valid
    #[test]
    fn test_preview_partial_overlap() {
        let mut grid = board(3, 3);
        let mut bus = EventBus::new();
        let palette = PreviewPalette::default();
        let square = block(1, 2, 2);

        grid.preview_placement(&square, CellCoord::new(2, 2));
        assert_eq!(grid.preview_cells(), &[CellCoord::new(2, 2)]);
        assert!(grid
            .cell(CellCoord::new(2, 2))
            .is_some_and(|cell| cell.color() == palette.blocked));

        let mut dagger = block(0, 1, 1);
        assert!(grid.try_place(&mut dagger, CellCoord::new(2, 1), &mut bus));
        grid.preview_placement(&square, CellCoord::new(2, 1));
        assert_eq!(grid.preview_cells().len(), 2);
        assert!(grid
            .cell(CellCoord::new(2, 1))
            .is_some_and(|cell| cell.color() == palette.invalid));
        assert!(grid
            .cell(CellCoord::new(2, 2))
            .is_some_and(|cell| cell.color() == palette.blocked));
        assert!(grid.preview_cells().iter().all(|&coord| grid
            .cell(coord)
            .is_some_and(|cell| cell.color() != palette.valid)));

        grid.clear_preview();
        assert!(grid.preview_cells().is_empty());
    }

    // Tests that placed items span their bounding box from the anchor corner
    // Verified by centering board items like staging items
    #[test]
    fn test_item_visual_spans_footprint() {
        let mut grid = board(5, 5);
        let mut bus = EventBus::new();
        let mut square = block(0, 2, 2);
        assert!(grid.try_place(&mut square, CellCoord::new(1, 2), &mut bus));
        assert_eq!(square.visual.parent, Parent::ItemsRoot(BOARD));
        assert!(close(square.visual.rect.top_left(), Vec2::new(100.0, 200.0)));
        assert!(close(square.visual.rect.size, Vec2::new(200.0, 200.0)));
        assert!(close(grid.drag_size_for(&square), Vec2::new(200.0, 200.0)));
    }

    // Tests pointer mapping and the out-of-rect guard
    // Verified by skipping the rect containment check
    #[test]
    fn test_screen_point_to_cell() {
        let mut grid = board(10, 5);
        let camera = OverlayCamera;
        assert_eq!(
            grid.screen_point_to_cell(Vec2::new(250.0, 150.0), &camera),
            Some(CellCoord::new(2, 1))
        );
        assert_eq!(
            grid.screen_point_to_cell(Vec2::new(999.0, 499.0), &camera),
            Some(CellCoord::new(9, 4))
        );
        assert!(grid
            .screen_point_to_cell(Vec2::new(1000.0, 100.0), &camera)
            .is_none());
    }

    // Tests that rendered cell rects feed the metric cache
    // Verified by never invalidating on apply_rendered_cell_rect
    #[test]
    fn test_rendered_layout_invalidates_cache() {
        let mut grid = board(3, 3);
        assert!(grid.layout_metrics().is_some_and(|metrics| close(metrics.step, Vec2::new(100.0, 100.0))));
        assert!(grid.layout_metrics().is_some());
        assert_eq!(grid.layout_cache().stats.misses, 1);
        assert_eq!(grid.layout_cache().stats.hits, 1);

        let shifted = RectTransform::from_top_left(Vec2::new(110.0, 0.0), Vec2::new(100.0, 100.0));
        assert!(grid.apply_rendered_cell_rect(CellCoord::new(1, 0), shifted));
        assert!(grid.layout_cache().is_dirty());
        assert!(grid.layout_metrics().is_some_and(|metrics| close(metrics.step, Vec2::new(110.0, 100.0))));
        assert!(!grid.apply_rendered_cell_rect(CellCoord::new(7, 7), shifted));
    }

    // Tests that only rect size changes invalidate the cache
    // Verified by invalidating on every set_rect
    #[test]
    fn test_set_rect_invalidation() {
        let mut grid = board(2, 2);
        assert!(grid.layout_metrics().is_some());
        let mut rect = grid.frame().rect;
        rect.position = Vec2::new(50.0, 50.0);
        grid.set_rect(rect);
        assert!(!grid.layout_cache().is_dirty());

        rect.size = Vec2::new(300.0, 300.0);
        grid.set_rect(rect);
        assert!(grid.layout_cache().is_dirty());
    }

    // Tests resize evicts every item and clamps dimensions
    // Verified by keeping the old occupancy on resize
    #[test]
    fn test_resize_evicts() {
        let mut grid = board(3, 3);
        let mut bus = EventBus::new();
        let mut items: BTreeMap<ItemId, Item> = BTreeMap::new();
        let mut bow = l_shape(0);
        assert!(grid.try_place(&mut bow, CellCoord::new(0, 0), &mut bus));
        items.insert(bow.id(), bow);

        grid.resize(0, 4, &mut items, &mut bus);
        assert_eq!((grid.columns(), grid.rows()), (1, 4));
        assert_eq!(grid.occupied_cell_count(), 0);
        assert!(items.values().all(|item| !item.is_placed() && item.visual.parent == Parent::Canvas));
        assert_eq!(grid.first_empty_cell(), Some(CellCoord::new(0, 0)));
    }

    // Tests the row-major scan for the first free cell
    // Verified by scanning columns before rows
    #[test]
    fn test_first_empty_cell_row_major() {
        let mut grid = board(2, 2);
        let mut bus = EventBus::new();
        let mut top = block(0, 2, 1);
        assert!(grid.try_place(&mut top, CellCoord::new(0, 0), &mut bus));
        assert_eq!(grid.first_empty_cell(), Some(CellCoord::new(0, 1)));
        let mut bottom = block(1, 2, 1);
        assert!(grid.try_place(&mut bottom, CellCoord::new(0, 1), &mut bus));
        assert_eq!(grid.first_empty_cell(), None);
    }
}
