//! Tests for the per-item placement record and revert snapshots

#[cfg(test)]
mod tests {
    use slotgrid::spatial::cell::CellCoord;
    use slotgrid::spatial::grid::GridId;
    use slotgrid::spatial::item::Parent;
    use slotgrid::spatial::placement::{ItemPlacement, Placement, RevertSnapshot};

    // Tests that placed is derived from the current grid
    // Verified by storing a separate placed flag
    #[test]
    fn test_set_current() {
        let mut placement = ItemPlacement::new((1, 1));
        assert!(!placement.is_placed());
        assert_eq!(placement.current_anchor(), CellCoord::ZERO);

        placement.set_current(GridId(1), CellCoord::new(2, 3));
        assert!(placement.is_placed());
        assert_eq!(placement.current_grid(), Some(GridId(1)));
        assert_eq!(
            placement.current(),
            Some(Placement {
                grid: GridId(1),
                anchor: CellCoord::new(2, 3),
            })
        );
    }

    // Tests that a stale grid cannot unplace an item held elsewhere
    // Verified by ignoring the grid argument in clear_current
    #[test]
    fn test_clear_current_checks_grid() {
        let mut placement = ItemPlacement::new((1, 1));
        placement.set_current(GridId(1), CellCoord::new(0, 0));
        assert!(!placement.clear_current(Some(GridId(2))));
        assert!(placement.is_placed());
        assert!(placement.clear_current(Some(GridId(1))));
        assert!(!placement.is_placed());
        assert!(!placement.clear_current(None));

        placement.set_current(GridId(4), CellCoord::new(0, 0));
        assert!(placement.clear_current(None));
    }

    // Tests that the drag snapshot records grid, anchor and parent
    // Verified by snapshotting after clearing the current placement
    #[test]
    fn test_begin_drag_snapshot() {
        let mut placement = ItemPlacement::new((2, 2));
        placement.set_current(GridId(3), CellCoord::new(4, 1));
        let vacate = placement.begin_drag(Parent::ItemsRoot(GridId(3)));
        assert_eq!(vacate.map(|current| current.grid), Some(GridId(3)));
        assert_eq!(
            placement.revert(),
            Some(RevertSnapshot {
                grid: Some(GridId(3)),
                anchor: CellCoord::new(4, 1),
                parent: Parent::ItemsRoot(GridId(3)),
            })
        );
        assert_eq!(placement.revert_grid(), Some(GridId(3)));
    }

    // Tests that a drag from nowhere snapshots no grid
    // Verified by defaulting the snapshot grid to GridId(0)
    #[test]
    fn test_begin_drag_unplaced() {
        let mut placement = ItemPlacement::new((1, 1));
        assert!(placement.begin_drag(Parent::Canvas).is_none());
        assert!(placement.revert().is_some_and(|snapshot| snapshot.grid.is_none()));
        assert!(placement.revert_grid().is_none());
    }

    // Tests reset clears both the placement and the snapshot
    // Verified by keeping the snapshot across reset
    #[test]
    fn test_reset() {
        let mut placement = ItemPlacement::new((1, 1));
        placement.set_current(GridId(1), CellCoord::new(0, 0));
        placement.begin_drag(Parent::Canvas);
        placement.reset();
        assert!(!placement.is_placed());
        assert!(placement.revert().is_none());
        placement.set_dimensions((3, 1));
        assert_eq!(placement.dimensions(), (3, 1));
    }
}
