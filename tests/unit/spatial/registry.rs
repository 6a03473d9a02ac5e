//! Tests for grid registration, tag lookup and pointer hit testing

#[cfg(test)]
mod tests {
    use slotgrid::math::geometry::{OrthoCamera, OverlayCamera, Vec2};
    use slotgrid::spatial::board::CoordinateGrid;
    use slotgrid::spatial::grid::{GridFrame, GridId, GridTag};
    use slotgrid::spatial::layout::LayoutSpec;
    use slotgrid::spatial::registry::GridRegistry;
    use slotgrid::spatial::staging::SingleRowGrid;

    fn board_at(id: GridId, tag: GridTag, top_left: Vec2, z_index: i32) -> CoordinateGrid {
        let frame = GridFrame::fitted(id, tag, top_left, LayoutSpec::default(), 3, 3)
            .with_z_index(z_index);
        CoordinateGrid::new(frame, 3, 3)
    }

    // Tests registration order, id reservation and tag lookup
    // Verified by indexing GridTag::None
    #[test]
    fn test_register_and_lookup() {
        let mut registry = GridRegistry::new();
        assert!(registry.is_empty());
        let board_id = registry.next_id();
        let row_id = registry.next_id();
        assert_ne!(board_id, row_id);

        registry.register(board_at(board_id, GridTag::PlayerInventory, Vec2::ZERO, 0));
        let row_frame = GridFrame::fitted(
            row_id,
            GridTag::PossibleItems,
            Vec2::new(0.0, 400.0),
            LayoutSpec::default(),
            3,
            1,
        );
        registry.register(SingleRowGrid::new(row_frame, 3));
        let loose = registry.next_id();
        registry.register(board_at(loose, GridTag::None, Vec2::new(900.0, 0.0), 0));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.id_for_tag(GridTag::PlayerInventory), Some(board_id));
        assert_eq!(registry.id_for_tag(GridTag::PossibleItems), Some(row_id));
        assert_eq!(registry.id_for_tag(GridTag::None), None);
        assert!(registry.by_tag(GridTag::PossibleItems).is_some_and(|grid| grid.id() == row_id));
        assert_eq!(
            registry.iter().map(|grid| grid.id()).collect::<Vec<_>>(),
            vec![board_id, row_id, loose]
        );
    }

    // Tests that the newest grid wins a tag collision
    // Verified by keeping the first tag entry
    #[test]
    fn test_tag_collision_last_wins() {
        let mut registry = GridRegistry::new();
        registry.register(board_at(GridId(0), GridTag::PlayerInventory, Vec2::ZERO, 0));
        registry.register(board_at(GridId(1), GridTag::PlayerInventory, Vec2::ZERO, 0));
        assert_eq!(registry.id_for_tag(GridTag::PlayerInventory), Some(GridId(1)));

        assert!(registry.unregister(GridId(0)).is_some());
        assert_eq!(registry.id_for_tag(GridTag::PlayerInventory), Some(GridId(1)));
        assert!(registry.unregister(GridId(1)).is_some());
        assert_eq!(registry.id_for_tag(GridTag::PlayerInventory), None);
        assert!(registry.unregister(GridId(1)).is_none());
    }

    // Tests that re-registering an id replaces the grid in place
    // Verified by appending a duplicate entry
    #[test]
    fn test_reregister_replaces() {
        let mut registry = GridRegistry::new();
        registry.register(board_at(GridId(4), GridTag::PlayerInventory, Vec2::ZERO, 0));
        registry.register(board_at(GridId(4), GridTag::None, Vec2::ZERO, 3));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(GridId(4)).is_some_and(|grid| grid.z_index() == 3));
        assert_eq!(registry.id_for_tag(GridTag::PlayerInventory), None);
        assert_eq!(registry.next_id(), GridId(5));
    }

    // Tests that the highest z_index wins among overlapping grids
    // Verified by returning the first containing grid
    #[test]
    fn test_hit_test_prefers_higher_z() {
        let mut registry = GridRegistry::new();
        registry.register(board_at(GridId(0), GridTag::None, Vec2::ZERO, 0));
        registry.register(board_at(GridId(1), GridTag::None, Vec2::new(100.0, 100.0), 5));
        let camera = OverlayCamera;

        assert_eq!(
            registry.find_grid_under_pointer(Vec2::new(150.0, 150.0), &camera),
            Some(GridId(1))
        );
        assert_eq!(
            registry.find_grid_under_pointer(Vec2::new(50.0, 50.0), &camera),
            Some(GridId(0))
        );
        assert_eq!(
            registry.find_grid_under_pointer(Vec2::new(1000.0, 1000.0), &camera),
            None
        );
    }

    // Tests that equal z_index resolves to the earliest registration
    // Verified by using >= in the comparison
    #[test]
    fn test_hit_test_tie_goes_to_first_registered() {
        let mut registry = GridRegistry::new();
        registry.register(board_at(GridId(3), GridTag::None, Vec2::ZERO, 1));
        registry.register(board_at(GridId(2), GridTag::None, Vec2::new(50.0, 50.0), 1));
        let camera = OverlayCamera;
        assert_eq!(
            registry.find_grid_under_pointer(Vec2::new(120.0, 120.0), &camera),
            Some(GridId(3))
        );
    }

    // Tests hit testing through a scaled camera and a degenerate one
    // Verified by hit testing in screen space directly
    #[test]
    fn test_hit_test_through_camera() {
        let mut registry = GridRegistry::new();
        registry.register(board_at(GridId(0), GridTag::None, Vec2::ZERO, 0));
        let zoomed = OrthoCamera {
            offset: Vec2::new(10.0, 10.0),
            scale: 0.5,
        };
        assert_eq!(
            registry.find_grid_under_pointer(Vec2::new(155.0, 155.0), &zoomed),
            Some(GridId(0))
        );
        assert_eq!(
            registry.find_grid_under_pointer(Vec2::new(165.0, 20.0), &zoomed),
            None
        );
        let broken = OrthoCamera {
            offset: Vec2::ZERO,
            scale: 0.0,
        };
        assert_eq!(
            registry.find_grid_under_pointer(Vec2::new(5.0, 5.0), &broken),
            None
        );
    }
}
