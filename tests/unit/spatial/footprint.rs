//! Tests for footprint parsing, mask validation and solid-cell iteration

#[cfg(test)]
mod tests {
    use slotgrid::SlotGridError;
    use slotgrid::spatial::footprint::Footprint;

    // Tests that an L shape keeps its empty corner
    // Verified by treating '.' as solid
    #[test]
    fn test_from_rows_l_shape() {
        let Ok(footprint) = Footprint::from_rows(&["#.", "##"]) else {
            unreachable!("L shape parses");
        };
        assert_eq!(footprint.dimensions(), (2, 2));
        assert!(footprint.is_filled(0, 0));
        assert!(!footprint.is_filled(1, 0));
        assert!(footprint.is_filled(0, 1));
        assert!(footprint.is_filled(1, 1));
        assert_eq!(footprint.filled_count(), 3);
        assert_eq!(
            footprint.filled_cells().collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (1, 1)]
        );
    }

    // Tests rejection of ragged rows and unknown glyphs
    // Verified by skipping the width check
    #[test]
    fn test_from_rows_rejects_malformed_input() {
        assert!(matches!(
            Footprint::from_rows(&["##", "#"]),
            Err(SlotGridError::InvalidFootprint { row: 1, .. })
        ));
        assert!(matches!(
            Footprint::from_rows(&["#?"]),
            Err(SlotGridError::InvalidFootprint { row: 0, .. })
        ));
        let empty: [&str; 0] = [];
        assert!(Footprint::from_rows(&empty).is_err());
    }

    // Tests that zero dimensions read as one cell
    // Verified by removing the clamp in dimensions
    #[test]
    fn test_zero_dimensions_clamp_to_one() {
        let footprint = Footprint::rectangle(0, 0);
        assert_eq!(footprint.dimensions(), (1, 1));
        assert_eq!(footprint.cell_count(), 1);
        assert!(footprint.is_filled(0, 0));
    }

    // Tests the solid fallback when the mask does not match the box
    // Verified by indexing the stale mask directly
    #[test]
    fn test_mismatched_mask_reads_solid() {
        let Ok(mut footprint) = Footprint::from_rows(&["#.", ".#"]) else {
            unreachable!("diagonal parses");
        };
        assert!(!footprint.is_filled(1, 0));
        footprint.width = 3;
        assert!(!footprint.has_valid_mask());
        assert!(footprint.is_filled(1, 0));
        assert!(footprint.mask_copy().is_none());
        assert_eq!(footprint.filled_count(), 6);
    }

    // Tests writes through set_filled and out-of-range guards
    // Verified by dropping the bounds check in index_of
    #[test]
    fn test_set_filled_and_bounds() {
        let mut footprint = Footprint::rectangle(2, 2);
        footprint.set_filled(1, 1, false);
        footprint.set_filled(5, 5, false);
        assert!(!footprint.is_filled(1, 1));
        assert!(!footprint.is_filled(-1, 0));
        assert!(!footprint.is_filled(2, 0));
        assert_eq!(footprint.filled_count(), 3);
    }

    // Tests resize, fill_all and make_rect
    // Verified by leaving the old mask in place on resize
    #[test]
    fn test_resize_and_make_rect() {
        let mut footprint = Footprint::rectangle(1, 1);
        footprint.resize(3, 2);
        assert_eq!(footprint.filled_count(), 6);
        footprint.fill_all(false);
        assert_eq!(footprint.filled_count(), 0);
        footprint.make_rect();
        assert_eq!(footprint.filled_count(), 6);
    }

    // Tests the text rendering matches the authored rows
    // Verified by swapping glyphs in Display
    #[test]
    fn test_display_round_trip() {
        let Ok(footprint) = Footprint::from_rows(&["#.", "##"]) else {
            unreachable!("L shape parses");
        };
        assert_eq!(footprint.to_string(), "#.\n##");
    }
}
