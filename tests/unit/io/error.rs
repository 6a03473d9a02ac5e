//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use slotgrid::SlotGridError;
    use slotgrid::io::error::{invalid_configuration, invalid_footprint};
    use std::error::Error;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = SlotGridError::FileSystem {
            path: "/tmp/board.png".into(),
            operation: "create directory",
            source: io_error,
        };
        assert!(error.source().is_some());
        assert!(error.to_string().contains("create directory"));
        assert!(error.to_string().contains("/tmp/board.png"));
    }

    // Tests that domain errors carry no source
    // Verified by returning a source for every variant
    #[test]
    fn test_domain_errors_have_no_source() {
        let error = SlotGridError::UnknownItemKind { kind: 12 };
        assert!(error.source().is_none());
        assert!(error.to_string().contains("12"));
        assert!(invalid_footprint(2, &"bad glyph").source().is_none());
    }

    // Tests invalid configuration messages name the field and value
    // Verified by omitting value from message
    #[test]
    fn test_invalid_configuration_message() {
        let error = invalid_configuration("respawn.threshold", &0, &"must be at least 1");
        let message = error.to_string();
        assert!(message.contains("respawn.threshold"));
        assert!(message.contains("'0'"));
        assert!(message.contains("must be at least 1"));
    }

    // Tests footprint errors report the failing row
    // Verified by formatting the row zero-based as one-based
    #[test]
    fn test_invalid_footprint_message() {
        let message = invalid_footprint(3, &"ragged row").to_string();
        assert!(message.contains("row 3"));
        assert!(message.contains("ragged row"));
    }

    // Tests conversion from a bare I/O error
    // Verified by mapping to a different variant
    #[test]
    fn test_from_io_error() {
        let error = SlotGridError::from(std::io::Error::other("disk full"));
        assert!(matches!(error, SlotGridError::FileSystem { operation: "unknown", .. }));
    }
}
