//! Error types for configuration, catalog and export operations
//!
//! Placement outcomes are deliberately not errors: out-of-bounds or colliding
//! placements return `false` and the caller takes its fallback path. The
//! variants here cover the failures that abort an operation outright.

use std::fmt;
use std::path::PathBuf;

/// Main error type for all fallible crate operations
#[derive(Debug)]
pub enum SlotGridError {
    /// Failed to read a configuration file from disk
    ConfigRead {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected schema
    ConfigParse {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying TOML decoding error
        source: toml::de::Error,
    },

    /// A configuration value failed validation
    InvalidConfiguration {
        /// Dotted name of the offending field
        field: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Authored footprint rows could not be parsed
    InvalidFootprint {
        /// Zero-based row where parsing failed
        row: usize,
        /// Description of the problem
        reason: String,
    },

    /// Item kind is not present in the catalog
    UnknownItemKind {
        /// The requested kind
        kind: u16,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to encode or save an exported image
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image error
        source: image::ImageError,
    },
}

impl fmt::Display for SlotGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigRead { path, source } => {
                write!(
                    f,
                    "Failed to read configuration '{}': {source}",
                    path.display()
                )
            }
            Self::ConfigParse { path, source } => {
                write!(
                    f,
                    "Failed to parse configuration '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidConfiguration {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid configuration '{field}' = '{value}': {reason}")
            }
            Self::InvalidFootprint { row, reason } => {
                write!(f, "Invalid footprint at row {row}: {reason}")
            }
            Self::UnknownItemKind { kind } => {
                write!(f, "Item kind {kind} is not in the catalog")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SlotGridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigRead { source, .. } | Self::FileSystem { source, .. } => Some(source),
            Self::ConfigParse { source, .. } => Some(source),
            Self::ImageExport { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for crate results
pub type Result<T> = std::result::Result<T, SlotGridError>;

impl From<std::io::Error> for SlotGridError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid configuration error
pub fn invalid_configuration(
    field: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SlotGridError {
    SlotGridError::InvalidConfiguration {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a footprint parsing error
pub fn invalid_footprint(row: usize, reason: &impl ToString) -> SlotGridError {
    SlotGridError::InvalidFootprint {
        row,
        reason: reason.to_string(),
    }
}
