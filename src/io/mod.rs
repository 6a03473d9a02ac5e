/// Command-line interface and simulation driver
pub mod cli;
/// Engine constants and TOML session configuration
pub mod configuration;
/// Error types and result alias
pub mod error;
/// PNG export of board snapshots
pub mod image;
/// Progress bars for simulation rounds
pub mod progress;
