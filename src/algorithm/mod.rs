/// Scripted pointer input for headless sessions
pub mod bot;
/// Drag gesture state machine and drop resolution
pub mod drag;
/// Transfer counting and batch respawn
pub mod respawn;
/// Application wiring of grids, pools, events and timers
pub mod session;
