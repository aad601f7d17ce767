//! Presentation layer: command dispatch and terminal output.

/// Command runner.
pub mod app;
/// Plain text tables.
pub mod output;

pub use app::App;
