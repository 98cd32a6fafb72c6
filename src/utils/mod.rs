//! Utility functions and helpers
//!
//! Application paths and the logging setup shared by the TUI and the
//! one-shot commands.

pub mod app_paths;
pub mod dual_logging;
pub mod logging;
