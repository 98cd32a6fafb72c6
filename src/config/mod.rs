//! Configuration module
//!
//! Settings file handling and API base-URL resolution.

pub mod config;

pub use config::Config;
