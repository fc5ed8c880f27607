//! Core application functionality
//!
//! This module contains everything around the pipeline itself:
//! - Error taxonomy
//! - CLI parsing and the settings file
//! - Resolving and prompting for configuration
//! - Process exit handling

pub mod cli;
pub mod config;
pub mod config_file;
pub mod errors;
pub mod platform;
pub mod prompt;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config_file::ConfigFile;
pub use errors::{PipelineError, PipelineResult, Stage};
