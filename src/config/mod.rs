//! Configuration module for the expense tracker
//!
//! This module provides configuration management including:
//! - Platform path resolution with an environment override
//! - Settings persistence

pub mod paths;
pub mod settings;

pub use paths::TrackerPaths;
pub use settings::Settings;
