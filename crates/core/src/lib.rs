//! SwellScope core library
//!
//! Shared pieces for the service binary:
//! - Configuration file discovery and loading (XDG-compliant)
//! - File system utilities

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{create_dir_all, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "swellscope";

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 9600;

/// Default local hour (site timezone) at which the daily collection runs
pub const DEFAULT_COLLECT_HOUR: u8 = 6;
