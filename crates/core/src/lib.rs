pub mod config;
pub mod error;
pub mod types;

pub use config::{CONFIG_FILE, MARKER_DIR, find_root, load_config, parse_config_str};
pub use error::{Error, Result};
pub use types::*;
