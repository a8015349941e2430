pub mod config;
pub mod generate;
pub mod init;
pub mod serve;
pub mod theme;

use anyhow::{Context, Result};
use mvw_core::{MARKER_DIR, WikiConfig, find_root, load_config};
use std::path::{Path, PathBuf};

/// Wiki root for `start`, or where one would be created there.
///
/// Outside any wiki the start directory acts as the source with every
/// setting at its default.
pub fn wiki_root(start: &Path) -> PathBuf {
    find_root(start).unwrap_or_else(|| start.join(MARKER_DIR))
}

/// Load the configuration of the wiki `start` belongs to
pub fn load_wiki(start: &Path) -> Result<WikiConfig> {
    let root = wiki_root(start);
    load_config(&root).with_context(|| format!("Failed to load configuration from {}", root.display()))
}
