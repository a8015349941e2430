use anyhow::{Context, Result, bail};
use mvw_core::config::DEFAULT_CONFIG_TOML;
use mvw_core::{CONFIG_FILE, find_root};
use std::fs;
use std::path::{Path, PathBuf};

use super::init::init;

/// Write the commented default `mvw.toml`, initializing the wiki first
/// when needed.
pub async fn run(start: PathBuf) -> Result<()> {
    let path = write_default_config(&start)?;

    println!("✓ Wrote configuration: {}", path.display());
    println!("  Every setting is commented out; uncomment what you want to change.");
    Ok(())
}

pub fn write_default_config(start: &Path) -> Result<PathBuf> {
    let root = match find_root(start) {
        Some(root) => root,
        None => init(start)?,
    };

    let path = root.join(CONFIG_FILE);
    if path.exists() {
        bail!("Will not overwrite existing configuration: {}", path.display());
    }

    fs::write(&path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvw_core::{MARKER_DIR, load_config};
    use tempfile::TempDir;

    #[test]
    fn test_writes_config_and_inits() {
        let dir = TempDir::new().unwrap();
        let path = write_default_config(dir.path()).unwrap();

        assert_eq!(path, dir.path().join(MARKER_DIR).join(CONFIG_FILE));
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_TOML);

        let config = load_config(dir.path().join(MARKER_DIR)).unwrap();
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = write_default_config(dir.path()).unwrap();
        fs::write(&path, "port = 9000\n").unwrap();

        assert!(write_default_config(dir.path()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "port = 9000\n");
    }
}
