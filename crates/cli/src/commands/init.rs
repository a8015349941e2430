use anyhow::{Context, Result, bail};
use mvw_core::{MARKER_DIR, find_root};
use std::fs;
use std::path::{Path, PathBuf};

/// Initialize a wiki in `start`.
///
/// Creates the `.mvw` marker directory. Every setting keeps its default
/// until `mvw config` writes an `mvw.toml`.
pub async fn run(start: PathBuf) -> Result<()> {
    let root = init(&start)?;

    println!("✓ Initialized wiki: {}", root.display());
    println!("\nNext steps:");
    println!("  1. Add Markdown pages to {}", start.display());
    println!("  2. Customize settings: mvw config");
    println!("  3. Preview: mvw serve");
    Ok(())
}

/// Create the marker directory, refusing to nest inside an existing wiki
pub fn init(start: &Path) -> Result<PathBuf> {
    if let Some(root) = find_root(start) {
        bail!("Cannot init within existing wiki: {}", root.display());
    }

    let root = start.join(MARKER_DIR);
    fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create {}", root.display()))?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_marker() {
        let dir = TempDir::new().unwrap();
        let root = init(dir.path()).unwrap();
        assert_eq!(root, dir.path().join(MARKER_DIR));
        assert!(root.is_dir());
    }

    #[test]
    fn test_init_inside_existing_wiki_fails() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();
        let nested = dir.path().join("notes");
        fs::create_dir(&nested).unwrap();

        let err = init(&nested).unwrap_err();
        assert!(err.to_string().contains("Cannot init within existing wiki"));
        assert!(!nested.join(MARKER_DIR).exists());

        assert!(init(dir.path()).is_err());
    }
}
