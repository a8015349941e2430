use anyhow::{Context, Result, bail};
use mvw_core::{find_root, load_config};
use mvw_generator::theme::install_default_theme;
use std::path::{Path, PathBuf};

use super::init::init;

/// Copy the built-in theme into the configured theme directory
pub async fn run(start: PathBuf) -> Result<()> {
    let (theme_dir, written) = install_theme(&start)?;

    println!("✓ Installed theme: {}", theme_dir.display());
    println!("  {} files written", written);
    println!("\nEdit template/default.html and public/css/style.css to restyle the wiki.");
    Ok(())
}

pub fn install_theme(start: &Path) -> Result<(PathBuf, usize)> {
    let root = match find_root(start) {
        Some(root) => root,
        None => init(start)?,
    };
    let config = load_config(&root)
        .with_context(|| format!("Failed to load configuration from {}", root.display()))?;

    let theme_dir = config.theme_dir;
    if theme_dir.exists() {
        bail!("Will not overwrite existing theme directory: {}", theme_dir.display());
    }

    let written = install_default_theme(&theme_dir)
        .with_context(|| format!("Failed to install theme into {}", theme_dir.display()))?;
    Ok((theme_dir, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvw_core::MARKER_DIR;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_installs_into_default_theme_dir() {
        let dir = TempDir::new().unwrap();
        let (theme_dir, written) = install_theme(dir.path()).unwrap();

        assert_eq!(theme_dir, dir.path().join(MARKER_DIR).join("theme"));
        assert_eq!(written, 2);
        assert!(theme_dir.join("template/default.html").is_file());
        assert!(theme_dir.join("public/css/style.css").is_file());
    }

    #[test]
    fn test_honors_configured_theme_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(MARKER_DIR);
        fs::create_dir(&root).unwrap();
        fs::write(root.join("mvw.toml"), "theme_dir = \"../my_theme\"\n").unwrap();

        let (theme_dir, _) = install_theme(dir.path()).unwrap();
        assert_eq!(theme_dir, dir.path().join("my_theme"));
    }

    #[test]
    fn test_refuses_existing_theme_dir() {
        let dir = TempDir::new().unwrap();
        install_theme(dir.path()).unwrap();
        let err = install_theme(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Will not overwrite"));
    }
}
