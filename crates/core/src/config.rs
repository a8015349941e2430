use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the directory marking the top of a wiki
pub const MARKER_DIR: &str = ".mvw";

/// Configuration file inside the marker directory
pub const CONFIG_FILE: &str = "mvw.toml";

/// Commented configuration written by `mvw config`
pub const DEFAULT_CONFIG_TOML: &str = r#"# mvw configuration
#
# Every key is optional. Directories are relative to the .mvw directory
# unless absolute; `~` and environment variables are expanded.

# Directory holding the wiki pages
#source_dir = ".."

# Directory the static site is generated into
#output_dir = "site"

# Theme directory. The built-in theme is used when it does not exist.
# Run `mvw theme` to copy the built-in theme here for customization.
#theme_dir = "theme"

# Prefix for generated links. Only applies to `mvw generate`;
# `mvw serve` always serves from /.
#site_root = "/"

# Link text for the site root in breadcrumbs.
# Defaults to a title made from the source directory name.
#breadcrumb_home = "Home"

# Port used by `mvw serve`
#port = 8000

# Render source code files (.rs, .py, ...) as highlighted pages
#highlight_source = false

# Display titles for names that title-casing gets wrong
#[titles]
#faq = "FAQ"
#mvw = "MVW"

# Themes are selected per page with a `theme: <name>` metadata line.
# `content_template` defaults to <name>.html in the theme's template directory.
# `markdown_extensions` may list: tables, footnotes, strikethrough, tasklists,
# smart_punctuation, heading_attributes, math
#[themes.default]
#content_template = "default.html"
#markdown_extensions = ["tables", "footnotes"]
"#;

/// Raw TOML configuration structure
/// This matches the mvw.toml file structure exactly
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    source_dir: Option<String>,
    output_dir: Option<String>,
    theme_dir: Option<String>,
    site_root: Option<String>,
    breadcrumb_home: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    highlight_source: bool,
    #[serde(default)]
    titles: BTreeMap<String, String>,
    #[serde(default)]
    themes: BTreeMap<String, ThemeSettings>,
}

/// Find the wiki root by looking for a `.mvw` directory in `start` or any
/// of its ancestors.
pub fn find_root<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .map(|dir| dir.join(MARKER_DIR))
        .find(|candidate| candidate.is_dir())
}

/// Load the configuration for a wiki root.
///
/// Reads `mvw.toml` from the root when present, otherwise every setting
/// takes its default. The root itself does not need to exist.
pub fn load_config<P: AsRef<Path>>(root: P) -> Result<WikiConfig> {
    let root = root.as_ref();
    let config_path = root.join(CONFIG_FILE);
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path)?;
        parse_config_str(&content, root)
    } else {
        parse_config_str("", root)
    }
}

/// Parse mvw.toml from a string (useful for testing)
pub fn parse_config_str(content: &str, root: &Path) -> Result<WikiConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let root = normalize_path(&std::path::absolute(root)?);

    let source_dir = resolve_dir(raw.source_dir.as_deref().unwrap_or(".."), &root, "source_dir")?;
    let output_dir = resolve_dir(raw.output_dir.as_deref().unwrap_or("site"), &root, "output_dir")?;
    let theme_dir = resolve_dir(raw.theme_dir.as_deref().unwrap_or("theme"), &root, "theme_dir")?;

    if output_dir == source_dir {
        return Err(Error::ConfigParse(format!(
            "output_dir must differ from source_dir: '{}'",
            output_dir.display()
        )));
    }

    let breadcrumb_home = raw
        .breadcrumb_home
        .map(|home| home.trim().to_string())
        .filter(|home| !home.is_empty());

    let titles = raw
        .titles
        .into_iter()
        .map(|(name, title)| (name.to_lowercase(), title))
        .collect();

    Ok(WikiConfig {
        root,
        source_dir,
        output_dir,
        theme_dir,
        site_root: normalize_site_root(raw.site_root.as_deref().unwrap_or("/")),
        breadcrumb_home,
        port: raw.port.unwrap_or(8000),
        highlight_source: raw.highlight_source,
        titles,
        themes: raw.themes,
    })
}

/// Expand and resolve a configured directory against the wiki root.
///
/// Absolute paths are kept, relative ones are joined onto `root`. The
/// result is lexically normalized so prefix comparisons are reliable.
fn resolve_dir(path_str: &str, root: &Path, field_name: &str) -> Result<PathBuf> {
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    let expanded = shellexpand::full(path_str).map_err(|e| {
        Error::ConfigParse(format!("Cannot expand '{}' in '{}': {}", path_str, field_name, e))
    })?;

    let path = Path::new(expanded.as_ref());
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    Ok(normalize_path(&joined))
}

/// Lexically normalize a path, folding `.` and `..` components.
///
/// Never touches the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Make sure a site root starts and ends with exactly one `/`
fn normalize_site_root(site_root: &str) -> String {
    let trimmed = site_root.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = parse_config_str("", Path::new("/wiki/.mvw")).unwrap();
        assert_eq!(config.root, PathBuf::from("/wiki/.mvw"));
        assert_eq!(config.source_dir, PathBuf::from("/wiki"));
        assert_eq!(config.output_dir, PathBuf::from("/wiki/.mvw/site"));
        assert_eq!(config.theme_dir, PathBuf::from("/wiki/.mvw/theme"));
        assert_eq!(config.site_root, "/");
        assert!(config.breadcrumb_home.is_none());
        assert_eq!(config.port, 8000);
        assert!(!config.highlight_source);
        assert!(config.themes.is_empty());
        assert!(config.titles.is_empty());
    }

    #[test]
    fn test_absolute_and_relative_dirs() {
        let toml = r#"
source_dir = "/srv/notes"
output_dir = "../public_html"
theme_dir = "./themes/dark"
"#;
        let config = parse_config_str(toml, Path::new("/wiki/.mvw")).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/srv/notes"));
        assert_eq!(config.output_dir, PathBuf::from("/wiki/public_html"));
        assert_eq!(config.theme_dir, PathBuf::from("/wiki/.mvw/themes/dark"));
        assert_eq!(config.template_dir(), PathBuf::from("/wiki/.mvw/themes/dark/template"));
        assert_eq!(config.public_dir(), PathBuf::from("/wiki/.mvw/themes/dark/public"));
    }

    #[test]
    fn test_site_root_normalized() {
        assert_eq!(normalize_site_root("/"), "/");
        assert_eq!(normalize_site_root(""), "/");
        assert_eq!(normalize_site_root("wiki"), "/wiki/");
        assert_eq!(normalize_site_root("/wiki"), "/wiki/");
        assert_eq!(normalize_site_root("/docs/wiki/"), "/docs/wiki/");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("/a/./b/.")), PathBuf::from("/a/b"));
        assert_eq!(normalize_path(Path::new("/a/.mvw/..")), PathBuf::from("/a"));
    }

    #[test]
    fn test_theme_settings() {
        let toml = r#"
[themes.default]
markdown_extensions = ["tables", "strikethrough", "smart_punctuation"]

[themes.slides]
content_template = "presentation.html"
"#;
        let config = parse_config_str(toml, Path::new("/wiki/.mvw")).unwrap();
        assert_eq!(config.content_template("default"), "default.html");
        assert_eq!(config.content_template("slides"), "presentation.html");
        assert_eq!(config.content_template("plain"), "plain.html");
        assert_eq!(
            config.markdown_extensions("default"),
            vec![
                MarkdownExtension::Tables,
                MarkdownExtension::Strikethrough,
                MarkdownExtension::SmartPunctuation
            ]
        );
        assert_eq!(
            config.markdown_extensions("slides"),
            vec![MarkdownExtension::Tables, MarkdownExtension::Footnotes]
        );
    }

    #[test]
    fn test_unknown_markdown_extension_rejected() {
        let toml = r#"
[themes.default]
markdown_extensions = ["codehilite"]
"#;
        let result = parse_config_str(toml, Path::new("/wiki/.mvw"));
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = parse_config_str("sourcedir = \"..\"", Path::new("/wiki/.mvw"));
        assert!(result.is_err());
    }

    #[test]
    fn test_titles_lowercased_and_home_trimmed() {
        let toml = r#"
breadcrumb_home = "  My Wiki "

[titles]
FAQ = "FAQ"
"#;
        let config = parse_config_str(toml, Path::new("/wiki/.mvw")).unwrap();
        assert_eq!(config.breadcrumb_home.as_deref(), Some("My Wiki"));
        assert_eq!(config.titles.get("faq").map(String::as_str), Some("FAQ"));
    }

    #[test]
    fn test_empty_dir_rejected() {
        let result = parse_config_str("output_dir = \"  \"", Path::new("/wiki/.mvw"));
        assert!(result.unwrap_err().to_string().contains("output_dir"));
    }

    #[test]
    fn test_output_equal_to_source_rejected() {
        let result = parse_config_str("output_dir = \"..\"", Path::new("/wiki/.mvw"));
        assert!(result.unwrap_err().to_string().contains("must differ"));
    }

    #[test]
    fn test_default_config_template_parses() {
        let config = parse_config_str(DEFAULT_CONFIG_TOML, Path::new("/wiki/.mvw")).unwrap();
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_find_root_searches_ancestors() {
        let dir = TempDir::new().unwrap();
        let child = dir.path().join("notes").join("deep");
        fs::create_dir_all(&child).unwrap();

        assert!(find_root(&child).is_none());

        fs::create_dir(dir.path().join(MARKER_DIR)).unwrap();
        assert_eq!(find_root(&child), Some(dir.path().join(MARKER_DIR)));
        assert_eq!(find_root(dir.path()), Some(dir.path().join(MARKER_DIR)));
    }

    #[test]
    fn test_load_config_reads_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(MARKER_DIR);
        fs::create_dir(&root).unwrap();

        let config = load_config(&root).unwrap();
        assert_eq!(config.port, 8000);

        fs::write(root.join(CONFIG_FILE), "port = 9001\nsite_root = \"wiki\"").unwrap();
        let config = load_config(&root).unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.site_root, "/wiki/");
    }
}
