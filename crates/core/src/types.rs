use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the theme used when a page does not select one.
pub const DEFAULT_THEME: &str = "default";

/// Fully resolved wiki configuration.
///
/// All directories are absolute and normalized. Built from `mvw.toml` (or
/// defaults when the file is absent) by [`crate::config::load_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// The `.mvw` marker directory everything else is relative to
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub theme_dir: PathBuf,
    /// Prefix for every generated link, always starts and ends with `/`
    pub site_root: String,
    /// Link text for the site root. Derived from the source directory name when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breadcrumb_home: Option<String>,
    pub port: u16,
    /// Render recognized source code files as highlighted pages
    pub highlight_source: bool,
    /// Display title overrides keyed by lowercased name
    pub titles: BTreeMap<String, String>,
    pub themes: BTreeMap<String, ThemeSettings>,
}

impl WikiConfig {
    /// Template file used for a theme's content pages.
    pub fn content_template(&self, theme: &str) -> String {
        self.themes
            .get(theme)
            .and_then(|t| t.content_template.clone())
            .unwrap_or_else(|| format!("{}.html", theme))
    }

    /// Markdown extensions enabled for a theme.
    pub fn markdown_extensions(&self, theme: &str) -> Vec<MarkdownExtension> {
        self.themes
            .get(theme)
            .and_then(|t| t.markdown_extensions.clone())
            .unwrap_or_else(|| vec![MarkdownExtension::Tables, MarkdownExtension::Footnotes])
    }

    /// Directory holding the theme's templates
    pub fn template_dir(&self) -> PathBuf {
        self.theme_dir.join("template")
    }

    /// Directory holding the theme's static assets
    pub fn public_dir(&self) -> PathBuf {
        self.theme_dir.join("public")
    }
}

/// Per-theme overrides from `[themes.<name>]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_extensions: Option<Vec<MarkdownExtension>>,
}

/// Optional Markdown syntax a theme can switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownExtension {
    Tables,
    Footnotes,
    Strikethrough,
    Tasklists,
    SmartPunctuation,
    HeadingAttributes,
    Math,
}
