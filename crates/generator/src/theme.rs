//! Theme templates and static assets.
//!
//! A theme directory holds `template/` (minijinja templates) and `public/`
//! (copied verbatim into the output root). Either part falls back to the
//! built-in theme when missing.

use minijinja::{Environment, path_loader};
use mvw_core::{DEFAULT_THEME, MarkdownExtension, WikiConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::convert::Metadata;
use crate::error::{GenerateError, Result};
use crate::navigation::NavContext;

const DEFAULT_TEMPLATE: &str = include_str!("../theme/template/default.html");
const DEFAULT_STYLESHEET: &str = include_str!("../theme/public/css/style.css");

/// Files of the built-in theme, relative to a theme directory
pub const DEFAULT_THEME_FILES: &[(&str, &str)] = &[
    ("template/default.html", DEFAULT_TEMPLATE),
    ("public/css/style.css", DEFAULT_STYLESHEET),
];

/// Everything a template can see
#[derive(Serialize)]
struct RenderContext<'a> {
    #[serde(flatten)]
    nav: &'a NavContext,
    content: &'a str,
    meta: BTreeMap<String, String>,
    meta_lists: &'a BTreeMap<String, Vec<String>>,
    site_root: &'a str,
}

pub struct Theme {
    env: Environment<'static>,
    public_dir: Option<PathBuf>,
    config: WikiConfig,
}

impl Theme {
    /// Load the theme configured for a wiki.
    ///
    /// Fails when the template for the default theme cannot be found, since
    /// every synthesized index page needs it.
    pub fn load(config: &WikiConfig) -> Result<Self> {
        let mut env = Environment::new();

        let template_dir = config.template_dir();
        if template_dir.is_dir() {
            debug!(dir = %template_dir.display(), "Using theme templates");
            env.set_loader(path_loader(template_dir));
        } else {
            debug!("Using built-in templates");
            env.add_template("default.html", DEFAULT_TEMPLATE)?;
        }

        env.get_template(&config.content_template(DEFAULT_THEME))?;

        let public_dir = config.public_dir();
        let public_dir = public_dir.is_dir().then_some(public_dir);

        Ok(Self {
            env,
            public_dir,
            config: config.clone(),
        })
    }

    /// Render page content with the template of the named theme
    pub fn render(
        &self,
        theme: &str,
        nav: &NavContext,
        content: &str,
        meta: &Metadata,
    ) -> Result<String> {
        let template = self.env.get_template(&self.config.content_template(theme))?;
        let context = RenderContext {
            nav,
            content,
            meta: meta.joined(),
            meta_lists: meta.lists(),
            site_root: &self.config.site_root,
        };
        Ok(template.render(&context)?)
    }

    /// Render a page that has no source, such as a synthesized directory index
    pub fn render_empty(&self, nav: &NavContext) -> Result<String> {
        self.render(DEFAULT_THEME, nav, "", &Metadata::default())
    }

    pub fn markdown_extensions(&self, theme: &str) -> Vec<MarkdownExtension> {
        self.config.markdown_extensions(theme)
    }

    /// Copy the theme's public assets into the output root.
    ///
    /// Returns the number of files written.
    pub fn install_public(&self, output_root: &Path) -> Result<usize> {
        match &self.public_dir {
            Some(public_dir) => copy_tree(public_dir, output_root),
            None => write_files(output_root, "public/"),
        }
    }
}

/// Write the built-in theme into `theme_dir` so it can be customized.
///
/// Returns the number of files written.
pub fn install_default_theme(theme_dir: &Path) -> Result<usize> {
    write_files(theme_dir, "")
}

/// Write the built-in files under `prefix`, with the prefix stripped
fn write_files(dest: &Path, prefix: &str) -> Result<usize> {
    let mut written = 0;
    for (name, content) in DEFAULT_THEME_FILES {
        let Some(relative) = name.strip_prefix(prefix) else {
            continue;
        };
        let path = dest.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(GenerateError::io(parent))?;
        }
        fs::write(&path, content).map_err(GenerateError::io(&path))?;
        written += 1;
    }
    Ok(written)
}

/// Copy a directory tree verbatim. A missing source copies nothing.
pub(crate) fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(GenerateError::io(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(GenerateError::io(entry.path()))?;
            copied += 1;
        }
    }
    Ok(copied)
}
