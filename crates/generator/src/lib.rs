//! Wiki site generation.
//!
//! [`Generator::generate`] rebuilds the whole output tree from the source
//! tree. [`Generator::regenerate`] rebuilds the single page behind a request
//! path, reading only that page's directory, so edits show up without a
//! full build.

pub mod convert;
pub mod error;
pub mod listing;
pub mod navigation;
pub mod paths;
pub mod regenerate;
pub mod theme;
pub mod walker;

pub use convert::{Converter, ConverterRegistry, Metadata};
pub use error::{GenerateError, Result};
pub use navigation::{NavContext, Navigation, Page};
pub use paths::{PathResolver, TitleFormatter};
pub use theme::Theme;
pub use walker::BuildReport;

use mvw_core::{Error as CoreError, WikiConfig};
use std::fs;
use std::path::Path;

use crate::paths::title_formatter_with_overrides;

/// Overrides for the pieces a wiki can customize
#[derive(Default)]
pub struct GeneratorOptions {
    /// Replaces the configured title formatting
    pub title_formatter: Option<TitleFormatter>,
    /// Replaces the converters derived from the configuration
    pub converters: Option<ConverterRegistry>,
}

/// Builds a wiki's site, in full or one page at a time.
pub struct Generator {
    config: WikiConfig,
    resolver: PathResolver,
    theme: Theme,
    converters: ConverterRegistry,
}

impl Generator {
    pub fn new(config: WikiConfig) -> Result<Self> {
        Self::with_options(config, GeneratorOptions::default())
    }

    /// Build a generator, loading the theme.
    ///
    /// Fails when the theme templates are missing or when the source tree
    /// lives inside the output tree, which every full build deletes.
    pub fn with_options(config: WikiConfig, options: GeneratorOptions) -> Result<Self> {
        if config.source_dir.starts_with(&config.output_dir) {
            return Err(CoreError::InvalidData(format!(
                "source_dir '{}' is inside output_dir '{}'",
                config.source_dir.display(),
                config.output_dir.display()
            ))
            .into());
        }

        let formatter = options
            .title_formatter
            .unwrap_or_else(|| title_formatter_with_overrides(config.titles.clone()));
        let resolver = PathResolver::new(
            config.source_dir.clone(),
            config.output_dir.clone(),
            config.site_root.clone(),
            config.breadcrumb_home.clone(),
            formatter,
        );
        let theme = Theme::load(&config)?;
        let converters = options
            .converters
            .unwrap_or_else(|| ConverterRegistry::for_config(&config));

        Ok(Self {
            config,
            resolver,
            theme,
            converters,
        })
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn output_dir(&self) -> &Path {
        self.resolver.output_root()
    }

    pub fn source_dir(&self) -> &Path {
        self.resolver.source_root()
    }

    /// Directories inside the source tree that are never part of the site
    pub(crate) fn is_excluded_dir(&self, dir: &Path) -> bool {
        dir.starts_with(&self.config.output_dir)
    }

    /// Whether reaching `dir` from the source root passes through a symlink.
    /// The full walk never enters linked directories.
    pub(crate) fn is_linked_dir(&self, dir: &Path) -> bool {
        let Ok(relative) = dir.strip_prefix(self.source_dir()) else {
            return false;
        };
        let mut current = self.source_dir().to_path_buf();
        relative.components().any(|component| {
            current.push(component);
            fs::symlink_metadata(&current).is_ok_and(|meta| meta.file_type().is_symlink())
        })
    }
}

/// Write a generated page, creating its directory when needed
pub(crate) fn write_page(dest: &Path, html: &str) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(GenerateError::io(parent))?;
    }
    fs::write(dest, html).map_err(GenerateError::io(dest))
}
