//! Full site generation.

use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{GenerateError, Result};
use crate::navigation::Navigation;
use crate::{Generator, write_page};

/// What a full build produced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages converted from sources
    pub pages: usize,
    /// Directory indexes synthesized without a source
    pub indexes: usize,
    /// Source files copied verbatim
    pub copied: usize,
    /// Theme assets installed
    pub assets: usize,
    /// Source directories mirrored
    pub directories: usize,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages, {} generated indexes, {} copied files, {} theme assets across {} directories",
            self.pages, self.indexes, self.copied, self.assets, self.directories
        )
    }
}

impl Generator {
    /// Rebuild the whole site from scratch.
    ///
    /// Deletes the output directory, installs the theme's public assets, then
    /// walks the source tree top-down. Afterwards every visible source
    /// directory has exactly one `index.html` and every visible source file
    /// exactly one output file. A missing source directory produces just the
    /// theme assets. Any filesystem error aborts the build.
    pub fn generate(&self) -> Result<BuildReport> {
        let output = self.output_dir();
        let source = self.source_dir();
        info!(source = %source.display(), output = %output.display(), "Generating site");

        if output.exists() {
            fs::remove_dir_all(output).map_err(GenerateError::io(output))?;
        }

        let mut report = BuildReport {
            assets: self.install_assets()?,
            ..BuildReport::default()
        };

        if source.is_dir() {
            self.generate_dir(source, &mut report)?;
        } else {
            warn!(source = %source.display(), "Source directory does not exist");
        }

        info!(%report, "Site generated");
        Ok(report)
    }

    /// Create the output directory and install the theme's public assets.
    ///
    /// Returns the number of asset files written. Existing output is kept,
    /// so this also prepares a site that is generated page by page.
    pub fn install_assets(&self) -> Result<usize> {
        let output = self.output_dir();
        fs::create_dir_all(output).map_err(GenerateError::io(output))?;
        self.theme.install_public(output)
    }

    fn generate_dir(&self, source_dir: &Path, report: &mut BuildReport) -> Result<()> {
        let listing = self.list_directory(source_dir)?;
        let dest_dir = &listing.dest_dir;
        debug!(dir = %dest_dir.display(), "Generating directory");

        fs::create_dir_all(dest_dir).map_err(GenerateError::io(dest_dir))?;

        // a leftover index must not stop this directory from getting a fresh one
        let index = listing.index_path();
        if index.is_file() {
            fs::remove_file(&index).map_err(GenerateError::io(&index))?;
        }

        for entry in &listing.verbatim {
            fs::copy(&entry.source, &entry.dest).map_err(GenerateError::io(&entry.source))?;
            report.copied += 1;
        }

        let nav = Navigation::new(self.resolver());
        for entry in &listing.content {
            let context = nav.context(&entry.dest, &listing.pages, &listing.children);
            if let Some(html) = self.converters.convert(&entry.source, &context, &self.theme)? {
                write_page(&entry.dest, &html)?;
                report.pages += 1;
            }
        }

        if !index.is_file() {
            let context = nav.context(&index, &listing.pages, &listing.children);
            let html = self.theme.render_empty(&context)?;
            write_page(&index, &html)?;
            report.indexes += 1;
        }

        report.directories += 1;

        for subdir in &listing.subdirs {
            self.generate_dir(subdir, report)?;
        }

        Ok(())
    }
}
