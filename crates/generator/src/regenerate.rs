//! Single-page regeneration for the dev server.

use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::Result;
use crate::navigation::Navigation;
use crate::paths::{
    HTML_EXTENSION, INDEX_FILE, is_directory_request, is_hidden, is_index, request_path,
};
use crate::{Generator, write_page};

impl Generator {
    /// Rebuild the page behind a request path from current sources.
    ///
    /// Only the page's own source directory is read. Paths ending in `/` or
    /// without an extension are directory requests for `<path>/index.html`. Returns the
    /// fresh HTML after writing it to the output tree, or `None` when the
    /// request is not a generated page (hidden names, non-HTML files, copied
    /// files, unknown sources) and static serving should handle it.
    ///
    /// Every call converts again; nothing is cached.
    pub fn regenerate(&self, request: &str) -> Result<Option<String>> {
        let relative = request_path(request);
        if relative.iter().any(is_hidden) {
            debug!(request, "Ignoring hidden path");
            return Ok(None);
        }

        let target = if is_directory_request(request) || relative.extension().is_none() {
            relative.join(INDEX_FILE)
        } else {
            relative
        };
        if target.extension() != Some(OsStr::new(HTML_EXTENSION)) {
            return Ok(None);
        }

        let dest = self.output_dir().join(&target);
        let Some(source_dir) = dest
            .parent()
            .and_then(|dir| self.resolver().to_source_dir(dir))
        else {
            return Ok(None);
        };
        if !source_dir.is_dir()
            || self.is_excluded_dir(&source_dir)
            || self.is_linked_dir(&source_dir)
        {
            return Ok(None);
        }

        let listing = self.list_directory(&source_dir)?;

        // the full walk converts in name order, so the last matching source wins there too
        let source = listing
            .content
            .iter()
            .rev()
            .find(|entry| entry.dest == dest)
            .map(|entry| entry.source.as_path());

        let context =
            Navigation::new(self.resolver()).context(&dest, &listing.pages, &listing.children);

        let html = match source {
            Some(source) => match self.converters.convert(source, &context, &self.theme)? {
                Some(html) => html,
                None => return Ok(None),
            },
            None if listing.verbatim.iter().any(|entry| entry.dest == dest) => return Ok(None),
            None if is_index(&dest) => self.theme.render_empty(&context)?,
            None => return Ok(None),
        };

        write_page(&dest, &html)?;
        info!(path = %target.display(), "Regenerated");
        Ok(Some(html))
    }

    /// Source file served as-is for a request, without a full build.
    ///
    /// Only files a full build would copy verbatim qualify: visible,
    /// not convertible, outside the output directory and not reached
    /// through a symlinked directory.
    pub fn resource_path(&self, request: &str) -> Option<PathBuf> {
        if is_directory_request(request) {
            return None;
        }
        let relative = request_path(request);
        if relative.as_os_str().is_empty() || relative.iter().any(is_hidden) {
            return None;
        }

        let source = self.source_dir().join(&relative);
        let dir = source.parent()?;
        if !source.is_file()
            || self.converters.is_convertible(&source)
            || self.is_excluded_dir(dir)
            || self.is_linked_dir(dir)
        {
            return None;
        }
        Some(source)
    }
}
