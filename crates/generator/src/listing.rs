//! One directory's worth of sources, classified.
//!
//! Both the full walk and single-page regeneration list a directory through
//! here, so a page sees the same navigation whichever way it was built.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::Generator;
use crate::error::{GenerateError, Result};
use crate::navigation::{Navigation, Page};
use crate::paths::{HTML_EXTENSION, INDEX_FILE, is_hidden};

/// A source file and where it lands in the output tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub source: PathBuf,
    pub dest: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DirectoryListing {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Sources a converter accepts, in file name order
    pub content: Vec<SourceEntry>,
    /// Sources copied byte for byte
    pub verbatim: Vec<SourceEntry>,
    /// Visible subdirectories
    pub subdirs: Vec<PathBuf>,
    /// Every `.html` destination in the directory, converted or copied
    pub pages: Vec<Page>,
    /// Index pages of the subdirectories
    pub children: Vec<Page>,
}

impl DirectoryListing {
    pub fn index_path(&self) -> PathBuf {
        self.dest_dir.join(INDEX_FILE)
    }
}

impl Generator {
    /// List a source directory's visible entries.
    ///
    /// Hidden names, the output directory and symlinked directories are
    /// skipped. Symlinked files count as regular files. Entries come back in
    /// file name order, which keeps builds reproducible.
    pub fn list_directory(&self, source_dir: &Path) -> Result<DirectoryListing> {
        let resolver = self.resolver();
        let dest_dir = resolver
            .to_destination(source_dir, false)
            .ok_or_else(|| GenerateError::OutsideSource(source_dir.to_path_buf()))?;

        let mut content = Vec::new();
        let mut verbatim = Vec::new();
        let mut subdirs = Vec::new();

        for entry in WalkDir::new(source_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if is_hidden(entry.file_name()) {
                continue;
            }

            let path = entry.path();
            let is_dir = if entry.path_is_symlink() {
                // linked files count as files, linked directories are never walked
                match fs::metadata(path) {
                    Ok(meta) if meta.is_dir() => {
                        debug!(path = %path.display(), "Skipping symlinked directory");
                        continue;
                    }
                    Ok(_) => false,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "Skipping dangling symlink");
                        continue;
                    }
                }
            } else {
                entry.file_type().is_dir()
            };

            if is_dir {
                if !self.is_excluded_dir(path) {
                    subdirs.push(path.to_path_buf());
                }
                continue;
            }

            let convertible = self.converters.is_convertible(path);
            let Some(dest) = resolver.to_destination(path, convertible) else {
                continue;
            };
            let source_entry = SourceEntry {
                source: path.to_path_buf(),
                dest,
            };
            if convertible {
                content.push(source_entry);
            } else {
                verbatim.push(source_entry);
            }
        }

        let nav = Navigation::new(resolver);

        let mut seen = BTreeSet::new();
        let html_dests: Vec<&PathBuf> = content
            .iter()
            .chain(verbatim.iter())
            .map(|entry| &entry.dest)
            .filter(|dest| dest.extension() == Some(OsStr::new(HTML_EXTENSION)))
            .filter(|dest| seen.insert(dest.as_path()))
            .collect();
        let pages = nav.siblings(&html_dests);

        let child_indexes: Vec<PathBuf> = subdirs
            .iter()
            .filter_map(|dir| resolver.to_destination(dir, false))
            .map(|dir| dir.join(INDEX_FILE))
            .collect();
        let children = nav.siblings(&child_indexes);

        Ok(DirectoryListing {
            source_dir: source_dir.to_path_buf(),
            dest_dir,
            content,
            verbatim,
            subdirs,
            pages,
            children,
        })
    }
}
