//! Translation between source paths, destination paths and site URLs.
//!
//! Everything here is lexical: nothing reads or writes the filesystem.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::navigation::Page;

/// File name of every directory's generated page
pub const INDEX_FILE: &str = "index.html";

/// Extension given to converted sources
pub const HTML_EXTENSION: &str = "html";

/// Characters escaped in generated URL path segments
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'\'')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Turns a raw file or directory name into a display title
pub type TitleFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Default title formatting: underscores become spaces, words are title-cased.
pub fn default_title_formatter() -> TitleFormatter {
    Arc::new(|name: &str| title_case(&name.replace('_', " ")))
}

/// Title formatting with explicit overrides keyed by lowercased name,
/// falling back to [`default_title_formatter`].
pub fn title_formatter_with_overrides(overrides: BTreeMap<String, String>) -> TitleFormatter {
    if overrides.is_empty() {
        return default_title_formatter();
    }
    let fallback = default_title_formatter();
    Arc::new(move |name: &str| match overrides.get(&name.to_lowercase()) {
        Some(title) => title.clone(),
        None => fallback(name),
    })
}

/// Title-case each whitespace separated word.
///
/// - `getting started` → "Getting Started"
/// - `FAQ list` → "Faq List"
pub fn title_case(text: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect();

    words.join(" ")
}

/// Hidden entries start with a dot and never reach the generated site
pub fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Whether a destination path names a directory index page
pub fn is_index(dest: &Path) -> bool {
    dest.file_name() == Some(OsStr::new(INDEX_FILE))
}

/// Turn a request path into a path relative to the output root.
///
/// Drops the query and fragment, percent-decodes, folds `.` and `..`
/// segments without ever climbing above the root, and skips empty segments.
/// `/a/b/../c.html?x=1` becomes `a/c.html`; `/` becomes an empty path.
pub fn request_path(raw: &str) -> PathBuf {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            word => segments.push(word),
        }
    }

    segments.iter().collect()
}

/// Whether a raw request path names a directory, i.e. ends in a separator.
///
/// [`request_path`] drops trailing separators, so `/v1.0/` has to be
/// recognized here before its last segment is mistaken for a file name.
pub fn is_directory_request(raw: &str) -> bool {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    decoded.is_empty() || decoded.ends_with(['/', '\\'])
}

/// Maps between the source tree, the output tree and site URLs.
#[derive(Clone)]
pub struct PathResolver {
    source_root: PathBuf,
    output_root: PathBuf,
    site_root: String,
    home: String,
    formatter: TitleFormatter,
}

impl PathResolver {
    /// `home` is the title of the root page. When `None` it is derived from
    /// the source directory name with `formatter`.
    pub fn new(
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        site_root: impl Into<String>,
        home: Option<String>,
        formatter: TitleFormatter,
    ) -> Self {
        let source_root = source_root.into();
        let home = home.unwrap_or_else(|| {
            let name = source_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            formatter(&name)
        });

        Self {
            source_root,
            output_root: output_root.into(),
            site_root: site_root.into(),
            home,
            formatter,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn site_root(&self) -> &str {
        &self.site_root
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    /// Destination of a source file or directory.
    ///
    /// Convertible sources get an `.html` extension, everything else keeps
    /// its name. Returns `None` for paths outside the source root.
    pub fn to_destination(&self, source: &Path, convertible: bool) -> Option<PathBuf> {
        let relative = source.strip_prefix(&self.source_root).ok()?;
        let dest = self.output_root.join(relative);
        if convertible {
            Some(dest.with_extension(HTML_EXTENSION))
        } else {
            Some(dest)
        }
    }

    /// Source directory mirrored by an output directory
    pub fn to_source_dir(&self, dest_dir: &Path) -> Option<PathBuf> {
        let relative = dest_dir.strip_prefix(&self.output_root).ok()?;
        Some(self.source_root.join(relative))
    }

    /// Site URL of a destination file.
    ///
    /// Index pages map to their directory URL with a trailing slash, so the
    /// root index is the site root itself.
    pub fn to_url(&self, dest: &Path) -> String {
        let relative = dest.strip_prefix(&self.output_root).unwrap_or(dest);
        let mut segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let directory = is_index(dest);
        if directory {
            segments.pop();
        }

        let mut url = self.site_root.clone();
        let encoded: Vec<String> = segments
            .iter()
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        url.push_str(&encoded.join("/"));
        if directory && !encoded.is_empty() {
            url.push('/');
        }
        url
    }

    /// Display title of a destination file.
    ///
    /// Index pages are titled after their directory, with the home label
    /// used for the output or source root.
    pub fn title_of(&self, dest: &Path) -> String {
        let name = if is_index(dest) {
            let parent = dest.parent().unwrap_or(Path::new(""));
            if parent == self.output_root || parent == self.source_root {
                return self.home.clone();
            }
            parent.file_name()
        } else {
            dest.file_stem()
        };

        let name = name.map(|n| n.to_string_lossy()).unwrap_or_default();
        (self.formatter)(&name)
    }

    /// The navigable page for a destination file
    pub fn page(&self, dest: &Path) -> Page {
        Page::new(self.title_of(dest), self.to_url(dest))
    }

    /// The site's root index page
    pub fn root_page(&self) -> Page {
        self.page(&self.output_root.join(INDEX_FILE))
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("source_root", &self.source_root)
            .field("output_root", &self.output_root)
            .field("site_root", &self.site_root)
            .field("home", &self.home)
            .finish_non_exhaustive()
    }
}
