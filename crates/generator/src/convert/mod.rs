//! Source-to-HTML conversion.
//!
//! Converters are kept in an ordered registry and the first one whose
//! predicate accepts a source wins. Sources no converter accepts are copied
//! into the site verbatim.

mod highlight;
mod markdown;
mod meta;

pub use highlight::HighlightConverter;
pub use markdown::{MARKDOWN_EXTENSIONS, MarkdownConverter};
pub use meta::Metadata;

use mvw_core::WikiConfig;
use std::path::Path;

use crate::error::Result;
use crate::navigation::NavContext;
use crate::theme::Theme;

/// Turns one source file into a rendered page.
pub trait Converter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether this converter accepts the source
    fn handles(&self, source: &Path) -> bool;

    /// Render the source with its navigation
    fn convert(&self, source: &Path, nav: &NavContext, theme: &Theme) -> Result<String>;
}

/// Ordered list of converters, first match wins
#[derive(Default)]
pub struct ConverterRegistry {
    converters: Vec<Box<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converters for a wiki: optional source highlighting, then Markdown
    pub fn for_config(config: &WikiConfig) -> Self {
        let mut registry = Self::new();
        if config.highlight_source {
            registry.register(HighlightConverter::new());
        }
        registry.register(MarkdownConverter);
        registry
    }

    /// Append a converter. Earlier registrations take precedence.
    pub fn register(&mut self, converter: impl Converter + 'static) -> &mut Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// First converter accepting the source
    pub fn find(&self, source: &Path) -> Option<&dyn Converter> {
        self.converters
            .iter()
            .find(|c| c.handles(source))
            .map(|c| c.as_ref())
    }

    pub fn is_convertible(&self, source: &Path) -> bool {
        self.find(source).is_some()
    }

    /// Convert a source, or `None` when no converter accepts it
    pub fn convert(&self, source: &Path, nav: &NavContext, theme: &Theme) -> Result<Option<String>> {
        match self.find(source) {
            Some(converter) => {
                tracing::debug!(converter = converter.name(), source = %source.display(), "Converting");
                converter.convert(source, nav, theme).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
