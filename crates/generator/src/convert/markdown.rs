use mvw_core::{DEFAULT_THEME, MarkdownExtension};
use pulldown_cmark::{Options, Parser, html};
use std::fs;
use std::path::Path;

use super::{Converter, Metadata};
use crate::error::{GenerateError, Result};
use crate::navigation::NavContext;
use crate::theme::Theme;

/// Extensions recognized as Markdown, compared case-insensitively
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd"];

/// Markdown pages rendered with pulldown-cmark.
///
/// A `theme:` metadata line picks the template and the enabled syntax
/// extensions; pages without one use the default theme.
pub struct MarkdownConverter;

impl Converter for MarkdownConverter {
    fn name(&self) -> &str {
        "markdown"
    }

    fn handles(&self, source: &Path) -> bool {
        is_markdown(source)
    }

    fn convert(&self, source: &Path, nav: &NavContext, theme: &Theme) -> Result<String> {
        let text = fs::read_to_string(source).map_err(GenerateError::io(source))?;
        let (meta, body) = Metadata::parse(&text);

        let theme_name = meta.get("theme").unwrap_or_else(|| DEFAULT_THEME.to_string());
        let content = render_markdown(body, &theme.markdown_extensions(&theme_name));

        theme.render(&theme_name, nav, &content, &meta)
    }
}

pub(crate) fn is_markdown(source: &Path) -> bool {
    source
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.as_str()))
}

fn options(extensions: &[MarkdownExtension]) -> Options {
    let mut options = Options::empty();
    for extension in extensions {
        options.insert(match extension {
            MarkdownExtension::Tables => Options::ENABLE_TABLES,
            MarkdownExtension::Footnotes => Options::ENABLE_FOOTNOTES,
            MarkdownExtension::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            MarkdownExtension::Tasklists => Options::ENABLE_TASKLISTS,
            MarkdownExtension::SmartPunctuation => Options::ENABLE_SMART_PUNCTUATION,
            MarkdownExtension::HeadingAttributes => Options::ENABLE_HEADING_ATTRIBUTES,
            MarkdownExtension::Math => Options::ENABLE_MATH,
        });
    }
    options
}

fn render_markdown(body: &str, extensions: &[MarkdownExtension]) -> String {
    let parser = Parser::new_ext(body, options(extensions));
    let mut content = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut content, parser);
    content
}
