use mvw_core::DEFAULT_THEME;
use std::fs;
use std::path::Path;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::markdown::is_markdown;
use super::{Converter, Metadata};
use crate::error::{GenerateError, Result};
use crate::navigation::NavContext;
use crate::theme::Theme;

/// Source code files rendered as syntax highlighted pages.
///
/// Accepts any extension syntect knows except Markdown and HTML. The output
/// uses CSS classes (`<pre class="syntax">`) so the theme stylesheet decides
/// the colors.
pub struct HighlightConverter {
    syntaxes: SyntaxSet,
}

impl HighlightConverter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn syntax_for(&self, source: &Path) -> Option<&SyntaxReference> {
        if is_markdown(source) {
            return None;
        }
        let ext = source.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") {
            return None;
        }
        self.syntaxes.find_syntax_by_extension(ext)
    }

    fn highlight(&self, source: &Path, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| GenerateError::Highlight {
                    path: source.to_path_buf(),
                    message: e.to_string(),
                })?;
        }
        Ok(format!(
            "<pre class=\"syntax\"><code>{}</code></pre>",
            generator.finalize()
        ))
    }
}

impl Default for HighlightConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for HighlightConverter {
    fn name(&self) -> &str {
        "highlight"
    }

    fn handles(&self, source: &Path) -> bool {
        self.syntax_for(source).is_some()
    }

    fn convert(&self, source: &Path, nav: &NavContext, theme: &Theme) -> Result<String> {
        let code = fs::read_to_string(source).map_err(GenerateError::io(source))?;
        let syntax = self
            .syntax_for(source)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let content = self.highlight(source, &code, syntax)?;
        theme.render(DEFAULT_THEME, nav, &content, &Metadata::default())
    }
}
