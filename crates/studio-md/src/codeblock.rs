//! Fenced code block rendering.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Languages that get syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    TypeScript,
}

impl Language {
    /// Normalize a code fence info string.
    ///
    /// Only the first word is considered. Matching ignores case and an
    /// optional `language-` prefix. Anything outside the supported set
    /// returns `None`.
    pub fn from_info(info: &str) -> Option<Self> {
        let tag = info.split_whitespace().next()?.to_lowercase();
        let tag = tag.strip_prefix("language-").unwrap_or(tag.as_str());
        match tag {
            "js" | "javascript" => Some(Self::JavaScript),
            "ts" | "typescript" => Some(Self::TypeScript),
            _ => None,
        }
    }

    /// Canonical name, used in the `language-<name>` class.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
        }
    }

    /// Find a grammar for this language.
    ///
    /// The bundled syntaxes have no TypeScript grammar, so TypeScript falls
    /// back to JavaScript.
    fn syntax<'s>(&self, syntaxes: &'s SyntaxSet) -> Option<&'s SyntaxReference> {
        let tokens: &[&str] = match self {
            Self::JavaScript => &["js", "javascript"],
            Self::TypeScript => &["ts", "typescript", "js"],
        };
        tokens
            .iter()
            .find_map(|token| syntaxes.find_syntax_by_token(token))
    }
}

/// Render a fenced code block to a `<pre><code>` pair.
///
/// Recognized languages are highlighted with classed spans; everything else,
/// and any block the highlighter chokes on, is emitted as escaped text.
pub fn render_code_block(syntaxes: &SyntaxSet, code: &str, info: &str) -> String {
    let Some(language) = Language::from_info(info) else {
        return format!("<pre><code>{}</code></pre>\n", escape_html(code));
    };

    let body = match highlight(syntaxes, language, code) {
        Some(html) => html,
        None => {
            tracing::debug!(
                "Highlighting failed for {} block, using plain text",
                language.name()
            );
            escape_html(code)
        }
    };

    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        language.name(),
        body
    )
}

fn highlight(syntaxes: &SyntaxSet, language: Language, code: &str) -> Option<String> {
    let syntax = language.syntax(syntaxes)?;
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        syntaxes,
        ClassStyle::SpacedPrefixed { prefix: "hl-" },
    );
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .ok()?;
    }
    Some(generator.finalize())
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
