//! Markdown to HTML rendering.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::parsing::SyntaxSet;

use crate::codeblock::render_code_block;

/// Renderer settings, built once per process and shared by reference.
pub struct RendererConfig {
    syntaxes: SyntaxSet,
    options: Options,
}

impl RendererConfig {
    /// Create a configuration with the bundled syntax definitions.
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RendererConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererConfig")
            .field("syntaxes", &self.syntaxes.syntaxes().len())
            .field("options", &self.options)
            .finish()
    }
}

/// Render Markdown to an HTML fragment.
///
/// Code blocks, fenced or indented, go through the code block renderer;
/// every other event uses the standard HTML writer.
pub fn render_markdown(config: &RendererConfig, markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, config.options);
    let mut events = Vec::new();
    let mut code_block: Option<(String, String)> = None; // (info, code)

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.into_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                code_block = Some((info, String::new()));
            }
            Event::Text(text) if code_block.is_some() => {
                if let Some((_, code)) = code_block.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((info, code)) = code_block.take() {
                    let html = render_code_block(&config.syntaxes, &code, &info);
                    events.push(Event::Html(CowStr::from(html)));
                }
            }
            event => events.push(event),
        }
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}
