//! Page templating.
//!
//! Pages are rendered in two steps. A [`Layouts`] environment renders the
//! page body (release notes, changelog index, docs article) with minijinja,
//! then [`PageTemplate::apply`] injects that body, the page title and the
//! social preview tags into the shared HTML shell.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use minijinja::Environment;
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;

use crate::error::BuildError;

type HtmlWriter = Writer<Cursor<Vec<u8>>>;

/// Attribute marking an insertion point in the shell.
const SLOT_ATTR: &[u8] = b"data-slot";

/// Social preview values for a page. Unset fields leave the template's tag alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocialMeta<'a> {
    pub image: Option<&'a str>,
    pub card: Option<&'a str>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// Values to inject into the shell. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSlots<'a> {
    /// Replaces the text of `<title>`
    pub page_title: Option<&'a str>,

    /// Replaces the text of the `data-slot="heading"` element
    pub heading: Option<&'a str>,

    /// Trusted HTML for the `data-slot="content"` element, inserted verbatim
    pub content: Option<&'a str>,

    /// Sets `<meta name="description">`
    pub description: Option<&'a str>,

    /// Sets the Open Graph and Twitter card tags
    pub meta: SocialMeta<'a>,
}

impl<'a> PageSlots<'a> {
    /// Value for a `<meta>` tag identified by its `name` or `property`.
    fn meta_value(&self, key: &[u8]) -> Option<&'a str> {
        match key {
            b"description" => self.description,
            b"og:image" | b"twitter:image" => self.meta.image,
            b"twitter:card" => self.meta.card,
            b"twitter:title" => self.meta.title,
            b"twitter:description" => self.meta.description,
            _ => None,
        }
    }
}

/// The shared HTML shell every page is rendered into.
///
/// Only the source text is kept. Each call to [`apply`](Self::apply) parses
/// it again, so one page can never see another page's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Load the shell from disk. A missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, BuildError> {
        if !path.is_file() {
            return Ok(None);
        }
        let source = fs::read_to_string(path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;
        Ok(Some(Self::new(source)))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Produce a complete HTML document with the given slots filled in.
    pub fn apply(&self, slots: &PageSlots<'_>) -> Result<String, BuildError> {
        let mut reader = Reader::from_str(&self.source);
        reader.config_mut().trim_text(false);
        reader.config_mut().enable_all_checks(false);

        let mut writer = Writer::new(Cursor::new(Vec::with_capacity(self.source.len() * 2)));
        let mut title_done = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                BuildError::TemplateError(format!(
                    "HTML parse error at position {}: {}",
                    reader.error_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(elem) => {
                    let name = elem.name().as_ref().to_ascii_lowercase();
                    if name == b"title" && !title_done {
                        title_done = true;
                        if let Some(title) = slots.page_title {
                            let replacement = Replacement::Text(title);
                            write_replaced(&mut reader, &mut writer, elem, replacement)?;
                            continue;
                        }
                        write_event(&mut writer, Event::Start(elem))?;
                    } else if name == b"meta" {
                        let elem = rewrite_meta(elem, slots);
                        write_event(&mut writer, Event::Start(elem))?;
                    } else if let Some(replacement) = slot_replacement(&elem, slots) {
                        write_replaced(&mut reader, &mut writer, elem, replacement)?;
                    } else {
                        write_event(&mut writer, Event::Start(elem))?;
                    }
                }
                Event::Empty(elem) => {
                    let name = elem.name().as_ref().to_ascii_lowercase();
                    if name == b"meta" {
                        let elem = rewrite_meta(elem, slots);
                        write_event(&mut writer, Event::Empty(elem))?;
                    } else if let Some(replacement) = slot_replacement(&elem, slots) {
                        // `<div data-slot="content"/>` becomes an open/close pair
                        let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
                        let end = BytesEnd::new(tag);
                        write_event(&mut writer, Event::Start(elem))?;
                        replacement.write(&mut writer)?;
                        write_event(&mut writer, Event::End(end))?;
                    } else {
                        write_event(&mut writer, Event::Empty(elem))?;
                    }
                }
                Event::Eof => break,
                event => write_event(&mut writer, event)?,
            }
        }

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| BuildError::TemplateError(format!("Rendered page is not UTF-8: {}", e)))
    }
}

/// What goes inside a replaced element.
#[derive(Debug, Clone, Copy)]
enum Replacement<'a> {
    /// Plain text, escaped on output
    Text(&'a str),
    /// Trusted HTML, written as-is
    Html(&'a str),
}

impl Replacement<'_> {
    fn write(self, writer: &mut HtmlWriter) -> Result<(), BuildError> {
        match self {
            Self::Text(text) => write_event(writer, Event::Text(BytesText::new(text))),
            Self::Html(html) => writer
                .get_mut()
                .write_all(html.as_bytes())
                .map_err(|e| BuildError::TemplateError(e.to_string())),
        }
    }
}

fn write_event(writer: &mut HtmlWriter, event: Event<'_>) -> Result<(), BuildError> {
    writer
        .write_event(event)
        .map_err(|e| BuildError::TemplateError(e.to_string()))
}

/// Find the slot an element is tagged with, if the caller supplied a value for it.
fn slot_replacement<'a>(elem: &BytesStart<'_>, slots: &PageSlots<'a>) -> Option<Replacement<'a>> {
    let slot = elem
        .html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(SLOT_ATTR))?;

    match slot.value.as_ref() {
        b"heading" => slots.heading.map(Replacement::Text),
        b"content" => slots.content.map(Replacement::Html),
        _ => None,
    }
}

/// Write `elem`, its replacement content, and its end tag, dropping the
/// template's original children.
fn write_replaced(
    reader: &mut Reader<&[u8]>,
    writer: &mut HtmlWriter,
    elem: BytesStart<'_>,
    replacement: Replacement<'_>,
) -> Result<(), BuildError> {
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    write_event(writer, Event::Start(elem))?;
    replacement.write(writer)?;
    skip_children(reader, &tag)?;
    write_event(writer, Event::End(BytesEnd::new(tag)))
}

/// Consume events up to and including the end tag closing the current element.
///
/// Only tags named like the slot element are counted, so children with an
/// omitted end tag (`<p>`, `<li>`) cannot end the slot early.
fn skip_children(reader: &mut Reader<&[u8]>, tag: &str) -> Result<(), BuildError> {
    let tag = tag.to_ascii_lowercase();
    let mut depth = 0usize;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;
        match event {
            Event::Start(elem) if elem.name().as_ref().eq_ignore_ascii_case(tag.as_bytes()) => {
                depth += 1;
            }
            Event::End(elem) if elem.name().as_ref().eq_ignore_ascii_case(tag.as_bytes()) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(BuildError::TemplateError(format!(
                    "Unclosed <{}> slot in page template",
                    tag
                )))
            }
            _ => {}
        }
    }
}

/// Rewrite the `content` attribute of a social or description `<meta>` tag.
fn rewrite_meta(elem: BytesStart<'_>, slots: &PageSlots<'_>) -> BytesStart<'static> {
    let key = elem
        .html_attributes()
        .flatten()
        .find(|attr| {
            let key = attr.key.as_ref();
            key.eq_ignore_ascii_case(b"name") || key.eq_ignore_ascii_case(b"property")
        })
        .map(|attr| attr.value.into_owned());

    let Some(value) = key.and_then(|k| slots.meta_value(&k)) else {
        return elem.into_owned();
    };

    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(tag);
    let mut has_content = false;
    for attr in elem.html_attributes().flatten() {
        if attr.key.as_ref().eq_ignore_ascii_case(b"content") {
            has_content = true;
            let escaped = escape(value);
            rebuilt.push_attribute((attr.key.as_ref(), escaped.as_bytes()));
        } else {
            rebuilt.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
    }
    if !has_content {
        rebuilt.push_attribute(("content", value));
    }
    rebuilt
}

/// Minijinja environment holding the page body layouts.
pub struct Layouts {
    env: Environment<'static>,
}

impl Layouts {
    /// Create the environment with the built-in layouts.
    pub fn new() -> Result<Self, BuildError> {
        let mut env = Environment::new();
        env.add_template("changelog_entry.html", CHANGELOG_ENTRY_LAYOUT)?;
        env.add_template("changelog_index.html", CHANGELOG_INDEX_LAYOUT)?;
        env.add_template("docs_page.html", DOCS_PAGE_LAYOUT)?;
        Ok(Self { env })
    }

    /// Render a layout with a serializable context.
    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<String, BuildError> {
        let tmpl = self.env.get_template(name)?;
        Ok(tmpl.render(context)?)
    }
}

impl std::fmt::Debug for Layouts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layouts").finish_non_exhaustive()
    }
}

const CHANGELOG_ENTRY_LAYOUT: &str = r##"<article class="release">
  <header class="release-header">
    <h2 class="release-version">{{ display_version }}</h2>
    <time class="release-date badge" datetime="{{ iso_date }}">{{ date_label }}</time>
  </header>
  <div class="release-body">
    {{ html | safe }}
  </div>
  <p class="release-back"><a href="index.html">All releases</a></p>
</article>"##;

const CHANGELOG_INDEX_LAYOUT: &str = r##"<section class="release-list">
{% if entries %}
  <ul class="releases">
  {% for entry in entries %}
    <li class="release-item">
      <a class="release-link" href="{{ entry.slug }}.html">{{ entry.display_version }}</a>
      <time class="release-date" datetime="{{ entry.iso_date }}">{{ entry.date_label }}</time>
      {% if entry.summary %}<p class="release-summary">{{ entry.summary }}</p>{% endif %}
    </li>
  {% endfor %}
  </ul>
{% else %}
  <p class="release-empty">No releases yet.</p>
{% endif %}
</section>"##;

const DOCS_PAGE_LAYOUT: &str = r##"<article class="doc">
  <nav class="breadcrumb"><a href="{{ docs_root | safe }}">Documentation</a></nav>
  <h1 class="doc-title">{{ title }}</h1>
  {% if description %}<p class="doc-description">{{ description }}</p>{% endif %}
  <div class="content">
    {{ html | safe }}
  </div>
</article>"##;

/// Page shell written by `studio-site init`.
pub const DEFAULT_PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Mongoose Studio</title>
  <meta name="description" content="A sleek, powerful MongoDB UI with built-in dashboarding and auth." />
  <meta property="og:image" content="https://mongoosestudio.app/images/og-image.png" />
  <meta name="twitter:card" content="summary_large_image" />
  <meta name="twitter:title" content="Mongoose Studio" />
  <meta name="twitter:description" content="A sleek, powerful MongoDB UI with built-in dashboarding and auth." />
  <meta name="twitter:image" content="https://mongoosestudio.app/images/og-image.png" />
  <link rel="stylesheet" href="/style.css" />
</head>
<body>
  <header class="site-header">
    <a class="logo" href="/">Mongoose Studio</a>
    <nav>
      <a href="/docs/index.html">Docs</a>
      <a href="/changelog/index.html">Changelog</a>
    </nav>
  </header>
  <main>
    <h1 class="page-heading" data-slot="heading">Mongoose Studio</h1>
    <div class="page-content" data-slot="content"></div>
  </main>
</body>
</html>
"##;
