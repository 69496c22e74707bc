//! Front matter extraction and parsing.

use serde_yaml::{Mapping, Value};

/// Metadata declared in a document's leading `---` block.
///
/// Keys keep their declaration order. Keys the pipeline does not know about
/// are kept as-is so callers can read them later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    entries: Mapping,
}

impl FrontMatter {
    /// Look up a raw metadata value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a metadata value that was declared as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Declared keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().filter_map(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_mapping(mapping: Mapping) -> Self {
        let mut entries = Mapping::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            entries.insert(Value::String(key), value);
        }
        Self { entries }
    }
}

/// A source document split into metadata and Markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceParts<'a> {
    /// Parsed front matter (empty when absent or malformed)
    pub front_matter: FrontMatter,

    /// Markdown content following the front matter block
    pub body: &'a str,
}

/// Split a document into front matter and body.
///
/// The block must open on the first line with `---` and close with a line
/// holding only `---`. A document without a block, or with an unclosed one,
/// is returned whole as the body. YAML that fails to parse, or that is not a
/// mapping, yields empty metadata while the block is still stripped.
pub fn parse_front_matter(source: &str) -> SourceParts<'_> {
    let Some((yaml, body)) = split_block(source) else {
        return SourceParts {
            front_matter: FrontMatter::default(),
            body: source,
        };
    };

    let front_matter = match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => FrontMatter::from_mapping(mapping),
        Ok(Value::Null) => FrontMatter::default(),
        Ok(_) => {
            tracing::debug!("Front matter is not a mapping, ignoring it");
            FrontMatter::default()
        }
        Err(e) => {
            tracing::debug!("Unparseable front matter, ignoring it: {}", e);
            FrontMatter::default()
        }
    };

    SourceParts { front_matter, body }
}

/// Locate the YAML block and the body that follows it.
fn split_block(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let (first, mut rest) = next_line(source)?;
    if first.trim_end() != "---" {
        return None;
    }

    let yaml_start = rest;
    let mut yaml_len = 0;
    loop {
        let (line, after) = next_line(rest)?;
        if line.trim_end() == "---" {
            return Some((&yaml_start[..yaml_len], after));
        }
        yaml_len += rest.len() - after.len();
        rest = after;
    }
}

/// Split off the first line, returning it without its terminator.
fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(pos) => Some((text[..pos].trim_end_matches('\r'), &text[pos + 1..])),
        None => Some((text, "")),
    }
}
