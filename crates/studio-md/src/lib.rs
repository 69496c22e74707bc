//! Markdown rendering for the Mongoose Studio site.
//!
//! This crate splits YAML front matter from Markdown sources and renders the
//! body to HTML, highlighting JavaScript and TypeScript code blocks.

pub mod codeblock;
pub mod frontmatter;
pub mod render;

pub use codeblock::{escape_html, Language};
pub use frontmatter::{parse_front_matter, FrontMatter, SourceParts};
pub use render::{render_markdown, RendererConfig};
