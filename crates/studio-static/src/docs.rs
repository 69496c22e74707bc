//! Documentation pages.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use studio_md::{parse_front_matter, render_markdown, FrontMatter};

use crate::collector::{collect_markdown, Depth, SourceEntry};
use crate::context::PageContext;
use crate::error::BuildError;
use crate::output::write_page;
use crate::templates::{PageSlots, PageTemplate, SocialMeta};

const DOCS_HEADING: &str = "Documentation";
const SOCIAL_CARD: &str = "summary_large_image";

/// A docs page ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDoc {
    /// Source path relative to the docs root
    pub relative_path: PathBuf,

    pub title: String,

    /// Empty when the page declares none
    pub description: String,

    /// Rendered Markdown body
    pub html: String,

    /// Social preview image URL
    pub image: String,
}

impl RenderedDoc {
    /// Output path relative to the docs output root.
    pub fn output_path(&self) -> PathBuf {
        self.relative_path.with_extension("html")
    }
}

/// Build every docs page into `output_dir`.
///
/// All pages are rendered before any is written, so a page without a
/// `title` fails the build without leaving partial output behind. Returns
/// the number of pages written.
pub fn build_docs(
    ctx: &PageContext<'_>,
    docs_dir: &Path,
    template: Option<&PageTemplate>,
    output_dir: &Path,
) -> Result<usize, BuildError> {
    let Some(template) = template else {
        tracing::warn!("No page template available, skipping docs");
        return Ok(0);
    };

    let Some(collection) = collect_markdown(ctx.source, docs_dir, Depth::Recursive)? else {
        tracing::warn!(
            "Docs directory {} not found, skipping docs",
            docs_dir.display()
        );
        return Ok(0);
    };

    let pages = collection
        .iter()
        .map(|source| {
            let doc = load_doc(ctx, source)?;
            let html = render_doc_page(ctx, template, &doc)?;
            Ok((doc.output_path(), html))
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    for (path, html) in &pages {
        write_page(&output_dir.join(path), html)?;
        tracing::debug!("Wrote docs page {}", path.display());
    }

    tracing::info!(
        "Wrote {} docs pages to {}",
        pages.len(),
        output_dir.display()
    );
    Ok(pages.len())
}

/// Read, validate and render one docs source.
pub fn load_doc(ctx: &PageContext<'_>, source: &SourceEntry) -> Result<RenderedDoc, BuildError> {
    let raw = ctx
        .source
        .read_to_string(&source.path)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", source.path.display(), e)))?;
    let parts = parse_front_matter(&raw);

    let title = scalar_text(parts.front_matter.get("title")).ok_or_else(|| {
        BuildError::MissingTitle {
            path: source.relative_path.display().to_string(),
        }
    })?;

    Ok(RenderedDoc {
        relative_path: source.relative_path.clone(),
        title,
        description: scalar_text(parts.front_matter.get("description")).unwrap_or_default(),
        html: render_markdown(ctx.renderer, parts.body),
        image: social_image(&parts.front_matter, ctx.default_social_image),
    })
}

/// The declared `image` if it is a string, otherwise the default.
pub fn social_image(front_matter: &FrontMatter, default: &str) -> String {
    front_matter
        .get_str("image")
        .unwrap_or(default)
        .to_string()
}

/// Text of a scalar front matter value. Empty strings count as absent.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn render_doc_page(
    ctx: &PageContext<'_>,
    template: &PageTemplate,
    doc: &RenderedDoc,
) -> Result<String, BuildError> {
    let content = ctx.layouts.render(
        "docs_page.html",
        minijinja::context! {
            docs_root => ctx.docs_root_url,
            title => &doc.title,
            description => &doc.description,
            html => &doc.html,
        },
    )?;

    let page_title = format!("{} | {} Docs", doc.title, ctx.site_name);
    let description = (!doc.description.is_empty()).then_some(doc.description.as_str());

    template.apply(&PageSlots {
        page_title: Some(&page_title),
        heading: Some(DOCS_HEADING),
        content: Some(&content),
        description,
        meta: SocialMeta {
            image: Some(&doc.image),
            card: Some(SOCIAL_CARD),
            title: Some(&doc.title),
            description,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::templates::{Layouts, DEFAULT_PAGE_TEMPLATE};
    use std::fs;
    use std::time::SystemTime;
    use studio_md::RendererConfig;
    use tempfile::tempdir;

    const DEFAULT_IMAGE: &str = "https://example.com/default.png";

    fn build(source: &MemorySource, out: &Path) -> Result<usize, BuildError> {
        let renderer = RendererConfig::new();
        let layouts = Layouts::new().unwrap();
        let ctx = PageContext {
            source,
            renderer: &renderer,
            layouts: &layouts,
            site_name: "Mongoose Studio",
            default_social_image: DEFAULT_IMAGE,
            docs_root_url: "/docs/index.html",
        };
        let template = PageTemplate::new(DEFAULT_PAGE_TEMPLATE);
        build_docs(&ctx, Path::new("docs"), Some(&template), out)
    }

    fn list_files(dir: &Path) -> Vec<String> {
        let mut files: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn mirrors_nested_pages() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("docs");
        let mut source = MemorySource::new();
        source
            .insert("docs/guide/a.md", "---\ntitle: \"A\"\n---\nAlpha\n", SystemTime::UNIX_EPOCH)
            .insert("docs/guide/b.md", "---\ntitle: \"B\"\n---\nBravo\n", SystemTime::UNIX_EPOCH);

        let written = build(&source, &out).unwrap();

        assert_eq!(written, 2);
        assert_eq!(list_files(&out), vec!["guide/a.html", "guide/b.html"]);
        let a = fs::read_to_string(out.join("guide/a.html")).unwrap();
        let b = fs::read_to_string(out.join("guide/b.html")).unwrap();
        assert!(a.contains("<h1 class=\"doc-title\">A</h1>"));
        assert!(b.contains("<h1 class=\"doc-title\">B</h1>"));
        assert!(a.contains("<title>A | Mongoose Studio Docs</title>"));
        assert!(a.contains("<p>Alpha</p>"));
    }

    #[test]
    fn missing_title_fails_with_path() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("docs");
        let mut source = MemorySource::new();
        source
            .insert("docs/guide/good.md", "---\ntitle: Good\n---\nFine\n", SystemTime::UNIX_EPOCH)
            .insert("docs/guide/untitled.md", "# No front matter\n", SystemTime::UNIX_EPOCH);

        let err = build(&source, &out).unwrap_err();

        match &err {
            BuildError::MissingTitle { path } => assert_eq!(path, "guide/untitled.md"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("guide/untitled.md"));
        assert!(!out.join("guide/untitled.html").exists());
        assert!(!out.join("guide/good.html").exists());
    }

    #[test]
    fn empty_title_counts_as_missing() {
        let temp = tempdir().unwrap();
        let mut source = MemorySource::new();
        source.insert("docs/x.md", "---\ntitle: \"\"\n---\n", SystemTime::UNIX_EPOCH);

        let result = build(&source, &temp.path().join("docs"));

        assert!(matches!(result, Err(BuildError::MissingTitle { .. })));
    }

    #[test]
    fn absent_docs_directory_is_a_no_op() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("docs");

        let written = build(&MemorySource::new(), &out).unwrap();

        assert_eq!(written, 0);
        assert!(!out.exists());
    }

    #[test]
    fn social_image_falls_back_to_default() {
        let declared = parse_front_matter("---\nimage: /img/dash.png\n---\n").front_matter;
        let numeric = parse_front_matter("---\nimage: 12\n---\n").front_matter;
        let missing = parse_front_matter("no front matter").front_matter;

        assert_eq!(social_image(&declared, DEFAULT_IMAGE), "/img/dash.png");
        assert_eq!(social_image(&numeric, DEFAULT_IMAGE), DEFAULT_IMAGE);
        assert_eq!(social_image(&missing, DEFAULT_IMAGE), DEFAULT_IMAGE);
    }

    #[test]
    fn writes_social_tags_and_description() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("docs");
        let mut source = MemorySource::new();
        source.insert(
            "docs/dashboards.md",
            "---\ntitle: Dashboards\ndescription: Charts & tables\n---\nBody\n",
            SystemTime::UNIX_EPOCH,
        );

        build(&source, &out).unwrap();

        let page = fs::read_to_string(out.join("dashboards.html")).unwrap();
        assert!(page.contains(&format!(r#"<meta property="og:image" content="{}"/>"#, DEFAULT_IMAGE)));
        assert!(page.contains(r#"<meta name="twitter:title" content="Dashboards"/>"#));
        assert!(page.contains(r#"<meta name="twitter:description" content="Charts &amp; tables"/>"#));
        assert!(page.contains(r#"<p class="doc-description">Charts &amp; tables</p>"#));
        assert!(page.contains(r#"<nav class="breadcrumb"><a href="/docs/index.html">Documentation</a></nav>"#));
    }

    #[test]
    fn uppercase_extension_becomes_html() {
        let doc = RenderedDoc {
            relative_path: PathBuf::from("guide/Setup.MD"),
            title: "Setup".into(),
            description: String::new(),
            html: String::new(),
            image: String::new(),
        };

        assert_eq!(doc.output_path(), PathBuf::from("guide/Setup.html"));
    }
}
