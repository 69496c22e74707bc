//! Changelog pages.
//!
//! Every Markdown file directly inside the changelog directory is one
//! release. Releases are rendered to `<slug>.html` and listed, newest first,
//! in `index.html`.

use std::cmp::Ordering;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_yaml::Value;

use studio_md::{parse_front_matter, render_markdown};

use crate::collector::{collect_markdown, Depth, SourceEntry};
use crate::context::PageContext;
use crate::error::BuildError;
use crate::output::write_page;
use crate::templates::{PageSlots, PageTemplate, SocialMeta};

const CHANGELOG_HEADING: &str = "Release Notes";

/// A rendered release.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogEntry {
    /// File name without extension
    pub slug: String,

    /// Slug with a leading `v`
    pub display_version: String,

    /// Rendered Markdown body
    pub html: String,

    /// First substantive line of the body, possibly empty
    pub summary: String,

    /// Declared publish date, or the file's modification time
    pub published_at: DateTime<Utc>,
}

impl ChangelogEntry {
    /// `YYYY-MM-DD`, for `datetime` attributes.
    pub fn iso_date(&self) -> String {
        self.published_at.format("%Y-%m-%d").to_string()
    }

    /// Human readable date, e.g. `March 4, 2025`.
    pub fn date_label(&self) -> String {
        self.published_at.format("%B %-d, %Y").to_string()
    }

    fn listing(&self) -> EntryListing<'_> {
        EntryListing {
            slug: &self.slug,
            display_version: &self.display_version,
            summary: &self.summary,
            iso_date: self.iso_date(),
            date_label: self.date_label(),
        }
    }
}

/// Index page row.
#[derive(Debug, Serialize)]
struct EntryListing<'a> {
    slug: &'a str,
    display_version: &'a str,
    summary: &'a str,
    iso_date: String,
    date_label: String,
}

/// Build the changelog into `output_dir`.
///
/// Without a template nothing is written. A missing source directory still
/// produces an empty index. Returns the number of pages written.
pub fn build_changelog(
    ctx: &PageContext<'_>,
    changelog_dir: &Path,
    template: Option<&PageTemplate>,
    output_dir: &Path,
) -> Result<usize, BuildError> {
    let Some(template) = template else {
        tracing::warn!("No page template available, skipping changelog");
        return Ok(0);
    };

    let entries = match collect_markdown(ctx.source, changelog_dir, Depth::Shallow)? {
        Some(collection) => {
            let mut entries = collection
                .iter()
                .map(|source| load_entry(ctx, source))
                .collect::<Result<Vec<_>, _>>()?;
            sort_entries(&mut entries);
            entries
        }
        None => {
            tracing::warn!(
                "Changelog directory {} not found, writing an empty index",
                changelog_dir.display()
            );
            Vec::new()
        }
    };

    for entry in &entries {
        let html = render_entry_page(ctx, template, entry)?;
        write_page(&output_dir.join(format!("{}.html", entry.slug)), &html)?;
        tracing::debug!("Wrote changelog page for {}", entry.display_version);
    }

    let index = render_index_page(ctx, template, &entries)?;
    write_page(&output_dir.join("index.html"), &index)?;

    let written = entries.len() + 1;
    tracing::info!(
        "Wrote {} changelog pages to {}",
        written,
        output_dir.display()
    );
    Ok(written)
}

/// Read, parse and render one release file.
pub fn load_entry(ctx: &PageContext<'_>, source: &SourceEntry) -> Result<ChangelogEntry, BuildError> {
    let raw = ctx
        .source
        .read_to_string(&source.path)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", source.path.display(), e)))?;
    let parts = parse_front_matter(&raw);

    let slug = source
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let declared = parts.front_matter.get("publishedAt");
    let published_at = match declared.and_then(parse_declared_date) {
        Some(date) => date,
        None => {
            if declared.is_some() {
                tracing::warn!(
                    "Unparseable publishedAt in {}, using file modification time",
                    source.relative_path.display()
                );
            }
            let modified = ctx
                .source
                .modified(&source.path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", source.path.display(), e)))?;
            DateTime::<Utc>::from(modified)
        }
    };

    Ok(ChangelogEntry {
        display_version: display_version(&slug),
        html: render_markdown(ctx.renderer, parts.body),
        summary: summarize(parts.body),
        published_at,
        slug,
    })
}

/// Prefix a slug with `v` unless it already has one.
pub fn display_version(slug: &str) -> String {
    if slug.starts_with('v') {
        slug.to_string()
    } else {
        format!("v{}", slug)
    }
}

/// First trimmed, non-blank line that is not a heading.
pub fn summarize(markdown: &str) -> String {
    markdown
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_default()
        .to_string()
}

/// Interpret a declared `publishedAt` value.
///
/// Strings may be RFC 3339 timestamps, `YYYY-MM-DD` dates with an optional
/// time, or long dates like `March 4, 2025`. Numbers are milliseconds since
/// the Unix epoch. Naive values are taken as UTC.
pub fn parse_declared_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::Tagged(tagged) => parse_declared_date(&tagged.value),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Newest first; equal timestamps fall back to descending natural slug order.
pub fn sort_entries(entries: &mut [ChangelogEntry]) {
    entries.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| natural_cmp(&b.slug, &a.slug))
    });
}

/// Compare strings treating digit runs as numbers and ignoring letter case.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = match (l, r) {
            (Chunk::Digits(l), Chunk::Digits(r)) => compare_digits(l, r),
            _ => l.text().to_lowercase().cmp(&r.text().to_lowercase()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

impl<'a> Chunk<'a> {
    fn text(&self) -> &'a str {
        match self {
            Self::Digits(s) | Self::Text(s) => s,
        }
    }
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(previous) if previous != digit => {
                chunks.push(make_chunk(&s[start..i], previous));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        chunks.push(make_chunk(&s[start..], digit));
    }
    chunks
}

fn make_chunk(text: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(text)
    } else {
        Chunk::Text(text)
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn render_entry_page(
    ctx: &PageContext<'_>,
    template: &PageTemplate,
    entry: &ChangelogEntry,
) -> Result<String, BuildError> {
    let content = ctx.layouts.render(
        "changelog_entry.html",
        minijinja::context! {
            display_version => &entry.display_version,
            iso_date => entry.iso_date(),
            date_label => entry.date_label(),
            html => &entry.html,
        },
    )?;

    let page_title = format!("{} {}", ctx.site_name, entry.display_version);
    let summary = (!entry.summary.is_empty()).then_some(entry.summary.as_str());

    template.apply(&PageSlots {
        page_title: Some(&page_title),
        heading: Some(CHANGELOG_HEADING),
        content: Some(&content),
        description: summary,
        meta: SocialMeta {
            title: Some(&page_title),
            description: summary,
            ..Default::default()
        },
    })
}

fn render_index_page(
    ctx: &PageContext<'_>,
    template: &PageTemplate,
    entries: &[ChangelogEntry],
) -> Result<String, BuildError> {
    let listings: Vec<_> = entries.iter().map(ChangelogEntry::listing).collect();
    let content = ctx.layouts.render(
        "changelog_index.html",
        minijinja::context! { entries => listings },
    )?;

    let page_title = format!("{} Changelog", ctx.site_name);
    template.apply(&PageSlots {
        page_title: Some(&page_title),
        heading: Some(CHANGELOG_HEADING),
        content: Some(&content),
        meta: SocialMeta {
            title: Some(&page_title),
            ..Default::default()
        },
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FsSource, MemorySource};
    use crate::templates::{Layouts, DEFAULT_PAGE_TEMPLATE};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use studio_md::RendererConfig;
    use tempfile::tempdir;

    fn mtime(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn with_context<T>(source: &MemorySource, f: impl FnOnce(&PageContext<'_>) -> T) -> T {
        let renderer = RendererConfig::new();
        let layouts = Layouts::new().unwrap();
        let ctx = PageContext {
            source,
            renderer: &renderer,
            layouts: &layouts,
            site_name: "Mongoose Studio",
            default_social_image: "https://example.com/default.png",
            docs_root_url: "/docs/index.html",
        };
        f(&ctx)
    }

    fn entry(slug: &str, secs: i64) -> ChangelogEntry {
        ChangelogEntry {
            slug: slug.to_string(),
            display_version: display_version(slug),
            html: String::new(),
            summary: String::new(),
            published_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn entry_without_date_uses_modification_time() {
        let mut source = MemorySource::new();
        source.insert("changelog/1.2.0.md", "# 1.2.0\n\nFixed things.\n", mtime(1_700_000_000));

        let loaded = with_context(&source, |ctx| {
            let collection = collect_markdown(ctx.source, Path::new("changelog"), Depth::Shallow)
                .unwrap()
                .unwrap();
            load_entry(ctx, collection.iter().next().unwrap()).unwrap()
        });

        assert_eq!(loaded.slug, "1.2.0");
        assert_eq!(loaded.display_version, "v1.2.0");
        assert_eq!(loaded.published_at, DateTime::<Utc>::from(mtime(1_700_000_000)));
        assert_eq!(loaded.summary, "Fixed things.");
        assert!(loaded.html.contains("<h1>1.2.0</h1>"));
    }

    #[test]
    fn declared_date_wins_over_modification_time() {
        let mut source = MemorySource::new();
        source.insert(
            "changelog/v0.9.0.md",
            "---\npublishedAt: 2024-03-04\n---\nNew charts.\n",
            mtime(1_700_000_000),
        );

        let loaded = with_context(&source, |ctx| {
            let entry = SourceEntry {
                path: "changelog/v0.9.0.md".into(),
                relative_path: "v0.9.0.md".into(),
            };
            load_entry(ctx, &entry).unwrap()
        });

        assert_eq!(loaded.display_version, "v0.9.0");
        assert_eq!(loaded.iso_date(), "2024-03-04");
        assert_eq!(loaded.date_label(), "March 4, 2024");
    }

    #[test]
    fn invalid_declared_date_falls_back() {
        let mut source = MemorySource::new();
        source.insert(
            "changelog/1.0.0.md",
            "---\npublishedAt: not a date\n---\nBody\n",
            mtime(86_400),
        );

        let loaded = with_context(&source, |ctx| {
            let entry = SourceEntry {
                path: "changelog/1.0.0.md".into(),
                relative_path: "1.0.0.md".into(),
            };
            load_entry(ctx, &entry).unwrap()
        });

        assert_eq!(loaded.iso_date(), "1970-01-02");
    }

    #[test]
    fn parses_declared_date_formats() {
        let cases = [
            ("2025-01-15T10:30:00Z", "2025-01-15"),
            ("2025-01-15T23:30:00-05:00", "2025-01-16"),
            ("2025-01-15 08:00:00", "2025-01-15"),
            ("2025-01-15", "2025-01-15"),
            ("January 15, 2025", "2025-01-15"),
        ];
        for (input, expected) in cases {
            let parsed = parse_declared_date(&Value::String(input.to_string()))
                .unwrap_or_else(|| panic!("failed to parse {}", input));
            assert_eq!(parsed.format("%Y-%m-%d").to_string(), expected, "{}", input);
        }

        let millis = parse_declared_date(&Value::Number(1_736_899_200_000i64.into())).unwrap();
        assert_eq!(millis.format("%Y-%m-%d").to_string(), "2025-01-15");

        assert!(parse_declared_date(&Value::String("soon".into())).is_none());
        assert!(parse_declared_date(&Value::Bool(true)).is_none());
    }

    #[test]
    fn display_version_is_prefixed_once() {
        assert_eq!(display_version("1.0.0"), "v1.0.0");
        assert_eq!(display_version("v1.0.0"), "v1.0.0");
    }

    #[test]
    fn summary_skips_headings_and_blank_lines() {
        assert_eq!(summarize("# Title\n\n## Sub\n   First real line.  \nNext"), "First real line.");
        assert_eq!(summarize("# Only a heading\n\n"), "");
        assert_eq!(summarize(""), "");
    }

    #[test]
    fn sorts_newest_first() {
        let mut entries = vec![entry("1.0.0", 100), entry("1.2.0", 300), entry("1.1.0", 200)];

        sort_entries(&mut entries);

        let slugs: Vec<_> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["1.2.0", "1.1.0", "1.0.0"]);
    }

    #[test]
    fn equal_timestamps_sort_by_descending_version() {
        let mut entries = vec![entry("2.0.0", 0), entry("10.0.0", 0), entry("1.5.0", 0)];

        sort_entries(&mut entries);

        let slugs: Vec<_> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["10.0.0", "2.0.0", "1.5.0"]);
    }

    #[test]
    fn natural_ordering() {
        assert_eq!(natural_cmp("v2.0.0", "v1.9.0"), Ordering::Greater);
        assert_eq!(natural_cmp("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(natural_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(natural_cmp("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(natural_cmp("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn builds_pages_and_index() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("changelog");
        let mut source = MemorySource::new();
        source
            .insert("changelog/2.0.0.md", "# 2.0.0\n\nBig release.\n", mtime(0))
            .insert("changelog/10.0.0.md", "# 10.0.0\n\n", mtime(0))
            .insert("changelog/1.5.0.md", "Small fix.\n", mtime(0))
            .insert("changelog/notes.txt", "ignored", mtime(0));
        let template = PageTemplate::new(DEFAULT_PAGE_TEMPLATE);

        let written = with_context(&source, |ctx| {
            build_changelog(ctx, Path::new("changelog"), Some(&template), &out).unwrap()
        });

        assert_eq!(written, 4);
        let page = fs::read_to_string(out.join("2.0.0.html")).unwrap();
        assert!(page.contains("<title>Mongoose Studio v2.0.0</title>"));
        assert!(page.contains(r#"data-slot="heading">Release Notes</h1>"#));
        assert!(page.contains(r#"datetime="1970-01-01">January 1, 1970</time>"#));
        assert!(page.contains("<p>Big release.</p>"));

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        let ten = index.find("10.0.0.html").unwrap();
        let two = index.find("2.0.0.html").unwrap();
        let one = index.find("1.5.0.html").unwrap();
        assert!(ten < two && two < one);
        assert!(index.contains(r#"<p class="release-summary">Big release.</p>"#));
        assert_eq!(index.matches("release-summary").count(), 2);
    }

    #[test]
    fn missing_directory_still_writes_empty_index() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("changelog");
        let source = MemorySource::new();
        let template = PageTemplate::new(DEFAULT_PAGE_TEMPLATE);

        let written = with_context(&source, |ctx| {
            build_changelog(ctx, Path::new("changelog"), Some(&template), &out).unwrap()
        });

        assert_eq!(written, 1);
        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.starts_with("<!DOCTYPE html>"));
        assert!(index.trim_end().ends_with("</html>"));
        assert!(index.contains("No releases yet."));
        assert!(!index.contains("release-item"));
    }

    #[test]
    fn empty_directory_on_disk_writes_empty_index() {
        let temp = tempdir().unwrap();
        let changelog_dir = temp.path().join("changelog");
        fs::create_dir_all(&changelog_dir).unwrap();
        let out = temp.path().join("public/changelog");
        let template = PageTemplate::new(DEFAULT_PAGE_TEMPLATE);
        let renderer = RendererConfig::new();
        let layouts = Layouts::new().unwrap();
        let ctx = PageContext {
            source: &FsSource,
            renderer: &renderer,
            layouts: &layouts,
            site_name: "Mongoose Studio",
            default_social_image: "https://example.com/default.png",
            docs_root_url: "/docs/index.html",
        };

        let written = build_changelog(&ctx, &changelog_dir, Some(&template), &out).unwrap();

        assert_eq!(written, 1);
        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.starts_with("<!DOCTYPE html>"));
        assert!(index.contains("<title>Mongoose Studio Changelog</title>"));
        assert!(index.contains(r#"<p class="release-empty">No releases yet.</p>"#));
        assert!(!index.contains("release-item"));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn missing_template_writes_nothing() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("changelog");
        let mut source = MemorySource::new();
        source.insert("changelog/1.0.0.md", "Hi\n", mtime(0));

        let written = with_context(&source, |ctx| {
            build_changelog(ctx, Path::new("changelog"), None, &out).unwrap()
        });

        assert_eq!(written, 0);
        assert!(!out.exists());
    }
}
