//! Shared state handed to the page builders.

use studio_md::RendererConfig;

use crate::source::ContentSource;
use crate::templates::Layouts;

/// Everything a builder needs besides its own input and output paths.
pub struct PageContext<'a> {
    /// Where Markdown sources are read from
    pub source: &'a dyn ContentSource,

    /// Markdown renderer settings
    pub renderer: &'a RendererConfig,

    /// Page body layouts
    pub layouts: &'a Layouts,

    /// Product name used in page titles
    pub site_name: &'a str,

    /// Social preview image used when a docs page declares none
    pub default_social_image: &'a str,

    /// URL of the docs landing page, used by the docs breadcrumb
    pub docs_root_url: &'a str,
}
