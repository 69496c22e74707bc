//! Static page builder for the Mongoose Studio site.
//!
//! Renders the bundled changelog and documentation Markdown into HTML pages
//! inside the shared page template, after the Studio frontend has been built
//! and copied into the public directory.

pub mod changelog;
pub mod collector;
pub mod context;
pub mod docs;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod templates;

pub use context::PageContext;
pub use error::BuildError;
pub use pipeline::{
    BuildConfig, BuildReport, CommandFrontend, FrontendBuilder, FrontendRequest, SiteBuilder,
    StudioOptions,
};
pub use source::{ContentSource, FsSource, MemorySource};
pub use templates::{PageSlots, PageTemplate, SocialMeta, DEFAULT_PAGE_TEMPLATE};
