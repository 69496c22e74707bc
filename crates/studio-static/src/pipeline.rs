//! Build orchestration.
//!
//! A full build runs the Mongoose Studio frontend build, copies its static
//! output into the public directory, then renders the changelog and the docs.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use studio_md::RendererConfig;
use tokio::process::Command;

use crate::changelog::build_changelog;
use crate::context::PageContext;
use crate::docs::build_docs;
use crate::error::BuildError;
use crate::output::copy_tree;
use crate::source::{ContentSource, FsSource};
use crate::templates::{Layouts, PageTemplate};

/// Environment variable holding the Mongoose Studio API key.
pub const API_KEY_VAR: &str = "MONGOOSE_STUDIO_API_KEY";

/// Environment variable holding the MongoDB connection string.
pub const CONNECTION_STRING_VAR: &str = "MONGODB_CONNECTION_STRING";

/// Landing page linked from the docs breadcrumb.
const DOCS_ROOT_URL: &str = "/docs/index.html";

/// Configuration for building the site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Product name used in page titles
    pub site_name: String,

    /// Root of the served output tree
    pub public_dir: PathBuf,

    /// Shared HTML shell
    pub template_path: PathBuf,

    /// Changelog sources (one Markdown file per release)
    pub changelog_dir: PathBuf,

    /// Docs sources (nested Markdown tree)
    pub docs_dir: PathBuf,

    /// Social preview image for docs pages that declare none
    pub default_social_image: String,

    /// Path the Studio API is mounted at
    pub mount_path: String,

    /// Static files produced by the frontend build
    pub frontend_assets_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            site_name: "Mongoose Studio".to_string(),
            public_dir: PathBuf::from("public"),
            template_path: PathBuf::from("templates/page.html"),
            changelog_dir: PathBuf::from("changelog"),
            docs_dir: PathBuf::from("docs"),
            default_social_image: "https://mongoosestudio.app/images/og-image.png".to_string(),
            mount_path: "/api/studio".to_string(),
            frontend_assets_dir: PathBuf::from("node_modules/@mongoosejs/studio/frontend/public"),
        }
    }
}

impl BuildConfig {
    pub fn changelog_output(&self) -> PathBuf {
        self.public_dir.join("changelog")
    }

    pub fn docs_output(&self) -> PathBuf {
        self.public_dir.join("docs")
    }
}

/// Options handed to the frontend build untouched.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
}

impl StudioOptions {
    /// Read the options from the process environment. Missing values are
    /// left for the frontend build to complain about.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_VAR).ok(),
            connection_string: std::env::var(CONNECTION_STRING_VAR).ok(),
        }
    }
}

impl fmt::Debug for StudioOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Arguments for one frontend build.
#[derive(Debug, Clone, Copy)]
pub struct FrontendRequest<'a> {
    pub mount_path: &'a str,
    pub static_export: bool,
    pub options: &'a StudioOptions,
}

/// Builds the Studio frontend assets.
pub trait FrontendBuilder {
    fn build(
        &self,
        request: FrontendRequest<'_>,
    ) -> impl Future<Output = Result<(), BuildError>> + Send;
}

/// Runs an external command to build the frontend.
///
/// The request is passed through the environment: `STUDIO_MOUNT_PATH`,
/// `STUDIO_STATIC_EXPORT` (`1` or `0`) and `STUDIO_OPTIONS` (JSON).
#[derive(Debug, Clone)]
pub struct CommandFrontend {
    program: String,
    args: Vec<String>,
}

impl CommandFrontend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args...]` list.
    pub fn from_argv(argv: &[String]) -> Result<Self, BuildError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| BuildError::FrontendError("No frontend command configured".into()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl FrontendBuilder for CommandFrontend {
    async fn build(&self, request: FrontendRequest<'_>) -> Result<(), BuildError> {
        let options = serde_json::to_string(request.options)
            .map_err(|e| BuildError::FrontendError(e.to_string()))?;

        tracing::debug!("Running {} {}", self.program, self.args.join(" "));

        let status = Command::new(&self.program)
            .args(&self.args)
            .env("STUDIO_MOUNT_PATH", request.mount_path)
            .env(
                "STUDIO_STATIC_EXPORT",
                if request.static_export { "1" } else { "0" },
            )
            .env("STUDIO_OPTIONS", options)
            .status()
            .await
            .map_err(|e| BuildError::FrontendError(format!("{}: {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(BuildError::FrontendError(format!(
                "{} exited with {}",
                self.program, status
            )))
        }
    }
}

/// Result of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Frontend asset files copied into the public directory
    pub assets_copied: usize,

    /// Changelog pages written, index included
    pub changelog_pages: usize,

    /// Docs pages written
    pub docs_pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Drives a site build.
pub struct SiteBuilder<F> {
    config: BuildConfig,
    options: StudioOptions,
    frontend: F,
    renderer: RendererConfig,
    layouts: Layouts,
}

impl<F: FrontendBuilder> SiteBuilder<F> {
    /// Create a builder. The renderer and layouts are set up once here and
    /// shared by every page.
    pub fn new(
        config: BuildConfig,
        options: StudioOptions,
        frontend: F,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            config,
            options,
            frontend,
            renderer: RendererConfig::new(),
            layouts: Layouts::new()?,
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run the full pipeline: frontend build, asset copy, changelog, docs.
    ///
    /// A failed frontend build stops everything before any page is written.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        tracing::info!("Building Studio frontend for {}", self.config.mount_path);
        let request = FrontendRequest {
            mount_path: &self.config.mount_path,
            static_export: true,
            options: &self.options,
        };
        if let Err(e) = self.frontend.build(request).await {
            tracing::error!("Frontend build failed: {}", e);
            return Err(e);
        }

        let assets_copied = copy_tree(&self.config.frontend_assets_dir, &self.config.public_dir)?;
        tracing::info!(
            "Copied {} frontend assets into {}",
            assets_copied,
            self.config.public_dir.display()
        );

        let mut report = self.build_pages(&FsSource)?;
        report.assets_copied = assets_copied;
        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Render the changelog and then the docs, without the frontend step.
    pub fn build_pages(&self, source: &dyn ContentSource) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let Some(template) = self.load_template()? else {
            return Ok(BuildReport::default());
        };

        let changelog_pages = self.changelog_with(source, &template)?;
        let docs_pages = self.docs_with(source, &template)?;

        Ok(BuildReport {
            assets_copied: 0,
            changelog_pages,
            docs_pages,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Render only the changelog.
    pub fn build_changelog(&self, source: &dyn ContentSource) -> Result<usize, BuildError> {
        match self.load_template()? {
            Some(template) => self.changelog_with(source, &template),
            None => Ok(0),
        }
    }

    /// Render only the docs.
    pub fn build_docs(&self, source: &dyn ContentSource) -> Result<usize, BuildError> {
        match self.load_template()? {
            Some(template) => self.docs_with(source, &template),
            None => Ok(0),
        }
    }

    fn changelog_with(
        &self,
        source: &dyn ContentSource,
        template: &PageTemplate,
    ) -> Result<usize, BuildError> {
        build_changelog(
            &self.page_context(source),
            &self.config.changelog_dir,
            Some(template),
            &self.config.changelog_output(),
        )
    }

    fn docs_with(
        &self,
        source: &dyn ContentSource,
        template: &PageTemplate,
    ) -> Result<usize, BuildError> {
        build_docs(
            &self.page_context(source),
            &self.config.docs_dir,
            Some(template),
            &self.config.docs_output(),
        )
    }

    fn load_template(&self) -> Result<Option<PageTemplate>, BuildError> {
        let template = PageTemplate::load(&self.config.template_path)?;
        if template.is_none() {
            tracing::warn!(
                "Page template {} not found, skipping static pages",
                self.config.template_path.display()
            );
        }
        Ok(template)
    }

    fn page_context<'a>(&'a self, source: &'a dyn ContentSource) -> PageContext<'a> {
        PageContext {
            source,
            renderer: &self.renderer,
            layouts: &self.layouts,
            site_name: &self.config.site_name,
            default_social_image: &self.config.default_social_image,
            docs_root_url: DOCS_ROOT_URL,
        }
    }
}
