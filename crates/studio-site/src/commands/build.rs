//! Site build commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use studio_static::{CommandFrontend, FsSource, SiteBuilder, StudioOptions};

use crate::config::load_config;

fn builder(config_path: &Path, output: Option<PathBuf>) -> Result<SiteBuilder<CommandFrontend>> {
    let file_config = load_config(config_path)?;
    let frontend = file_config.frontend()?;
    let config = file_config.build_config(output);

    Ok(SiteBuilder::new(
        config,
        StudioOptions::from_env(),
        frontend,
    )?)
}

/// Run the full build.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building Mongoose Studio site...");

    let builder = builder(config_path, output)?;
    let report = builder.build().await?;

    tracing::info!(
        "Copied {} assets, wrote {} changelog and {} docs pages in {}ms",
        report.assets_copied,
        report.changelog_pages,
        report.docs_pages,
        report.duration_ms
    );
    tracing::info!("Output: {}", builder.config().public_dir.display());

    Ok(())
}

/// Render only the changelog.
pub fn run_changelog(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let builder = builder(config_path, output)?;
    let pages = builder.build_changelog(&FsSource)?;

    tracing::info!(
        "Wrote {} changelog pages to {}",
        pages,
        builder.config().changelog_output().display()
    );
    Ok(())
}

/// Render only the docs.
pub fn run_docs(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let builder = builder(config_path, output)?;
    let pages = builder.build_docs(&FsSource)?;

    tracing::info!(
        "Wrote {} docs pages to {}",
        pages,
        builder.config().docs_output().display()
    );
    Ok(())
}
