//! Preview server for the built site.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::load_config;

/// Directory to preview: the `--dir` flag, else `[site] public_dir`.
fn public_dir(config_path: &Path, dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(PathBuf::from(load_config(config_path)?.site.public_dir)),
    }
}

/// Serve the public directory on localhost until interrupted.
pub async fn run(
    config_path: &Path,
    port: u16,
    dir: Option<PathBuf>,
    open_browser: bool,
) -> Result<()> {
    let dir = public_dir(config_path, dir)?;
    if !dir.is_dir() {
        anyhow::bail!(
            "{} does not exist. Run 'studio-site build' first.",
            dir.display()
        );
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // `/docs/` resolves to `/docs/index.html`
    let app = Router::new().fallback_service(ServeDir::new(&dir));

    let url = format!("http://{}", addr);
    tracing::info!("Previewing {} at {}", dir.display(), url);

    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser: {}", e);
        }
    }

    axum::serve(listener, app)
        .await
        .context("Preview server stopped")
}
