//! studio.toml loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use studio_static::{BuildConfig, CommandFrontend};

/// Configuration file structure (studio.toml).
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_social_image")]
    pub default_social_image: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ContentConfig {
    #[serde(default = "default_changelog_dir")]
    pub changelog_dir: String,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct FrontendConfig {
    /// Program and arguments that build the frontend
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            public_dir: default_public_dir(),
            template: default_template(),
            default_social_image: default_social_image(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            changelog_dir: default_changelog_dir(),
            docs_dir: default_docs_dir(),
        }
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            assets_dir: default_assets_dir(),
            mount_path: default_mount_path(),
        }
    }
}

fn default_name() -> String {
    BuildConfig::default().site_name
}
fn default_public_dir() -> String {
    "public".to_string()
}
fn default_template() -> String {
    "templates/page.html".to_string()
}
fn default_social_image() -> String {
    BuildConfig::default().default_social_image
}
fn default_changelog_dir() -> String {
    "changelog".to_string()
}
fn default_docs_dir() -> String {
    "docs".to_string()
}
fn default_command() -> Vec<String> {
    vec!["node".to_string(), "scripts/build-frontend.js".to_string()]
}
fn default_assets_dir() -> String {
    BuildConfig::default()
        .frontend_assets_dir
        .to_string_lossy()
        .into_owned()
}
fn default_mount_path() -> String {
    BuildConfig::default().mount_path
}

impl ConfigFile {
    /// Resolve into a build configuration, letting `public_dir` override the
    /// configured output directory.
    pub fn build_config(&self, public_dir: Option<PathBuf>) -> BuildConfig {
        BuildConfig {
            site_name: self.site.name.clone(),
            public_dir: public_dir.unwrap_or_else(|| PathBuf::from(&self.site.public_dir)),
            template_path: PathBuf::from(&self.site.template),
            changelog_dir: PathBuf::from(&self.content.changelog_dir),
            docs_dir: PathBuf::from(&self.content.docs_dir),
            default_social_image: self.site.default_social_image.clone(),
            mount_path: self.frontend.mount_path.clone(),
            frontend_assets_dir: PathBuf::from(&self.frontend.assets_dir),
        }
    }

    pub fn frontend(&self) -> Result<CommandFrontend> {
        CommandFrontend::from_argv(&self.frontend.command)
            .context("Invalid [frontend] command in config")
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
