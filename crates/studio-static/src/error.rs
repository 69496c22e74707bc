//! Build errors.

/// Errors that can occur during a site build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read content: {0}")]
    ReadError(String),

    #[error("Docs page {path} is missing the required `title` front matter field")]
    MissingTitle { path: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Frontend build failed: {0}")]
    FrontendError(String),

    #[error("Failed to copy frontend assets: {0}")]
    AssetsError(String),
}

impl From<minijinja::Error> for BuildError {
    fn from(e: minijinja::Error) -> Self {
        Self::TemplateError(e.to_string())
    }
}
