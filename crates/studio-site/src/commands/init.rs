//! Scaffold a Mongoose Studio site.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use studio_static::DEFAULT_PAGE_TEMPLATE;

/// Files written by `init`, relative to the project root.
const SCAFFOLD: &[(&str, &str)] = &[
    ("studio.toml", DEFAULT_CONFIG),
    ("templates/page.html", DEFAULT_PAGE_TEMPLATE),
    ("scripts/build-frontend.js", BUILD_FRONTEND_SCRIPT),
    ("changelog/0.1.0.md", DEFAULT_CHANGELOG_ENTRY),
    ("docs/index.md", DEFAULT_DOCS_INDEX),
    ("docs/getting-started.md", DEFAULT_GETTING_STARTED),
];

/// Run the init command in the current directory.
pub fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing Mongoose Studio site...");

    let created = scaffold(Path::new("."), yes)?;
    if created.is_empty() {
        tracing::warn!("Nothing to do, every file already exists. Use --yes to overwrite.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'studio-site build' to build the site.");

    Ok(())
}

/// Write the scaffold under `root`. Existing files are kept unless
/// `overwrite` is set. Returns the files written.
pub fn scaffold(root: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    for (relative, contents) in SCAFFOLD {
        let path = root.join(relative);
        if path.exists() && !overwrite {
            tracing::debug!("Keeping existing {}", relative);
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created {}", relative);
        created.push(path);
    }

    Ok(created)
}

const DEFAULT_CONFIG: &str = r#"# Mongoose Studio site configuration

[site]
# Product name used in page titles
name = "Mongoose Studio"

# Output directory for the built site
public_dir = "public"

# Shared HTML shell for changelog and docs pages
template = "templates/page.html"

# Social preview image for docs pages without an `image`
default_social_image = "https://mongoosestudio.app/images/og-image.png"

[content]
changelog_dir = "changelog"
docs_dir = "docs"

[frontend]
# Command that builds the Studio frontend
command = ["node", "scripts/build-frontend.js"]

# Where the frontend build leaves its static files
assets_dir = "node_modules/@mongoosejs/studio/frontend/public"

# Path the Studio API is mounted at
mount_path = "/api/studio"
"#;

const BUILD_FRONTEND_SCRIPT: &str = r#"'use strict';

// Builds the Mongoose Studio frontend for a static export.
// Invoked by `studio-site build` with STUDIO_MOUNT_PATH, STUDIO_STATIC_EXPORT
// and STUDIO_OPTIONS set in the environment.

const buildFrontend = require('@mongoosejs/studio/frontend');

const mountPath = process.env.STUDIO_MOUNT_PATH || '/api/studio';
const staticExport = process.env.STUDIO_STATIC_EXPORT === '1';
const options = JSON.parse(process.env.STUDIO_OPTIONS || '{}');

Promise.resolve(buildFrontend(mountPath, staticExport, options)).then(
  () => process.exit(0),
  err => {
    console.error(err);
    process.exit(1);
  }
);
"#;

const DEFAULT_CHANGELOG_ENTRY: &str = r#"---
version: 0.1.0
publishedAt: 2026-01-15
---

First public release of Mongoose Studio.

- Browse collections and documents
- Run queries from the browser
"#;

const DEFAULT_DOCS_INDEX: &str = r#"---
title: Documentation
description: Everything you need to run Mongoose Studio.
---

Welcome to the Mongoose Studio docs. Start with [Getting Started](getting-started.html).
"#;

const DEFAULT_GETTING_STARTED: &str = r#"---
title: Getting Started
description: Mount Mongoose Studio in an Express app.
---

Install the package:

```sh
npm install @mongoosejs/studio
```

Then mount it next to your API:

```javascript
const studio = require('@mongoosejs/studio/express');

app.use('/studio', await studio('/studio/api', mongoose));
```
"#;
