//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::helpers::today;
use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Site
name: Me
description: ''
language: en
url: http://localhost:3000

# Layout
avatar: /images/profile.jpg
favicon: /favicon.ico
stylesheet: /styles/global.css
intro:
  - Hello! Welcome to my site.

# Directory
content_dir: posts
static_dir: public
output_dir: out

# Writing
markdown:
  highlight: true
  highlight_theme: InspiredGitHub
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("public/images"))?;
    fs::create_dir_all(target_dir.join("public/styles"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("public/styles/global.css"), "")?;

    let sample_post = format!(
        r#"---
title: Hello World
date: '{}'
---

Welcome! This is your first post. Edit or delete it, then start writing.

## Writing posts

Create `posts/<name>.md` or `posts/<name>.mdx`; it is published at `/posts/<name>`.

```bash
$ folio new "My New Post"
```

## Previewing

```bash
$ folio server
```
"#,
        today()
    );
    fs::write(target_dir.join("posts/hello-world.md"), sample_post)?;

    Ok(())
}
