//! Template composition.
//!
//! Every rendered document is a tiny synthetic template that inherits the
//! site's `base.html` and fills its `content` block with the decoded HTML:
//!
//! ```jinja
//! {% extends "base.html" %}
//! {% block content %}<h1>Title</h1>
//! <p>Hello</p>
//! {% endblock content %}
//! ```
//!
//! Templates are loaded once from the template directory (recursively, named
//! by their `/`-separated path relative to it), so `base.html` can itself
//! `{% include %}` or `{% extends %}` anything else in there.
//!
//! Autoescaping is off: metadata values are inserted verbatim, the way a
//! classic Jinja environment behaves. Use `| escape` in templates where a
//! value may carry markup.

use crate::config::Mapping;
use crate::context::GlobalContext;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the template every document inherits from.
pub const BASE_TEMPLATE: &str = "base.html";

/// Block in [`BASE_TEMPLATE`] that receives each document's HTML.
pub const CONTENT_BLOCK: &str = "content";

/// Name the synthetic per-document template is registered under.
const DOCUMENT_TEMPLATE: &str = "__document__";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("cannot read template directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("cannot read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load templates from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
    #[error("base template 'base.html' not found in {0}")]
    MissingBase(PathBuf),
    #[error("failed to compose document template: {0}")]
    Compose(#[source] tera::Error),
    #[error("failed to render document: {0}")]
    Render(#[source] tera::Error),
}

/// Owns the template engine and renders documents through `base.html`.
pub struct TemplateComposer {
    tera: Tera,
}

impl TemplateComposer {
    /// Load every text file under `dir` as a template. `dir` must contain
    /// [`BASE_TEMPLATE`].
    ///
    /// Hidden entries (`.DS_Store`, `.git/`) and files that are not UTF-8
    /// (images, fonts) are skipped rather than rejected.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut templates = Vec::new();
        let walker = WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

        for entry in walker {
            let entry = entry.map_err(|source| TemplateError::Directory {
                path: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let bytes = fs::read(entry.path()).map_err(|source| TemplateError::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let Ok(source) = String::from_utf8(bytes) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            templates.push((name, source));
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates)
            .map_err(|source| TemplateError::Load {
                path: dir.to_path_buf(),
                source,
            })?;

        if !tera.get_template_names().any(|name| name == BASE_TEMPLATE) {
            return Err(TemplateError::MissingBase(dir.to_path_buf()));
        }
        Ok(Self { tera })
    }

    /// Build a composer from in-memory `(name, source)` templates.
    pub fn from_templates(templates: &[(&str, &str)]) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates.to_vec())
            .map_err(|source| TemplateError::Load {
                path: PathBuf::new(),
                source,
            })?;
        if !tera.get_template_names().any(|name| name == BASE_TEMPLATE) {
            return Err(TemplateError::MissingBase(PathBuf::new()));
        }
        Ok(Self { tera })
    }

    /// Render `fragment` inside `base.html` with `metadata` laid over
    /// `global`. Returns UTF-8 bytes.
    pub fn render(
        &mut self,
        fragment: &str,
        global: &GlobalContext,
        metadata: &Mapping,
    ) -> Result<Vec<u8>, TemplateError> {
        let context = global.overlay(metadata).to_tera();
        self.tera
            .add_raw_template(DOCUMENT_TEMPLATE, &synthetic_template(fragment))
            .map_err(TemplateError::Compose)?;
        let html = self
            .tera
            .render(DOCUMENT_TEMPLATE, &context)
            .map_err(TemplateError::Render)?;
        Ok(html.into_bytes())
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

/// The per-document template source.
pub fn synthetic_template(fragment: &str) -> String {
    format!(
        "{{% extends \"{BASE_TEMPLATE}\" %}}\n\
         {{% block {CONTENT_BLOCK} %}}{fragment}{{% endblock {CONTENT_BLOCK} %}}"
    )
}

impl std::fmt::Debug for TemplateComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self
            .tera
            .get_template_names()
            .filter(|n| *n != DOCUMENT_TEMPLATE)
            .collect();
        names.sort_unstable();
        f.debug_struct("TemplateComposer")
            .field("templates", &names)
            .finish()
    }
}
