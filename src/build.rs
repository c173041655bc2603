//! Build orchestration: load, plan, execute.
//!
//! [`Builder::new`] does all the fallible setup up front (context file,
//! templates, decoders) so a misconfigured site fails before the output tree
//! is touched. [`Builder::build`] then plans the source tree and runs the plan
//! in order:
//!
//! ```text
//! CreateDir  →  DirectorySync::materialize   (may stop the build: Declined)
//! Render     →  read → split → decode → compose → write
//! Copy       →  fs::copy
//! ```
//!
//! The first error aborts the build. Files already written stay where they
//! are; the next build wipes them anyway.
//!
//! Progress is reported through a [`BuildEvent`] callback rather than printed,
//! so the CLI decides what to show and tests can observe the exact sequence.

use crate::config::{self, BuildConfig, ConfigError};
use crate::context::GlobalContext;
use crate::decode::{DecodeError, DecoderRegistry};
use crate::plan::{self, Action, PlanError};
use crate::split::split_content;
use crate::sync::{Confirm, DirectorySync, SyncError, SyncOutcome};
use crate::template::{TemplateComposer, TemplateError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("invalid metadata block in {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("no decoder registered for '.{extension}' ({path})")]
    NoDecoder { path: PathBuf, extension: String },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("cannot render {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },
    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
    move |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Progress reported while a plan executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEvent<'a> {
    Directory { path: &'a Path, outcome: SyncOutcome },
    Rendered { src: &'a Path, dst: &'a Path },
    Copied { src: &'a Path, dst: &'a Path },
}

/// Counts for a completed build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub directories: usize,
    pub rendered: usize,
    pub copied: usize,
}

/// How a build ended. Declining is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Completed(BuildReport),
    /// The operator refused to wipe `path`. Nothing under it was changed.
    Declined { path: PathBuf },
}

/// A loaded site, ready to plan and build.
#[derive(Debug)]
pub struct Builder {
    config: BuildConfig,
    context: GlobalContext,
    templates: TemplateComposer,
    decoders: DecoderRegistry,
}

impl Builder {
    /// Load the context file and templates named by `config`, with the
    /// built-in decoders.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        Self::with_decoders(config, DecoderRegistry::with_builtins())
    }

    /// Like [`Builder::new`] with a caller-supplied decoder registry.
    pub fn with_decoders(
        config: BuildConfig,
        decoders: DecoderRegistry,
    ) -> Result<Self, BuildError> {
        let context = config::load_context(&config.context)?;
        let templates = TemplateComposer::load(&config.templates)?;
        Ok(Self {
            config,
            context,
            templates,
            decoders,
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn context(&self) -> &GlobalContext {
        &self.context
    }

    pub fn decoders(&self) -> &DecoderRegistry {
        &self.decoders
    }

    /// What a build would do, without doing it.
    pub fn plan(&self) -> Result<Vec<Action>, BuildError> {
        Ok(plan::plan(&self.config.root, &self.config.build, &self.decoders)?)
    }

    /// Build the site, asking `confirm` before wiping an existing output root
    /// (unless forced).
    pub fn build(&mut self, confirm: &mut impl Confirm) -> Result<BuildOutcome, BuildError> {
        self.build_with(confirm, |_| {})
    }

    /// [`Builder::build`], reporting each executed action to `on_event`.
    pub fn build_with(
        &mut self,
        confirm: &mut impl Confirm,
        mut on_event: impl FnMut(&BuildEvent<'_>),
    ) -> Result<BuildOutcome, BuildError> {
        let actions = self.plan()?;
        let mut sync = DirectorySync::new(self.config.force);
        let mut report = BuildReport::default();

        for action in &actions {
            match action {
                Action::CreateDir { dst } => {
                    let outcome = sync.materialize(dst, confirm)?;
                    if outcome == SyncOutcome::Declined {
                        return Ok(BuildOutcome::Declined { path: dst.clone() });
                    }
                    report.directories += 1;
                    on_event(&BuildEvent::Directory { path: dst, outcome });
                }
                Action::Render {
                    src,
                    dst,
                    extension,
                } => {
                    self.render_file(src, dst, extension)?;
                    report.rendered += 1;
                    on_event(&BuildEvent::Rendered { src, dst });
                }
                Action::Copy { src, dst } => {
                    fs::copy(src, dst).map_err(io_error(src))?;
                    report.copied += 1;
                    on_event(&BuildEvent::Copied { src, dst });
                }
            }
        }
        Ok(BuildOutcome::Completed(report))
    }

    fn render_file(&mut self, src: &Path, dst: &Path, extension: &str) -> Result<(), BuildError> {
        let bytes = fs::read(src).map_err(io_error(src))?;
        let text = std::str::from_utf8(&bytes).map_err(|source| BuildError::Encoding {
            path: src.to_path_buf(),
            source,
        })?;

        let document = split_content(text).map_err(|source| BuildError::Metadata {
            path: src.to_path_buf(),
            source,
        })?;

        let decoder = self
            .decoders
            .get(extension)
            .ok_or_else(|| BuildError::NoDecoder {
                path: src.to_path_buf(),
                extension: extension.to_string(),
            })?;
        let fragment = decoder
            .decode(document.body)
            .map_err(|source| BuildError::Decode {
                path: src.to_path_buf(),
                source,
            })?;

        let html = self
            .templates
            .render(&fragment, &self.context, &document.metadata)
            .map_err(|source| BuildError::Render {
                path: src.to_path_buf(),
                source,
            })?;
        fs::write(dst, html).map_err(io_error(dst))
    }
}
