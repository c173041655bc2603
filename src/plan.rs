//! Build planning: mirror the source tree into an ordered list of actions.
//!
//! Planning walks the source root and decides, for every entry, what the
//! build will do with it. Nothing is written; the output root is not even
//! looked at. The build then executes the plan front to back.
//!
//! ```text
//! root/                     CreateDir build/
//! ├── about.rst             Render    root/about.rst      → build/about.html
//! ├── blog/                 CreateDir build/blog/
//! │   └── 2024/             CreateDir build/blog/2024/
//! │       └── first.md      Render    root/blog/2024/first.md → build/blog/2024/first.html
//! └── css/                  CreateDir build/css/
//!     └── site.css          Copy      root/css/site.css   → build/css/site.css
//! ```
//!
//! ## Ordering
//!
//! The output root comes first and every directory precedes everything beneath
//! it, so executing in order never writes a file into a directory that does
//! not exist yet. Siblings are sorted by file name, which makes plans (and the
//! progress output) deterministic.
//!
//! ## What is visited
//!
//! Everything under the source root, once. Symlinks are followed. The one
//! exception is an output root nested inside the source root: it is skipped,
//! or every build would copy the previous build into itself.

use crate::decode::DecoderRegistry;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("source root {0} is not a directory")]
    MissingRoot(PathBuf),
    #[error("cannot walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One step of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Materialize an output directory (destructively, see [`crate::sync`]).
    CreateDir { dst: PathBuf },
    /// Split, decode and template `src` into `dst`.
    Render {
        src: PathBuf,
        dst: PathBuf,
        /// Registered extension that selected the decoder.
        extension: String,
    },
    /// Copy `src` to `dst` byte-for-byte.
    Copy { src: PathBuf, dst: PathBuf },
}

impl Action {
    pub fn destination(&self) -> &Path {
        match self {
            Action::CreateDir { dst }
            | Action::Render { dst, .. }
            | Action::Copy { dst, .. } => dst,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        match self {
            Action::CreateDir { .. } => None,
            Action::Render { src, .. } | Action::Copy { src, .. } => Some(src),
        }
    }
}

/// Plan the build of `root` into `output`.
pub fn plan(
    root: &Path,
    output: &Path,
    decoders: &DecoderRegistry,
) -> Result<Vec<Action>, PlanError> {
    if !root.is_dir() {
        return Err(PlanError::MissingRoot(root.to_path_buf()));
    }

    let mut actions = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.path() != output);

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        if entry.file_type().is_dir() {
            let dst = if entry.depth() == 0 {
                output.to_path_buf()
            } else {
                output.join(relative)
            };
            actions.push(Action::CreateDir { dst });
            continue;
        }

        let src = entry.path().to_path_buf();
        let dst = output.join(decoders.mirror_path(relative));
        match decoders.match_path(relative) {
            Some(extension) => actions.push(Action::Render {
                src,
                dst,
                extension,
            }),
            None => actions.push(Action::Copy { src, dst }),
        }
    }
    Ok(actions)
}
