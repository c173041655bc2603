//! Shared test utilities for the supernum test suite.
//!
//! Provides site fixture setup, a file writer that creates parent
//! directories, a content-hash snapshot of an output tree, and a scripted
//! [`Confirm`] port.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_site();
//! let mut builder = Builder::new(site_config(tmp.path())).unwrap();
//! let mut confirm = RecordingConfirm::declining();
//! builder.build(&mut confirm).unwrap();
//!
//! let snapshot = tree_snapshot(&tmp.path().join("build"));
//! assert!(snapshot.contains_key(Path::new("index.html")));
//! ```

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::BuildConfig;
use crate::sync::Confirm;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Default build configuration rooted at `dir`.
pub fn site_config(dir: &Path) -> BuildConfig {
    BuildConfig::default().in_dir(dir)
}

/// Write `content` to `path`, creating missing parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// =========================================================================
// Output inspection
// =========================================================================

/// Every regular file under `dir`, keyed by relative path, valued by the
/// SHA-256 of its contents. Two equal snapshots are byte-identical trees
/// (modulo empty directories).
pub fn tree_snapshot(dir: &Path) -> BTreeMap<PathBuf, String> {
    WalkDir::new(dir)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            let digest = Sha256::digest(fs::read(entry.path()).unwrap());
            (relative, format!("{:x}", digest))
        })
        .collect()
}

// =========================================================================
// Scripted confirmation
// =========================================================================

/// A [`Confirm`] port that gives the same answer every time and records
/// which paths it was asked about.
#[derive(Debug, Default)]
pub struct RecordingConfirm {
    answer: bool,
    pub asked: Vec<PathBuf>,
}

impl RecordingConfirm {
    pub fn accepting() -> Self {
        Self {
            answer: true,
            asked: Vec::new(),
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }
}

impl Confirm for RecordingConfirm {
    fn confirm(&mut self, path: &Path) -> io::Result<bool> {
        self.asked.push(path.to_path_buf());
        Ok(self.answer)
    }
}
