//! Destructive directory synchronization.
//!
//! Every directory in the plan goes through [`DirectorySync::materialize`]:
//!
//! | Target | Force | Result |
//! |--------|-------|--------|
//! | missing | either | created (with parents) |
//! | exists | on | removed recursively, recreated |
//! | exists | off | ask the [`Confirm`] port (see below) |
//!
//! A yes from the port wipes the directory and turns force on for every later
//! call. A no returns [`SyncOutcome::Declined`] and touches nothing.
//!
//! Because the first directory synced is the output root, which is normally
//! wiped, every later directory hits the "missing" row. The prompt only ever
//! fires for the output root in practice.
//!
//! Removal and recreation are two separate filesystem operations. A build
//! interrupted between them leaves no output root at all; the next build
//! simply creates it.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("confirmation prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

/// What [`DirectorySync::materialize`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Replaced,
    /// The operator refused to wipe the directory. Nothing was touched.
    Declined,
}

/// Asks the operator whether an existing directory may be wiped.
pub trait Confirm {
    fn confirm(&mut self, path: &Path) -> io::Result<bool>;
}

/// Line-oriented yes/no prompt over any reader/writer pair.
///
/// Only the exact answer `yes` accepts; the line ending and surrounding
/// whitespace are ignored. Anything else, including end of input, is a no.
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirm<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the controlling terminal.
    pub fn terminal() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, path: &Path) -> io::Result<bool> {
        write!(
            self.output,
            "{} exists. Contents will be deleted. Continue [yes/no]? ",
            path.display()
        )?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        Ok(answer.trim() == "yes")
    }
}

/// Creates output directories, wiping stale ones under the force/confirm
/// policy.
#[derive(Debug, Clone)]
pub struct DirectorySync {
    force: bool,
}

impl DirectorySync {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    /// Whether existing directories are currently wiped without asking.
    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Ensure `path` exists as a fresh, empty directory.
    pub fn materialize(
        &mut self,
        path: &Path,
        confirm: &mut impl Confirm,
    ) -> Result<SyncOutcome, SyncError> {
        // `symlink_metadata` so a dangling symlink still counts as existing.
        if fs::symlink_metadata(path).is_err() {
            create(path)?;
            return Ok(SyncOutcome::Created);
        }

        if !self.force {
            self.force = confirm.confirm(path).map_err(SyncError::Prompt)?;
            if !self.force {
                return Ok(SyncOutcome::Declined);
            }
        }

        remove(path)?;
        create(path)?;
        Ok(SyncOutcome::Replaced)
    }
}

fn create(path: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(path).map_err(|source| SyncError::Create {
        path: path.to_path_buf(),
        source,
    })
}

fn remove(path: &Path) -> Result<(), SyncError> {
    let is_dir = fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|source| SyncError::Remove {
        path: path.to_path_buf(),
        source,
    })
}
