//! Markup decoders and the extension-keyed registry that dispatches to them.
//!
//! A [`Decoder`] turns one markup dialect into an HTML fragment. The
//! [`DecoderRegistry`] maps lower-cased file extensions to decoders:
//!
//! | Extension | Decoder | Output |
//! |-----------|---------|--------|
//! | `md` | [`Markdown`] | CommonMark via pulldown-cmark |
//! | `rst` | [`Restructured`] | Body fragment wrapped in `<div class="document">` |
//!
//! A file whose extension has a decoder is rendered and its destination name
//! gets the `.html` extension. Every other file is copied through untouched.
//! Lookup is by key, so registration order never matters, and registering an
//! extension twice is rejected.

mod markdown;
mod rst;

pub use markdown::Markdown;
pub use rst::Restructured;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension given to every rendered document.
pub const RENDERED_EXTENSION: &str = "html";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{dialect} line {line}: {message}")]
    Malformed {
        dialect: &'static str,
        line: usize,
        message: String,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a decoder for '.{0}' files is already registered")]
    Duplicate(String),
    #[error("invalid decoder extension '{0}'")]
    InvalidExtension(String),
}

/// Converts markup text to an HTML fragment.
pub trait Decoder {
    fn decode(&self, body: &str) -> Result<String, DecodeError>;
}

impl<F> Decoder for F
where
    F: Fn(&str) -> Result<String, DecodeError>,
{
    fn decode(&self, body: &str) -> Result<String, DecodeError> {
        self(body)
    }
}

/// Extension → decoder table.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: BTreeMap<String, Box<dyn Decoder>>,
}

impl DecoderRegistry {
    /// An empty registry: every file is copied through.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in `md` and `rst` decoders.
    pub fn with_builtins() -> Self {
        let mut decoders: BTreeMap<String, Box<dyn Decoder>> = BTreeMap::new();
        decoders.insert("md".to_string(), Box::new(Markdown));
        decoders.insert("rst".to_string(), Box::new(Restructured));
        Self { decoders }
    }

    /// Register `decoder` for files ending in `.{extension}`.
    ///
    /// Extensions are matched case-insensitively, without the leading dot.
    pub fn register(
        &mut self,
        extension: &str,
        decoder: impl Decoder + 'static,
    ) -> Result<(), RegistryError> {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        if key.is_empty() || key.contains(&['.', '/', '\\'][..]) {
            return Err(RegistryError::InvalidExtension(extension.to_string()));
        }
        if self.decoders.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        self.decoders.insert(key, Box::new(decoder));
        Ok(())
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// The decoder registered for `extension`, if any.
    pub fn get(&self, extension: &str) -> Option<&dyn Decoder> {
        self.decoders
            .get(&extension.to_ascii_lowercase())
            .map(|d| d.as_ref())
    }

    /// The registered extension matching `path`, lower-cased.
    ///
    /// `None` for files with no extension or an unregistered one.
    pub fn match_path(&self, path: &Path) -> Option<String> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        self.decoders.contains_key(&extension).then_some(extension)
    }

    /// Destination for a source path: `.html` when a decoder matches,
    /// unchanged otherwise.
    pub fn mirror_path(&self, path: &Path) -> PathBuf {
        match self.match_path(path) {
            Some(_) => path.with_extension(RENDERED_EXTENSION),
            None => path.to_path_buf(),
        }
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.decoders.keys()).finish()
    }
}
