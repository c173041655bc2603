//! Build configuration and context file loading.
//!
//! Two kinds of configuration feed a build:
//!
//! - [`BuildConfig`]: where things live (context file, templates, source root,
//!   output root) and whether the output may be wiped without asking. Set from
//!   the command line; every field has a default.
//! - The **context file**: a YAML document (`context.yaml` by default) whose
//!   top-level mapping becomes the [`GlobalContext`] every page renders
//!   against. A file ending in `.toml` is read as TOML instead.
//!
//! ```yaml
//! # context.yaml
//! site: Field Notes
//! author: Ada
//! nav:
//!   - { title: Home, href: / }
//!   - { title: Blog, href: /blog/ }
//! ```
//!
//! An empty context file (or one holding only comments) is an empty mapping.
//! Anything that parses but is not a mapping, a bare list or a scalar, is
//! rejected.
//!
//! The same YAML rules apply to per-document metadata blocks, parsed with
//! [`parse_yaml_mapping`].

use crate::context::GlobalContext;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A string-keyed mapping of structured values. This is the value model both
/// the context file and document metadata deserialize into, and the one Tera
/// renders against.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a key/value mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Paths and flags for one build.
///
/// Relative paths are resolved against a working directory with
/// [`BuildConfig::in_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Context file holding the global template context.
    pub context: PathBuf,
    /// Directory containing `base.html` and any templates it pulls in.
    pub templates: PathBuf,
    /// Directory index file name. Recorded but not used by the pipeline.
    pub index: String,
    /// Source root: the document tree to mirror.
    pub root: PathBuf,
    /// Output root: wiped and rebuilt on every run.
    pub build: PathBuf,
    /// Wipe an existing output root without asking.
    pub force: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            context: PathBuf::from("context.yaml"),
            templates: PathBuf::from("templates"),
            index: "index.html".to_string(),
            root: PathBuf::from("root"),
            build: PathBuf::from("build"),
            force: false,
        }
    }
}

impl BuildConfig {
    /// Resolve every relative path against `workdir`. Absolute paths are kept.
    pub fn in_dir(self, workdir: &Path) -> Self {
        Self {
            context: workdir.join(&self.context),
            templates: workdir.join(&self.templates),
            root: workdir.join(&self.root),
            build: workdir.join(&self.build),
            ..self
        }
    }
}

/// Load the global context from a YAML (or `.toml`) file.
pub fn load_context(path: &Path) -> Result<GlobalContext, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let values = if is_toml {
        parse_toml_mapping(&content)?
    } else {
        parse_yaml_mapping(&content)?
    };
    Ok(GlobalContext::new(values))
}

/// Parse YAML text into a mapping.
///
/// Empty text, or text holding only comments and document markers, is an
/// empty mapping. A document that parses to `null` is too.
pub fn parse_yaml_mapping(text: &str) -> Result<Mapping, ConfigError> {
    if is_blank_document(text) {
        return Ok(Mapping::new());
    }
    let value: serde_json::Value = serde_yaml_ng::from_str(text)?;
    into_mapping(value)
}

fn parse_toml_mapping(text: &str) -> Result<Mapping, ConfigError> {
    let table: toml::Table = toml::from_str(text)?;
    into_mapping(serde_json::to_value(table)?)
}

/// Whether `text` holds no YAML content: only blank lines, comments and
/// document markers.
pub(crate) fn is_blank_document(text: &str) -> bool {
    text.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn into_mapping(value: serde_json::Value) -> Result<Mapping, ConfigError> {
    use serde_json::Value;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        Value::Bool(_) => Err(ConfigError::NotAMapping("a boolean")),
        Value::Number(_) => Err(ConfigError::NotAMapping("a number")),
        Value::String(_) => Err(ConfigError::NotAMapping("a string")),
        Value::Array(_) => Err(ConfigError::NotAMapping("a list")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn default_config_paths() {
        let config = BuildConfig::default();
        assert_eq!(config.context, PathBuf::from("context.yaml"));
        assert_eq!(config.templates, PathBuf::from("templates"));
        assert_eq!(config.index, "index.html");
        assert_eq!(config.root, PathBuf::from("root"));
        assert_eq!(config.build, PathBuf::from("build"));
        assert!(!config.force);
    }

    #[test]
    fn in_dir_resolves_relative_paths() {
        let config = BuildConfig::default().in_dir(Path::new("/srv/site"));
        assert_eq!(config.context, PathBuf::from("/srv/site/context.yaml"));
        assert_eq!(config.templates, PathBuf::from("/srv/site/templates"));
        assert_eq!(config.root, PathBuf::from("/srv/site/root"));
        assert_eq!(config.build, PathBuf::from("/srv/site/build"));
        // Not a path
        assert_eq!(config.index, "index.html");
    }

    #[test]
    fn in_dir_keeps_absolute_paths() {
        let config = BuildConfig {
            build: PathBuf::from("/tmp/out"),
            ..BuildConfig::default()
        }
        .in_dir(Path::new("/srv/site"));
        assert_eq!(config.build, PathBuf::from("/tmp/out"));
        assert_eq!(config.root, PathBuf::from("/srv/site/root"));
    }

    // =========================================================================
    // YAML mappings
    // =========================================================================

    #[test]
    fn parse_yaml_mapping_reads_keys() {
        let map = parse_yaml_mapping("title: Page\ntags: [a, b]\n").unwrap();
        assert_eq!(map["title"], json!("Page"));
        assert_eq!(map["tags"], json!(["a", "b"]));
    }

    #[test]
    fn parse_yaml_mapping_nested_values() {
        let map = parse_yaml_mapping("author:\n  name: Ada\n  mail: ada@example.org\n").unwrap();
        assert_eq!(map["author"]["name"], json!("Ada"));
    }

    #[test]
    fn empty_yaml_is_empty_mapping() {
        assert!(parse_yaml_mapping("").unwrap().is_empty());
        assert!(parse_yaml_mapping("   \n\n").unwrap().is_empty());
    }

    #[test]
    fn comment_only_yaml_is_empty_mapping() {
        assert!(parse_yaml_mapping("# Title").unwrap().is_empty());
        assert!(parse_yaml_mapping("---\n# nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn explicit_null_is_empty_mapping() {
        assert!(parse_yaml_mapping("~").unwrap().is_empty());
        assert!(parse_yaml_mapping("null").unwrap().is_empty());
    }

    #[test]
    fn scalar_yaml_is_rejected() {
        let result = parse_yaml_mapping("Hello world");
        assert!(matches!(result, Err(ConfigError::NotAMapping("a string"))));
    }

    #[test]
    fn list_yaml_is_rejected() {
        let result = parse_yaml_mapping("- one\n- two\n");
        assert!(matches!(result, Err(ConfigError::NotAMapping("a list"))));
    }

    #[test]
    fn malformed_yaml_is_error() {
        let result = parse_yaml_mapping("title: [unclosed\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    // =========================================================================
    // load_context
    // =========================================================================

    #[test]
    fn load_context_reads_yaml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("context.yaml");
        fs::write(&path, "site: Field Notes\nyear: 2024\n").unwrap();

        let context = load_context(&path).unwrap();
        assert_eq!(context.get("site"), Some(&json!("Field Notes")));
        assert_eq!(context.get("year"), Some(&json!(2024)));
    }

    #[test]
    fn load_context_empty_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("context.yaml");
        fs::write(&path, "").unwrap();

        assert!(load_context(&path).unwrap().is_empty());
    }

    #[test]
    fn load_context_reads_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("context.toml");
        fs::write(
            &path,
            r#"
site = "Field Notes"

[author]
name = "Ada"
"#,
        )
        .unwrap();

        let context = load_context(&path).unwrap();
        assert_eq!(context.get("site"), Some(&json!("Field Notes")));
        assert_eq!(context.get("author"), Some(&json!({ "name": "Ada" })));
    }

    #[test]
    fn load_context_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("context.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        assert!(matches!(load_context(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_context_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.yaml");

        match load_context(&path) {
            Err(ConfigError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
