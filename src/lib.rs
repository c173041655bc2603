//! # Supernum
//!
//! A pragmatic static site generator. A source tree of Markdown and
//! reStructuredText documents, each optionally topped with a YAML metadata
//! block, is mirrored into an output tree of HTML pages rendered through a
//! single inheriting template. Everything else in the source tree (stylesheets,
//! images, fonts) is copied through byte-for-byte.
//!
//! # Architecture: Plan, Then Execute
//!
//! ```text
//! 1. Load     context.yaml + templates/  →  GlobalContext + TemplateComposer
//! 2. Plan     root/                      →  Vec<Action>   (no output touched)
//! 3. Execute  Vec<Action>                →  build/        (sync, render, copy)
//! ```
//!
//! Planning is a pure walk of the source tree: it decides which directories to
//! create and which files to render or copy, and where each lands. Execution
//! applies that plan in order. Keeping the two apart makes `--dry-run` free and
//! lets tests assert the exact shape of a build without writing a byte.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Build paths and flags, context file loading (YAML or TOML) |
//! | [`context`] | Immutable global context and the per-document overlay |
//! | [`split`] | Separates a document's metadata block from its body |
//! | [`decode`] | Extension-keyed decoder registry: Markdown and reStructuredText |
//! | [`template`] | Synthetic `extends "base.html"` template composition via Tera |
//! | [`plan`] | Source tree walk producing the ordered action plan |
//! | [`sync`] | Destructive directory (re)creation behind a confirmation port |
//! | [`build`] | Orchestrator: load, plan, execute |
//! | [`output`] | CLI output formatting for progress, plans, and summaries |
//!
//! # Design Decisions
//!
//! ## Wipe, Then Rebuild
//!
//! There is no incremental mode. The output root is removed and recreated on
//! every build (after confirmation, or unconditionally with `--force`), so the
//! output is always exactly a function of the source tree, the context file
//! and the templates. Two forced builds of the same input are byte-identical.
//!
//! ## Shallow Metadata Overlay
//!
//! A document's metadata keys replace global context keys wholesale. Nested
//! mappings are not merged: `nav:` in a document replaces the global `nav:`
//! entirely. Each document gets a fresh copy, so nothing one page sets can
//! leak into the next.
//!
//! ## Templates Are Evaluated Inside Documents
//!
//! The decoded HTML is spliced into the synthetic template's `content` block
//! before the template is parsed, so a document may use `{{ title }}` or any
//! other Tera expression in its body.

pub mod build;
pub mod config;
pub mod context;
pub mod decode;
pub mod output;
pub mod plan;
pub mod split;
pub mod sync;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
