//! Global context and the per-document render context.
//!
//! The global context is loaded once from the context file and never changes
//! for the rest of the build. Each document renders against a
//! [`RenderContext`]: a fresh copy of the global values with the document's
//! metadata laid on top.
//!
//! The overlay is shallow. A document key replaces the global value at that
//! key outright, even when both are mappings:
//!
//! ```text
//! global:   { title: Site, author: { name: Ada, mail: ada@example.org } }
//! document: { title: Page, author: { name: Grace } }
//! render:   { title: Page, author: { name: Grace } }
//! ```

use crate::config::Mapping;
use serde_json::Value;

/// Site-wide template values, read-only after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalContext {
    values: Mapping,
}

impl GlobalContext {
    pub fn new(values: Mapping) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build the context one document renders against: a copy of the global
    /// values with `metadata` applied on top. Document keys win.
    pub fn overlay(&self, metadata: &Mapping) -> RenderContext {
        let mut values = self.values.clone();
        for (key, value) in metadata {
            values.insert(key.clone(), value.clone());
        }
        RenderContext { values }
    }
}

/// The values one document is rendered with. Owned by that render alone.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    values: Mapping,
}

impl RenderContext {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Mapping {
        &self.values
    }

    pub fn to_tera(&self) -> tera::Context {
        let mut context = tera::Context::new();
        for (key, value) in &self.values {
            context.insert(key.as_str(), value);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            other => panic!("not a mapping: {other}"),
        }
    }

    #[test]
    fn document_keys_win() {
        let global = GlobalContext::new(mapping(json!({ "title": "Site" })));
        let render = global.overlay(&mapping(json!({ "title": "Page" })));
        assert_eq!(render.get("title"), Some(&json!("Page")));
    }

    #[test]
    fn global_keys_survive_when_not_overridden() {
        let global = GlobalContext::new(mapping(json!({ "title": "Site", "author": "Ada" })));
        let render = global.overlay(&mapping(json!({ "title": "Page" })));
        assert_eq!(render.get("author"), Some(&json!("Ada")));
    }

    #[test]
    fn overlay_is_shallow() {
        let global = GlobalContext::new(mapping(json!({
            "author": { "name": "Ada", "mail": "ada@example.org" }
        })));
        let render = global.overlay(&mapping(json!({ "author": { "name": "Grace" } })));
        assert_eq!(render.get("author"), Some(&json!({ "name": "Grace" })));
    }

    #[test]
    fn overlay_does_not_leak_between_documents() {
        let global = GlobalContext::new(mapping(json!({ "title": "Site" })));

        let first = global.overlay(&mapping(json!({ "title": "Page", "draft": true })));
        assert_eq!(first.get("title"), Some(&json!("Page")));

        let second = global.overlay(&Mapping::new());
        assert_eq!(second.get("title"), Some(&json!("Site")));
        assert_eq!(second.get("draft"), None);
        assert_eq!(global.get("title"), Some(&json!("Site")));
        assert_eq!(global.len(), 1);
    }

    #[test]
    fn empty_global_takes_document_values() {
        let global = GlobalContext::default();
        assert!(global.is_empty());
        let render = global.overlay(&mapping(json!({ "title": "Page" })));
        assert_eq!(render.values().len(), 1);
    }

    #[test]
    fn to_tera_carries_every_key() {
        let global = GlobalContext::new(mapping(json!({ "site": "Notes", "year": 2024 })));
        let context = global.overlay(&Mapping::new()).to_tera();
        assert_eq!(context.get("site"), Some(&json!("Notes")));
        assert_eq!(context.get("year"), Some(&json!(2024)));
    }
}
