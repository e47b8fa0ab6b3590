//! Component catalog
//!
//! Maps component type names to host renderer handles. The processor and the
//! tree resolver never consult this - an unknown type is a rendering-layer
//! concern, not a resolution failure - so the renderer type is left fully
//! generic: a host binding registers whatever it dispatches on (a function, a
//! widget factory, an enum).

use std::collections::HashMap;

/// Registry of renderers keyed by component type name.
#[derive(Debug, Clone)]
pub struct Catalog<R> {
    renderers: HashMap<String, R>,
}

impl<R> Default for Catalog<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Catalog<R> {
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Register a renderer for `type_name`, replacing any previous one.
    pub fn register(&mut self, type_name: impl Into<String>, renderer: R) {
        self.renderers.insert(type_name.into(), renderer);
    }

    pub fn get(&self, type_name: &str) -> Option<&R> {
        self.renderers.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.renderers.contains_key(type_name)
    }

    /// Registered type names, in stable (sorted) order.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut catalog: Catalog<fn() -> &'static str> = Catalog::new();
        catalog.register("Text", || "text");
        catalog.register("Image", || "image");

        assert!(catalog.contains("Text"));
        assert!(!catalog.contains("Video"));
        assert_eq!(catalog.get("Text").map(|r| r()), Some("text"));
        assert_eq!(catalog.type_names(), vec!["Image", "Text"]);
    }

    #[test]
    fn test_register_replaces() {
        let mut catalog: Catalog<u32> = Catalog::new();
        catalog.register("Text", 1);
        catalog.register("Text", 2);
        assert_eq!(catalog.get("Text"), Some(&2));
    }
}
