use std::collections::HashMap;

use crate::error::RegistryError;

use super::{JsonRenderer, Renderer, XmlRenderer};

/// Builds a fresh renderer for one parse.
pub type RendererFactory = Box<dyn Fn() -> Box<dyn Renderer>>;

pub const DEFAULT_FORMAT: &str = "xml";

/// Maps format names to renderer factories.
///
/// Owned by whoever runs the parse; there is no process-wide registry.
pub struct RendererRegistry {
    factories: HashMap<String, RendererFactory>,
    default: String,
}

impl RendererRegistry {
    /// An empty registry. The default name is `xml` but nothing is registered.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            default: DEFAULT_FORMAT.to_string(),
        }
    }

    /// A registry with the `xml` and `json` renderers, `xml` as default.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("xml", || Box::new(XmlRenderer::new()));
        registry.register("json", || Box::new(JsonRenderer::new()));
        registry
    }

    /// Registers a factory, replacing any previous one under the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Renderer> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), RegistryError> {
        if !self.contains(name) {
            return Err(RegistryError::UnknownDefault(name.to_string()));
        }
        self.default = name.to_string();
        Ok(())
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the renderer registered as `name`, or the default one.
    pub fn resolve(&self, name: Option<&str>) -> Result<Box<dyn Renderer>, RegistryError> {
        let name = name.unwrap_or(&self.default);
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("formats", &self.names())
            .field("default", &self.default)
            .finish()
    }
}
