//! Named registration point for embedding provider factories.

use std::collections::HashMap;
use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// A factory producing a configured [`EmbeddingProvider`].
pub type ProviderFactory = Box<dyn Fn() -> Result<Arc<dyn EmbeddingProvider>> + Send + Sync>;

/// A name → factory map for pluggable embedding providers.
///
/// Applications register the backends they ship and resolve one by the name
/// found in their configuration. The registry is an explicit value, not a
/// process-wide singleton.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// registry.register("ollama", || Ok(Arc::new(OllamaEmbedding::new())));
/// let provider = registry.create("ollama")?;
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous registration.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Result<Arc<dyn EmbeddingProvider>> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Instantiate the provider registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] for an unknown name, and
    /// whatever the factory itself fails with.
    pub fn create(&self, name: &str) -> Result<Arc<dyn EmbeddingProvider>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            RagError::InvalidConfig(format!("no embedding provider registered under '{name}'"))
        })?;
        factory()
    }

    /// Names of all registered providers, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
