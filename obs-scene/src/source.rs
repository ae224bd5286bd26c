//! Source abstraction consumed by scenes
//!
//! A source is anything that can draw itself: a capture device, an image, or
//! another scene. Sources are shared as `Arc<dyn Source>`; cloning the `Arc`
//! is an addref, dropping it a release.

use crate::scene::Scene;
use crate::transform::GraphicsContext;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, reference-counted handle to a source
pub type SourceRef = Arc<dyn Source>;

/// A renderable source
pub trait Source: Send + Sync {
    /// Stable human-readable identifier, used for lookup and persistence
    fn name(&self) -> &str;

    /// True once the source has been removed and should be dropped from any
    /// scene that still shows it
    fn is_removed(&self) -> bool {
        false
    }

    /// Draw with the transform currently on the graphics stack
    fn video_render(&self, gfx: &mut dyn GraphicsContext);

    fn width(&self) -> u32 {
        0
    }

    fn height(&self) -> u32 {
        0
    }

    /// Called when this source becomes a structural child of `parent`
    fn add_parent(&self, _parent: &dyn Source) {}

    /// Called when this source stops being a structural child of `parent`
    fn remove_parent(&self, _parent: &dyn Source) {}

    /// Visit the sources this source is composed of
    fn enum_sources(&self, _callback: &mut dyn FnMut(&SourceRef)) {}

    /// The scene behind this source, if it is one
    fn as_scene(&self) -> Option<Scene> {
        None
    }
}

/// Resolves sources by name, used when loading saved scenes
pub trait SourceResolver {
    fn source_by_name(&self, name: &str) -> Option<SourceRef>;
}

/// Thread-safe registry of named sources
///
/// Lookups return the first registered source with a matching name.
#[derive(Default)]
pub struct SourceRegistry {
    sources: RwLock<Vec<SourceRef>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source; the registry holds a reference until it is
    /// unregistered
    pub fn register(&self, source: SourceRef) {
        log::debug!("registering source '{}'", source.name());
        self.sources.write().push(source);
    }

    /// Remove every source with this name
    ///
    /// Returns the number of sources removed.
    pub fn unregister(&self, name: &str) -> usize {
        let mut sources = self.sources.write();
        let before = sources.len();
        sources.retain(|source| source.name() != name);
        before - sources.len()
    }

    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }
}

impl SourceResolver for SourceRegistry {
    fn source_by_name(&self, name: &str) -> Option<SourceRef> {
        self.sources
            .read()
            .iter()
            .find(|source| source.name() == name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Source for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn video_render(&self, _gfx: &mut dyn GraphicsContext) {}
    }

    #[test]
    fn test_registry_lookup() {
        let registry = SourceRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Named("camera")));
        registry.register(Arc::new(Named("mic")));
        assert_eq!(registry.len(), 2);

        let found = registry.source_by_name("mic").unwrap();
        assert_eq!(found.name(), "mic");
        assert!(registry.source_by_name("screen").is_none());
    }

    #[test]
    fn test_registry_first_match_wins() {
        let registry = SourceRegistry::new();
        let first: SourceRef = Arc::new(Named("dup"));
        registry.register(first.clone());
        registry.register(Arc::new(Named("dup")));

        let found = registry.source_by_name("dup").unwrap();
        assert!(Arc::ptr_eq(&found, &first));
    }

    #[test]
    fn test_registry_unregister() {
        let registry = SourceRegistry::new();
        registry.register(Arc::new(Named("dup")));
        registry.register(Arc::new(Named("dup")));
        registry.register(Arc::new(Named("other")));

        assert_eq!(registry.unregister("dup"), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.unregister("dup"), 0);
    }

    #[test]
    fn test_source_defaults() {
        let source = Named("plain");
        assert!(!source.is_removed());
        assert_eq!(source.width(), 0);
        assert!(source.as_scene().is_none());
    }
}
