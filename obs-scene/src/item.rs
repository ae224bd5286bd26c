//! Scene items
//!
//! A [`SceneItem`] binds one source to a 2D transform and a position in its
//! scene's paint order. Handles are reference counted: cloning is an addref,
//! dropping a release. The scene's list holds one reference for as long as
//! the item is linked; the item (and its source reference) is destroyed when
//! the last handle goes away, which may be well after it left the scene.

use crate::list::ItemKey;
use crate::scene::{Scene, SceneInner};
use crate::source::SourceRef;
use crate::types::{ItemTransform, OrderMovement};
use glam::Vec2;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Copy)]
struct ItemState {
    transform: ItemTransform,
    visible: bool,
}

struct ItemInner {
    key: ItemKey,
    source: SourceRef,
    state: Mutex<ItemState>,
    removed: AtomicBool,
    parent: Mutex<Weak<SceneInner>>,
}

impl Drop for ItemInner {
    fn drop(&mut self) {
        log::trace!("destroying scene item for source '{}'", self.source.name());
    }
}

/// Handle to an item in a scene
#[derive(Clone)]
pub struct SceneItem {
    inner: Arc<ItemInner>,
}

impl SceneItem {
    pub(crate) fn new(key: ItemKey, source: SourceRef, parent: Weak<SceneInner>) -> Self {
        Self {
            inner: Arc::new(ItemInner {
                key,
                source,
                state: Mutex::new(ItemState {
                    transform: ItemTransform::default(),
                    visible: true,
                }),
                removed: AtomicBool::new(false),
                parent: Mutex::new(parent),
            }),
        }
    }

    pub(crate) fn key(&self) -> ItemKey {
        self.inner.key
    }

    /// Set the removed flag; returns true if it was already set
    pub(crate) fn mark_removed(&self) -> bool {
        self.inner.removed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn clear_parent(&self) {
        *self.inner.parent.lock() = Weak::new();
    }

    pub(crate) fn parent_inner(&self) -> Option<Arc<SceneInner>> {
        self.inner.parent.lock().upgrade()
    }

    /// Take an additional reference
    pub fn addref(&self) -> SceneItem {
        self.clone()
    }

    /// Give up this reference; the last release destroys the item
    pub fn release(self) {
        drop(self);
    }

    /// Number of live references, including the scene's own while linked
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// True if both handles refer to the same item
    pub fn ptr_eq(&self, other: &SceneItem) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The scene this item belongs to, or `None` once it has been removed
    pub fn scene(&self) -> Option<Scene> {
        self.parent_inner().map(Scene::from_inner)
    }

    pub fn source(&self) -> &SourceRef {
        &self.inner.source
    }

    /// Name of the item's source
    pub fn name(&self) -> &str {
        self.inner.source.name()
    }

    pub fn is_removed(&self) -> bool {
        self.inner.removed.load(Ordering::Acquire)
    }

    /// Detach the item from its scene
    ///
    /// Idempotent: only the first call has any effect.
    pub fn remove(&self) {
        if let Some(scene) = self.parent_inner() {
            scene.remove_item(self);
        }
    }

    /// Move the item within its scene's paint order
    pub fn set_order(&self, movement: OrderMovement) {
        if let Some(scene) = self.scene() {
            scene.set_order(self, movement);
        }
    }

    pub fn transform(&self) -> ItemTransform {
        self.inner.state.lock().transform
    }

    pub fn pos(&self) -> Vec2 {
        self.inner.state.lock().transform.pos
    }

    pub fn rot(&self) -> f32 {
        self.inner.state.lock().transform.rot
    }

    pub fn origin(&self) -> Vec2 {
        self.inner.state.lock().transform.origin
    }

    pub fn scale(&self) -> Vec2 {
        self.inner.state.lock().transform.scale
    }

    pub fn visible(&self) -> bool {
        self.inner.state.lock().visible
    }

    /// Setters return `false` and leave the item unchanged if it has been
    /// removed or the value isn't finite.
    pub fn set_transform(&self, transform: ItemTransform) -> bool {
        self.check_finite(transform.is_finite(), "transform")
            && self.update(|state| state.transform = transform)
    }

    pub fn set_pos(&self, pos: Vec2) -> bool {
        self.check_finite(pos.is_finite(), "position")
            && self.update(|state| state.transform.pos = pos)
    }

    pub fn set_rot(&self, rot: f32) -> bool {
        self.check_finite(rot.is_finite(), "rotation")
            && self.update(|state| state.transform.rot = rot)
    }

    pub fn set_origin(&self, origin: Vec2) -> bool {
        self.check_finite(origin.is_finite(), "origin")
            && self.update(|state| state.transform.origin = origin)
    }

    pub fn set_scale(&self, scale: Vec2) -> bool {
        self.check_finite(scale.is_finite(), "scale")
            && self.update(|state| state.transform.scale = scale)
    }

    pub fn set_visible(&self, visible: bool) -> bool {
        self.update(|state| state.visible = visible)
    }

    fn check_finite(&self, finite: bool, what: &str) -> bool {
        if !finite {
            log::debug!(
                "ignoring non-finite {} for scene item '{}'",
                what,
                self.inner.source.name()
            );
        }
        finite
    }

    /// Apply a change unless the item has been removed
    fn update<F>(&self, update_fn: F) -> bool
    where
        F: FnOnce(&mut ItemState),
    {
        if self.is_removed() {
            log::debug!(
                "ignoring update to removed scene item '{}'",
                self.inner.source.name()
            );
            return false;
        }
        update_fn(&mut self.inner.state.lock());
        true
    }
}

impl PartialEq for SceneItem {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for SceneItem {}

impl std::fmt::Debug for SceneItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneItem")
            .field("name", &self.name())
            .field("removed", &self.is_removed())
            .field("transform", &self.transform())
            .finish()
    }
}
