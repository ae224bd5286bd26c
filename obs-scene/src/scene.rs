//! Scene management with a re-entrant lock over an ordered item list
//!
//! A scene is itself a source: [`Scene::as_source`] hands out the same
//! reference-counted object, so scenes can be shown inside other scenes and
//! adding/releasing a scene reference is the host source's refcount.
//!
//! Every structural read or write of the item list happens under the scene's
//! single `ReentrantMutex`. Re-entrancy lets teardown, load and the render
//! pass call back into `remove` while already holding the lock. The
//! `RefCell` inside is only ever borrowed for short stretches that never
//! call out of the module.

use crate::error::SceneError;
use crate::item::SceneItem;
use crate::list::ItemList;
use crate::signal::{SceneEvent, SceneEventKind, SignalHandler};
use crate::source::{Source, SourceRef, SourceResolver};
use crate::transform::GraphicsContext;
use crate::types::{OrderMovement, RenderContext};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

pub(crate) struct SceneInner {
    name: String,
    context: RenderContext,
    items: ReentrantMutex<RefCell<ItemList>>,
    signals: SignalHandler,
    removed: AtomicBool,
    self_ref: Weak<SceneInner>,
}

impl SceneInner {
    fn weak_scene(&self) -> WeakScene {
        WeakScene {
            inner: self.self_ref.clone(),
        }
    }

    /// Visit every item in paint order under the lock.
    ///
    /// Each visit holds a temporary reference to the item; both neighbours
    /// are captured before the visit so the visitor may remove the item and
    /// its successor. Stops when the visitor returns false.
    pub(crate) fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&SceneItem) -> bool,
    {
        let guard = self.items.lock();
        let mut cursor = guard.borrow().head();

        while let Some(key) = cursor {
            let (item, prev, captured) = {
                let list = guard.borrow();
                (list.get(key).cloned(), list.prev(key), list.next(key))
            };
            let Some(item) = item else {
                break;
            };

            let keep_going = visit(&item);
            drop(item);
            if !keep_going {
                break;
            }

            cursor = guard.borrow().resume_after(key, prev, captured);
        }
    }

    /// Detach an item from this scene; idempotent.
    pub(crate) fn remove_item(&self, item: &SceneItem) {
        let guard = self.items.lock();

        if item.mark_removed() {
            return;
        }

        item.source().remove_parent(self);
        self.signals.emit(SceneEvent::ItemRemoved {
            scene: self.weak_scene(),
            item: item.clone(),
        });

        let taken = guard.borrow_mut().take(item.key());
        item.clear_parent();
        drop(guard);

        // the list's reference
        drop(taken);
    }

    /// Remove items from the head until the list is empty
    ///
    /// `remove_parent` hooks may remove other items along the way.
    pub(crate) fn remove_all(&self) {
        let guard = self.items.lock();
        loop {
            let head = {
                let list = guard.borrow();
                list.head().and_then(|key| list.get(key).cloned())
            };
            let Some(item) = head else {
                break;
            };

            if item.is_removed() {
                // already being removed further up this thread's stack
                let taken = guard.borrow_mut().take(item.key());
                drop(taken);
                continue;
            }
            self.remove_item(&item);
        }
    }

    /// True if `source` is this scene or shows it somewhere below
    fn is_reachable_from(&self, source: &SourceRef) -> bool {
        let is_self = source
            .as_scene()
            .map_or(false, |scene| std::ptr::eq(scene.inner(), self));
        if is_self {
            return true;
        }

        let mut found = false;
        source.enum_sources(&mut |child| {
            if !found && self.is_reachable_from(child) {
                found = true;
            }
        });
        found
    }

    fn set_order(&self, item: &SceneItem, movement: OrderMovement) {
        let guard = self.items.lock();
        if item.is_removed() || !self.owns(&guard.borrow(), item) {
            return;
        }
        guard.borrow_mut().reorder(item.key(), movement);
    }

    fn owns(&self, list: &ItemList, item: &SceneItem) -> bool {
        list.get(item.key())
            .map_or(false, |linked| linked.ptr_eq(item))
    }
}

impl Drop for SceneInner {
    fn drop(&mut self) {
        self.remove_all();
        log::debug!("scene '{}' destroyed", self.name);
    }
}

impl Source for SceneInner {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    fn video_render(&self, gfx: &mut dyn GraphicsContext) {
        self.traverse(gfx, &mut |item, gfx| item.source().video_render(gfx));
    }

    fn width(&self) -> u32 {
        self.context.base_width
    }

    fn height(&self) -> u32 {
        self.context.base_height
    }

    fn enum_sources(&self, callback: &mut dyn FnMut(&SourceRef)) {
        self.walk(|item| {
            callback(item.source());
            true
        });
    }

    fn as_scene(&self) -> Option<Scene> {
        self.self_ref.upgrade().map(Scene::from_inner)
    }
}

/// A scene that contains multiple scene items
///
/// Cloning a `Scene` adds a reference to the scene (and its host source);
/// dropping the last reference tears the scene down, removing every item.
#[derive(Clone)]
pub struct Scene {
    inner: Arc<SceneInner>,
}

impl Scene {
    /// Create a new scene with the default render context
    pub fn new(name: impl Into<String>) -> Self {
        Self::create(name, RenderContext::default())
    }

    /// Create a new scene reporting the given canvas dimensions
    pub fn create(name: impl Into<String>, context: RenderContext) -> Self {
        let name = name.into();
        let inner = Arc::new_cyclic(|self_ref| SceneInner {
            name,
            context,
            items: ReentrantMutex::new(RefCell::new(ItemList::new())),
            signals: SignalHandler::new(),
            removed: AtomicBool::new(false),
            self_ref: self_ref.clone(),
        });
        inner
            .signals
            .register(&[SceneEventKind::ItemAdded, SceneEventKind::ItemRemoved]);

        log::debug!("scene '{}' created", inner.name);
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<SceneInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &SceneInner {
        &self.inner
    }

    /// The scene's host source
    pub fn as_source(&self) -> SourceRef {
        self.inner.clone()
    }

    /// The scene behind a source, if it is one
    pub fn from_source(source: &SourceRef) -> Option<Scene> {
        source.as_scene()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn context(&self) -> RenderContext {
        self.inner.context
    }

    pub fn width(&self) -> u32 {
        self.inner.context.base_width
    }

    pub fn height(&self) -> u32 {
        self.inner.context.base_height
    }

    /// Take an additional reference to the scene
    pub fn addref(&self) -> Scene {
        self.clone()
    }

    /// Give up this reference; the last release destroys the scene
    pub fn release(self) {
        drop(self);
    }

    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn downgrade(&self) -> WeakScene {
        self.inner.weak_scene()
    }

    pub fn ptr_eq(&self, other: &Scene) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Flag the scene's host source as removed
    ///
    /// Parent scenes drop it on their next render pass.
    pub fn mark_removed(&self) {
        self.inner.removed.store(true, Ordering::Release);
    }

    pub fn is_removed(&self) -> bool {
        self.inner.is_removed()
    }

    /// The scene's event handler
    pub fn signals(&self) -> &SignalHandler {
        &self.inner.signals
    }

    /// Add a source to the end of the paint order
    ///
    /// Returns `None` (and logs) if the source has been removed or already
    /// contains this scene. See [`Scene::try_add`].
    pub fn add(&self, source: SourceRef) -> Option<SceneItem> {
        match self.try_add(source) {
            Ok(item) => Some(item),
            Err(err) => {
                log::error!("Tried to add to scene '{}': {}", self.name(), err);
                None
            }
        }
    }

    /// Add a source to the end of the paint order
    ///
    /// Fails with [`SceneError::RemovedSource`] for a removed source and with
    /// [`SceneError::RecursiveAdd`] if the source is this scene or any scene
    /// nested inside it shows this scene.
    pub fn try_add(&self, source: SourceRef) -> Result<SceneItem, SceneError> {
        if source.is_removed() {
            return Err(SceneError::RemovedSource(source.name().to_string()));
        }
        if self.inner.is_reachable_from(&source) {
            return Err(SceneError::RecursiveAdd {
                scene: self.name().to_string(),
                child: source.name().to_string(),
            });
        }

        source.add_parent(&*self.inner);

        let item = {
            let guard = self.inner.items.lock();
            let mut list = guard.borrow_mut();
            let parent = Arc::downgrade(&self.inner);
            let item = list
                .push_back_with_key(|key| SceneItem::new(key, source, parent))
                .clone();
            item
        };

        log::trace!("added '{}' to scene '{}'", item.name(), self.name());
        self.inner.signals.emit(SceneEvent::ItemAdded {
            scene: self.downgrade(),
            item: item.clone(),
        });
        Ok(item)
    }

    /// Resolve a source by name and add it
    pub fn add_by_name(
        &self,
        name: &str,
        resolver: &dyn SourceResolver,
    ) -> Result<SceneItem, SceneError> {
        let source = resolver
            .source_by_name(name)
            .ok_or_else(|| SceneError::SourceNotFound(name.to_string()))?;
        self.try_add(source)
    }

    /// Remove an item from this scene
    ///
    /// Items belonging to another scene are left alone.
    pub fn remove(&self, item: &SceneItem) {
        match item.parent_inner() {
            Some(parent) if Arc::ptr_eq(&parent, &self.inner) => self.inner.remove_item(item),
            _ => {}
        }
    }

    /// Remove every item
    pub fn remove_all(&self) {
        self.inner.remove_all();
    }

    /// Move an item within the paint order
    pub fn set_order(&self, item: &SceneItem, movement: OrderMovement) {
        // temporary scene reference held across the lock
        let scene = self.addref();
        scene.inner.set_order(item, movement);
        scene.release();
    }

    /// Number of items in the scene
    pub fn item_count(&self) -> usize {
        self.inner.items.lock().borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Snapshot of the items in paint order
    pub fn items(&self) -> Vec<SceneItem> {
        self.inner.items.lock().borrow().items()
    }

    /// Enumerate items in paint order, holding the scene lock
    ///
    /// The callback returns `false` to stop. It runs under the lock, so it
    /// may call back into this scene from the same thread but must not wait
    /// on another thread that needs this scene.
    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(&Scene, &SceneItem) -> bool,
    {
        self.inner.walk(|item| callback(self, item));
    }

    /// Enumerate the sources of every item
    pub fn enum_sources<F>(&self, mut callback: F)
    where
        F: FnMut(&SourceRef),
    {
        self.inner.enum_sources(&mut callback);
    }

    /// First item in paint order whose source has this name
    pub fn find_by_name(&self, name: &str) -> Option<SceneItem> {
        let mut found = None;
        self.inner.walk(|item| {
            if item.name() == name {
                found = Some(item.clone());
                return false;
            }
            true
        });
        found
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.inner.items.lock().borrow().is_consistent()
    }

    #[cfg(test)]
    pub(crate) fn contains_key(&self, key: crate::list::ItemKey) -> bool {
        self.inner.items.lock().borrow().contains(key)
    }
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Scene {}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name())
            .field("items", &self.item_count())
            .finish()
    }
}

/// Non-owning reference to a scene
#[derive(Clone)]
pub struct WeakScene {
    inner: Weak<SceneInner>,
}

impl WeakScene {
    pub fn upgrade(&self) -> Option<Scene> {
        self.inner.upgrade().map(Scene::from_inner)
    }
}

impl std::fmt::Debug for WeakScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakScene")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
