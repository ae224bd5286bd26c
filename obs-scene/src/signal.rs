//! Typed scene events
//!
//! Each scene owns a [`SignalHandler`]. Subscribers receive events over a
//! crossbeam channel, so emitting never blocks on a slow subscriber.

use crate::item::SceneItem;
use crate::scene::WeakScene;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

/// Event kinds a scene registers at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEventKind {
    ItemAdded,
    ItemRemoved,
}

impl SceneEventKind {
    pub fn name(self) -> &'static str {
        match self {
            SceneEventKind::ItemAdded => "item_add",
            SceneEventKind::ItemRemoved => "item_remove",
        }
    }
}

/// Event emitted by a scene
///
/// The scene is held weakly so queued events don't keep it alive.
#[derive(Clone)]
pub enum SceneEvent {
    ItemAdded { scene: WeakScene, item: SceneItem },
    ItemRemoved { scene: WeakScene, item: SceneItem },
}

impl SceneEvent {
    pub fn kind(&self) -> SceneEventKind {
        match self {
            SceneEvent::ItemAdded { .. } => SceneEventKind::ItemAdded,
            SceneEvent::ItemRemoved { .. } => SceneEventKind::ItemRemoved,
        }
    }

    pub fn item(&self) -> &SceneItem {
        match self {
            SceneEvent::ItemAdded { item, .. } | SceneEvent::ItemRemoved { item, .. } => item,
        }
    }

    pub fn scene(&self) -> &WeakScene {
        match self {
            SceneEvent::ItemAdded { scene, .. } | SceneEvent::ItemRemoved { scene, .. } => scene,
        }
    }
}

impl std::fmt::Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEvent")
            .field("kind", &self.kind())
            .field("item", &self.item().name())
            .finish()
    }
}

struct Subscriber {
    kinds: Vec<SceneEventKind>,
    tx: Sender<SceneEvent>,
}

/// Observer list for scene events
#[derive(Default)]
pub struct SignalHandler {
    registered: Mutex<Vec<SceneEventKind>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare event kinds this handler emits
    pub fn register(&self, kinds: &[SceneEventKind]) {
        let mut registered = self.registered.lock();
        for kind in kinds {
            if !registered.contains(kind) {
                registered.push(*kind);
            }
        }
    }

    pub fn is_registered(&self, kind: SceneEventKind) -> bool {
        self.registered.lock().contains(&kind)
    }

    /// Receive every registered event kind
    pub fn subscribe(&self) -> Receiver<SceneEvent> {
        let kinds = self.registered.lock().clone();
        self.subscribe_to(&kinds)
    }

    /// Receive only the given event kinds
    pub fn subscribe_to(&self, kinds: &[SceneEventKind]) -> Receiver<SceneEvent> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.lock().push(Subscriber {
            kinds: kinds.to_vec(),
            tx,
        });
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Deliver an event to matching subscribers
    ///
    /// Subscribers whose receiver was dropped are pruned.
    pub fn emit(&self, event: SceneEvent) {
        let kind = event.kind();
        if !self.is_registered(kind) {
            log::warn!("emitting unregistered scene event '{}'", kind.name());
        }

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sub| {
            if !sub.kinds.contains(&kind) {
                return true;
            }
            sub.tx.send(event.clone()).is_ok()
        });
    }
}
