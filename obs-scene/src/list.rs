//! Arena-backed doubly linked item list
//!
//! Nodes live in a slotmap and link to each other by key, so a stale key
//! can never reach a freed node. All methods assume the owning scene's lock
//! is held.

use crate::item::SceneItem;
use crate::types::OrderMovement;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to a node in a scene's item list
    pub struct ItemKey;
}

struct Node {
    item: SceneItem,
    prev: Option<ItemKey>,
    next: Option<ItemKey>,
}

/// Ordered item list; head is painted first, tail last
pub struct ItemList {
    nodes: SlotMap<ItemKey, Node>,
    head: Option<ItemKey>,
    tail: Option<ItemKey>,
}

impl ItemList {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(16),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn head(&self) -> Option<ItemKey> {
        self.head
    }

    pub fn tail(&self) -> Option<ItemKey> {
        self.tail
    }

    pub fn contains(&self, key: ItemKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn get(&self, key: ItemKey) -> Option<&SceneItem> {
        self.nodes.get(key).map(|node| &node.item)
    }

    pub fn next(&self, key: ItemKey) -> Option<ItemKey> {
        self.nodes.get(key).and_then(|node| node.next)
    }

    pub fn prev(&self, key: ItemKey) -> Option<ItemKey> {
        self.nodes.get(key).and_then(|node| node.prev)
    }

    /// Insert a new node at the tail; `make` receives the node's key
    pub fn push_back_with_key<F>(&mut self, make: F) -> &SceneItem
    where
        F: FnOnce(ItemKey) -> SceneItem,
    {
        let key = self.nodes.insert_with_key(|key| Node {
            item: make(key),
            prev: None,
            next: None,
        });
        let tail = self.tail;
        self.attach(key, tail);
        &self.nodes[key].item
    }

    /// Unlink and free a node, returning the list's handle to its item
    pub fn take(&mut self, key: ItemKey) -> Option<SceneItem> {
        if !self.nodes.contains_key(key) {
            return None;
        }
        self.detach(key);
        self.nodes.remove(key).map(|node| node.item)
    }

    /// Unlink a node from its neighbours, leaving it in the arena
    ///
    /// Returns the former (prev, next) neighbours.
    pub fn detach(&mut self, key: ItemKey) -> (Option<ItemKey>, Option<ItemKey>) {
        let (prev, next) = match self.nodes.get_mut(key) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return (None, None),
        };

        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }

        (prev, next)
    }

    /// Link a detached node after `after`, or as the new head if `None`
    pub fn attach(&mut self, key: ItemKey, after: Option<ItemKey>) {
        let next = match after {
            Some(a) => self.nodes.get(a).and_then(|node| node.next),
            None => self.head,
        };

        if let Some(node) = self.nodes.get_mut(key) {
            node.prev = after;
            node.next = next;
        }

        match after {
            Some(a) => self.set_next(a, Some(key)),
            None => self.head = Some(key),
        }
        match next {
            Some(n) => self.set_prev(n, Some(key)),
            None => self.tail = Some(key),
        }
    }

    /// Move a node within the list; the length never changes
    pub fn reorder(&mut self, key: ItemKey, movement: OrderMovement) {
        if !self.nodes.contains_key(key) {
            return;
        }

        let (prev, next) = self.detach(key);
        let after = match movement {
            OrderMovement::Up => prev.and_then(|p| self.prev(p)),
            // at the tail already: stay there
            OrderMovement::Down => next.or(prev),
            OrderMovement::Top => self.tail,
            OrderMovement::Bottom => None,
        };
        self.attach(key, after);
    }

    /// Where a walk continues after visiting `current`
    ///
    /// `prev` and `captured` are the neighbours recorded before the visit.
    /// The captured successor wins while it is still linked, then the live
    /// successor of `current`, then the live successor of `prev` (or the head
    /// if `current` was the head). A walk that started at the tail ends there.
    pub fn resume_after(
        &self,
        current: ItemKey,
        prev: Option<ItemKey>,
        captured: Option<ItemKey>,
    ) -> Option<ItemKey> {
        let captured = captured?;
        if self.contains(captured) {
            return Some(captured);
        }
        if self.contains(current) {
            return self.next(current);
        }
        match prev {
            Some(p) if self.contains(p) => self.next(p),
            Some(_) => None,
            None => self.head,
        }
    }

    /// Keys in paint order
    pub fn keys(&self) -> Vec<ItemKey> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(key) = cursor {
            keys.push(key);
            cursor = self.next(key);
        }
        keys
    }

    /// Item handles in paint order
    pub fn items(&self) -> Vec<SceneItem> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(key).cloned())
            .collect()
    }

    fn set_next(&mut self, key: ItemKey, next: Option<ItemKey>) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, key: ItemKey, prev: Option<ItemKey>) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.prev = prev;
        }
    }

    /// Check link consistency
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let mut count = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(key) = cursor {
            let node = match self.nodes.get(key) {
                Some(node) => node,
                None => return false,
            };
            if node.prev != prev {
                return false;
            }
            count += 1;
            prev = Some(key);
            cursor = node.next;
        }
        prev == self.tail && count == self.nodes.len()
    }
}

impl Default for ItemList {
    fn default() -> Self {
        Self::new()
    }
}
