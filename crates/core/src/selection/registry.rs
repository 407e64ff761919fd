use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use super::range::{SelectorId, SelectorRef, SelectorSnapshot};

/// Notifications published by a [`SelectionRegistry`].
#[derive(Debug, Clone)]
pub enum SelectorEvent {
    /// The full list after a mutation.
    Updated(Vec<SelectorSnapshot>),
    /// Sent once per `clear()`, after the matching `Updated`. Carries the
    /// removed ranges so each view can delete the ones it owns.
    Deleted(Vec<SelectorRef>),
}

#[derive(Debug)]
struct Subscriber {
    tx: Sender<SelectorEvent>,
    /// Only wants `Deleted`.
    deletions_only: bool,
}

#[derive(Debug, Default)]
struct RegistryState {
    selectors: Vec<SelectorRef>,
    subscribers: Vec<Subscriber>,
    next_id: SelectorId,
}

/// Ordered set of live selection ranges shared by every view in one
/// application scope.
///
/// Cloning yields another handle onto the same registry. Every mutation is
/// applied before any subscriber hears about it, and events arrive in
/// mutation order.
#[derive(Debug, Clone, Default)]
pub struct SelectionRegistry {
    inner: Rc<RefCell<RegistryState>>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new event stream. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<SelectorEvent> {
        self.add_subscriber(false)
    }

    /// Like [`subscribe`](Self::subscribe), but only `clear()` is delivered.
    /// Nothing queues up on ordinary adds and deletes.
    pub fn subscribe_deletions(&self) -> Receiver<SelectorEvent> {
        self.add_subscriber(true)
    }

    fn add_subscriber(&self, deletions_only: bool) -> Receiver<SelectorEvent> {
        let (tx, rx) = mpsc::channel();
        self.inner.borrow_mut().subscribers.push(Subscriber { tx, deletions_only });
        rx
    }

    /// Allocate an id unique within this registry.
    pub fn next_id(&self) -> SelectorId {
        let mut state = self.inner.borrow_mut();
        state.next_id += 1;
        state.next_id
    }

    pub fn add(&self, range: SelectorRef) {
        self.inner.borrow_mut().selectors.push(range);
        self.publish_updated();
    }

    /// Remove the first entry that is the same allocation as `range`.
    /// Absent ranges are ignored and nothing is published.
    pub fn delete(&self, range: &SelectorRef) -> bool {
        let removed = {
            let mut state = self.inner.borrow_mut();
            match state.selectors.iter().position(|s| Rc::ptr_eq(s, range)) {
                Some(pos) => {
                    state.selectors.remove(pos);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.publish_updated();
        }
        removed
    }

    /// Drop every selector, then publish `Updated([])` and one `Deleted`.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut self.inner.borrow_mut().selectors);
        log::debug!("clearing {} selectors", removed.len());
        self.publish_updated();
        self.publish(SelectorEvent::Deleted(removed));
    }

    /// Current entries, in insertion order.
    pub fn list(&self) -> Vec<SelectorRef> {
        self.inner.borrow().selectors.clone()
    }

    pub fn snapshots(&self) -> Vec<SelectorSnapshot> {
        self.inner
            .borrow()
            .selectors
            .iter()
            .map(|s| s.borrow().snapshot())
            .collect()
    }

    /// Entries created by the view with id `owner`.
    pub fn owned_by(&self, owner: &str) -> Vec<SelectorRef> {
        self.inner
            .borrow()
            .selectors
            .iter()
            .filter(|s| s.borrow().owner() == owner)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: SelectorId) -> Option<SelectorRef> {
        self.inner
            .borrow()
            .selectors
            .iter()
            .find(|s| s.borrow().id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().selectors.is_empty()
    }

    fn publish_updated(&self) {
        let list = self.snapshots();
        self.publish(SelectorEvent::Updated(list));
    }

    fn publish(&self, event: SelectorEvent) {
        let updated = matches!(event, SelectorEvent::Updated(_));
        self.inner.borrow_mut().subscribers.retain(|sub| {
            if updated && sub.deletions_only {
                return true;
            }
            sub.tx.send(event.clone()).is_ok()
        });
    }
}
