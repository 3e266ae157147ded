//! Observable lists: shared, thread-safe collections that report changes.
//!
//! Observers run synchronously on the mutating thread, after the list lock
//! has been released. They should do as little as possible; the tree arena
//! only pushes the change onto its queue.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

/// Handle returned by [`ObservableList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A structural change to a list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<V> {
    Added(Vec<V>),
    Removed(Vec<V>),
}

type Observer<V> = Arc<dyn Fn(&ListChange<V>) + Send + Sync>;

struct ListInner<V> {
    items: RwLock<Vec<V>>,
    observers: Mutex<Vec<(SubscriptionId, Observer<V>)>>,
    next_id: AtomicU64,
}

/// A list shared between owners; clones refer to the same list.
pub struct ObservableList<V> {
    inner: Arc<ListInner<V>>,
}

impl<V> Clone for ObservableList<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> PartialEq for ObservableList<V> {
    /// Identity, not contents.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<V> fmt::Debug for ObservableList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("len", &self.inner.items.read().len())
            .field("observers", &self.inner.observers.lock().len())
            .finish()
    }
}

impl<V> Default for ObservableList<V> {
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl<V> FromIterator<V> for ObservableList<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<V> ObservableList<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<V>) -> Self {
        Self {
            inner: Arc::new(ListInner {
                items: RwLock::new(items),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    /// Register an observer for future changes.
    pub fn subscribe(&self, observer: impl Fn(&ListChange<V>) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.observers.lock().push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.inner.observers.lock();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }

    /// Mutate the items under the write lock, then notify with the change
    /// `f` reports. Observers are captured while the lock is held so that a
    /// concurrent [`ObservableList::subscribe_with_snapshot`] sees each change
    /// exactly once: either in its snapshot or as a notification.
    fn mutate(&self, f: impl FnOnce(&mut Vec<V>) -> Option<ListChange<V>>) {
        let (change, observers) = {
            let mut items = self.inner.items.write();
            let Some(change) = f(&mut items) else {
                return;
            };
            let observers: Vec<Observer<V>> = self
                .inner
                .observers
                .lock()
                .iter()
                .map(|(_, o)| Arc::clone(o))
                .collect();
            (change, observers)
        };
        for observer in observers {
            observer(&change);
        }
    }
}

impl<V: Clone> ObservableList<V> {
    /// Copy of the current items.
    pub fn snapshot(&self) -> Vec<V> {
        self.inner.items.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<V> {
        self.inner.items.read().get(index).cloned()
    }

    /// Subscribe and take a snapshot atomically with respect to mutations.
    pub fn subscribe_with_snapshot(
        &self,
        observer: impl Fn(&ListChange<V>) + Send + Sync + 'static,
    ) -> (SubscriptionId, Vec<V>) {
        let items = self.inner.items.read();
        let id = self.subscribe(observer);
        (id, items.clone())
    }

    pub fn push(&self, value: V) {
        self.mutate(|items| {
            items.push(value.clone());
            Some(ListChange::Added(vec![value]))
        });
    }

    pub fn extend(&self, values: impl IntoIterator<Item = V>) {
        let values: Vec<V> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        self.mutate(|items| {
            items.extend(values.iter().cloned());
            Some(ListChange::Added(values))
        });
    }

    /// Insert at `index`, clamped to the list length.
    pub fn insert(&self, index: usize, value: V) {
        self.mutate(|items| {
            let index = index.min(items.len());
            items.insert(index, value.clone());
            Some(ListChange::Added(vec![value]))
        });
    }

    pub fn remove_at(&self, index: usize) -> Option<V> {
        let mut removed = None;
        self.mutate(|items| {
            if index >= items.len() {
                return None;
            }
            let value = items.remove(index);
            removed = Some(value.clone());
            Some(ListChange::Removed(vec![value]))
        });
        removed
    }

    pub fn clear(&self) {
        self.mutate(|items| {
            if items.is_empty() {
                return None;
            }
            Some(ListChange::Removed(std::mem::take(items)))
        });
    }
}

impl<V: Clone + PartialEq> ObservableList<V> {
    pub fn contains(&self, value: &V) -> bool {
        self.inner.items.read().contains(value)
    }

    /// Remove the first item equal to `value`.
    pub fn remove(&self, value: &V) -> bool {
        let mut found = false;
        self.mutate(|items| {
            let index = items.iter().position(|v| v == value)?;
            found = true;
            Some(ListChange::Removed(vec![items.remove(index)]))
        });
        found
    }

    /// Keep only items matching `keep`, reporting the rest as one removal.
    pub fn retain(&self, mut keep: impl FnMut(&V) -> bool) {
        self.mutate(|items| {
            let (kept, dropped): (Vec<V>, Vec<V>) = std::mem::take(items).into_iter().partition(|v| keep(v));
            *items = kept;
            (!dropped.is_empty()).then_some(ListChange::Removed(dropped))
        });
    }
}
