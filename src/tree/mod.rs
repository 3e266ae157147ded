//! Recursive filterable trees over observable child lists.
//!
//! A [`TreeArena`] owns every node of one tree. Each attached node mirrors
//! the live [`ObservableList`] returned by the arena's children accessor for
//! its value. List changes may happen on any thread; observers only enqueue
//! them, and [`TreeArena::sync`] applies them on the thread that owns the
//! arena.
//!
//! Every node keeps two child lists: the *original* children (one per item
//! of the live list) and the *exposed* children (the original ones that pass
//! the node's predicate). A child is exposed when:
//!
//! - the node has no predicate, or
//! - the child already exposes children of its own, or
//! - the child is not a group and the predicate accepts its value.
//!
//! Before a child is tested, the parent's predicate is pushed into it if it
//! has original children, so filtering cascades depth first and a branch
//! stays visible as long as something beneath it matches.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use crossbeam_channel::{Receiver, Sender};

use crate::log::{debug, trace, warn};

mod id;
mod observable;

pub use id::NodeId;
pub use observable::{ListChange, ObservableList, SubscriptionId};

/// Values that can live in a [`TreeArena`].
pub trait TreeValue: Clone + PartialEq + Send + Sync + 'static {
    /// Pure grouping placeholders have no content of their own and are only
    /// shown while they expose children.
    fn is_group(&self) -> bool {
        false
    }
}

impl TreeValue for String {}
impl TreeValue for &'static str {}

/// Filter predicate shared down a tree.
pub type Predicate<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

/// Returns the live child list of a value.
pub type ChildrenFn<V> = Arc<dyn Fn(&V) -> ObservableList<V> + Send + Sync>;

// ============================================================================
// Nodes
// ============================================================================

struct Source<V> {
    list: ObservableList<V>,
    subscription: SubscriptionId,
    /// Identifies this binding in queued events, so changes from a list the
    /// node no longer mirrors are ignored.
    token: u64,
}

struct Node<V> {
    value: Option<V>,
    parent: Option<NodeId>,
    original: Vec<NodeId>,
    children: Vec<NodeId>,
    predicate: Option<Predicate<V>>,
    source: Option<Source<V>>,
}

impl<V> Node<V> {
    fn new(value: Option<V>, parent: Option<NodeId>) -> Self {
        Self {
            value,
            parent,
            original: Vec::new(),
            children: Vec::new(),
            predicate: None,
            source: None,
        }
    }
}

struct Slot<V> {
    generation: u32,
    node: Option<Node<V>>,
}

struct TreeEvent<V> {
    node: NodeId,
    token: u64,
    change: ListChange<V>,
}

// ============================================================================
// Arena
// ============================================================================

/// A tree of nodes mirroring observable child lists.
pub struct TreeArena<V: TreeValue> {
    slots: Vec<Slot<V>>,
    free: Vec<u32>,
    live: usize,
    root: NodeId,
    children_of: ChildrenFn<V>,
    next_token: u64,
    events_tx: Sender<TreeEvent<V>>,
    events_rx: Receiver<TreeEvent<V>>,
    owner: ThreadId,
}

impl<V: TreeValue> TreeArena<V> {
    /// Tree with an unattached root. See [`TreeArena::attach`].
    pub fn unattached(children_of: impl Fn(&V) -> ObservableList<V> + Send + Sync + 'static) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let mut arena = Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            root: NodeId::new(0, 0),
            children_of: Arc::new(children_of),
            next_token: 0,
            events_tx,
            events_rx,
            owner: thread::current().id(),
        };
        arena.root = arena.alloc(Node::new(None, None));
        arena
    }

    /// Tree whose root wraps `value`.
    pub fn with_root(value: V, children_of: impl Fn(&V) -> ObservableList<V> + Send + Sync + 'static) -> Self {
        let mut arena = Self::unattached(children_of);
        let root = arena.root;
        arena.attach(root, value);
        arena
    }

    /// Tree with a grouping root whose children mirror `list`.
    pub fn from_list(
        list: ObservableList<V>,
        children_of: impl Fn(&V) -> ObservableList<V> + Send + Sync + 'static,
    ) -> Self {
        let mut arena = Self::unattached(children_of);
        let root = arena.root;
        arena.bind(root, list);
        arena.expose(root, false);
        arena
    }

    /// Assign `value` to `node` and mirror its child list. Any subtree the
    /// node had before is dropped.
    pub fn attach(&mut self, node: NodeId, value: V) -> bool {
        if !self.is_alive(node) {
            warn!(?node, "attach to a dead node ignored");
            return false;
        }
        self.release(node);
        let list = (self.children_of)(&value);
        if let Some(n) = self.node_mut(node) {
            n.value = Some(value);
        }
        self.bind(node, list);
        self.refilter(node);
        self.refresh_ancestors(node);
        true
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_alive(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn value(&self, node: NodeId) -> Option<&V> {
        self.node(node)?.value.as_ref()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    /// Exposed (filtered) children.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map_or(&[], |n| n.children.as_slice())
    }

    /// All children, regardless of the predicate.
    pub fn original_children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map_or(&[], |n| n.original.as_slice())
    }

    pub fn predicate(&self, node: NodeId) -> Option<Predicate<V>> {
        self.node(node)?.predicate.clone()
    }

    /// Values of the exposed children of `node`.
    pub fn visible_values(&self, node: NodeId) -> Vec<V> {
        self.children(node)
            .iter()
            .filter_map(|&c| self.value(c).cloned())
            .collect()
    }

    /// Exposed descendants of `node` in depth-first order.
    pub fn visible_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// First node (depth first, ignoring the filter) whose value matches.
    pub fn find(&self, mut matches: impl FnMut(&V) -> bool) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.value(id).is_some_and(&mut matches) {
                return Some(id);
            }
            stack.extend(self.original_children(id).iter().rev());
        }
        None
    }

    /// Number of queued list changes not yet applied.
    pub fn pending(&self) -> usize {
        self.events_rx.len()
    }

    // ------------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------------

    /// Store `predicate` on `node` and recompute its exposed children.
    pub fn set_predicate(&mut self, node: NodeId, predicate: Option<Predicate<V>>) {
        let Some(n) = self.node_mut(node) else {
            warn!(?node, "predicate on a dead node ignored");
            return;
        };
        n.predicate = predicate;
        self.refilter(node);
        self.refresh_ancestors(node);
    }

    /// Convenience for [`TreeArena::set_predicate`] with a closure.
    pub fn set_filter(&mut self, node: NodeId, predicate: impl Fn(&V) -> bool + Send + Sync + 'static) {
        self.set_predicate(node, Some(Arc::new(predicate)));
    }

    /// Recompute the exposed children of `node`, cascading its predicate.
    pub fn refilter(&mut self, node: NodeId) {
        self.expose(node, true);
    }

    fn expose(&mut self, node: NodeId, cascade: bool) {
        let Some(n) = self.node(node) else {
            return;
        };
        let predicate = n.predicate.clone();
        let original = n.original.clone();

        let mut exposed = Vec::with_capacity(original.len());
        for child in original {
            if cascade {
                // leaves keep the predicate too, for when they gain children
                if let Some(c) = self.node_mut(child) {
                    c.predicate = predicate.clone();
                }
                if !self.original_children(child).is_empty() {
                    self.expose(child, true);
                }
            }
            if self.retains(predicate.as_ref(), child) {
                exposed.push(child);
            }
        }

        if let Some(n) = self.node_mut(node) {
            n.children = exposed;
        }
    }

    fn retains(&self, predicate: Option<&Predicate<V>>, child: NodeId) -> bool {
        let Some(predicate) = predicate else {
            return true;
        };
        let Some(node) = self.node(child) else {
            return false;
        };
        if !node.children.is_empty() {
            return true;
        }
        match &node.value {
            Some(value) if !value.is_group() => predicate(value),
            _ => false,
        }
    }

    fn refresh_ancestors(&mut self, node: NodeId) {
        let mut current = self.parent(node);
        while let Some(id) = current {
            self.expose(id, false);
            current = self.parent(id);
        }
    }

    // ------------------------------------------------------------------------
    // Synchronization
    // ------------------------------------------------------------------------

    /// Apply queued list changes. Must run on the thread that created the
    /// arena; returns the number of changes applied.
    pub fn sync(&mut self) -> usize {
        if thread::current().id() != self.owner {
            warn!("tree sync refused off the owning thread");
            return 0;
        }

        let mut applied = 0;
        let mut touched = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            let current = self
                .node(event.node)
                .and_then(|n| n.source.as_ref())
                .is_some_and(|s| s.token == event.token);
            if !current {
                trace!(node = ?event.node, "stale list change skipped");
                continue;
            }
            match event.change {
                ListChange::Added(values) => {
                    for value in values {
                        let child = self.spawn(event.node, value);
                        if let Some(n) = self.node_mut(event.node) {
                            n.original.push(child);
                        }
                    }
                }
                ListChange::Removed(values) => {
                    // drops every equal child, while the list only dropped the first
                    for value in &values {
                        self.remove_matching(event.node, value);
                    }
                }
            }
            if !touched.contains(&event.node) {
                touched.push(event.node);
            }
            applied += 1;
        }

        for node in touched {
            if self.is_alive(node) {
                self.refilter(node);
                self.refresh_ancestors(node);
            }
        }
        if applied > 0 {
            debug!(applied, nodes = self.live, "tree synchronized");
        }
        applied
    }

    fn remove_matching(&mut self, parent: NodeId, value: &V) {
        let doomed: Vec<NodeId> = self
            .original_children(parent)
            .iter()
            .copied()
            .filter(|&c| self.value(c) == Some(value))
            .collect();
        if let Some(n) = self.node_mut(parent) {
            n.original.retain(|c| !doomed.contains(c));
            n.children.retain(|c| !doomed.contains(c));
        }
        for child in doomed {
            self.drop_subtree(child);
        }
    }

    // ------------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------------

    fn node(&self, id: NodeId) -> Option<&Node<V>> {
        let slot = self.slots.get(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<V>> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn alloc(&mut self, node: Node<V>) -> NodeId {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(node);
            return NodeId::new(idx, slot.generation);
        }
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::new(idx, 0)
    }

    /// Create a child of `parent` for `value`, mirroring its child list.
    fn spawn(&mut self, parent: NodeId, value: V) -> NodeId {
        let list = (self.children_of)(&value);
        let id = self.alloc(Node::new(Some(value), Some(parent)));
        self.bind(id, list);
        self.expose(id, false);
        id
    }

    /// Subscribe `node` to `list` and create a child per current item.
    fn bind(&mut self, node: NodeId, list: ObservableList<V>) {
        let token = self.next_token;
        self.next_token += 1;

        let tx = self.events_tx.clone();
        let (subscription, items) = list.subscribe_with_snapshot(move |change| {
            let event = TreeEvent {
                node,
                token,
                change: change.clone(),
            };
            if tx.send(event).is_err() {
                trace!(?node, "tree gone, list change dropped");
            }
        });

        let children: Vec<NodeId> = items.into_iter().map(|v| self.spawn(node, v)).collect();
        if let Some(n) = self.node_mut(node) {
            n.original = children;
            n.source = Some(Source {
                list,
                subscription,
                token,
            });
        }
    }

    /// Unsubscribe `node` and drop its children, keeping the node itself.
    fn release(&mut self, node: NodeId) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        let source = n.source.take();
        let original = std::mem::take(&mut n.original);
        n.children.clear();
        if let Some(source) = source {
            source.list.unsubscribe(source.subscription);
        }
        for child in original {
            self.drop_subtree(child);
        }
    }

    fn drop_subtree(&mut self, node: NodeId) {
        self.release(node);
        let Some(slot) = self.slots.get_mut(node.idx as usize) else {
            return;
        };
        if slot.generation != node.generation || slot.node.take().is_none() {
            return;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node.idx);
        self.live -= 1;
    }
}

impl<V: TreeValue> Drop for TreeArena<V> {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            if let Some(source) = slot.node.as_mut().and_then(|n| n.source.take()) {
                source.list.unsubscribe(source.subscription);
            }
        }
    }
}

impl<V: TreeValue + std::fmt::Debug> std::fmt::Debug for TreeArena<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeArena")
            .field("root", &self.root)
            .field("live", &self.live)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Child lists keyed by parent name.
    fn catalog(entries: &[(&'static str, &[&'static str])]) -> HashMap<&'static str, ObservableList<&'static str>> {
        entries
            .iter()
            .map(|(k, v)| (*k, ObservableList::from_vec(v.to_vec())))
            .collect()
    }

    fn accessor(
        lists: &HashMap<&'static str, ObservableList<&'static str>>,
    ) -> impl Fn(&&'static str) -> ObservableList<&'static str> + Send + Sync + 'static {
        let lists = lists.clone();
        move |v: &&'static str| lists.get(v).cloned().unwrap_or_default()
    }

    fn names(tree: &TreeArena<&'static str>, node: NodeId) -> Vec<&'static str> {
        tree.visible_values(node)
    }

    #[test]
    fn from_list_mirrors_nested_lists() {
        let lists = catalog(&[("A", &["A1", "A2"]), ("A1", &["C"])]);
        let top = ObservableList::from_vec(vec!["A", "B"]);
        let tree = TreeArena::from_list(top, accessor(&lists));

        assert_eq!(tree.len(), 6);
        assert_eq!(tree.value(tree.root()), None);
        assert_eq!(names(&tree, tree.root()), ["A", "B"]);
        let a = tree.find(|v| *v == "A").unwrap();
        assert_eq!(names(&tree, a), ["A1", "A2"]);
        let c = tree.find(|v| *v == "C").unwrap();
        assert_eq!(tree.parent(c).and_then(|p| tree.value(p)), Some(&"A1"));
    }

    #[test]
    fn predicate_keeps_ancestor_chain_of_matches() {
        let lists = catalog(&[("A", &["A1", "A2"]), ("A1", &["C"]), ("B", &["B1"])]);
        let top = ObservableList::from_vec(vec!["A", "B"]);
        let mut tree = TreeArena::from_list(top, accessor(&lists));
        let root = tree.root();

        tree.set_filter(root, |v| *v == "C");

        assert_eq!(names(&tree, root), ["A"]);
        let a = tree.find(|v| *v == "A").unwrap();
        let a1 = tree.find(|v| *v == "A1").unwrap();
        let b = tree.find(|v| *v == "B").unwrap();
        assert_eq!(names(&tree, a), ["A1"]);
        assert_eq!(names(&tree, a1), ["C"]);
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.original_children(b).len(), 1);

        let visible: Vec<_> = tree
            .visible_descendants(root)
            .into_iter()
            .filter_map(|id| tree.value(id).copied())
            .collect();
        assert_eq!(visible, ["A", "A1", "C"]);

        tree.set_predicate(root, None);
        assert_eq!(names(&tree, root), ["A", "B"]);
        assert_eq!(names(&tree, b), ["B1"]);
        assert!(tree.predicate(b).is_none());
    }

    #[test]
    fn leaf_matching_parent_value_is_kept_without_children() {
        let lists = catalog(&[("A", &["x"])]);
        let top = ObservableList::from_vec(vec!["A", "B"]);
        let mut tree = TreeArena::from_list(top, accessor(&lists));
        let root = tree.root();
        tree.set_filter(root, |v| *v == "B");
        assert_eq!(names(&tree, root), ["B"]);
    }

    #[test]
    fn sync_applies_additions_and_removals() {
        let lists = catalog(&[("A", &["A1"])]);
        let top = ObservableList::from_vec(vec!["A"]);
        let mut tree = TreeArena::from_list(top.clone(), accessor(&lists));
        let root = tree.root();

        top.push("B");
        lists["A"].push("A2");
        assert_eq!(tree.pending(), 2);
        assert_eq!(names(&tree, root), ["A"]);

        assert_eq!(tree.sync(), 2);
        assert_eq!(names(&tree, root), ["A", "B"]);
        let a = tree.find(|v| *v == "A").unwrap();
        assert_eq!(names(&tree, a), ["A1", "A2"]);

        lists["A"].remove(&"A1");
        tree.sync();
        assert_eq!(names(&tree, a), ["A2"]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn removal_drops_every_equal_child() {
        let top = ObservableList::from_vec(vec!["x", "y", "x"]);
        let mut tree = TreeArena::from_list(top.clone(), |_: &&str| ObservableList::new());
        top.remove(&"x");
        tree.sync();
        assert_eq!(names(&tree, tree.root()), ["y"]);
    }

    #[test]
    fn leaf_gaining_children_inherits_predicate() {
        let lists = catalog(&[("A", &[]), ("B", &["C"])]);
        let top = ObservableList::from_vec(vec!["A", "B"]);
        let mut tree = TreeArena::from_list(top, accessor(&lists));
        let root = tree.root();
        tree.set_filter(root, |v| *v == "C");
        assert_eq!(names(&tree, root), ["B"]);

        lists["A"].push("D");
        tree.sync();
        let a = tree.find(|v| *v == "A").unwrap();
        assert!(tree.predicate(a).is_some());
        assert!(names(&tree, a).is_empty());
        assert_eq!(names(&tree, root), ["B"]);

        lists["A"].push("C");
        tree.sync();
        assert_eq!(names(&tree, a), ["C"]);
        assert_eq!(names(&tree, root), ["A", "B"]);
    }

    #[test]
    fn duplicate_removal_diverges_from_list() {
        let top = ObservableList::from_vec(vec!["x", "y", "x"]);
        let mut tree = TreeArena::from_list(top.clone(), |_: &&str| ObservableList::new());
        assert!(top.remove(&"x"));
        tree.sync();
        assert_eq!(top.snapshot(), ["y", "x"]);
        assert_eq!(names(&tree, tree.root()), ["y"]);
    }

    #[test]
    fn removed_subtrees_stop_listening() {
        let lists = catalog(&[("A", &["A1"])]);
        let top = ObservableList::from_vec(vec!["A"]);
        let mut tree = TreeArena::from_list(top.clone(), accessor(&lists));
        let a = tree.find(|v| *v == "A").unwrap();
        assert_eq!(lists["A"].observer_count(), 1);

        top.remove(&"A");
        tree.sync();
        assert!(!tree.is_alive(a));
        assert_eq!(lists["A"].observer_count(), 0);

        lists["A"].push("A2");
        assert_eq!(tree.pending(), 0);
    }

    #[test]
    fn stale_ids_after_slot_reuse() {
        let top = ObservableList::from_vec(vec!["a"]);
        let mut tree = TreeArena::from_list(top.clone(), |_: &&str| ObservableList::new());
        let a = tree.find(|v| *v == "a").unwrap();
        top.clear();
        top.push("b");
        tree.sync();
        let b = tree.find(|v| *v == "b").unwrap();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert_eq!(tree.value(a), None);
        assert_eq!(tree.value(b), Some(&"b"));
    }

    #[test]
    fn new_children_respect_existing_predicate() {
        let lists = catalog(&[("A", &["keep"])]);
        let top = ObservableList::from_vec(vec!["A"]);
        let mut tree = TreeArena::from_list(top, accessor(&lists));
        let root = tree.root();
        tree.set_filter(root, |v| v.starts_with('k'));
        let a = tree.find(|v| *v == "A").unwrap();
        assert_eq!(names(&tree, a), ["keep"]);

        lists["A"].extend(["drop", "kite"]);
        tree.sync();
        assert_eq!(names(&tree, a), ["keep", "kite"]);
    }

    #[test]
    fn attach_replaces_subtree() {
        let lists = catalog(&[("A", &["A1", "A2"]), ("B", &["B1"])]);
        let mut tree = TreeArena::unattached(accessor(&lists));
        let root = tree.root();
        assert_eq!(tree.len(), 1);
        assert!(tree.children(root).is_empty());

        tree.attach(root, "A");
        assert_eq!(names(&tree, root), ["A1", "A2"]);
        tree.attach(root, "B");
        assert_eq!(names(&tree, root), ["B1"]);
        assert_eq!(tree.len(), 2);
        assert_eq!(lists["A"].observer_count(), 0);

        // changes to the old list are ignored
        lists["A"].push("A3");
        tree.sync();
        assert_eq!(names(&tree, root), ["B1"]);
    }

    #[test]
    fn sync_refused_off_owner_thread() {
        let top = ObservableList::from_vec(vec!["a"]);
        let mut tree = TreeArena::from_list(top.clone(), |_: &&str| ObservableList::new());
        top.push("b");
        let applied = std::thread::scope(|s| s.spawn(|| tree.sync()).join().unwrap());
        assert_eq!(applied, 0);
        assert_eq!(tree.sync(), 1);
    }

    #[test]
    fn groups_hidden_without_visible_children() {
        #[derive(Clone, PartialEq, Debug)]
        enum Entry {
            Folder(&'static str),
            File(&'static str),
        }
        impl TreeValue for Entry {
            fn is_group(&self) -> bool {
                matches!(self, Entry::Folder(_))
            }
        }

        let docs = ObservableList::from_vec(vec![Entry::File("notes")]);
        let top = ObservableList::from_vec(vec![Entry::Folder("docs"), Entry::Folder("empty")]);
        let mut tree = TreeArena::from_list(top, move |e: &Entry| match e {
            Entry::Folder("docs") => docs.clone(),
            _ => ObservableList::new(),
        });
        let root = tree.root();
        tree.set_filter(root, |_| true);
        assert_eq!(tree.visible_values(root), [Entry::Folder("docs")]);
    }
}
