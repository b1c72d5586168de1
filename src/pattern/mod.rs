//! The pattern bundle: a captured before/after edit plus its replayable
//! script.
//!
//! A pattern is assembled by the external diff and attribute-extraction
//! stage from one example change. It is immutable during matching and
//! replay; the only writers are the abstraction-stage mutators that flip
//! considered flags and attribute hardness before matching begins.

pub mod attr;
pub mod ops;

pub use attr::{extract_attrs, extract_tables, AttrFlags, AttrKey, AttrTable, AttrValue, Attribute};
pub use ops::{EditOp, SlotLocation};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::{preorder, NodeBimap, NodeRef};

/// A captured structural edit: Before and After trees, their node
/// correspondence, the ordered edit script, and the per-node matching
/// metadata (considered flags and attribute tables).
pub struct Pattern {
    before: NodeRef,
    after: NodeRef,
    before_to_after: NodeBimap,
    operations: Vec<EditOp>,
    considered: FxHashSet<u64>,
    attributes: FxHashMap<u64, AttrTable>,
}

impl Pattern {
    /// Bundles a pattern from the diff stage's outputs.
    ///
    /// Every Before node starts considered, with a freshly extracted
    /// attribute table; the abstraction stage narrows from there.
    pub fn new(
        before: NodeRef,
        after: NodeRef,
        before_to_after: NodeBimap,
        operations: Vec<EditOp>,
    ) -> Self {
        let mut considered = FxHashSet::default();
        let mut attributes = FxHashMap::default();
        for node in preorder(&before) {
            considered.insert(node.borrow().id());
            attributes.insert(node.borrow().id(), extract_attrs(&node));
        }
        Pattern {
            before,
            after,
            before_to_after,
            operations,
            considered,
            attributes,
        }
    }

    /// Returns the Before tree root.
    pub fn before(&self) -> &NodeRef {
        &self.before
    }

    /// Returns the After tree root.
    pub fn after(&self) -> &NodeRef {
        &self.after
    }

    /// Returns the Before↔After node correspondence.
    pub fn before_to_after(&self) -> &NodeBimap {
        &self.before_to_after
    }

    /// Returns the edit script in replay order.
    pub fn operations(&self) -> &[EditOp] {
        &self.operations
    }

    /// Returns true if the given Before node is considered for matching.
    pub fn is_considered(&self, node: &NodeRef) -> bool {
        self.considered.contains(&node.borrow().id())
    }

    /// Flags a Before node as considered or not.
    pub fn set_considered(&mut self, node: &NodeRef, considered: bool) {
        let id = node.borrow().id();
        if considered {
            self.considered.insert(id);
        } else {
            self.considered.remove(&id);
        }
    }

    /// The considered Before nodes, in preorder.
    pub fn considered_nodes(&self) -> Vec<NodeRef> {
        preorder(&self.before)
            .into_iter()
            .filter(|node| self.considered.contains(&node.borrow().id()))
            .collect()
    }

    /// Returns the attribute table of a Before node.
    pub fn attrs(&self, node: &NodeRef) -> Option<&AttrTable> {
        self.attributes.get(&node.borrow().id())
    }

    /// Returns the attribute table of a Before node mutably.
    ///
    /// This is the abstraction stage's write surface: softening a hard
    /// constraint, dropping an attribute, or unconsidering one.
    pub fn attrs_mut(&mut self, node: &NodeRef) -> Option<&mut AttrTable> {
        self.attributes.get_mut(&node.borrow().id())
    }

    /// Downgrades an attribute from hard constraint to weighted soft signal.
    pub fn soften_attr(&mut self, node: &NodeRef, key: AttrKey) {
        if let Some(attr) = self.attrs_mut(node).and_then(|t| t.get_mut(key)) {
            let flags = attr.flags() & !AttrFlags::HARD;
            attr.set_flags(flags);
        }
    }
}
