//! A small bidirectional map relating node identities across two trees.
//!
//! Keys on both sides are node IDs; values are strong node handles. Four of
//! these relations coexist during one patch attempt: Before↔After (shipped
//! with the pattern), Before↔Left (one match instance), Left↔Right (produced
//! by deep-copying the target), and After↔Right (the maintenance map built
//! during replay).

use rustc_hash::FxHashMap;

use super::NodeRef;

/// A bidirectional node map.
#[derive(Debug, Default)]
pub struct NodeBimap {
    fwd: FxHashMap<u64, NodeRef>,
    back: FxHashMap<u64, NodeRef>,
}

impl NodeBimap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Relates `a` to `b`. An existing relation for either side is replaced.
    pub fn insert(&mut self, a: &NodeRef, b: &NodeRef) {
        self.fwd.insert(a.borrow().id(), b.clone());
        self.back.insert(b.borrow().id(), a.clone());
    }

    /// Looks up the counterpart of a forward-side node.
    pub fn get(&self, a: &NodeRef) -> Option<NodeRef> {
        self.fwd.get(&a.borrow().id()).cloned()
    }

    /// Looks up the counterpart of a backward-side node.
    pub fn get_back(&self, b: &NodeRef) -> Option<NodeRef> {
        self.back.get(&b.borrow().id()).cloned()
    }

    /// Returns true if `a` appears on the forward side.
    pub fn contains(&self, a: &NodeRef) -> bool {
        self.fwd.contains_key(&a.borrow().id())
    }

    /// Returns true if `b` appears on the backward side.
    pub fn contains_back(&self, b: &NodeRef) -> bool {
        self.back.contains_key(&b.borrow().id())
    }

    /// Removes the relation keyed by forward-side node `a`.
    pub fn remove(&mut self, a: &NodeRef) {
        if let Some(b) = self.fwd.remove(&a.borrow().id()) {
            self.back.remove(&b.borrow().id());
        }
    }

    /// Returns the number of relations.
    pub fn len(&self) -> usize {
        self.fwd.len()
    }

    /// Returns true if no relations are stored.
    pub fn is_empty(&self) -> bool {
        self.fwd.is_empty()
    }

    /// Iterates over forward-side entries as (forward id, counterpart).
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &NodeRef)> {
        self.fwd.iter()
    }
}

impl Clone for NodeBimap {
    fn clone(&self) -> Self {
        NodeBimap {
            fwd: self.fwd.clone(),
            back: self.back.clone(),
        }
    }
}
