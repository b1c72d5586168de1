//! Per-node similarity attributes.
//!
//! An attribute is a named fact about one node used when scoring candidate
//! pairs. Attributes flagged `CONSIDERED` take part in scoring; the rest are
//! ignored. A `HARD` attribute is a constraint: any mismatch vetoes the pair
//! with similarity −1, regardless of the soft running sum. Soft attributes
//! contribute `weight × similarity`.
//!
//! The same extraction runs on pattern capture and on each candidate tree,
//! so both sides carry comparable tables. Which attributes stay considered
//! or hard on the pattern side is decided by the external abstraction stage
//! through the mutators on [`Pattern`](super::Pattern).

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::constants::{HARD_MISMATCH, KIND_WEIGHT, NAME_WEIGHT, TOKEN_WEIGHT, WILDCARD_SIMILARITY};
use crate::matching::lcs::lcs_match;
use crate::node::{preorder, NodeRef, SyntaxKind};

bitflags! {
    /// Flags controlling how an attribute takes part in scoring.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttrFlags: u8 {
        /// The attribute participates in scoring at all.
        const CONSIDERED = 1;
        /// A mismatch vetoes the candidate pair outright.
        const HARD = 2;
    }
}

/// The closed set of attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKey {
    /// The node's kind tag.
    Kind,
    /// Identifier text, present on name leaves only.
    Name,
    /// The subtree's scalar token list.
    Tokens,
}

/// The value side of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Kind(SyntaxKind),
    Name(String),
    Tokens(Vec<String>),
}

/// One named fact about one node.
#[derive(Debug, Clone)]
pub struct Attribute {
    flags: AttrFlags,
    value: AttrValue,
}

impl Attribute {
    /// Creates a considered attribute; name attributes start hard.
    fn new(value: AttrValue) -> Self {
        let flags = match value {
            AttrValue::Name(_) => AttrFlags::CONSIDERED | AttrFlags::HARD,
            _ => AttrFlags::CONSIDERED,
        };
        Attribute { flags, value }
    }

    /// Returns the flags.
    pub fn flags(&self) -> AttrFlags {
        self.flags
    }

    /// Replaces the flags.
    pub fn set_flags(&mut self, flags: AttrFlags) {
        self.flags = flags;
    }

    /// Returns true if the attribute takes part in scoring.
    pub fn is_considered(&self) -> bool {
        self.flags.contains(AttrFlags::CONSIDERED)
    }

    /// Returns true if a mismatch vetoes the pair.
    pub fn is_hard(&self) -> bool {
        self.flags.contains(AttrFlags::HARD)
    }

    /// Returns the attribute value.
    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    /// Pairwise similarity in `[0, 1]`, or −1 when the values cannot be
    /// compared (different attribute shapes).
    pub fn similarity(&self, other: &Attribute) -> f64 {
        match (&self.value, &other.value) {
            (AttrValue::Kind(a), AttrValue::Kind(b)) => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
            (AttrValue::Name(a), AttrValue::Name(b)) => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
            (AttrValue::Tokens(a), AttrValue::Tokens(b)) => {
                if a.is_empty() && b.is_empty() {
                    return 1.0;
                }
                let aligned = lcs_match(a, b, |x, y| x == y);
                (aligned.len() * 2) as f64 / (a.len() + b.len()) as f64
            }
            _ => HARD_MISMATCH,
        }
    }
}

/// The attribute table of one node.
#[derive(Debug, Clone, Default)]
pub struct AttrTable {
    entries: FxHashMap<AttrKey, Attribute>,
}

impl AttrTable {
    /// Looks up an attribute by key.
    pub fn get(&self, key: AttrKey) -> Option<&Attribute> {
        self.entries.get(&key)
    }

    /// Looks up an attribute mutably.
    pub fn get_mut(&mut self, key: AttrKey) -> Option<&mut Attribute> {
        self.entries.get_mut(&key)
    }

    /// Removes an attribute.
    pub fn remove(&mut self, key: AttrKey) {
        self.entries.remove(&key);
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&AttrKey, &Attribute)> {
        self.entries.iter()
    }

    /// Returns true if no attribute in the table is considered.
    pub fn nothing_considered(&self) -> bool {
        self.entries.values().all(|attr| !attr.is_considered())
    }
}

/// Weight of an attribute key in the soft similarity sum.
pub fn weight_of(key: AttrKey) -> f64 {
    match key {
        AttrKey::Kind => KIND_WEIGHT,
        AttrKey::Name => NAME_WEIGHT,
        AttrKey::Tokens => TOKEN_WEIGHT,
    }
}

/// Collects the scalar tokens of the subtree rooted at `node`, in preorder.
pub fn subtree_tokens(node: &NodeRef) -> Vec<String> {
    preorder(node)
        .iter()
        .filter_map(|n| n.borrow().scalar().map(|s| s.as_token()))
        .collect()
}

/// Extracts the attribute table of one node.
pub fn extract_attrs(node: &NodeRef) -> AttrTable {
    let mut entries = FxHashMap::default();
    let kind = node.borrow().kind();
    entries.insert(AttrKey::Kind, Attribute::new(AttrValue::Kind(kind)));

    if matches!(kind, SyntaxKind::SimpleName | SyntaxKind::QualifiedName) {
        if let Some(scalar) = node.borrow().scalar() {
            entries.insert(
                AttrKey::Name,
                Attribute::new(AttrValue::Name(scalar.as_token())),
            );
        }
    }

    entries.insert(
        AttrKey::Tokens,
        Attribute::new(AttrValue::Tokens(subtree_tokens(node))),
    );
    AttrTable { entries }
}

/// Extracts attribute tables for every node of a tree, keyed by node id.
pub fn extract_tables(root: &NodeRef) -> FxHashMap<u64, AttrTable> {
    preorder(root)
        .iter()
        .map(|node| (node.borrow().id(), extract_attrs(node)))
        .collect()
}

/// Scores a (pattern node, candidate node) attribute-table pair.
///
/// Range is `{−1} ∪ [0, 1]`. Any considered hard attribute that mismatches,
/// and any considered attribute missing or uncomparable on the candidate
/// side, vetoes the pair with −1. A pattern node with nothing considered is
/// a wildcard scoring 1.0.
pub fn pair_similarity(pattern: &AttrTable, candidate: &AttrTable) -> f64 {
    if pattern.nothing_considered() {
        return WILDCARD_SIMILARITY;
    }

    let mut total = 0.0;
    for (key, pattern_attr) in pattern.iter() {
        if !pattern_attr.is_considered() {
            continue;
        }
        let Some(candidate_attr) = candidate.get(*key) else {
            return HARD_MISMATCH;
        };
        let sim = pattern_attr.similarity(candidate_attr);
        if sim < 0.0 {
            return HARD_MISMATCH;
        }
        if pattern_attr.is_hard() {
            if sim < 1.0 {
                return HARD_MISMATCH;
            }
        } else {
            total += weight_of(*key) * sim;
        }
    }
    total
}
