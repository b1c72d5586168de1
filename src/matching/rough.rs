//! Rough matching: per-node candidate screening.
//!
//! For every considered Before node, score it against every node of the
//! target tree, veto hard-constraint mismatches, drop candidates at or below
//! the similarity threshold, and sort the survivors by descending score.
//! Entries are then reordered most-constrained-first (ascending candidate
//! count) so the exact search fails fast.

use tracing::debug;

use crate::node::{preorder, NodeRef};
use crate::pattern::attr::{extract_tables, pair_similarity};
use crate::pattern::Pattern;

/// A scored candidate for one pattern node.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The target-tree node.
    pub node: NodeRef,
    /// Pairwise similarity, strictly above the threshold.
    pub score: f64,
}

/// One rough-mapping entry: a considered Before node with its surviving
/// candidates, best first.
#[derive(Debug)]
pub struct RoughEntry {
    /// The considered pattern node.
    pub pattern_node: NodeRef,
    /// Surviving candidates, sorted by descending score.
    pub candidates: Vec<Candidate>,
}

/// The rough matcher's output: threshold-filtered candidate lists plus the
/// target's node count, which bounds the exact search depth when the pattern
/// has more considered nodes than the target has nodes.
#[derive(Debug)]
pub struct RoughMapping {
    entries: Vec<RoughEntry>,
    target_node_count: usize,
}

impl RoughMapping {
    /// Returns the entries, most-constrained-first.
    pub fn entries(&self) -> &[RoughEntry] {
        &self.entries
    }

    /// Number of considered pattern nodes.
    pub fn pattern_node_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of nodes in the target tree.
    pub fn target_node_count(&self) -> usize {
        self.target_node_count
    }
}

/// Builds the rough mapping between a pattern and a target tree.
///
/// Target attribute tables are extracted fresh here with the same logic used
/// at pattern-capture time. Candidates scoring at or below `threshold` are
/// dropped; hard mismatches are discarded outright.
pub fn rough_match(pattern: &Pattern, target: &NodeRef, threshold: f64) -> RoughMapping {
    let target_tables = extract_tables(target);
    let target_nodes = preorder(target);

    let mut entries = Vec::new();
    for pattern_node in pattern.considered_nodes() {
        let Some(pattern_attrs) = pattern.attrs(&pattern_node) else {
            continue;
        };
        let mut candidates = Vec::new();
        for candidate in &target_nodes {
            let Some(candidate_attrs) = target_tables.get(&candidate.borrow().id()) else {
                continue;
            };
            let score = pair_similarity(pattern_attrs, candidate_attrs);
            if score < 0.0 || score <= threshold {
                continue;
            }
            candidates.push(Candidate {
                node: candidate.clone(),
                score,
            });
        }
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        entries.push(RoughEntry {
            pattern_node,
            candidates,
        });
    }

    // Most-constrained-first prunes the backtracking search.
    entries.sort_by_key(|entry| entry.candidates.len());

    debug!(
        pattern_nodes = entries.len(),
        target_nodes = target_nodes.len(),
        "rough mapping built"
    );

    RoughMapping {
        entries,
        target_node_count: target_nodes.len(),
    }
}
