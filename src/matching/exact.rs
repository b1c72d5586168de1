//! Exact matching: backtracking search over rough candidate lists.
//!
//! The search walks the most-constrained-first entry list, binding one
//! candidate per pattern node under an injectivity constraint and a one-level
//! parent-edge consistency check. The search state (index, partial
//! assignment, used-candidate set, running score) is explicit, and every
//! binding is undone structurally on backtrack. There is no optimality
//! guarantee: instances are ranked by similarity sum only, and matches may be
//! structurally discontinuous at unconsidered levels.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::node::{NodeBimap, NodeRef};

use super::rough::RoughMapping;

/// One scored correspondence between a pattern and a target tree.
///
/// The node map is a partial injective assignment from considered Before
/// nodes to target nodes. An instance is legal iff every considered Before
/// node received an assignment; illegal instances are an expected outcome
/// and are simply skipped by callers.
#[derive(Debug)]
pub struct MatchInstance {
    node_map: NodeBimap,
    score: f64,
    legal: bool,
}

impl MatchInstance {
    /// Returns the Before→target node assignment.
    pub fn node_map(&self) -> &NodeBimap {
        &self.node_map
    }

    /// Returns the aggregate similarity score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns true iff every considered Before node is assigned.
    pub fn is_legal(&self) -> bool {
        self.legal
    }
}

/// Mutable search state shared across recursive calls and fully undone on
/// each backtrack.
struct SearchState {
    assignment: NodeBimap,
    used: FxHashSet<u64>,
    score: f64,
}

/// Runs the backtracking search over a rough mapping.
///
/// Emits up to `max_instances` instances, sorted by descending score.
pub fn search(rough: &RoughMapping, max_instances: usize) -> Vec<MatchInstance> {
    let mut state = SearchState {
        assignment: NodeBimap::new(),
        used: FxHashSet::default(),
        score: 0.0,
    };
    let mut instances = Vec::new();

    // The pattern may have more considered nodes than the target has nodes;
    // depth is bounded by whichever runs out first.
    let bound = rough.pattern_node_count().min(rough.target_node_count());
    match_next(rough, 0, bound, max_instances, &mut state, &mut instances);

    instances.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    debug!(count = instances.len(), "match search finished");
    instances
}

fn match_next(
    rough: &RoughMapping,
    i: usize,
    bound: usize,
    max_instances: usize,
    state: &mut SearchState,
    instances: &mut Vec<MatchInstance>,
) {
    if instances.len() >= max_instances {
        return;
    }
    if i == bound {
        instances.push(MatchInstance {
            node_map: state.assignment.clone(),
            score: state.score,
            legal: state.assignment.len() == rough.pattern_node_count(),
        });
        return;
    }

    let entry = &rough.entries()[i];
    let mut bound_any = false;
    for candidate in &entry.candidates {
        let candidate_id = candidate.node.borrow().id();
        if state.used.contains(&candidate_id) {
            continue;
        }
        if !check_parent_edge(&entry.pattern_node, &candidate.node, &state.assignment) {
            continue;
        }

        state.assignment.insert(&entry.pattern_node, &candidate.node);
        state.used.insert(candidate_id);
        state.score += candidate.score;
        bound_any = true;

        match_next(rough, i + 1, bound, max_instances, state, instances);

        state.assignment.remove(&entry.pattern_node);
        state.used.remove(&candidate_id);
        state.score -= candidate.score;
    }

    if !bound_any {
        // No usable candidate for this node: continue unbound so the search
        // still surfaces (illegal) instances for the rest of the pattern.
        match_next(rough, i + 1, bound, max_instances, state, instances);
    }
}

/// One-level parent-edge consistency check.
///
/// When both the pattern node's parent and the candidate's parent are already
/// bound, reject the binding if the two parents disagree in both directions.
/// This is deliberately not a full subtree-isomorphism test.
fn check_parent_edge(pattern_node: &NodeRef, candidate: &NodeRef, track: &NodeBimap) -> bool {
    let pattern_parent = pattern_node.borrow().parent().upgrade();
    let candidate_parent = candidate.borrow().parent().upgrade();

    if let (Some(pattern_parent), Some(candidate_parent)) = (pattern_parent, candidate_parent) {
        let fwd = track.get(&pattern_parent);
        let back = track.get_back(&candidate_parent);
        if let (Some(fwd), Some(back)) = (fwd, back) {
            let fwd_agrees = fwd.borrow().id() == candidate_parent.borrow().id();
            let back_agrees = back.borrow().id() == pattern_parent.borrow().id();
            if !fwd_agrees && !back_agrees {
                return false;
            }
        }
    }
    true
}
