//! Tree matching: finding where a pattern's Before side fits a target tree.
//!
//! Matching runs in two stages. The rough matcher screens every considered
//! pattern node against every target node under the attribute similarity
//! model, producing threshold-filtered candidate lists. The exact matcher
//! then runs a backtracking search over those lists, producing ranked,
//! scored, legal-or-illegal match instances.

pub mod exact;
pub mod lcs;
pub mod rough;

pub use exact::MatchInstance;
pub use rough::{Candidate, RoughEntry, RoughMapping};

use crate::constants::{MAX_MATCH_INSTANCES, SIMILARITY_THRESHOLD};
use crate::node::NodeRef;
use crate::pattern::Pattern;

/// Tunables for one matching run.
///
/// The defaults (0.2 threshold, 100 instance cap) are inherited from the
/// original tool; they are exposed here rather than assumed correct.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Candidates scoring at or below this similarity are dropped.
    pub similarity_threshold: f64,
    /// Hard cap on accepted match instances.
    pub max_instances: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            similarity_threshold: SIMILARITY_THRESHOLD,
            max_instances: MAX_MATCH_INSTANCES,
        }
    }
}

/// Matches a pattern against a target tree.
///
/// Returns match instances sorted by descending similarity score. Callers
/// typically replay the first few legal instances; illegal instances (some
/// considered node unassigned) are reported, not raised.
pub fn find_matches(pattern: &Pattern, target: &NodeRef, config: &MatchConfig) -> Vec<MatchInstance> {
    let rough = rough::rough_match(pattern, target, config.similarity_threshold);
    exact::search(&rough, config.max_instances)
}
