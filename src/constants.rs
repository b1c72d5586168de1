//! Constants used throughout regraft.
//!
//! The threshold and instance cap are inherited from the original tool and
//! are exposed through [`MatchConfig`](crate::matching::MatchConfig) rather
//! than hard-wired into the algorithms.

/// Minimum pairwise similarity for a rough-match candidate to survive.
/// Candidates scoring at or below this are dropped.
pub const SIMILARITY_THRESHOLD: f64 = 0.2;

/// Hard cap on accepted match instances per search.
pub const MAX_MATCH_INSTANCES: usize = 100;

/// Similarity assigned to a pattern node with no considered attributes.
/// Such a node matches anything (wildcard).
pub const WILDCARD_SIMILARITY: f64 = 1.0;

/// Similarity value that vetoes a candidate pair outright.
pub const HARD_MISMATCH: f64 = -1.0;

/// Weight of the node-kind attribute in the soft similarity sum.
pub const KIND_WEIGHT: f64 = 0.4;

/// Weight of the name attribute when it is softened.
pub const NAME_WEIGHT: f64 = 0.3;

/// Weight of the subtree-token attribute.
pub const TOKEN_WEIGHT: f64 = 0.3;
