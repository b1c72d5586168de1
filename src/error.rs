//! Error types for regraft.

use thiserror::Error;

use crate::node::Role;

/// Result type alias for regraft tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating trees.
#[derive(Error, Debug)]
pub enum Error {
    /// The node kind has no slot with the given role.
    #[error("kind has no slot for role {0:?}")]
    NoSuchSlot(Role),

    /// A single-child operation was attempted on a list slot, or vice versa.
    #[error("slot shape mismatch for role {0:?}")]
    SlotShape(Role),

    /// A list insertion index was outside the current list bounds.
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds {
        /// The requested insertion index.
        index: usize,
        /// The current list length.
        len: usize,
    },

    /// Attempted to detach a node that has no parent.
    #[error("node has no parent to detach from")]
    DetachWithoutParent,
}

/// A typed replay failure, naming the operation that could not be applied.
///
/// Replay halts at the first fatal error; the partially mutated working tree
/// is discarded by the caller dropping it. Callers should move on to the next
/// match instance rather than retry the same one.
#[derive(Error, Debug)]
#[error("replay failed at operation {op_index}: {kind}")]
pub struct ReplayError {
    /// Position of the failing operation in the pattern's script.
    pub op_index: usize,
    /// What went wrong.
    pub kind: ReplayErrorKind,
}

/// The reason a replay attempt failed.
#[derive(Error, Debug)]
pub enum ReplayErrorKind {
    /// The match instance handed to `apply_patch` was not legal.
    #[error("match instance is not legal")]
    IllegalMatchInstance,

    /// An operation's node reference survived none of the three resolution
    /// cases (maintenance map, before-side, after-side).
    #[error("unresolvable {what} reference")]
    UnresolvedReference {
        /// Which reference failed to resolve (e.g. "parent", "moved node").
        what: &'static str,
    },

    /// A tree manipulation failed (bad index, missing slot, shape mismatch).
    #[error(transparent)]
    Tree(#[from] Error),
}
