//! regraft - Pattern-based structural code repair
//!
//! This library matches captured edit patterns against syntax trees and
//! replays their edit scripts onto new locations.
//!
//! # Overview
//!
//! A repair pattern is harvested from one example change: a Before tree, an
//! After tree, their node correspondence, and a generalized edit script of
//! delete, insert, move and update operations. Given a fresh target tree,
//! the library finds where the pattern's Before side fits (similarity-scored
//! backtracking search under hard and soft attribute constraints) and then
//! grafts the script onto a deep copy of the target, leaving the target
//! itself untouched.
//!
//! # Pipeline
//!
//! 1. Rough matching screens every considered pattern node against every
//!    target node and keeps threshold-filtered candidate lists.
//! 2. Exact matching runs a backtracking search over those lists, producing
//!    ranked [`MatchInstance`]s.
//! 3. Replay resolves each script operation's node references through the
//!    four live node correspondences and mutates the working copy, in
//!    script order, failing fast on the first fatal error.

pub mod apply;
pub mod constants;
pub mod error;
pub mod matching;
pub mod node;
pub mod pattern;

// Re-export commonly used types
pub use apply::{apply_patch, PatchApplier};
pub use constants::*;
pub use error::{Error, ReplayError, ReplayErrorKind, Result};
pub use matching::{find_matches, Candidate, MatchConfig, MatchInstance, RoughEntry, RoughMapping};
pub use node::{
    attach_list, attach_single, deep_copy, detach, in_tree, new_leaf, new_node, preorder,
    NodeBimap, NodeInner, NodeRef, Role, ScalarValue, Slot, SlotShape, SlotValue, SyntaxKind,
    WeakNodeRef,
};
pub use pattern::{
    AttrFlags, AttrKey, AttrTable, AttrValue, Attribute, EditOp, Pattern, SlotLocation,
};
