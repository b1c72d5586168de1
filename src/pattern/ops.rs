//! Typed edit operations making up a pattern's replayable script.
//!
//! Each operation is fixed at pattern-construction time and references only
//! nodes of the pattern's Before and After trees; resolution onto the target
//! happens during replay. Operations must be replayed in the order recorded
//! by the diff that produced them.

use crate::node::{NodeRef, Role};

/// Where an inserted or moved node lands in its destination parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLocation {
    /// A single-child slot; an existing occupant is overwritten.
    Single(Role),
    /// A list slot at the recorded index, bounds-checked at replay time.
    At(Role, usize),
}

impl SlotLocation {
    /// Returns the role of the destination slot.
    pub fn role(&self) -> Role {
        match self {
            SlotLocation::Single(role) | SlotLocation::At(role, _) => *role,
        }
    }
}

/// One step of a pattern's generalized edit script.
#[derive(Debug, Clone)]
pub enum EditOp {
    /// Detach a Before-tree node from its parent.
    Delete {
        /// The node to delete, in the Before tree.
        node: NodeRef,
    },
    /// Create a fresh node from an After-tree template and attach it.
    ///
    /// The template contributes its kind and scalar only; template children
    /// arrive through their own later inserts.
    Insert {
        /// Destination parent, in the After tree.
        parent: NodeRef,
        /// Destination slot and list index.
        location: SlotLocation,
        /// The After-tree node serving as the template.
        template: NodeRef,
    },
    /// Detach a node and re-attach it under a new parent.
    Move {
        /// The moved node, in the Before tree.
        node: NodeRef,
        /// Destination parent, in the After tree.
        new_parent: NodeRef,
        /// Destination slot and list index.
        location: SlotLocation,
    },
    /// Replace the scalar value of a Before-tree leaf.
    Update {
        /// The node to update, in the Before tree.
        node: NodeRef,
        /// The new scalar value, as raw text interpreted per node kind.
        new_value: String,
    },
}
