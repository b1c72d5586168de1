//! Patch replay: applying a pattern's edit script to a matched target tree.
//!
//! Replay maintains four node correspondences at once:
//!
//! - Before↔After, shipped with the pattern;
//! - Before↔Left, one match instance (Left is the target tree);
//! - Left↔Right, produced by deep-copying the whole target into the working
//!   tree (Right);
//! - After↔Right, the maintenance map, built incrementally for nodes that
//!   exist only in the After tree (inserted or re-materialized during this
//!   replay).
//!
//! Every node reference an operation carries is resolved onto Right through
//! one [`PatchApplier::resolve`] rule. The maintenance map is consulted
//! first: an entry there means an earlier operation of this same script
//! produced the node, and that live copy must win over the stale whole-tree
//! counterpart. Operations replay strictly in script order; the first fatal
//! error aborts the attempt and the working tree is discarded.

use tracing::{debug, warn};

use crate::error::{ReplayError, ReplayErrorKind};
use crate::matching::MatchInstance;
use crate::node::{
    attach_list, attach_single, deep_copy, detach, new_node, preorder, NodeBimap, NodeRef,
};
use crate::pattern::{EditOp, Pattern, SlotLocation};

/// Replays one pattern's script against one matched target tree.
pub struct PatchApplier<'a> {
    pattern: &'a Pattern,
    instance: &'a MatchInstance,
    /// Root of the working tree being mutated.
    right: NodeRef,
    /// Left↔Right map from the whole-target deep copy.
    left_to_right: NodeBimap,
    /// After↔Right maintenance map.
    maintenance: NodeBimap,
}

impl<'a> PatchApplier<'a> {
    /// Deep-copies the target and prepares the correspondence state.
    pub fn new(pattern: &'a Pattern, target: &NodeRef, instance: &'a MatchInstance) -> Self {
        let (right, left_to_right) = deep_copy(target);
        PatchApplier {
            pattern,
            instance,
            right,
            left_to_right,
            maintenance: NodeBimap::new(),
        }
    }

    /// Replays every operation in script order.
    ///
    /// Returns the mutated working tree root, or the first fatal error with
    /// the failing operation's position. The partially mutated tree is
    /// dropped on error.
    pub fn apply(mut self) -> Result<NodeRef, ReplayError> {
        if !self.instance.is_legal() {
            return Err(ReplayError {
                op_index: 0,
                kind: ReplayErrorKind::IllegalMatchInstance,
            });
        }

        for (op_index, op) in self.pattern.operations().iter().enumerate() {
            self.replay_one(op_index, op)
                .map_err(|kind| ReplayError { op_index, kind })?;
        }
        Ok(self.right)
    }

    fn replay_one(&mut self, op_index: usize, op: &EditOp) -> Result<(), ReplayErrorKind> {
        match op {
            EditOp::Delete { node } => {
                let target = self
                    .resolve(node)
                    .ok_or(ReplayErrorKind::UnresolvedReference {
                        what: "deleted node",
                    })?;
                detach(&target)?;
                debug!(op_index, "delete replayed");
            }
            EditOp::Insert {
                parent,
                location,
                template,
            } => {
                let parent_right =
                    self.resolve(parent)
                        .ok_or(ReplayErrorKind::UnresolvedReference {
                            what: "insert parent",
                        })?;

                // Fresh node from the template's kind and scalar only;
                // template children arrive through their own inserts.
                let fresh = new_node(template.borrow().kind());
                if let Some(scalar) = template.borrow().scalar() {
                    fresh.borrow_mut().set_scalar(scalar.clone());
                }
                // Recorded before attaching so later operations in this
                // script can reference the inserted node.
                self.maintenance.insert(template, &fresh);

                self.attach_at(&parent_right, *location, &fresh)?;
                debug!(op_index, "insert replayed");
            }
            EditOp::Move {
                node,
                new_parent,
                location,
            } => {
                let moved = if let Some(fresh) = self.maintenance.get(node) {
                    // The node was produced earlier in this replay; moving
                    // it must reuse that entry, never mint a second copy.
                    if fresh.borrow().is_attached() {
                        detach(&fresh)?;
                    }
                    fresh
                } else {
                    let stale =
                        self.resolve(node)
                            .ok_or(ReplayErrorKind::UnresolvedReference {
                                what: "moved node",
                            })?;
                    if stale.borrow().is_attached() {
                        detach(&stale)?;
                    }
                    // The whole-tree-copy counterpart goes stale here; a
                    // fresh subtree copy keeps later references safe even
                    // when the same subtree is touched twice.
                    let (fresh, copy_map) = deep_copy(&stale);
                    self.record_moved_subtree(&stale, &copy_map);
                    fresh
                };

                let parent_right =
                    self.resolve(new_parent)
                        .ok_or(ReplayErrorKind::UnresolvedReference {
                            what: "move destination parent",
                        })?;
                self.attach_at(&parent_right, *location, &moved)?;
                debug!(op_index, "move replayed");
            }
            EditOp::Update { node, new_value } => {
                let target = self
                    .resolve(node)
                    .ok_or(ReplayErrorKind::UnresolvedReference {
                        what: "updated node",
                    })?;
                let kind = target.borrow().kind();
                match kind.scalar_from_text(new_value) {
                    Some(scalar) => {
                        target.borrow_mut().set_scalar(scalar);
                        debug!(op_index, "update replayed");
                    }
                    None => {
                        // Losing one textual update is preferable to
                        // discarding an otherwise valid patch.
                        warn!(op_index, ?kind, "update on kind without a scalar, skipped");
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolves a Before- or After-tree node reference onto the Right tree.
    ///
    /// Three cases, tried in order:
    /// 1. the maintenance map (the node was created earlier in this replay);
    /// 2. a Before-side identity: map to Left via the match instance, then
    ///    to Right via the copy map;
    /// 3. an After-side identity: map to its Before counterpart, then as in
    ///    case 2.
    fn resolve(&self, reference: &NodeRef) -> Option<NodeRef> {
        if let Some(node) = self.maintenance.get(reference) {
            return Some(node);
        }
        if self.pattern.before_to_after().contains(reference) {
            let left = self.instance.node_map().get(reference)?;
            return self.left_to_right.get(&left);
        }
        if let Some(before) = self.pattern.before_to_after().get_back(reference) {
            let left = self.instance.node_map().get(&before)?;
            return self.left_to_right.get(&left);
        }
        None
    }

    /// Records the After identities of a freshly re-copied moved subtree in
    /// the maintenance map, so later operations land on the live copies.
    fn record_moved_subtree(&mut self, stale_root: &NodeRef, copy_map: &NodeBimap) {
        for stale in preorder(stale_root) {
            let Some(fresh) = copy_map.get(&stale) else {
                continue;
            };
            let Some(left) = self.left_to_right.get_back(&stale) else {
                continue;
            };
            let Some(before) = self.instance.node_map().get_back(&left) else {
                continue;
            };
            let Some(after) = self.pattern.before_to_after().get(&before) else {
                continue;
            };
            self.maintenance.insert(&after, &fresh);
        }
    }

    fn attach_at(
        &self,
        parent: &NodeRef,
        location: SlotLocation,
        child: &NodeRef,
    ) -> Result<(), ReplayErrorKind> {
        match location {
            SlotLocation::Single(role) => {
                // Overwrite; the displaced occupant is dropped.
                attach_single(parent, role, child)?;
            }
            SlotLocation::At(role, index) => {
                attach_list(parent, role, index, child)?;
            }
        }
        Ok(())
    }
}

/// Replays `pattern`'s edit script against `target` at the location picked
/// out by `instance`.
///
/// The target tree itself is never mutated; the result is a patched deep
/// copy. Illegal instances are rejected up front. On error, try the next
/// match instance rather than retrying this one.
pub fn apply_patch(
    pattern: &Pattern,
    target: &NodeRef,
    instance: &MatchInstance,
) -> Result<NodeRef, ReplayError> {
    PatchApplier::new(pattern, target, instance).apply()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{find_matches, MatchConfig};
    use crate::node::{new_leaf, Role, ScalarValue, SyntaxKind};
    use crate::pattern::AttrKey;

    fn name(text: &str) -> NodeRef {
        new_leaf(
            SyntaxKind::SimpleName,
            ScalarValue::Identifier(text.to_string()),
        )
    }

    fn return_of(expr: &NodeRef) -> NodeRef {
        let ret = new_node(SyntaxKind::ReturnStatement);
        attach_single(&ret, Role::Expression, expr).unwrap();
        ret
    }

    /// Pattern whose script deletes the return expression.
    fn delete_pattern() -> Pattern {
        let before = return_of(&name("x"));
        let before_x = before.borrow().children()[0].clone();
        let after = new_node(SyntaxKind::ReturnStatement);

        let mut map = NodeBimap::new();
        map.insert(&before, &after);

        Pattern::new(
            before.clone(),
            after,
            map,
            vec![EditOp::Delete { node: before_x }],
        )
    }

    fn first_legal(pattern: &Pattern, target: &NodeRef) -> MatchInstance {
        find_matches(pattern, target, &MatchConfig::default())
            .into_iter()
            .find(|i| i.is_legal())
            .expect("no legal instance")
    }

    #[test]
    fn test_delete_detaches_right_counterpart() {
        let pattern = delete_pattern();
        let target = return_of(&name("x"));
        let instance = first_legal(&pattern, &target);

        let patched = apply_patch(&pattern, &target, &instance).unwrap();
        assert_eq!(preorder(&patched).len(), 1);
        // The target itself is untouched.
        assert_eq!(preorder(&target).len(), 2);
    }

    #[test]
    fn test_illegal_instance_rejected() {
        // Pattern larger than the target can satisfy.
        let block = new_node(SyntaxKind::Block);
        attach_list(&block, Role::Statements, 0, &new_node(SyntaxKind::BreakStatement)).unwrap();
        attach_list(&block, Role::Statements, 1, &new_node(SyntaxKind::ContinueStatement)).unwrap();
        let pattern = Pattern::new(
            block,
            new_node(SyntaxKind::Block),
            NodeBimap::new(),
            vec![],
        );
        let target = new_node(SyntaxKind::BreakStatement);

        let instance = find_matches(&pattern, &target, &MatchConfig::default())
            .into_iter()
            .next()
            .unwrap();
        assert!(!instance.is_legal());

        let err = apply_patch(&pattern, &target, &instance).unwrap_err();
        assert!(matches!(err.kind, ReplayErrorKind::IllegalMatchInstance));
    }

    #[test]
    fn test_insert_into_single_slot_overwrites() {
        // Before: return x;  After: return y;  Script: insert y over the
        // expression slot (the diff replaced the name wholesale).
        let before = return_of(&name("x"));
        let after = return_of(&name("y"));
        let after_y = after.borrow().children()[0].clone();

        let mut map = NodeBimap::new();
        map.insert(&before, &after);

        let pattern = Pattern::new(
            before,
            after.clone(),
            map,
            vec![EditOp::Insert {
                parent: after,
                location: SlotLocation::Single(Role::Expression),
                template: after_y,
            }],
        );

        let target = return_of(&name("x"));
        let instance = first_legal(&pattern, &target);
        let patched = apply_patch(&pattern, &target, &instance).unwrap();

        let nodes = preorder(&patched);
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes[1].borrow().scalar(),
            Some(&ScalarValue::Identifier("y".to_string()))
        );
    }

    #[test]
    fn test_insert_index_out_of_bounds_is_fatal() {
        let before = new_node(SyntaxKind::Block);
        let after = new_node(SyntaxKind::Block);
        let template = new_node(SyntaxKind::BreakStatement);

        let mut map = NodeBimap::new();
        map.insert(&before, &after);

        let pattern = Pattern::new(
            before,
            after.clone(),
            map,
            vec![EditOp::Insert {
                parent: after,
                location: SlotLocation::At(Role::Statements, 3),
                template,
            }],
        );

        let target = new_node(SyntaxKind::Block);
        let instance = first_legal(&pattern, &target);

        let err = apply_patch(&pattern, &target, &instance).unwrap_err();
        assert_eq!(err.op_index, 0);
        assert!(matches!(
            err.kind,
            ReplayErrorKind::Tree(crate::error::Error::IndexOutOfBounds { index: 3, len: 0 })
        ));
    }

    #[test]
    fn test_update_sets_scalar() {
        let before = return_of(&name("x"));
        let before_x = before.borrow().children()[0].clone();
        let after = return_of(&name("y"));

        let mut map = NodeBimap::new();
        map.insert(&before, &after);
        map.insert(&before_x, &after.borrow().children()[0].clone());

        let mut pattern = Pattern::new(
            before,
            after,
            map,
            vec![EditOp::Update {
                node: before_x.clone(),
                new_value: "y".to_string(),
            }],
        );
        pattern.soften_attr(&before_x, AttrKey::Name);

        let target = return_of(&name("x"));
        let instance = first_legal(&pattern, &target);
        let patched = apply_patch(&pattern, &target, &instance).unwrap();

        assert_eq!(
            preorder(&patched)[1].borrow().scalar(),
            Some(&ScalarValue::Identifier("y".to_string()))
        );
    }

    #[test]
    fn test_update_without_scalar_field_is_skipped() {
        // Updating a null literal has no scalar to write; replay continues.
        let before = return_of(&new_leaf(
            SyntaxKind::NullLiteral,
            ScalarValue::Keyword("null".to_string()),
        ));
        let before_null = before.borrow().children()[0].clone();
        let after = new_node(SyntaxKind::ReturnStatement);

        let mut map = NodeBimap::new();
        map.insert(&before, &after);

        let pattern = Pattern::new(
            before,
            after,
            map,
            vec![EditOp::Update {
                node: before_null,
                new_value: "something".to_string(),
            }],
        );

        let target = return_of(&new_leaf(
            SyntaxKind::NullLiteral,
            ScalarValue::Keyword("null".to_string()),
        ));
        let instance = first_legal(&pattern, &target);

        // Does not error; tree unchanged apart from being a copy.
        let patched = apply_patch(&pattern, &target, &instance).unwrap();
        assert_eq!(preorder(&patched).len(), 2);
    }

    #[test]
    fn test_unresolvable_reference_is_fatal() {
        let before = new_node(SyntaxKind::Block);
        let after = new_node(SyntaxKind::Block);
        // Loose node with no identity anywhere.
        let stranger = new_node(SyntaxKind::BreakStatement);

        let mut map = NodeBimap::new();
        map.insert(&before, &after);

        let pattern = Pattern::new(
            before,
            after,
            map,
            vec![EditOp::Delete { node: stranger }],
        );

        let target = new_node(SyntaxKind::Block);
        let instance = first_legal(&pattern, &target);

        let err = apply_patch(&pattern, &target, &instance).unwrap_err();
        assert!(matches!(
            err.kind,
            ReplayErrorKind::UnresolvedReference { .. }
        ));
    }

    #[test]
    fn test_delete_already_detached_is_fatal() {
        // Two deletes of the same node: the second finds it parentless.
        let before = return_of(&name("x"));
        let before_x = before.borrow().children()[0].clone();
        let after = new_node(SyntaxKind::ReturnStatement);

        let mut map = NodeBimap::new();
        map.insert(&before, &after);

        let pattern = Pattern::new(
            before,
            after,
            map,
            vec![
                EditOp::Delete {
                    node: before_x.clone(),
                },
                EditOp::Delete { node: before_x },
            ],
        );

        let target = return_of(&name("x"));
        let instance = first_legal(&pattern, &target);

        let err = apply_patch(&pattern, &target, &instance).unwrap_err();
        assert_eq!(err.op_index, 1);
        assert!(matches!(
            err.kind,
            ReplayErrorKind::Tree(crate::error::Error::DetachWithoutParent)
        ));
    }
}
