//! Deep copying of subtrees.
//!
//! Copying a tree yields structurally identical nodes with entirely fresh
//! identities, plus an original↔copy [`NodeBimap`] so callers can carry node
//! correspondences across the copy. Patch replay uses this both for the
//! whole-target working copy and for re-materializing moved subtrees.

use super::{
    attach_list, attach_single, new_node, NodeBimap, NodeRef, SlotValue,
};

/// Deep-copies the subtree rooted at `root`.
///
/// Returns the copy root and the original→copy correspondence covering every
/// node of the subtree. The copy root is detached regardless of whether the
/// original was attached.
pub fn deep_copy(root: &NodeRef) -> (NodeRef, NodeBimap) {
    let mut map = NodeBimap::new();
    let copy = copy_rec(root, &mut map);
    (copy, map)
}

fn copy_rec(original: &NodeRef, map: &mut NodeBimap) -> NodeRef {
    let copy = {
        let inner = original.borrow();
        let node = new_node(inner.kind());
        if let Some(scalar) = inner.scalar() {
            node.borrow_mut().set_scalar(scalar.clone());
        }
        node
    };
    map.insert(original, &copy);

    let slots: Vec<_> = original
        .borrow()
        .slots()
        .iter()
        .map(|slot| {
            let children = match slot.value() {
                SlotValue::Single(child) => child.iter().cloned().collect::<Vec<_>>(),
                SlotValue::List(list) => list.clone(),
            };
            (slot.role(), matches!(slot.value(), SlotValue::List(_)), children)
        })
        .collect();

    for (role, is_list, children) in slots {
        if is_list {
            for (i, child) in children.iter().enumerate() {
                let child_copy = copy_rec(child, map);
                // Infallible: the copy's slot is shaped like the original's
                // and indices arrive in order.
                let _ = attach_list(&copy, role, i, &child_copy);
            }
        } else if let Some(child) = children.first() {
            let child_copy = copy_rec(child, map);
            let _ = attach_single(&copy, role, &child_copy);
        }
    }

    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{
        attach_list, attach_single, new_leaf, preorder, Role, ScalarValue, SyntaxKind,
    };

    fn sample_tree() -> NodeRef {
        let if_stmt = new_node(SyntaxKind::IfStatement);
        let cond = new_leaf(
            SyntaxKind::SimpleName,
            ScalarValue::Identifier("x".to_string()),
        );
        let then = new_node(SyntaxKind::Block);
        let ret = new_node(SyntaxKind::ReturnStatement);
        attach_single(&if_stmt, Role::Condition, &cond).unwrap();
        attach_single(&if_stmt, Role::Then, &then).unwrap();
        attach_list(&then, Role::Statements, 0, &ret).unwrap();
        if_stmt
    }

    #[test]
    fn test_copy_preserves_structure() {
        let original = sample_tree();
        let (copy, _) = deep_copy(&original);

        let orig_nodes = preorder(&original);
        let copy_nodes = preorder(&copy);
        assert_eq!(orig_nodes.len(), copy_nodes.len());
        for (o, c) in orig_nodes.iter().zip(copy_nodes.iter()) {
            assert_eq!(o.borrow().kind(), c.borrow().kind());
            assert_eq!(o.borrow().scalar(), c.borrow().scalar());
            assert_ne!(o.borrow().id(), c.borrow().id());
        }
    }

    #[test]
    fn test_copy_map_covers_every_node() {
        let original = sample_tree();
        let (_, map) = deep_copy(&original);
        assert_eq!(map.len(), preorder(&original).len());
        for node in preorder(&original) {
            assert!(map.contains(&node));
        }
    }

    #[test]
    fn test_mutating_copy_leaves_original_untouched() {
        let original = sample_tree();
        let (copy, map) = deep_copy(&original);

        // Delete the return statement from the copy.
        let orig_ret = preorder(&original)
            .into_iter()
            .find(|n| n.borrow().kind() == SyntaxKind::ReturnStatement)
            .unwrap();
        let copy_ret = map.get(&orig_ret).unwrap();
        crate::node::detach(&copy_ret).unwrap();

        assert_eq!(preorder(&copy).len(), 3);
        assert_eq!(preorder(&original).len(), 4);
    }

    #[test]
    fn test_copy_root_is_detached() {
        let block = new_node(SyntaxKind::Block);
        let stmt = new_node(SyntaxKind::BreakStatement);
        attach_list(&block, Role::Statements, 0, &stmt).unwrap();

        let (copy, _) = deep_copy(&stmt);
        assert!(!copy.borrow().is_attached());
    }
}
