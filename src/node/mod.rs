//! Node structures for typed syntax-tree representation.
//!
//! A tree is built from reference-counted [`NodeRef`] handles. Each node has
//! a kind tag from a closed enumeration, named slots shaped per kind (single
//! child or ordered list), an optional scalar value for leaf kinds, and a
//! weak parent back-reference recording the slot it occupies. The parent
//! reference is maintained exclusively by [`attach_single`], [`attach_list`]
//! and [`detach`]; attaching a node to a new slot first detaches it from any
//! previous one, so a node belongs to at most one parent slot at a time.

mod bimap;
mod copy;
mod kind;

pub use bimap::NodeBimap;
pub use copy::deep_copy;
pub use kind::{Role, ScalarValue, SlotShape, SyntaxKind};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

/// Global counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique node ID.
fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A reference-counted pointer to a node.
pub type NodeRef = Rc<RefCell<NodeInner>>;

/// A weak reference to a node, used for parent back-references.
pub type WeakNodeRef = Weak<RefCell<NodeInner>>;

/// The contents of one named slot.
#[derive(Debug)]
pub enum SlotValue {
    /// A single-child slot, possibly empty.
    Single(Option<NodeRef>),
    /// An ordered child list.
    List(Vec<NodeRef>),
}

/// A named slot of a node.
#[derive(Debug)]
pub struct Slot {
    role: Role,
    value: SlotValue,
}

impl Slot {
    /// Returns the role naming this slot.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the slot contents.
    pub fn value(&self) -> &SlotValue {
        &self.value
    }
}

/// The inner data of a syntax-tree node.
#[derive(Debug)]
pub struct NodeInner {
    /// Unique identifier, stable for the node's lifetime.
    id: u64,
    /// Kind tag from the closed enumeration.
    kind: SyntaxKind,
    /// Named slots, shaped by the kind's layout table.
    slots: Vec<Slot>,
    /// Scalar value; present only on leaf kinds that carry one.
    scalar: Option<ScalarValue>,
    /// Weak reference to the parent node.
    parent: WeakNodeRef,
    /// The role of the parent slot this node occupies.
    parent_role: Option<Role>,
}

impl NodeInner {
    fn new(kind: SyntaxKind, scalar: Option<ScalarValue>) -> Self {
        let slots = kind
            .slots()
            .iter()
            .map(|(role, shape)| Slot {
                role: *role,
                value: match shape {
                    SlotShape::Single => SlotValue::Single(None),
                    SlotShape::List => SlotValue::List(Vec::new()),
                },
            })
            .collect();
        NodeInner {
            id: next_node_id(),
            kind,
            slots,
            scalar,
            parent: Weak::new(),
            parent_role: None,
        }
    }

    /// Returns the unique ID of this node.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Returns the scalar value, if this is a scalar-bearing leaf.
    pub fn scalar(&self) -> Option<&ScalarValue> {
        self.scalar.as_ref()
    }

    /// Replaces the scalar value.
    pub fn set_scalar(&mut self, value: ScalarValue) {
        self.scalar = Some(value);
    }

    /// Returns the slots in declaration order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Returns the contents of the slot with the given role.
    pub fn slot(&self, role: Role) -> Option<&SlotValue> {
        self.slots
            .iter()
            .find(|slot| slot.role == role)
            .map(|slot| &slot.value)
    }

    fn slot_mut(&mut self, role: Role) -> Option<&mut SlotValue> {
        self.slots
            .iter_mut()
            .find(|slot| slot.role == role)
            .map(|slot| &mut slot.value)
    }

    /// Returns a weak reference to the parent.
    pub fn parent(&self) -> &WeakNodeRef {
        &self.parent
    }

    /// Returns the role of the parent slot this node sits in, if attached.
    pub fn parent_role(&self) -> Option<Role> {
        self.parent_role
    }

    /// Returns true if this node currently has a parent.
    pub fn is_attached(&self) -> bool {
        self.parent.strong_count() > 0
    }

    /// Collects the children of every slot, in slot declaration order.
    pub fn children(&self) -> Vec<NodeRef> {
        let mut out = Vec::new();
        for slot in &self.slots {
            match &slot.value {
                SlotValue::Single(Some(child)) => out.push(child.clone()),
                SlotValue::Single(None) => {}
                SlotValue::List(list) => out.extend(list.iter().cloned()),
            }
        }
        out
    }
}

/// Creates a new non-leaf node of the given kind with empty slots.
pub fn new_node(kind: SyntaxKind) -> NodeRef {
    Rc::new(RefCell::new(NodeInner::new(kind, None)))
}

/// Creates a new leaf node carrying the given scalar value.
pub fn new_leaf(kind: SyntaxKind, value: ScalarValue) -> NodeRef {
    Rc::new(RefCell::new(NodeInner::new(kind, Some(value))))
}

/// Attaches `child` into the single-child slot `role` of `parent`.
///
/// The child is first detached from any previous parent. Returns the node
/// that previously occupied the slot, if any; the displaced node is left
/// detached.
pub fn attach_single(parent: &NodeRef, role: Role, child: &NodeRef) -> Result<Option<NodeRef>> {
    match parent.borrow().kind().slot_shape(role) {
        Some(SlotShape::Single) => {}
        Some(SlotShape::List) => return Err(Error::SlotShape(role)),
        None => return Err(Error::NoSuchSlot(role)),
    }

    if child.borrow().is_attached() {
        detach(child)?;
    }

    let displaced = {
        let mut parent_inner = parent.borrow_mut();
        match parent_inner.slot_mut(role) {
            Some(SlotValue::Single(current)) => current.replace(child.clone()),
            _ => unreachable!("shape checked above"),
        }
    };
    if let Some(old) = &displaced {
        let mut old_inner = old.borrow_mut();
        old_inner.parent = Weak::new();
        old_inner.parent_role = None;
    }

    let mut child_inner = child.borrow_mut();
    child_inner.parent = Rc::downgrade(parent);
    child_inner.parent_role = Some(role);
    Ok(displaced)
}

/// Inserts `child` into the list slot `role` of `parent` at `index`.
///
/// The child is first detached from any previous parent. The index is
/// bounds-checked against the current list length (`0 ≤ index ≤ len`); an
/// out-of-range index is an error, never clamped.
pub fn attach_list(parent: &NodeRef, role: Role, index: usize, child: &NodeRef) -> Result<()> {
    match parent.borrow().kind().slot_shape(role) {
        Some(SlotShape::List) => {}
        Some(SlotShape::Single) => return Err(Error::SlotShape(role)),
        None => return Err(Error::NoSuchSlot(role)),
    }

    if child.borrow().is_attached() {
        detach(child)?;
    }

    {
        let mut parent_inner = parent.borrow_mut();
        match parent_inner.slot_mut(role) {
            Some(SlotValue::List(list)) => {
                if index > list.len() {
                    return Err(Error::IndexOutOfBounds {
                        index,
                        len: list.len(),
                    });
                }
                list.insert(index, child.clone());
            }
            _ => unreachable!("shape checked above"),
        }
    }

    let mut child_inner = child.borrow_mut();
    child_inner.parent = Rc::downgrade(parent);
    child_inner.parent_role = Some(role);
    Ok(())
}

/// Detaches `child` from its parent slot and clears the back-reference.
///
/// Returns an error if the node has no parent.
pub fn detach(child: &NodeRef) -> Result<()> {
    let (parent, role) = {
        let inner = child.borrow();
        let parent = inner.parent.upgrade().ok_or(Error::DetachWithoutParent)?;
        let role = inner.parent_role.ok_or(Error::DetachWithoutParent)?;
        (parent, role)
    };

    let child_id = child.borrow().id();
    {
        let mut parent_inner = parent.borrow_mut();
        match parent_inner.slot_mut(role) {
            Some(SlotValue::Single(current)) => {
                if current.as_ref().map(|n| n.borrow().id()) == Some(child_id) {
                    *current = None;
                }
            }
            Some(SlotValue::List(list)) => {
                list.retain(|n| n.borrow().id() != child_id);
            }
            None => {}
        }
    }

    let mut child_inner = child.borrow_mut();
    child_inner.parent = Weak::new();
    child_inner.parent_role = None;
    Ok(())
}

/// Collects the subtree rooted at `node` in preorder.
pub fn preorder(node: &NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let mut stack = vec![node.clone()];
    while let Some(current) = stack.pop() {
        let children = current.borrow().children();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
        out.push(current);
    }
    out
}

/// Returns true if `node` lives in the tree rooted at `root`.
pub fn in_tree(root: &NodeRef, node: &NodeRef) -> bool {
    let id = node.borrow().id();
    preorder(root).iter().any(|n| n.borrow().id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> NodeRef {
        new_leaf(
            SyntaxKind::SimpleName,
            ScalarValue::Identifier(text.to_string()),
        )
    }

    #[test]
    fn test_unique_node_ids() {
        let a = new_node(SyntaxKind::Block);
        let b = new_node(SyntaxKind::Block);
        assert_ne!(a.borrow().id(), b.borrow().id());
    }

    #[test]
    fn test_attach_single_sets_parent() {
        let if_stmt = new_node(SyntaxKind::IfStatement);
        let cond = name("flag");
        attach_single(&if_stmt, Role::Condition, &cond).unwrap();

        assert!(cond.borrow().is_attached());
        assert_eq!(cond.borrow().parent_role(), Some(Role::Condition));
        let parent = cond.borrow().parent().upgrade().unwrap();
        assert_eq!(parent.borrow().id(), if_stmt.borrow().id());
    }

    #[test]
    fn test_attach_single_displaces_previous_occupant() {
        let ret = new_node(SyntaxKind::ReturnStatement);
        let a = name("a");
        let b = name("b");
        attach_single(&ret, Role::Expression, &a).unwrap();
        let displaced = attach_single(&ret, Role::Expression, &b).unwrap();

        assert_eq!(
            displaced.unwrap().borrow().id(),
            a.borrow().id()
        );
        assert!(!a.borrow().is_attached());
        assert!(b.borrow().is_attached());
    }

    #[test]
    fn test_attach_moves_node_out_of_old_slot() {
        let block_a = new_node(SyntaxKind::Block);
        let block_b = new_node(SyntaxKind::Block);
        let stmt = new_node(SyntaxKind::BreakStatement);

        attach_list(&block_a, Role::Statements, 0, &stmt).unwrap();
        attach_list(&block_b, Role::Statements, 0, &stmt).unwrap();

        assert_eq!(block_a.borrow().children().len(), 0);
        assert_eq!(block_b.borrow().children().len(), 1);
        let parent = stmt.borrow().parent().upgrade().unwrap();
        assert_eq!(parent.borrow().id(), block_b.borrow().id());
    }

    #[test]
    fn test_attach_list_bounds_checked() {
        let block = new_node(SyntaxKind::Block);
        let stmt = new_node(SyntaxKind::BreakStatement);
        let err = attach_list(&block, Role::Statements, 1, &stmt).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfBounds { index: 1, len: 0 }
        ));
    }

    #[test]
    fn test_attach_wrong_shape() {
        let block = new_node(SyntaxKind::Block);
        let stmt = new_node(SyntaxKind::BreakStatement);
        assert!(matches!(
            attach_single(&block, Role::Statements, &stmt),
            Err(Error::SlotShape(Role::Statements))
        ));
        let if_stmt = new_node(SyntaxKind::IfStatement);
        assert!(matches!(
            attach_list(&if_stmt, Role::Condition, 0, &stmt),
            Err(Error::SlotShape(Role::Condition))
        ));
    }

    #[test]
    fn test_attach_unknown_role() {
        let block = new_node(SyntaxKind::Block);
        let stmt = new_node(SyntaxKind::BreakStatement);
        assert!(matches!(
            attach_single(&block, Role::Condition, &stmt),
            Err(Error::NoSuchSlot(Role::Condition))
        ));
    }

    #[test]
    fn test_detach_clears_backref() {
        let block = new_node(SyntaxKind::Block);
        let stmt = new_node(SyntaxKind::BreakStatement);
        attach_list(&block, Role::Statements, 0, &stmt).unwrap();

        detach(&stmt).unwrap();
        assert!(!stmt.borrow().is_attached());
        assert_eq!(stmt.borrow().parent_role(), None);
        assert_eq!(block.borrow().children().len(), 0);
    }

    #[test]
    fn test_detach_without_parent_is_error() {
        let stmt = new_node(SyntaxKind::BreakStatement);
        assert!(matches!(detach(&stmt), Err(Error::DetachWithoutParent)));
    }

    #[test]
    fn test_preorder_order() {
        let if_stmt = new_node(SyntaxKind::IfStatement);
        let cond = name("x");
        let then = new_node(SyntaxKind::Block);
        let ret = new_node(SyntaxKind::ReturnStatement);
        attach_single(&if_stmt, Role::Condition, &cond).unwrap();
        attach_single(&if_stmt, Role::Then, &then).unwrap();
        attach_list(&then, Role::Statements, 0, &ret).unwrap();

        let order: Vec<u64> = preorder(&if_stmt).iter().map(|n| n.borrow().id()).collect();
        assert_eq!(
            order,
            vec![
                if_stmt.borrow().id(),
                cond.borrow().id(),
                then.borrow().id(),
                ret.borrow().id()
            ]
        );
    }

    #[test]
    fn test_in_tree() {
        let block = new_node(SyntaxKind::Block);
        let stmt = new_node(SyntaxKind::BreakStatement);
        let loose = new_node(SyntaxKind::BreakStatement);
        attach_list(&block, Role::Statements, 0, &stmt).unwrap();

        assert!(in_tree(&block, &stmt));
        assert!(!in_tree(&block, &loose));
    }
}
