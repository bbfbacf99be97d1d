//! The host project: a node arena, its top-level forest and its registry.
//!
//! Ownership is explicit. A node is either top-level, owned by exactly one
//! parent, or detached (in the arena but unreachable). Every structural
//! change goes through a method here so that a node is never listed under
//! two owners at once and the [`Registry`] only ever changes at the points
//! where nodes are created, registered, flattened or discarded.

use std::collections::HashMap;
use std::mem;

use crate::error::ModelError;
use crate::model::{NewNode, Node, NodeId, Registry};

/// A documentation project under construction.
#[derive(Clone, Debug)]
pub struct Project {
    name: String,
    nodes: HashMap<NodeId, Node>,
    children: Vec<NodeId>,
    registry: Registry,
    /// Next fresh id; `None` once `u64::MAX` has been handed out or taken.
    next_id: Option<u64>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: HashMap::new(),
            children: Vec::new(),
            registry: Registry::new(),
            next_id: Some(1),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level forest, in output order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Like [`Project::node`], but a missing id is an error.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeNotFound`] if `id` is not in the arena.
    pub fn get(&self, id: NodeId) -> Result<&Node, ModelError> {
        self.nodes.get(&id).ok_or(ModelError::NodeNotFound { id })
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Insert a registered node under `parent` (or at top level) with a fresh id.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeNotFound`] if `parent` does not exist and
    /// [`ModelError::IdSpaceExhausted`] if no fresh id is left.
    pub fn add_node(&mut self, parent: Option<NodeId>, new: NewNode) -> Result<NodeId, ModelError> {
        if let Some(p) = parent
            && !self.nodes.contains_key(&p)
        {
            return Err(ModelError::NodeNotFound { id: p });
        }
        let id = self.allocate_id()?;
        self.insert_with_id(id, parent, new)?;
        Ok(id)
    }

    /// Insert a registered node with a caller-chosen id.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateId`] if `id` is taken, or
    /// [`ModelError::NodeNotFound`] if `parent` does not exist.
    pub fn insert_with_id(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        new: NewNode,
    ) -> Result<(), ModelError> {
        if self.nodes.contains_key(&id) {
            return Err(ModelError::DuplicateId { id });
        }
        if let Some(p) = parent
            && !self.nodes.contains_key(&p)
        {
            return Err(ModelError::NodeNotFound { id: p });
        }
        self.registry.insert(id, &new.name)?;
        let mut node = Node::from_new(id, new);
        node.parent = parent;
        self.nodes.insert(id, node);
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(owner) => owner.children.push(id),
            None => self.children.push(id),
        }
        self.reserve_ids_through(id.get());
        Ok(())
    }

    /// Insert an unregistered node with no owner.
    ///
    /// Used for synthetic nodes that only become part of the forest (and
    /// the registry) once they are known to be emitted.
    ///
    /// # Errors
    /// Returns [`ModelError::IdSpaceExhausted`] if no fresh id is left.
    pub fn create_detached(&mut self, new: NewNode) -> Result<NodeId, ModelError> {
        let id = self.allocate_id()?;
        if self.nodes.contains_key(&id) {
            return Err(ModelError::DuplicateId { id });
        }
        self.nodes.insert(id, Node::from_new(id, new));
        Ok(id)
    }

    /// Check that `count` fresh ids can still be allocated.
    ///
    /// # Errors
    /// Returns [`ModelError::IdSpaceExhausted`] otherwise.
    pub fn ensure_fresh_ids(&self, count: usize) -> Result<(), ModelError> {
        let Some(extra) = count.checked_sub(1) else {
            return Ok(());
        };
        let extra = u64::try_from(extra).map_err(|_| ModelError::IdSpaceExhausted)?;
        self.next_id
            .and_then(|next| next.checked_add(extra))
            .map(|_| ())
            .ok_or(ModelError::IdSpaceExhausted)
    }

    /// Make sure fresh ids start above `max`.
    pub(crate) fn reserve_ids_through(&mut self, max: u64) {
        if let Some(next) = self.next_id
            && max >= next
        {
            self.next_id = max.checked_add(1);
        }
    }

    fn allocate_id(&mut self) -> Result<NodeId, ModelError> {
        let id = self.next_id.ok_or(ModelError::IdSpaceExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(NodeId::new(id))
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Add the registry entry for an existing node.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeNotFound`] or [`ModelError::AlreadyRegistered`].
    pub fn register(&mut self, id: NodeId) -> Result<(), ModelError> {
        let node = self.nodes.get(&id).ok_or(ModelError::NodeNotFound { id })?;
        self.registry.insert(id, &node.name)
    }

    /// Drop the registry entry for `id`, keeping the node itself.
    pub fn unregister(&mut self, id: NodeId) -> Option<String> {
        self.registry.remove(id)
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Empty the top-level forest and return what it held.
    ///
    /// The returned nodes stay in the arena, parentless and unreachable,
    /// until they are re-parented or discarded.
    pub fn detach_top_level(&mut self) -> Vec<NodeId> {
        mem::take(&mut self.children)
    }

    /// Replace the top-level forest wholesale.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeNotFound`] for unknown ids.
    pub fn set_top_level(&mut self, ids: Vec<NodeId>) -> Result<(), ModelError> {
        for &id in &ids {
            self.detach(id)?;
        }
        for id in self.detach_top_level() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parent = None;
            }
        }
        self.children = ids;
        Ok(())
    }

    /// Move `id` from its current owner to the end of `new_parent`'s children.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeNotFound`] for unknown ids and
    /// [`ModelError::Cycle`] if `new_parent` lies inside `id`'s subtree.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), ModelError> {
        self.get(id)?;
        self.get(new_parent)?;
        if self.is_ancestor_or_self(id, new_parent) {
            return Err(ModelError::Cycle { id, new_parent });
        }
        self.detach(id)?;
        self.attach(id, new_parent);
        Ok(())
    }

    /// Move all children of `from` to the end of `to`'s children, in order.
    ///
    /// Returns the moved ids.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeNotFound`] for unknown ids and
    /// [`ModelError::Cycle`] if `to` lies inside `from`'s subtree.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>, ModelError> {
        self.get(to)?;
        if self.is_ancestor_or_self(from, to) {
            return Err(ModelError::Cycle {
                id: from,
                new_parent: to,
            });
        }
        let moved = mem::take(
            &mut self
                .nodes
                .get_mut(&from)
                .ok_or(ModelError::NodeNotFound { id: from })?
                .children,
        );
        for &child in &moved {
            self.attach(child, to);
        }
        Ok(moved)
    }

    /// Remove `id` and its whole subtree from the arena and the registry.
    ///
    /// Returns the number of nodes removed.
    ///
    /// # Errors
    /// Returns [`ModelError::NodeNotFound`] if `id` is unknown.
    pub fn discard_subtree(&mut self, id: NodeId) -> Result<usize, ModelError> {
        self.detach(id)?;
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                self.registry.remove(next);
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Every node reachable from the top-level forest, in pre-order.
    #[must_use]
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_preorder(&self.children, &mut out);
        out
    }

    fn collect_preorder(&self, roots: &[NodeId], out: &mut Vec<NodeId>) {
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// True if `ancestor` is `node` or lies on `node`'s parent chain.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    /// Unlink `id` from whichever list currently owns it.
    fn detach(&mut self, id: NodeId) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ModelError::NodeNotFound { id })?;
        match node.parent.take() {
            Some(parent) => {
                if let Some(owner) = self.nodes.get_mut(&parent) {
                    owner.children.retain(|&c| c != id);
                }
            }
            None => self.children.retain(|&c| c != id),
        }
        Ok(())
    }

    /// Link a parentless `id` under `parent`. Both must exist.
    fn attach(&mut self, id: NodeId, parent: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        if let Some(owner) = self.nodes.get_mut(&parent) {
            owner.children.push(id);
        }
    }
}
