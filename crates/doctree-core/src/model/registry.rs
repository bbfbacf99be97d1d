//! Global id/name lookup table for live nodes.
//!
//! The registry is a denormalized index over the project arena: every node
//! reachable from the final forest has exactly one entry, and nodes that are
//! absorbed, flattened or discarded lose theirs. All writes go through
//! [`Registry::insert`] and [`Registry::remove`], which keep the id and name
//! indexes in step.

use std::collections::{BTreeMap, HashMap};

use crate::error::ModelError;
use crate::model::NodeId;

/// Lookup table from node id (and name) to node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    by_id: BTreeMap<NodeId, String>,
    by_name: HashMap<String, Vec<NodeId>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry for `id`.
    ///
    /// # Errors
    /// Returns [`ModelError::AlreadyRegistered`] if `id` already has an entry.
    pub fn insert(&mut self, id: NodeId, name: &str) -> Result<(), ModelError> {
        if let Some(existing) = self.by_id.get(&id) {
            return Err(ModelError::AlreadyRegistered {
                id,
                name: existing.clone(),
            });
        }
        self.by_id.insert(id, name.to_owned());
        self.by_name.entry(name.to_owned()).or_default().push(id);
        Ok(())
    }

    /// Drop the entry for `id`, returning its name. Absent ids are a no-op.
    pub fn remove(&mut self, id: NodeId) -> Option<String> {
        let name = self.by_id.remove(&id)?;
        if let Some(ids) = self.by_name.get_mut(&name) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.by_name.remove(&name);
            }
        }
        Some(name)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All registered ids carrying `name`, in registration order.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> &[NodeId] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_id.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_remove() {
        let mut reg = Registry::new();
        reg.insert(NodeId::new(1), "Widget").unwrap();
        reg.insert(NodeId::new(2), "Widget").unwrap();
        reg.insert(NodeId::new(3), "render").unwrap();

        assert_eq!(reg.len(), 3);
        assert!(reg.contains(NodeId::new(3)));
        assert_eq!(
            reg.lookup_name("Widget"),
            &[NodeId::new(1), NodeId::new(2)]
        );

        assert_eq!(reg.remove(NodeId::new(1)).as_deref(), Some("Widget"));
        assert_eq!(reg.lookup_name("Widget"), &[NodeId::new(2)]);
        assert!(!reg.contains(NodeId::new(1)));

        reg.remove(NodeId::new(2));
        assert!(reg.lookup_name("Widget").is_empty());
    }

    #[test]
    fn insert_rejects_second_entry_for_same_id() {
        let mut reg = Registry::new();
        reg.insert(NodeId::new(7), "a").unwrap();
        let err = reg.insert(NodeId::new(7), "b").unwrap_err();
        assert_eq!(
            err,
            ModelError::AlreadyRegistered {
                id: NodeId::new(7),
                name: "a".to_owned(),
            }
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut reg = Registry::new();
        assert_eq!(reg.remove(NodeId::new(9)), None);
        assert!(reg.is_empty());
    }
}
