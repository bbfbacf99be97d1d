//! Serialized form of a project: nested nodes, as read from and written to JSON.
//!
//! ```json
//! {
//!   "name": "my-workspace",
//!   "children": [
//!     { "id": 1, "name": "index", "kind": "external-module",
//!       "sourcePath": "/ws/core/src/index.ts",
//!       "children": [ { "name": "Widget", "kind": "class",
//!                       "sourcePath": "/ws/core/src/index.ts",
//!                       "flags": { "exported": true } } ] }
//!   ]
//! }
//! ```
//!
//! Ids are optional on input; nodes without one get a fresh id above the
//! largest explicit id.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{NewNode, NodeFlags, NodeId, NodeKind, Project};

/// A whole project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDoc {
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeDoc>,
}

/// One node and its subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub name: String,
    pub kind: NodeKind,
    #[serde(alias = "originalName")]
    pub source_path: PathBuf,
    #[serde(default)]
    pub flags: NodeFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDoc>,
}

impl Project {
    /// Build a project from its serialized form. Every node is registered.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateId`] if two nodes carry the same id and
    /// [`ModelError::IdSpaceExhausted`] if a node without an id cannot get one.
    pub fn from_doc(doc: ProjectDoc) -> Result<Self, ModelError> {
        let mut project = Self::new(doc.name);

        // Explicit ids go first so that fresh ones never collide with them.
        let mut explicit = Vec::new();
        collect_ids(&doc.children, &mut explicit);
        if let Some(max) = explicit.iter().map(|id| id.get()).max() {
            project.reserve_ids_through(max);
        }

        let mut stack: Vec<(Option<NodeId>, NodeDoc)> =
            doc.children.into_iter().rev().map(|c| (None, c)).collect();
        while let Some((parent, node)) = stack.pop() {
            let new = NewNode {
                name: node.name,
                kind: node.kind,
                source_path: node.source_path,
                flags: node.flags,
                description: node.description,
            };
            let id = match node.id {
                Some(id) => {
                    project.insert_with_id(id, parent, new)?;
                    id
                }
                None => project.add_node(parent, new)?,
            };
            stack.extend(node.children.into_iter().rev().map(|c| (Some(id), c)));
        }
        Ok(project)
    }

    /// Serialize the forest reachable from the top level.
    #[must_use]
    pub fn to_doc(&self) -> ProjectDoc {
        ProjectDoc {
            name: self.name().to_owned(),
            children: self
                .children()
                .iter()
                .filter_map(|&id| self.node_doc(id))
                .collect(),
        }
    }

    fn node_doc(&self, id: NodeId) -> Option<NodeDoc> {
        let node = self.node(id)?;
        Some(NodeDoc {
            id: Some(id),
            name: node.name.clone(),
            kind: node.kind,
            source_path: node.source_path.clone(),
            flags: node.flags,
            description: node.description.clone(),
            children: node
                .children()
                .iter()
                .filter_map(|&c| self.node_doc(c))
                .collect(),
        })
    }
}

fn collect_ids(nodes: &[NodeDoc], out: &mut Vec<NodeId>) {
    for node in nodes {
        out.extend(node.id);
        collect_ids(&node.children, out);
    }
}
