//! Documentation node types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Identifier of a node in a [`Project`](super::Project) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// What a documentation node describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// A sub-module, or a synthetic package container.
    Module,
    /// A whole source file.
    ExternalModule,
    /// A namespace declared inside a file.
    Namespace,
    Class,
    Interface,
    Function,
    Variable,
    Enum,
    TypeAlias,
    Property,
    Method,
    Accessor,
    Constructor,
}

impl NodeKind {
    /// True for nodes standing for a whole file or sub-module rather than a
    /// single declaration. These wrappers are flattened into their package
    /// container during reorganization.
    #[must_use]
    pub const fn is_module_shaped(self) -> bool {
        matches!(self, Self::Module | Self::ExternalModule)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Module => "module",
            Self::ExternalModule => "external-module",
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Enum => "enum",
            Self::TypeAlias => "type-alias",
            Self::Property => "property",
            Self::Method => "method",
            Self::Accessor => "accessor",
            Self::Constructor => "constructor",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// NodeFlags
// ---------------------------------------------------------------------------

/// Boolean attributes carried by a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFlags {
    /// The entity is exported from its module.
    #[serde(default)]
    pub exported: bool,
    /// The entity comes from outside the documented sources.
    #[serde(default)]
    pub external: bool,
}

impl NodeFlags {
    /// Flags with only `exported` set.
    #[must_use]
    pub const fn exported() -> Self {
        Self {
            exported: true,
            external: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Attributes of a node about to be inserted into a project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNode {
    pub name: String,
    pub kind: NodeKind,
    pub source_path: PathBuf,
    pub flags: NodeFlags,
    pub description: Option<String>,
}

impl NewNode {
    /// A node with default flags and no description.
    pub fn new(name: impl Into<String>, kind: NodeKind, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            source_path: source_path.into(),
            flags: NodeFlags::default(),
            description: None,
        }
    }

    /// Set the flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// One documented entity, owned by a [`Project`](super::Project).
///
/// Parent and child links are maintained by the project; a node is reachable
/// from at most one parent at any time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Absolute path of the file the node was extracted from.
    pub source_path: PathBuf,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub flags: NodeFlags,
    pub description: Option<String>,
}

impl Node {
    pub(crate) fn from_new(id: NodeId, new: NewNode) -> Self {
        Self {
            id,
            name: new.name,
            kind: new.kind,
            source_path: new.source_path,
            parent: None,
            children: Vec::new(),
            flags: new.flags,
            description: new.description,
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The owning node, or `None` for top-level and detached nodes.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in output order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_shaped_kinds() {
        assert!(NodeKind::Module.is_module_shaped());
        assert!(NodeKind::ExternalModule.is_module_shaped());
        assert!(!NodeKind::Namespace.is_module_shaped());
        assert!(!NodeKind::Class.is_module_shaped());
        assert!(!NodeKind::Function.is_module_shaped());
    }

    #[test]
    fn kind_serde_matches_display() {
        for kind in [
            NodeKind::Module,
            NodeKind::ExternalModule,
            NodeKind::TypeAlias,
            NodeKind::Constructor,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::new(42).to_string(), "#42");
    }
}
