//! Error types for the documentation forest and the reorganize pass.
//!
//! [`ModelError`] covers structural violations of the node arena and its
//! registry. [`ReorganizeError`] covers the fatal conditions of the
//! reorganize pass; any of them aborts the pass before the project is touched.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::NodeId;

/// Structural errors raised by [`Project`](crate::Project) and
/// [`Registry`](crate::Registry) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Two nodes were given the same id.
    #[error("duplicate node id {id}")]
    DuplicateId {
        /// The id that was used twice.
        id: NodeId,
    },

    /// An operation referenced a node that is not in the arena.
    #[error("node {id} not found")]
    NodeNotFound {
        /// The missing id.
        id: NodeId,
    },

    /// The registry already holds an entry for this node.
    #[error("node {id} (`{name}`) is already registered")]
    AlreadyRegistered {
        /// The node id.
        id: NodeId,
        /// Name of the existing entry.
        name: String,
    },

    /// Every node id up to `u64::MAX` is already in use.
    #[error("no node ids left: the forest already uses id {}", u64::MAX)]
    IdSpaceExhausted,

    /// A re-parent would make a node its own ancestor.
    #[error("cannot move node {id} under {new_parent}: it would become its own ancestor")]
    Cycle {
        /// The node being moved.
        id: NodeId,
        /// The requested new parent.
        new_parent: NodeId,
    },

    /// A package root was not an absolute path.
    #[error("package `{name}` has a relative root {}", root.display())]
    RelativePackageRoot {
        /// Package name.
        name: String,
        /// The offending root.
        root: PathBuf,
    },
}

/// Fatal conditions of the reorganize pass.
#[derive(Debug, Error)]
pub enum ReorganizeError {
    /// No registered package contains the node's source path.
    #[error(
        "node `{node_name}` ({node}) comes from {}, which is not inside any known package.\n  To fix: add the package to the workspace manifest, or exclude the path with path_exclude",
        path.display()
    )]
    Unresolved {
        /// The node that could not be filed.
        node: NodeId,
        /// Its display name.
        node_name: String,
        /// The source path that matched nothing.
        path: PathBuf,
    },

    /// A node resolved to a package for which no container was built.
    #[error("package `{package}` resolved but has no container (internal inconsistency)")]
    MissingContainer {
        /// The resolved package name.
        package: String,
    },

    /// The arena rejected a structural change.
    #[error(transparent)]
    Model(#[from] ModelError),
}
