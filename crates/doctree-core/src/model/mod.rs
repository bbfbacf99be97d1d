//! Documentation forest model: nodes, the owning project and its registry.

pub mod doc;
pub mod node;
pub mod project;
pub mod registry;

pub use doc::{NodeDoc, ProjectDoc};
pub use node::{NewNode, Node, NodeFlags, NodeId, NodeKind};
pub use project::Project;
pub use registry::Registry;
