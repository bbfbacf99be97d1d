//! Core domain logic for doctree.
//!
//! Everything here is free of workspace I/O: the node arena and its global
//! registry ([`model`]), the package map handed over by the discovery layer
//! ([`package`]), path-to-package resolution ([`resolve`]) and the pass that
//! regroups a flat forest into one container per package ([`reorganize`]).
//! README contents are the one external input, supplied through the
//! [`reorganize::ReadmeSource`] trait.

pub mod error;
pub mod model;
pub mod package;
pub mod reorganize;
pub mod resolve;

pub use error::{ModelError, ReorganizeError};
pub use model::{Node, NodeFlags, NodeId, NodeKind, Project, Registry};
pub use package::{Package, PackageMap};
pub use reorganize::{ReadmeSource, ReorganizeOptions, ReorganizeReport, reorganize};
pub use resolve::{PathExclusions, Resolution, Resolver};
