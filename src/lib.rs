//! doctree library crate.
//!
//! The primary interface is the `doctree` binary. The domain model and the
//! reorganize pass live in `doctree-core`; this crate adds the workspace
//! side: configuration, package discovery, README lookup, and output
//! rendering. Modules are public so integration tests and benchmarks can
//! drive them without going through the CLI.

pub mod commands;
pub mod config;
pub mod format;
pub mod packages;
pub mod readme;
pub mod telemetry;
pub mod tree_render;

pub use doctree_core as domain;
