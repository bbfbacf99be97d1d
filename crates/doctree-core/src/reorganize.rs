//! Regroup a flat documentation forest into one container per package.
//!
//! The pass runs in two halves. Planning builds the container descriptions
//! (reading READMEs eagerly) and decides, for every top-level node, whether
//! it is dropped, flattened into its package container or absorbed whole.
//! All fatal conditions surface while planning, so a failed pass leaves the
//! project exactly as it was. Applying the plan then rewires the arena:
//!
//! 1. detach the whole top-level forest;
//! 2. create one detached container per package;
//! 3. drop excluded nodes, flatten module-shaped nodes (their registry entry
//!    goes away and their children move up into the container) and absorb
//!    everything else;
//! 4. emit the containers that have children and are not excluded,
//!    registering each; discard the rest together with their contents.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Serialize;

use crate::error::ReorganizeError;
use crate::model::{NewNode, NodeFlags, NodeId, NodeKind, Project};
use crate::package::PackageMap;
use crate::resolve::{PathExclusions, Resolver};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Supplies package descriptions for containers.
pub trait ReadmeSource {
    /// README contents for the package rooted at `root`, if it has one.
    fn readme(&self, root: &Path) -> Option<String>;
}

/// A [`ReadmeSource`] that never finds anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReadme;

impl ReadmeSource for NoReadme {
    fn readme(&self, _root: &Path) -> Option<String> {
        None
    }
}

impl<F> ReadmeSource for F
where
    F: Fn(&Path) -> Option<String>,
{
    fn readme(&self, root: &Path) -> Option<String> {
        self(root)
    }
}

/// Knobs of the reorganize pass.
#[derive(Clone, Debug, Default)]
pub struct ReorganizeOptions {
    /// Packages whose container is never emitted.
    pub lerna_exclude: BTreeSet<String>,
    /// Nodes whose source path contains one of these are dropped.
    pub path_exclude: PathExclusions,
}

/// What a pass did, for logging and for callers that want to report it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReorganizeReport {
    /// Emitted package containers, in output order.
    pub emitted: Vec<String>,
    /// Populated containers left out because of `lerna_exclude`.
    pub excluded: Vec<String>,
    /// Containers discarded because nothing was filed under them.
    pub empty: Vec<String>,
    /// Module-shaped wrappers merged into their container.
    pub flattened_modules: usize,
    /// Nodes attached directly to a container.
    pub absorbed: usize,
    /// Nodes removed by `path_exclude`, subtrees included.
    pub dropped: usize,
}

// ---------------------------------------------------------------------------
// Container construction
// ---------------------------------------------------------------------------

/// Describe one container per package, in discovery order.
///
/// Containers are modules rooted at the package root with the exported flag
/// set; a README found at the root becomes the description.
pub fn container_nodes(packages: &PackageMap, readmes: &dyn ReadmeSource) -> Vec<NewNode> {
    packages
        .iter()
        .map(|package| {
            let mut node = NewNode::new(package.name(), NodeKind::Module, package.root())
                .with_flags(NodeFlags::exported());
            node.description = readmes.readme(package.root());
            node
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Action {
    Drop,
    Flatten { container: usize, prune: Vec<NodeId> },
    Absorb { container: usize, prune: Vec<NodeId> },
}

fn plan(
    project: &Project,
    packages: &PackageMap,
    containers: &[NewNode],
    options: &ReorganizeOptions,
) -> Result<Vec<(NodeId, Action)>, ReorganizeError> {
    let resolver = Resolver::new(packages);
    let slots: HashMap<&str, usize> = containers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();

    let mut actions = Vec::with_capacity(project.children().len());
    for &id in project.children() {
        let node = project.get(id)?;

        if let Some(rule) = options.path_exclude.matching_rule(&node.source_path) {
            tracing::debug!(node = %id, name = %node.name, rule, "excluded by path rule");
            actions.push((id, Action::Drop));
            continue;
        }

        let package = resolver
            .resolve(&node.source_path)
            .ok_or_else(|| ReorganizeError::Unresolved {
                node: id,
                node_name: node.name.clone(),
                path: node.source_path.clone(),
            })?;
        let container = *slots
            .get(package.name())
            .ok_or_else(|| ReorganizeError::MissingContainer {
                package: package.name().to_owned(),
            })?;

        let prune = excluded_descendants(project, id, &options.path_exclude);
        let action = if node.kind.is_module_shaped() {
            Action::Flatten { container, prune }
        } else {
            Action::Absorb { container, prune }
        };
        actions.push((id, action));
    }
    Ok(actions)
}

/// Topmost descendants of `id` whose source path is excluded.
fn excluded_descendants(project: &Project, id: NodeId, rules: &PathExclusions) -> Vec<NodeId> {
    if rules.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = project
        .node(id)
        .map(|n| n.children().to_vec())
        .unwrap_or_default();
    while let Some(next) = stack.pop() {
        let Some(node) = project.node(next) else {
            continue;
        };
        if rules.is_excluded(&node.source_path) {
            out.push(next);
        } else {
            stack.extend_from_slice(node.children());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// The pass
// ---------------------------------------------------------------------------

/// Regroup `project`'s top-level forest by package.
///
/// On success the top level holds one container per emitted package and the
/// registry has exactly one entry per reachable node.
///
/// # Errors
/// Returns [`ReorganizeError::Unresolved`] if a node lies outside every
/// package and [`ReorganizeError::MissingContainer`] if resolution and
/// container construction disagree, and [`ReorganizeError::Model`] if the
/// project has no fresh ids left for the containers. The project is
/// unchanged on error.
pub fn reorganize(
    project: &mut Project,
    packages: &PackageMap,
    options: &ReorganizeOptions,
    readmes: &dyn ReadmeSource,
) -> Result<ReorganizeReport, ReorganizeError> {
    let specs = container_nodes(packages, readmes);
    let actions = plan(project, packages, &specs, options)?;
    project.ensure_fresh_ids(specs.len())?;

    let mut report = ReorganizeReport::default();
    project.detach_top_level();
    let containers = specs
        .into_iter()
        .map(|spec| project.create_detached(spec))
        .collect::<Result<Vec<NodeId>, _>>()?;

    for (id, action) in actions {
        match action {
            Action::Drop => {
                report.dropped += project.discard_subtree(id)?;
            }
            Action::Flatten { container, prune } => {
                for excluded in prune {
                    report.dropped += project.discard_subtree(excluded)?;
                }
                project.unregister(id);
                let moved = project.move_children(id, containers[container])?;
                project.discard_subtree(id)?;
                tracing::debug!(
                    module = %id,
                    into = %containers[container],
                    children = moved.len(),
                    "flattened module into package"
                );
                report.flattened_modules += 1;
                report.absorbed += moved.len();
            }
            Action::Absorb { container, prune } => {
                for excluded in prune {
                    report.dropped += project.discard_subtree(excluded)?;
                }
                project.reparent(id, containers[container])?;
                report.absorbed += 1;
            }
        }
    }

    let mut emitted = Vec::new();
    for (package, &container) in packages.iter().zip(&containers) {
        let name = package.name();
        if options.lerna_exclude.contains(name) {
            project.discard_subtree(container)?;
            tracing::info!(package = name, "package excluded from output");
            report.excluded.push(name.to_owned());
        } else if project.get(container)?.children().is_empty() {
            project.discard_subtree(container)?;
            tracing::debug!(package = name, "no documented entities, dropping package");
            report.empty.push(name.to_owned());
        } else {
            project.register(container)?;
            emitted.push(container);
            report.emitted.push(name.to_owned());
        }
    }
    project.set_top_level(emitted)?;

    tracing::info!(
        emitted = report.emitted.len(),
        excluded = report.excluded.len(),
        empty = report.empty.len(),
        flattened = report.flattened_modules,
        absorbed = report.absorbed,
        dropped = report.dropped,
        "reorganized documentation by package"
    );
    Ok(report)
}
