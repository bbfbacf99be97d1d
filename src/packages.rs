//! Package registry: turn the workspace manifest into a `name → root` map.
//!
//! Location patterns come from the manifest's `packages` list (`lerna.json`
//! by default). The descriptor's `workspaces` field (`package.json`, array or
//! `{ "packages": [...] }`) is used instead when the manifest sets
//! `"useWorkspaces": true`, and as a fallback when the manifest lists no
//! packages. Each pattern is expanded relative to the workspace root and
//! every candidate directory must carry a descriptor with a `name`:
//!
//! - a wildcard pattern only matches directories;
//! - a wildcard candidate without a descriptor is skipped with a warning
//!   (scratch folders and the like);
//! - an exact entry without a descriptor is a configuration error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use doctree_core::resolve::normalize;
use doctree_core::{ModelError, Package, PackageMap};
use glob::Pattern;
use serde::Deserialize;
use thiserror::Error;

use crate::config::WorkspaceConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building the package registry.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Neither the manifest nor the descriptor fallback lists any package location.
    #[error(
        "no package locations configured in {}.\n  To fix: add a \"packages\" list to {manifest}, or a \"workspaces\" list to {descriptor}",
        root.display()
    )]
    NoPatterns {
        /// Workspace root that was searched.
        root: PathBuf,
        /// Manifest file name.
        manifest: String,
        /// Descriptor file name.
        descriptor: String,
    },

    /// A JSON file could not be parsed.
    #[error("{}: invalid JSON: {detail}", path.display())]
    InvalidJson {
        /// The file.
        path: PathBuf,
        /// Parser message.
        detail: String,
    },

    /// A location pattern is not a valid glob.
    #[error("invalid package pattern '{pattern}': {detail}")]
    InvalidPattern {
        /// The raw pattern.
        pattern: String,
        /// Why it failed to compile.
        detail: String,
    },

    /// An exact package entry has no descriptor.
    #[error(
        "package entry '{pattern}' has no {} file.\n  To fix: create it, or remove '{pattern}' from the package list",
        path.display()
    )]
    DescriptorMissing {
        /// The manifest entry.
        pattern: String,
        /// Where the descriptor was expected.
        path: PathBuf,
    },

    /// A descriptor has no `name` field.
    #[error("{}: package descriptor has no \"name\"", path.display())]
    UnnamedPackage {
        /// The descriptor file.
        path: PathBuf,
    },

    /// A package root could not be used.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An I/O error other than a missing descriptor.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file or directory being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Manifest formats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceManifest {
    #[serde(default)]
    packages: Vec<String>,
    #[serde(default)]
    use_workspaces: bool,
}

#[derive(Debug, Default, Deserialize)]
struct PackageDescriptor {
    name: Option<String>,
    workspaces: Option<Workspaces>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Workspaces {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl Workspaces {
    fn into_patterns(self) -> Vec<String> {
        match self {
            Self::List(p) | Self::Object { packages: p } => p,
        }
    }
}

/// Read and parse a JSON file; `Ok(None)` if it does not exist.
fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, PackageError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PackageError::Io {
                path: path.to_owned(),
                source,
            });
        }
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| PackageError::InvalidJson {
            path: path.to_owned(),
            detail: e.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Package location patterns declared by the workspace at `root`.
///
/// # Errors
/// Returns [`PackageError::NoPatterns`] if nothing is declared, or a read or
/// parse error for either file.
pub fn location_patterns(root: &Path, layout: &WorkspaceConfig) -> Result<Vec<String>, PackageError> {
    let manifest: WorkspaceManifest = read_json(&root.join(&layout.manifest))?.unwrap_or_default();
    if manifest.use_workspaces {
        if !manifest.packages.is_empty() {
            tracing::debug!(
                manifest = %layout.manifest,
                "useWorkspaces is set, ignoring the manifest package list"
            );
        }
    } else if !manifest.packages.is_empty() {
        return Ok(manifest.packages);
    }

    let descriptor: PackageDescriptor =
        read_json(&root.join(&layout.descriptor))?.unwrap_or_default();
    let patterns = descriptor
        .workspaces
        .map(Workspaces::into_patterns)
        .unwrap_or_default();
    if patterns.is_empty() {
        return Err(PackageError::NoPatterns {
            root: root.to_owned(),
            manifest: layout.manifest.clone(),
            descriptor: layout.descriptor.clone(),
        });
    }
    tracing::debug!(
        descriptor = %layout.descriptor,
        count = patterns.len(),
        "using descriptor workspaces"
    );
    Ok(patterns)
}

/// Expand `patterns` under `root` and read each candidate's descriptor.
///
/// # Errors
/// Returns an error for invalid patterns, exact entries without descriptor,
/// unnamed or unparsable descriptors, and I/O failures.
pub fn discover(root: &Path, patterns: &[String], descriptor: &str) -> Result<PackageMap, PackageError> {
    let mut packages = PackageMap::new();
    for pattern in patterns {
        let wildcard = is_wildcard(pattern);
        for dir in candidates(root, pattern)? {
            let descriptor_path = dir.join(descriptor);
            let Some(parsed) = read_json::<PackageDescriptor>(&descriptor_path)? else {
                if wildcard {
                    tracing::warn!(
                        dir = %dir.display(),
                        pattern = %pattern,
                        "no {descriptor} found, skipping"
                    );
                    continue;
                }
                return Err(PackageError::DescriptorMissing {
                    pattern: pattern.clone(),
                    path: descriptor_path,
                });
            };
            let name = parsed.name.ok_or_else(|| PackageError::UnnamedPackage {
                path: descriptor_path.clone(),
            })?;

            tracing::info!(package = %name, root = %dir.display(), "found package");
            if let Some(previous) = packages.insert(Package::new(name, dir)?) {
                let current = packages.get(previous.name()).map(Package::root);
                tracing::warn!(
                    package = previous.name(),
                    replaced = %previous.root().display(),
                    root = ?current,
                    "duplicate package name, the later entry wins"
                );
            }
        }
    }
    Ok(packages)
}

/// Build the registry for the workspace at `root`.
///
/// # Errors
/// See [`location_patterns`] and [`discover`].
pub fn load(root: &Path, layout: &WorkspaceConfig) -> Result<PackageMap, PackageError> {
    let root = std::path::absolute(root).map_err(|source| PackageError::Io {
        path: root.to_owned(),
        source,
    })?;
    let patterns = location_patterns(&root, layout)?;
    discover(&root, &patterns, &layout.descriptor)
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Directories a pattern stands for, in lexical order.
fn candidates(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, PackageError> {
    let trimmed = pattern.trim_end_matches('/');
    if !is_wildcard(trimmed) {
        return Ok(vec![normalize(&root.join(trimmed))]);
    }
    let full = format!(
        "{}/{}",
        Pattern::escape(&root.to_string_lossy()),
        trimmed.trim_start_matches("./")
    );
    let paths = glob::glob(&full).map_err(|e| PackageError::InvalidPattern {
        pattern: pattern.to_owned(),
        detail: e.to_string(),
    })?;

    let mut out = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| PackageError::Io {
            path: e.path().to_owned(),
            source: e.into(),
        })?;
        if !path.is_dir() {
            continue;
        }
        out.push(normalize(&path));
    }
    Ok(out)
}
