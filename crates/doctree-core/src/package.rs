//! Workspace packages as seen by the reorganize pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ModelError;

/// A named package and the absolute directory it lives in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Package {
    name: String,
    root: PathBuf,
}

impl Package {
    /// # Errors
    /// Returns [`ModelError::RelativePackageRoot`] if `root` is not absolute.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Result<Self, ModelError> {
        let name = name.into();
        let root = root.into();
        if !root.is_absolute() {
            return Err(ModelError::RelativePackageRoot { name, root });
        }
        Ok(Self { name, root })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Package name → root mapping, in discovery order.
///
/// Names are unique. Inserting a name that is already present replaces its
/// root in place (last writer wins) and keeps the original position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageMap {
    packages: Vec<Package>,
    index: HashMap<String, usize>,
}

impl PackageMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a package, returning the entry it replaced.
    pub fn insert(&mut self, package: Package) -> Option<Package> {
        if let Some(&slot) = self.index.get(package.name()) {
            return Some(std::mem::replace(&mut self.packages[slot], package));
        }
        self.index
            .insert(package.name().to_owned(), self.packages.len());
        self.packages.push(package);
        None
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.index.get(name).map(|&slot| &self.packages[slot])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.packages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl<'a> IntoIterator for &'a PackageMap {
    type Item = &'a Package;
    type IntoIter = std::slice::Iter<'a, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Package> for PackageMap {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let mut map = Self::new();
        for package in iter {
            map.insert(package);
        }
        map
    }
}
