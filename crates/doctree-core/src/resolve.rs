//! Path-to-package resolution.
//!
//! A package fits a path when the path lies inside the package root,
//! compared segment by segment after lexical normalization (so `/ws/core`
//! does not fit `/ws/core-utils/x.ts`). Among fitting packages the one with
//! the longest name wins; on equal lengths the first in discovery order
//! wins. Name length stands in for nesting depth, which holds when nested
//! packages carry their parent's name as a prefix. When it picks a package
//! that is not the most deeply nested fit, a warning is logged.

use std::path::{Component, Path, PathBuf};

use crate::package::{Package, PackageMap};

// ---------------------------------------------------------------------------
// Exclusions
// ---------------------------------------------------------------------------

/// Substring rules that drop nodes by source path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathExclusions {
    rules: Vec<String>,
}

impl PathExclusions {
    /// Build from raw rules. Empty rules are ignored; they would match every path.
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(Into::into)
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// The first rule contained in `path`, if any.
    #[must_use]
    pub fn matching_rule(&self, path: &Path) -> Option<&str> {
        let haystack = path.to_string_lossy();
        self.rules
            .iter()
            .find(|rule| haystack.contains(rule.as_str()))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.matching_rule(path).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

/// Lexically normalize a path: drop `.` segments and fold `..` into its parent.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// True if `path` is `root` or lies beneath it.
#[must_use]
pub fn contains(root: &Path, path: &Path) -> bool {
    normalize(path).starts_with(normalize(root))
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves source paths against a [`PackageMap`].
#[derive(Debug)]
pub struct Resolver<'a> {
    entries: Vec<(&'a Package, PathBuf)>,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(packages: &'a PackageMap) -> Self {
        Self {
            entries: packages
                .iter()
                .map(|p| (p, normalize(p.root())))
                .collect(),
        }
    }

    /// All packages whose root contains `path`, in discovery order.
    pub fn fitting(&self, path: &Path) -> impl Iterator<Item = &'a Package> + '_ {
        let path = normalize(path);
        self.entries
            .iter()
            .filter(move |(_, root)| path.starts_with(root))
            .map(|(p, _)| *p)
    }

    /// The owning package of `path`, or `None` if no package fits.
    ///
    /// Logs a warning when a more deeply nested package root also fits.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Option<&'a Package> {
        let resolution = self.resolution(path);
        if let (Some(chosen), Some(nested)) = (resolution.package, resolution.nested) {
            tracing::warn!(
                path = %path.display(),
                chosen = chosen.name(),
                nested = nested.name(),
                "longest package name is not the most deeply nested package root"
            );
        }
        resolution.package
    }

    /// Like [`Resolver::resolve`], but also reports the package the
    /// name-length tie-break passed over in favour of a shallower root.
    #[must_use]
    pub fn resolution(&self, path: &Path) -> Resolution<'a> {
        let mut chosen: Option<&'a Package> = None;
        let mut deepest: Option<(usize, &'a Package)> = None;
        for package in self.fitting(path) {
            if chosen.is_none_or(|c| name_len(package) > name_len(c)) {
                chosen = Some(package);
            }
            let depth = package.root().components().count();
            if deepest.is_none_or(|(d, _)| depth > d) {
                deepest = Some((depth, package));
            }
        }

        let nested = match (chosen, deepest) {
            (Some(winner), Some((depth, nested)))
                if depth > winner.root().components().count() =>
            {
                Some(nested)
            }
            _ => None,
        };
        Resolution {
            package: chosen,
            nested,
        }
    }
}

/// Outcome of resolving one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The owning package.
    pub package: Option<&'a Package>,
    /// A fitting package with a deeper root than `package`, if any.
    pub nested: Option<&'a Package>,
}

fn name_len(package: &Package) -> usize {
    package.name().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> PackageMap {
        entries
            .iter()
            .map(|(n, r)| Package::new(*n, *r).unwrap())
            .collect()
    }

    fn resolve<'a>(packages: &'a PackageMap, path: &str) -> Option<&'a str> {
        Resolver::new(packages)
            .resolve(Path::new(path))
            .map(Package::name)
    }

    #[test]
    fn sibling_with_shared_prefix_does_not_fit() {
        let packages = map(&[("core", "/ws/core"), ("core-utils", "/ws/core-utils")]);
        assert_eq!(resolve(&packages, "/ws/core-utils/src/x.ts"), Some("core-utils"));
        assert_eq!(resolve(&packages, "/ws/core/src/x.ts"), Some("core"));
    }

    #[test]
    fn nested_root_resolves_to_longer_name() {
        let packages = map(&[("app", "/ws/app"), ("app-plugins", "/ws/app/plugins")]);
        assert_eq!(resolve(&packages, "/ws/app/plugins/a/b.ts"), Some("app-plugins"));
        assert_eq!(resolve(&packages, "/ws/app/src/main.ts"), Some("app"));
    }

    #[test]
    fn name_length_beats_nesting() {
        // The inner package has the shorter name; the tie-break still prefers
        // the longer name.
        let packages = map(&[("platform", "/ws/platform"), ("ui", "/ws/platform/ui")]);
        assert_eq!(resolve(&packages, "/ws/platform/ui/button.ts"), Some("platform"));
    }

    #[test]
    fn shallower_winner_reports_the_nested_package() {
        let packages = map(&[("platform", "/ws/platform"), ("ui", "/ws/platform/ui")]);
        let resolver = Resolver::new(&packages);

        let shadowed = resolver.resolution(Path::new("/ws/platform/ui/button.ts"));
        assert_eq!(shadowed.package.map(Package::name), Some("platform"));
        assert_eq!(shadowed.nested.map(Package::name), Some("ui"));

        let outside_inner = resolver.resolution(Path::new("/ws/platform/core.ts"));
        assert_eq!(outside_inner.package.map(Package::name), Some("platform"));
        assert_eq!(outside_inner.nested, None);
    }

    #[test]
    fn deepest_winner_reports_nothing_nested() {
        let packages = map(&[("app", "/ws/app"), ("app-plugins", "/ws/app/plugins")]);
        let resolution = Resolver::new(&packages).resolution(Path::new("/ws/app/plugins/a.ts"));
        assert_eq!(resolution.package.map(Package::name), Some("app-plugins"));
        assert_eq!(resolution.nested, None);
    }

    #[test]
    fn equal_length_names_keep_discovery_order() {
        let packages = map(&[("aa", "/ws"), ("bb", "/ws/b")]);
        assert_eq!(resolve(&packages, "/ws/b/x.ts"), Some("aa"));
    }

    #[test]
    fn no_fit_returns_none() {
        let packages = map(&[("core", "/ws/core")]);
        assert_eq!(resolve(&packages, "/elsewhere/x.ts"), None);
        assert_eq!(resolve(&packages, "/ws/cor"), None);
    }

    #[test]
    fn path_equal_to_root_fits() {
        let packages = map(&[("core", "/ws/core")]);
        assert_eq!(resolve(&packages, "/ws/core"), Some("core"));
        assert_eq!(resolve(&packages, "/ws/core/"), Some("core"));
    }

    #[test]
    fn dot_segments_are_normalized() {
        let packages = map(&[("core", "/ws/core")]);
        assert_eq!(resolve(&packages, "/ws/other/../core/./src/a.ts"), Some("core"));
        assert_eq!(resolve(&packages, "/ws/core/../other/a.ts"), None);
    }

    #[test]
    fn exclusions_match_substrings() {
        let rules = PathExclusions::new(["/ws/core/test/", ""]);
        assert!(rules.is_excluded(Path::new("/ws/core/test/helper.ts")));
        assert!(!rules.is_excluded(Path::new("/ws/core/src/helper.ts")));
        assert_eq!(
            rules.matching_rule(Path::new("/ws/core/test/helper.ts")),
            Some("/ws/core/test/")
        );
        assert!(PathExclusions::new([""]).is_empty());
    }
}
