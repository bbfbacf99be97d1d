//! doctree configuration (`doctree.toml`).
//!
//! Defines where the workspace manifest and package descriptors live and
//! which packages or paths the reorganize pass leaves out.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use doctree_core::{PathExclusions, ReorganizeOptions};
use serde::Deserialize;
use thiserror::Error;

/// Default config file name, looked up in the workspace root.
pub const CONFIG_FILE: &str = "doctree.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level doctree configuration.
///
/// Missing fields use defaults; a missing file means all defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoctreeConfig {
    /// Workspace layout settings.
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Reorganize pass settings.
    #[serde(default)]
    pub reorganize: ReorganizeConfig,
}

// ---------------------------------------------------------------------------
// WorkspaceConfig
// ---------------------------------------------------------------------------

/// Where package locations and descriptors are read from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Workspace manifest listing package location patterns (default: `"lerna.json"`).
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Per-package descriptor file (default: `"package.json"`). Also the
    /// file consulted for the `workspaces` fallback.
    #[serde(default = "default_descriptor")]
    pub descriptor: String,

    /// Attach README contents to package containers (default: `true`).
    #[serde(default = "default_readme")]
    pub readme: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            descriptor: default_descriptor(),
            readme: default_readme(),
        }
    }
}

fn default_manifest() -> String {
    "lerna.json".to_owned()
}

fn default_descriptor() -> String {
    "package.json".to_owned()
}

const fn default_readme() -> bool {
    true
}

// ---------------------------------------------------------------------------
// ReorganizeConfig
// ---------------------------------------------------------------------------

/// Exclusion rules for the reorganize pass.
///
/// ```toml
/// [reorganize]
/// lerna_exclude = ["internal-tools"]
/// path_exclude = ["/test/", "node_modules"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReorganizeConfig {
    /// Package names whose container is left out of the output.
    #[serde(default, alias = "lernaExclude")]
    pub lerna_exclude: Vec<String>,

    /// Source-path substrings; matching nodes are dropped.
    #[serde(default, alias = "pathExclude")]
    pub path_exclude: Vec<String>,
}

impl ReorganizeConfig {
    /// Merge in extra rules (e.g. from the command line) and build pass options.
    #[must_use]
    pub fn options_with(&self, lerna_exclude: &[String], path_exclude: &[String]) -> ReorganizeOptions {
        ReorganizeOptions {
            lerna_exclude: self
                .lerna_exclude
                .iter()
                .chain(lerna_exclude)
                .cloned()
                .collect::<BTreeSet<_>>(),
            path_exclude: PathExclusions::new(self.path_exclude.iter().chain(path_exclude).cloned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a doctree configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("{}: could not read file: {source}", path.display())]
    Read {
        /// The config file.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// TOML that does not describe a valid configuration.
    #[error("config error: {}{message}", at_line(*line))]
    Syntax {
        /// 1-based line of the offending span, when known.
        line: Option<usize>,
        /// Parser message.
        message: String,
    },

    /// Like [`ConfigError::Syntax`], for a file on disk.
    #[error("{}: {}{message}", path.display(), at_line(*line))]
    Invalid {
        /// The config file.
        path: PathBuf,
        /// 1-based line of the offending span, when known.
        line: Option<usize>,
        /// Parser message.
        message: String,
    },
}

fn at_line(line: Option<usize>) -> String {
    line.map(|l| format!("line {l}: ")).unwrap_or_default()
}

impl DoctreeConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns [`ConfigError::Invalid`] with the offending line.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        Self::parse(&contents).map_err(|e| match e {
            ConfigError::Syntax { line, message } => ConfigError::Invalid {
                path: path.to_owned(),
                line,
                message,
            },
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`ConfigError::Syntax`] on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Syntax {
            line: e
                .span()
                .map(|span| toml_str[..span.start].matches('\n').count() + 1),
            message: e.message().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn defaults_all_fields() {
        let cfg = DoctreeConfig::default();
        assert_eq!(cfg.workspace.manifest, "lerna.json");
        assert_eq!(cfg.workspace.descriptor, "package.json");
        assert!(cfg.workspace.readme);
        assert!(cfg.reorganize.lerna_exclude.is_empty());
        assert!(cfg.reorganize.path_exclude.is_empty());
    }

    #[test]
    fn parse_empty_string() {
        let cfg = DoctreeConfig::parse("").unwrap();
        assert_eq!(cfg, DoctreeConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[workspace]
manifest = "workspace.json"
descriptor = "pkg.json"
readme = false

[reorganize]
lerna_exclude = ["internal-tools"]
path_exclude = ["/test/", "node_modules"]
"#;
        let cfg = DoctreeConfig::parse(toml).unwrap();
        assert_eq!(cfg.workspace.manifest, "workspace.json");
        assert_eq!(cfg.workspace.descriptor, "pkg.json");
        assert!(!cfg.workspace.readme);
        assert_eq!(cfg.reorganize.lerna_exclude, ["internal-tools"]);
        assert_eq!(cfg.reorganize.path_exclude, ["/test/", "node_modules"]);
    }

    #[test]
    fn parse_accepts_camel_case_option_names() {
        let toml = r#"
[reorganize]
lernaExclude = ["a"]
pathExclude = ["b"]
"#;
        let cfg = DoctreeConfig::parse(toml).unwrap();
        assert_eq!(cfg.reorganize.lerna_exclude, ["a"]);
        assert_eq!(cfg.reorganize.path_exclude, ["b"]);
    }

    #[test]
    fn parse_rejects_unknown_field() {
        let err = DoctreeConfig::parse("[reorganize]\nexclude = []\n").unwrap_err();
        match &err {
            ConfigError::Syntax { line, message } => {
                assert_eq!(*line, Some(2));
                assert!(message.contains("unknown field"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("config error: line 2:"), "{err}");
    }

    #[test]
    fn options_merge_file_and_extra_rules() {
        let cfg = DoctreeConfig::parse(
            r#"
[reorganize]
lerna_exclude = ["internal-tools"]
path_exclude = ["/test/"]
"#,
        )
        .unwrap();
        let opts = cfg
            .reorganize
            .options_with(&["scratch".to_owned()], &["__mocks__".to_owned()]);
        assert!(opts.lerna_exclude.contains("internal-tools"));
        assert!(opts.lerna_exclude.contains("scratch"));
        assert!(opts.path_exclude.is_excluded(Path::new("/ws/a/test/x.ts")));
        assert!(opts.path_exclude.is_excluded(Path::new("/ws/a/__mocks__/x.ts")));
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = DoctreeConfig::load(Path::new("/nonexistent/doctree.toml")).unwrap();
        assert_eq!(cfg, DoctreeConfig::default());
    }

    #[test]
    fn load_invalid_file_shows_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid [[[toml").unwrap();
        let err = DoctreeConfig::load(&path).unwrap_err();
        match &err {
            ConfigError::Invalid { path: p, line, .. } => {
                assert_eq!(p, &path);
                assert_eq!(*line, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with(&format!("{}: line 1:", path.display())));
    }

    #[test]
    fn load_unreadable_path_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DoctreeConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err}");
    }
}
