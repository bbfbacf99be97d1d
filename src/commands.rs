//! Command implementations behind the CLI.
//!
//! Each command returns its rendered output; the binary decides where it
//! goes. Nothing is written unless the whole command succeeds.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use doctree_core::model::ProjectDoc;
use doctree_core::reorganize::NoReadme;
use doctree_core::{Package, PackageMap, Project, ReadmeSource, ReorganizeReport};

use crate::config::{CONFIG_FILE, DoctreeConfig};
use crate::format::OutputFormat;
use crate::packages;
use crate::readme::FsReadmes;
use crate::tree_render;

/// Settings shared by every command.
#[derive(Clone, Debug)]
pub struct Context {
    /// Workspace root.
    pub root: PathBuf,
    pub config: DoctreeConfig,
    pub format: OutputFormat,
}

impl Context {
    /// Resolve the workspace root and load its configuration.
    ///
    /// `config` overrides the default `doctree.toml` in the root.
    ///
    /// # Errors
    /// Fails if the working directory cannot be determined or the config
    /// file is invalid.
    pub fn load(cwd: Option<&Path>, config: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let root = match cwd {
            Some(dir) => std::path::absolute(dir)
                .with_context(|| format!("invalid workspace root {}", dir.display()))?,
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let config_path = config.map_or_else(|| root.join(CONFIG_FILE), Path::to_path_buf);
        let config = DoctreeConfig::load(&config_path)?;
        Ok(Self {
            root,
            config,
            format,
        })
    }

    /// Build the package registry for this workspace.
    ///
    /// # Errors
    /// See [`packages::load`].
    pub fn packages(&self) -> Result<PackageMap> {
        let map = packages::load(&self.root, &self.config.workspace)?;
        tracing::info!(count = map.len(), "package registry built");
        Ok(map)
    }
}

/// `doctree packages`: list the discovered packages.
///
/// # Errors
/// Fails on configuration errors.
pub fn packages(ctx: &Context) -> Result<String> {
    let map = ctx.packages()?;
    match ctx.format {
        OutputFormat::Text => Ok(tree_render::render_packages(&map)),
        format => {
            let list: Vec<&Package> = map.iter().collect();
            format.serialize(&list)
        }
    }
}

/// Input of `doctree reorganize`.
#[derive(Clone, Debug, Default)]
pub struct ReorganizeRequest {
    /// Forest to read; `None` or `-` reads stdin.
    pub input: Option<PathBuf>,
    /// Extra package names to leave out.
    pub lerna_exclude: Vec<String>,
    /// Extra source-path substrings to drop.
    pub path_exclude: Vec<String>,
    /// Skip README lookup even if the config enables it.
    pub no_readme: bool,
}

/// Read a serialized forest from a file or stdin.
///
/// # Errors
/// Fails if the input cannot be read or is not a valid forest.
pub fn read_forest(input: Option<&Path>) -> Result<Project> {
    let (text, origin) = match input {
        Some(path) if path != Path::new("-") => (
            std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?,
            path.display().to_string(),
        ),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("could not read forest from stdin")?;
            (buf, "<stdin>".to_owned())
        }
    };
    let doc: ProjectDoc =
        serde_json::from_str(&text).with_context(|| format!("{origin}: invalid forest JSON"))?;
    Project::from_doc(doc).with_context(|| format!("{origin}: invalid forest"))
}

/// Run the reorganize pass over an in-memory project.
///
/// # Errors
/// Fails if discovery fails or a node cannot be filed under any package.
pub fn reorganize_project(
    ctx: &Context,
    project: &mut Project,
    request: &ReorganizeRequest,
) -> Result<ReorganizeReport> {
    let packages = ctx.packages()?;
    let options = ctx
        .config
        .reorganize
        .options_with(&request.lerna_exclude, &request.path_exclude);
    let readmes: &dyn ReadmeSource = if ctx.config.workspace.readme && !request.no_readme {
        &FsReadmes
    } else {
        &NoReadme
    };
    let report = doctree_core::reorganize(project, &packages, &options, readmes)?;
    Ok(report)
}

/// `doctree reorganize`: regroup a forest by package and render it.
///
/// # Errors
/// Fails on unreadable input, configuration errors and resolution errors.
pub fn reorganize(ctx: &Context, request: &ReorganizeRequest) -> Result<String> {
    let mut project = read_forest(request.input.as_deref())?;
    reorganize_project(ctx, &mut project, request)?;
    let doc = project.to_doc();
    match ctx.format {
        OutputFormat::Text => Ok(tree_render::render_project(&doc)),
        format => format.serialize(&doc),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("lerna.json"), r#"{ "packages": ["packages/*"] }"#).unwrap();
        for name in ["core", "core-utils"] {
            let pkg = root.join("packages").join(name);
            fs::create_dir_all(&pkg).unwrap();
            fs::write(pkg.join("package.json"), format!(r#"{{ "name": "{name}" }}"#)).unwrap();
        }
        fs::write(root.join("packages/core/README.md"), "Core package.\n").unwrap();
        dir
    }

    fn forest(root: &Path) -> Project {
        let core = root.join("packages/core/src/index.ts");
        let utils = root.join("packages/core-utils/src/x.ts");
        let doc = serde_json::json!({
            "name": "ws",
            "children": [
                { "name": "index", "kind": "external-module", "sourcePath": core,
                  "children": [ { "name": "Widget", "kind": "class", "sourcePath": core } ] },
                { "name": "x", "kind": "external-module", "sourcePath": utils,
                  "children": [ { "name": "clamp", "kind": "function", "sourcePath": utils } ] }
            ]
        });
        Project::from_doc(serde_json::from_value(doc).unwrap()).unwrap()
    }

    #[test]
    fn reorganize_project_attaches_readme() {
        let dir = workspace();
        let ctx = Context::load(Some(dir.path()), None, OutputFormat::Json).unwrap();
        let mut project = forest(dir.path());

        let report = reorganize_project(&ctx, &mut project, &ReorganizeRequest::default()).unwrap();

        assert_eq!(report.emitted, ["core", "core-utils"]);
        let core = project.get(project.children()[0]).unwrap();
        assert_eq!(core.description.as_deref(), Some("Core package.\n"));
        let utils = project.get(project.children()[1]).unwrap();
        assert_eq!(utils.description, None);
    }

    #[test]
    fn no_readme_flag_skips_descriptions() {
        let dir = workspace();
        let ctx = Context::load(Some(dir.path()), None, OutputFormat::Json).unwrap();
        let mut project = forest(dir.path());
        let request = ReorganizeRequest {
            no_readme: true,
            ..ReorganizeRequest::default()
        };

        reorganize_project(&ctx, &mut project, &request).unwrap();

        let core = project.get(project.children()[0]).unwrap();
        assert_eq!(core.description, None);
    }

    #[test]
    fn config_file_exclusions_apply() {
        let dir = workspace();
        fs::write(
            dir.path().join("doctree.toml"),
            "[reorganize]\nlerna_exclude = [\"core-utils\"]\n",
        )
        .unwrap();
        let ctx = Context::load(Some(dir.path()), None, OutputFormat::Json).unwrap();
        let mut project = forest(dir.path());

        let report = reorganize_project(&ctx, &mut project, &ReorganizeRequest::default()).unwrap();

        assert_eq!(report.emitted, ["core"]);
        assert_eq!(report.excluded, ["core-utils"]);
    }

    #[test]
    fn packages_text_output() {
        let dir = workspace();
        let ctx = Context::load(Some(dir.path()), None, OutputFormat::Text).unwrap();
        let out = packages(&ctx).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("core "));
        assert!(lines[1].starts_with("core-utils "));
    }
}
