//! ASCII rendering of documentation forests and package registries.

use doctree_core::PackageMap;
use doctree_core::model::{NodeDoc, ProjectDoc};

/// Render a project as an indented tree.
///
/// Example output:
/// ```text
/// my-workspace
/// ├── core  (module)  /ws/packages/core
/// │   ├── Widget  (class)
/// │   └── render  (function)
/// └── utils  (module)  /ws/packages/utils
///     └── clamp  (function)
/// ```
///
/// Source paths are shown on top-level nodes only.
#[must_use]
pub fn render_project(doc: &ProjectDoc) -> String {
    let mut output = String::new();
    output.push_str(&doc.name);
    output.push('\n');
    for (i, node) in doc.children.iter().enumerate() {
        let is_last = i + 1 == doc.children.len();
        render_node(&mut output, node, "", is_last, true);
    }
    output
}

fn render_node(output: &mut String, node: &NodeDoc, prefix: &str, is_last: bool, top: bool) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(prefix);
    output.push_str(branch);
    output.push_str(&node.name);
    output.push_str("  (");
    output.push_str(&node.kind.to_string());
    output.push(')');
    if top {
        output.push_str("  ");
        output.push_str(&node.source_path.display().to_string());
    }
    output.push('\n');

    let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
    for (i, child) in node.children.iter().enumerate() {
        let child_last = i + 1 == node.children.len();
        render_node(output, child, &child_prefix, child_last, false);
    }
}

/// Render a package registry as aligned `name  root` lines.
#[must_use]
pub fn render_packages(packages: &PackageMap) -> String {
    let width = packages
        .iter()
        .map(|p| p.name().chars().count())
        .max()
        .unwrap_or(0);
    let mut output = String::new();
    for package in packages {
        output.push_str(&format!(
            "{:<width$}  {}\n",
            package.name(),
            package.root().display()
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use doctree_core::{NodeFlags, NodeKind, Package};

    use super::*;

    fn leaf(name: &str, kind: NodeKind) -> NodeDoc {
        NodeDoc {
            id: None,
            name: name.to_owned(),
            kind,
            source_path: PathBuf::from("/ws/x.ts"),
            flags: NodeFlags::default(),
            description: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn renders_nested_branches() {
        let mut core = leaf("core", NodeKind::Module);
        core.source_path = PathBuf::from("/ws/core");
        let mut widget = leaf("Widget", NodeKind::Class);
        widget.children.push(leaf("draw", NodeKind::Method));
        core.children = vec![widget, leaf("render", NodeKind::Function)];
        let mut utils = leaf("utils", NodeKind::Module);
        utils.source_path = PathBuf::from("/ws/utils");
        utils.children.push(leaf("clamp", NodeKind::Function));

        let doc = ProjectDoc {
            name: "ws".to_owned(),
            children: vec![core, utils],
        };

        let expected = "\
ws
├── core  (module)  /ws/core
│   ├── Widget  (class)
│   │   └── draw  (method)
│   └── render  (function)
└── utils  (module)  /ws/utils
    └── clamp  (function)
";
        assert_eq!(render_project(&doc), expected);
    }

    #[test]
    fn empty_project_is_just_the_name() {
        let doc = ProjectDoc {
            name: "ws".to_owned(),
            children: Vec::new(),
        };
        assert_eq!(render_project(&doc), "ws\n");
    }

    #[test]
    fn packages_are_aligned() {
        let map: PackageMap = [
            Package::new("core", "/ws/core").unwrap(),
            Package::new("core-utils", "/ws/core-utils").unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            render_packages(&map),
            "core        /ws/core\ncore-utils  /ws/core-utils\n"
        );
    }
}
