//! README lookup for package containers.

use std::fs;
use std::path::{Path, PathBuf};

use doctree_core::ReadmeSource;

const README: &str = "README.md";

/// Reads `README.md` (any letter case) from a package root.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsReadmes;

impl FsReadmes {
    fn locate(root: &Path) -> Option<PathBuf> {
        let exact = root.join(README);
        if exact.is_file() {
            return Some(exact);
        }
        fs::read_dir(root)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .find(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(README))
            })
    }
}

impl ReadmeSource for FsReadmes {
    fn readme(&self, root: &Path) -> Option<String> {
        let path = Self::locate(root)?;
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read README");
                None
            }
        }
    }
}
