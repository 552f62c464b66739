use std::io;
use std::path::{Component, Path, PathBuf};

/// Directory every text-editor path must resolve into.
#[derive(Debug, Clone)]
pub struct Sandbox {
    /// Canonical form, used for containment checks.
    root: PathBuf,
    /// As configured, used in error messages.
    label: String,
}

impl Sandbox {
    /// Canonicalizes `root` when it exists (`/tmp` is a symlink on some hosts);
    /// otherwise keeps its lexically normalized absolute form.
    pub fn new(root: &Path) -> Self {
        let label = root.display().to_string();
        let root = resolve(root).unwrap_or_else(|_| root.to_path_buf());
        Self { root, label }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Containment is per component: `/tmpfoo` is not inside `/tmp`.
    pub(super) fn contains(&self, resolved: &Path) -> bool {
        resolved.starts_with(&self.root)
    }
}

/// Symlink hops allowed while resolving, matching the usual `ELOOP` limit.
const MAX_SYMLINK_HOPS: usize = 40;

/// Resolve `path` to an absolute path the way a non-strict `realpath` does.
///
/// Relative paths are taken against the current directory. Every component is
/// checked on disk after it is appended, so symlinks are followed even when an
/// earlier component was missing and `..` climbed back out of it. Missing
/// components are kept as written. Dangling symlinks are followed to their
/// target.
pub(crate) fn resolve(path: &Path) -> io::Result<PathBuf> {
    resolve_hops(path, 0)
}

fn resolve_hops(path: &Path, hops: usize) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                resolved = settle(resolved, hops)?;
            }
        }
    }
    Ok(resolved)
}

/// Canonicalize `candidate` if it exists. A dangling symlink is chased to its
/// target; anything else missing stays lexical.
fn settle(candidate: PathBuf, hops: usize) -> io::Result<PathBuf> {
    if let Ok(real) = std::fs::canonicalize(&candidate) {
        return Ok(real);
    }
    let is_link = std::fs::symlink_metadata(&candidate)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return Ok(candidate);
    }
    if hops >= MAX_SYMLINK_HOPS {
        return Err(io::Error::other(format!(
            "too many levels of symbolic links: {}",
            candidate.display()
        )));
    }
    let target = std::fs::read_link(&candidate)?;
    let base = candidate.parent().unwrap_or_else(|| Path::new("/"));
    resolve_hops(&base.join(target), hops + 1)
}
