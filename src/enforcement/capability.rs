use std::path::{Path, PathBuf};

/// A command string that has been checked against the denylist.
///
/// Construction is double-locked:
/// 1. `Seal` is a private type — prevents struct literal construction from outside this file.
/// 2. `new()` is `pub(super)` — only `enforcement/` can call it.
///
/// No `Clone`, `Default`, or `From` — a screened command is consumed by the runner.
///
/// ```compile_fail
/// use skillexec::enforcement::capability::ScreenedCommand;
///
/// let _cmd = ScreenedCommand::new("rm -rf /".to_owned());
/// ```
#[derive(Debug)]
pub struct ScreenedCommand {
    command: String,
    _seal: Seal,
}

/// An absolute, resolved path proven to lie inside the sandbox root.
///
/// Same double lock as [`ScreenedCommand`].
///
/// ```compile_fail
/// use skillexec::enforcement::capability::ConfinedPath;
///
/// let _path = ConfinedPath::new("/etc/passwd".into());
/// ```
#[derive(Debug)]
pub struct ConfinedPath {
    path: PathBuf,
    _seal: Seal,
}

#[derive(Debug)]
struct Seal;

impl ScreenedCommand {
    pub(super) fn new(command: String) -> Self {
        Self {
            command,
            _seal: Seal,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.command
    }
}

impl ConfinedPath {
    pub(super) fn new(path: PathBuf) -> Self {
        Self { path, _seal: Seal }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }
}
