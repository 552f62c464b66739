pub mod capability;
pub mod policy;
pub mod sandbox;

use std::path::Path;

use capability::{ConfinedPath, ScreenedCommand};
use policy::Policy;
use sandbox::Sandbox;

use crate::error::SkillError;

/// Check a bash command against the denylist.
///
/// The only way to obtain a `ScreenedCommand`, and therefore the only way to
/// reach process spawning.
pub fn screen(command: &str, policy: &Policy) -> Result<ScreenedCommand, SkillError> {
    if command.is_empty() {
        return Err(SkillError::Validation("Command is required".to_owned()));
    }
    if let Some(pattern) = policy.find_blocked(command) {
        tracing::warn!(pattern, "command blocked by denylist");
        return Err(SkillError::BlockedCommand {
            pattern: pattern.to_owned(),
        });
    }
    Ok(ScreenedCommand::new(command.to_owned()))
}

/// Resolve `path` and prove it lies inside the sandbox. Touches the
/// filesystem only to read metadata while resolving.
pub fn confine(path: &str, sandbox: &Sandbox) -> Result<ConfinedPath, SkillError> {
    let resolved = sandbox::resolve(Path::new(path))
        .map_err(|e| SkillError::Execution(format!("cannot resolve {path}: {e}")))?;

    if !sandbox.contains(&resolved) {
        tracing::warn!(path, resolved = %resolved.display(), "path escapes sandbox");
        return Err(SkillError::Permission {
            root: sandbox.label().to_owned(),
        });
    }
    Ok(ConfinedPath::new(resolved))
}
