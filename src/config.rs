use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::enforcement::policy::Policy;
use crate::enforcement::sandbox::Sandbox;
use crate::error::SkillError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WORKDIR: &str = "/tmp";
pub const DEFAULT_SANDBOX_ROOT: &str = "/tmp";

const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KiB

// --- TOML deserialization structs (private, map 1:1 to TOML schema) ---

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    bash: BashSection,
    #[serde(default)]
    text_editor: TextEditorSection,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct BashSection {
    default_timeout: Option<u64>,
    default_workdir: Option<PathBuf>,
    #[serde(default)]
    deny: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TextEditorSection {
    sandbox_root: Option<PathBuf>,
}

/// Everything an invocation needs besides its own parameters.
#[derive(Debug)]
pub struct Config {
    /// Seconds, applied when a bash request omits `timeout`.
    pub default_timeout: u64,
    /// Applied when a bash request omits `workdir`.
    pub default_workdir: PathBuf,
    pub policy: Policy,
    pub sandbox: Sandbox,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT_SECS,
            default_workdir: PathBuf::from(DEFAULT_WORKDIR),
            policy: Policy::default(),
            sandbox: Sandbox::new(Path::new(DEFAULT_SANDBOX_ROOT)),
        }
    }
}

impl FromStr for Config {
    type Err = SkillError;

    /// Parse a TOML config, filling anything absent from the built-in defaults.
    fn from_str(content: &str) -> Result<Self, SkillError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| SkillError::ConfigLoad(e.to_string()))?;

        let default_timeout = file.bash.default_timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if default_timeout == 0 {
            return Err(SkillError::ConfigValidation(
                "bash.default_timeout must be at least 1 second".to_owned(),
            ));
        }

        let sandbox_root = file
            .text_editor
            .sandbox_root
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SANDBOX_ROOT));
        if !sandbox_root.is_absolute() {
            return Err(SkillError::ConfigValidation(format!(
                "text_editor.sandbox_root must be absolute, got {}",
                sandbox_root.display()
            )));
        }

        Ok(Self {
            default_timeout,
            default_workdir: file
                .bash
                .default_workdir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKDIR)),
            policy: Policy::with_extra(file.bash.deny)?,
            sandbox: Sandbox::new(&sandbox_root),
        })
    }
}

impl Config {
    /// Load a config from a TOML file. Checks file size before reading.
    pub fn load(path: &Path) -> Result<Self, SkillError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| SkillError::ConfigLoad(format!("cannot read {}: {e}", path.display())))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(SkillError::ConfigLoad(format!(
                "config file exceeds {MAX_CONFIG_FILE_SIZE} byte limit"
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SkillError::ConfigLoad(format!("cannot read {}: {e}", path.display())))?;

        content.parse()
    }
}
