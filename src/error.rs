use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("{0}")]
    Validation(String),

    #[error("Dangerous command blocked: {pattern}")]
    BlockedCommand { pattern: String },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File operations restricted to {root} directory")]
    Permission { root: String },

    #[error("Command timeout after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("{0}")]
    Execution(String),

    #[error("cannot load config: {0}")]
    ConfigLoad(String),

    #[error("invalid config: {0}")]
    ConfigValidation(String),
}

impl SkillError {
    /// Stable tag for logs. Never parsed back.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::BlockedCommand { .. } => "blocked_command",
            Self::NotFound(_) => "not_found",
            Self::Permission { .. } => "permission",
            Self::Timeout { .. } => "timeout",
            Self::Execution(_) => "execution",
            Self::ConfigLoad(_) => "config_load",
            Self::ConfigValidation(_) => "config_validation",
        }
    }
}
