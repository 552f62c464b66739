use crate::error::SkillError;

/// Commands containing any of these substrings are refused outright.
///
/// Literal substring matching against the raw command text. Whitespace
/// variation, quoting, `$(...)` or aliases walk straight past it: this stops
/// accidents, not adversaries.
pub const BUILTIN_DENYLIST: &[&str] = &[
    "rm -rf /",
    "mkfs",
    "dd if=/dev",
    ":(){:|:&};:",
    "chmod 777",
    "chmod -R 777",
];

/// Denylist applied to every bash invocation before a process is spawned.
pub struct Policy {
    deny: Vec<String>,
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("pattern_count", &self.deny.len())
            .finish()
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            deny: BUILTIN_DENYLIST.iter().map(|p| (*p).to_owned()).collect(),
        }
    }
}

impl Policy {
    /// Built-in patterns plus `extra`. Built-ins cannot be removed.
    pub fn with_extra<I>(extra: I) -> Result<Self, SkillError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut policy = Self::default();
        for pattern in extra {
            if pattern.is_empty() {
                return Err(SkillError::ConfigValidation(
                    "deny patterns must not be empty".to_owned(),
                ));
            }
            if !policy.deny.contains(&pattern) {
                policy.deny.push(pattern);
            }
        }
        Ok(policy)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.deny.iter().map(String::as_str)
    }

    /// First pattern (in declaration order) that occurs in `command`.
    pub(super) fn find_blocked(&self, command: &str) -> Option<&str> {
        self.patterns().find(|pattern| command.contains(pattern))
    }
}
