pub mod bash;
pub mod text_editor;

use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::SkillError;

/// The closed set of skills the dispatcher routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skill {
    Bash,
    TextEditor,
}

impl FromStr for Skill {
    type Err = SkillError;

    fn from_str(name: &str) -> Result<Self, SkillError> {
        match name {
            "bash" => Ok(Self::Bash),
            "text_editor" => Ok(Self::TextEditor),
            other => Err(SkillError::Validation(format!("Unknown skill: {other}"))),
        }
    }
}

impl Skill {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::TextEditor => "text_editor",
        }
    }

    /// Run this skill once and return its result object.
    pub async fn invoke(
        self,
        params: serde_json::Value,
        config: &Config,
    ) -> Result<serde_json::Value, SkillError> {
        match self {
            Self::Bash => {
                let request = bash::CommandRequest::from_params(params, config)?;
                to_document(bash::execute(request, config).await?)
            }
            Self::TextEditor => {
                let request = text_editor::EditRequest::from_params(params, config)?;
                to_document(text_editor::edit(request)?)
            }
        }
    }
}

/// Deserialize a skill's parameter object. Absent fields take their serde
/// defaults; wrong types are validation errors naming the field.
pub(crate) fn parse_params<T: DeserializeOwned>(
    skill: &str,
    params: serde_json::Value,
) -> Result<T, SkillError> {
    serde_json::from_value(params)
        .map_err(|e| SkillError::Validation(format!("invalid {skill} parameters: {e}")))
}

fn to_document<T: serde::Serialize>(result: T) -> Result<serde_json::Value, SkillError> {
    serde_json::to_value(result)
        .map_err(|e| SkillError::Execution(format!("cannot encode result: {e}")))
}
