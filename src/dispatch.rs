//! One invocation in, one JSON document out.

use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::error::SkillError;
use crate::tools::Skill;

/// What the process prints and how it exits.
#[derive(Debug)]
pub struct Outcome {
    pub document: Value,
    pub success: bool,
}

impl Outcome {
    pub fn from_result(result: Result<Value, SkillError>) -> Self {
        match result {
            Ok(document) => Self {
                document,
                success: true,
            },
            Err(err) => Self::failure(&err),
        }
    }

    /// `{ "error": <message> }`. The kind goes to the log, not the document.
    pub fn failure(err: &SkillError) -> Self {
        tracing::info!(kind = err.kind(), error = %err, "invocation failed");
        Self {
            document: json!({ "error": err.to_string() }),
            success: false,
        }
    }

    pub fn exit_code(&self) -> u8 {
        if self.success { 0 } else { 1 }
    }
}

/// Parse `raw_params`, route to `skill_name`, and wrap the result or error.
pub async fn dispatch(skill_name: &str, raw_params: &str, config: &Config) -> Outcome {
    let id = Uuid::now_v7();
    let span = tracing::info_span!("invocation", %id, skill = skill_name);
    Outcome::from_result(run(skill_name, raw_params, config).instrument(span).await)
}

async fn run(skill_name: &str, raw_params: &str, config: &Config) -> Result<Value, SkillError> {
    let params: Value = serde_json::from_str(raw_params)
        .map_err(|e| SkillError::Validation(format!("Invalid JSON parameters: {e}")))?;
    let skill: Skill = skill_name.parse()?;
    tracing::debug!(skill = skill.name(), "dispatching");
    skill.invoke(params, config).await
}
