use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::enforcement::{self, capability::ConfinedPath};
use crate::error::SkillError;

/// Raw `text_editor` parameters as the agent sends them.
#[derive(Debug, Default, Deserialize)]
struct EditParams {
    command: Option<String>,
    path: Option<String>,
    content: Option<String>,
    line_number: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Create,
    View,
    Insert,
    Replace,
    Delete,
}

impl FromStr for EditCommand {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self, SkillError> {
        match s {
            "create" => Ok(Self::Create),
            "view" => Ok(Self::View),
            "insert" => Ok(Self::Insert),
            "replace" => Ok(Self::Replace),
            "delete" => Ok(Self::Delete),
            other => Err(SkillError::Validation(format!("Unknown command: {other}"))),
        }
    }
}

/// A text-editor request whose path has already been confined to the sandbox.
#[derive(Debug)]
pub struct EditRequest {
    pub command: EditCommand,
    pub path: ConfinedPath,
    /// The path exactly as the caller wrote it, for not-found messages.
    pub requested_path: String,
    /// Defaults to the empty string.
    pub content: String,
    /// 1-based.
    pub line_number: Option<i64>,
}

impl EditRequest {
    /// Validate required fields, then confine the path before the
    /// sub-command is even looked at.
    pub fn from_params(params: serde_json::Value, config: &Config) -> Result<Self, SkillError> {
        let params: EditParams = super::parse_params("text_editor", params)?;
        let (Some(command), Some(path)) = (
            params.command.filter(|c| !c.is_empty()),
            params.path.filter(|p| !p.is_empty()),
        ) else {
            return Err(SkillError::Validation(
                "command and path are required".to_owned(),
            ));
        };

        let confined = enforcement::confine(&path, &config.sandbox)?;

        Ok(Self {
            command: command.parse()?,
            path: confined,
            requested_path: path,
            content: params.content.unwrap_or_default(),
            line_number: params.line_number,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    Created,
    Viewed,
    Inserted,
    Replaced,
    Deleted,
    DeletedLine,
}

#[derive(Debug, Serialize)]
pub struct EditResult {
    pub status: EditStatus,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub lines_affected: usize,
}

pub fn edit(request: EditRequest) -> Result<EditResult, SkillError> {
    let path = request.path.as_path();
    let shown = request.requested_path.as_str();
    tracing::debug!(command = ?request.command, path = %path.display(), "edit");

    let (status, content, lines_affected) = match request.command {
        EditCommand::Create => {
            create(path, &request.content)?;
            (EditStatus::Created, None, count_lines(&request.content))
        }
        EditCommand::View => {
            let text = read_existing(path, shown)?;
            let lines = count_lines(&text);
            (EditStatus::Viewed, Some(text), lines)
        }
        EditCommand::Insert => {
            let line = require_line(request.line_number, "insert")?;
            insert(path, shown, line, &request.content)?;
            (EditStatus::Inserted, None, 1)
        }
        EditCommand::Replace => {
            let line = require_line(request.line_number, "replace")?;
            replace(path, shown, line, &request.content)?;
            (EditStatus::Replaced, None, 1)
        }
        EditCommand::Delete => match request.line_number {
            None => {
                fs::remove_file(path).map_err(|e| io_error(shown, e))?;
                (EditStatus::Deleted, None, 0)
            }
            Some(line) => {
                delete_line(path, shown, line)?;
                (EditStatus::DeletedLine, None, 1)
            }
        },
    };

    Ok(EditResult {
        status,
        path: path.display().to_string(),
        content,
        lines_affected,
    })
}

fn create(path: &Path, content: &str) -> Result<(), SkillError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(&parent.display().to_string(), e))?;
    }
    fs::write(path, content).map_err(|e| io_error(&path.display().to_string(), e))
}

fn insert(path: &Path, shown: &str, line: i64, content: &str) -> Result<(), SkillError> {
    let new_line = format!("{content}\n");
    let text = read_existing(path, shown)?;
    let mut lines = split_lines(&text);
    let index = insert_index(line, lines.len())?;
    lines.insert(index, &new_line);
    write_atomic(path, &lines.concat())
}

fn replace(path: &Path, shown: &str, line: i64, content: &str) -> Result<(), SkillError> {
    let new_line = format!("{content}\n");
    let text = read_existing(path, shown)?;
    let mut lines = split_lines(&text);
    let index = existing_index(line, lines.len())?;
    lines[index] = &new_line;
    write_atomic(path, &lines.concat())
}

fn delete_line(path: &Path, shown: &str, line: i64) -> Result<(), SkillError> {
    let text = read_existing(path, shown)?;
    let mut lines = split_lines(&text);
    let index = existing_index(line, lines.len())?;
    lines.remove(index);
    write_atomic(path, &lines.concat())
}

/// Newline count plus one, so empty content counts as one line.
fn count_lines(content: &str) -> usize {
    content.bytes().filter(|b| *b == b'\n').count() + 1
}

/// Lines with their terminators attached. An unterminated tail is a line; an
/// empty file has none.
fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn require_line(line_number: Option<i64>, command: &str) -> Result<i64, SkillError> {
    line_number
        .ok_or_else(|| SkillError::Validation(format!("line_number is required for {command}")))
}

/// Index of an existing line: `1 <= line <= count`.
fn existing_index(line: i64, count: usize) -> Result<usize, SkillError> {
    match usize::try_from(line) {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(invalid_line(line)),
    }
}

/// Insertion point for a new line `line`. Past the end clamps to append.
fn insert_index(line: i64, count: usize) -> Result<usize, SkillError> {
    match usize::try_from(line) {
        Ok(n) if n >= 1 => Ok((n - 1).min(count)),
        _ => Err(invalid_line(line)),
    }
}

fn invalid_line(line: i64) -> SkillError {
    SkillError::Validation(format!("Invalid line number: {line}"))
}

fn read_existing(path: &Path, shown: &str) -> Result<String, SkillError> {
    if !path.exists() {
        return Err(SkillError::NotFound(shown.to_owned()));
    }
    fs::read_to_string(path).map_err(|e| io_error(shown, e))
}

/// Replace `path` by renaming a fully written sibling over it, keeping the
/// original permissions.
fn write_atomic(path: &Path, contents: &str) -> Result<(), SkillError> {
    let shown = path.display().to_string();
    let dir = path.parent().unwrap_or_else(|| Path::new("/"));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_error(&shown, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| io_error(&shown, e))?;
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| io_error(&shown, e))?;
    }
    tmp.persist(path).map_err(|e| io_error(&shown, e.error))?;
    Ok(())
}

fn io_error(shown: &str, e: io::Error) -> SkillError {
    match e.kind() {
        io::ErrorKind::NotFound => SkillError::NotFound(shown.to_owned()),
        _ => SkillError::Execution(format!("{shown}: {e}")),
    }
}
