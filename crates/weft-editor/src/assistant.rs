//! Assistant-backed snapshot merge.
//!
//! Shells out to a code assistant CLI: the prompt carries the current file,
//! the rendered canvas snapshot, and the imports the snapshot needs, and the
//! assistant returns the whole merged file on stdout. The process is fenced
//! by a timeout and its output is stripped of markdown code fences before it
//! is trusted.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use weft_core::error::SnapshotMergeError;
use weft_core::merge::{SnapshotMerge, SnapshotMergeRequest};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub struct AssistantCli {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl AssistantCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(request: &SnapshotMergeRequest) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "Merge the edited component markup below into the source file. \
             Preserve all logic, hooks, handlers, comments, and formatting that \
             the markup does not contradict. Output only the complete merged \
             file, no commentary.\n\n",
        );
        prompt.push_str(&format!("File: {}\n\n", request.file_path));
        prompt.push_str("Current source:\n```\n");
        prompt.push_str(&request.original_source);
        prompt.push_str("\n```\n\nEdited markup:\n```\n");
        prompt.push_str(&request.rendered_snapshot);
        prompt.push_str("\n```\n");
        if !request.component_imports.is_empty() {
            prompt.push_str("\nImports the markup needs:\n");
            for import in &request.component_imports {
                prompt.push_str(import);
                prompt.push('\n');
            }
        }
        if !request.mock_bindings.is_empty() {
            prompt.push_str("\nRuntime bindings referenced by the markup:\n");
            for (name, value) in &request.mock_bindings {
                prompt.push_str(&format!("  {name} = {value}\n"));
            }
        }
        prompt
    }
}

/// Drop a leading/trailing markdown fence pair if the assistant wrapped its
/// answer in one.
fn strip_code_fences(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Skip the info string on the opening fence ("tsx", "jsx", ...).
    match body.find('\n') {
        Some(eol) => body[eol + 1..].trim_end(),
        None => body.trim(),
    }
}

#[async_trait]
impl SnapshotMerge for AssistantCli {
    async fn merge(&self, request: &SnapshotMergeRequest) -> Result<String, SnapshotMergeError> {
        let prompt = Self::build_prompt(request);

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SnapshotMergeError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|source| SnapshotMergeError::Spawn {
                    command: self.command.clone(),
                    source,
                })?;
            // Close stdin so the assistant sees EOF.
            drop(stdin);
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| SnapshotMergeError::Timeout { seconds: self.timeout.as_secs() })?
            .map_err(|source| SnapshotMergeError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SnapshotMergeError::Process {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let merged = strip_code_fences(&stdout);
        if merged.is_empty() {
            return Err(SnapshotMergeError::EmptyOutput);
        }
        log::debug!("assistant merged {} ({} bytes)", request.file_path, merged.len());
        Ok(merged.to_string())
    }
}
