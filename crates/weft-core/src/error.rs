//! Error taxonomy for parsing, merging, and the pluggable assistant merge.

use thiserror::Error;

/// Markup that cannot be parsed. Parsing is all-or-nothing: a syntax error
/// aborts the whole parse, it never yields a partial tree.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid markup at offset {offset}: {message}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Deterministic source-merge failures.
#[derive(Debug, Error)]
pub enum MergeError {
    /// No return expression (or arrow body) could be located in the target
    /// source. The merge fails closed — the file is left untouched.
    #[error("no component return expression found in {path}")]
    TargetNotFound { path: String },
}

/// Failures from the alternate, context-aware merge strategy.
#[derive(Debug, Error)]
pub enum SnapshotMergeError {
    #[error("assistant merge timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("failed to spawn assistant process `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("assistant process exited with {code:?}: {stderr}")]
    Process { code: Option<i32>, stderr: String },

    #[error("assistant produced no output")]
    EmptyOutput,
}
