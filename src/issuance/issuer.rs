use std::io;

use thiserror::Error;

use crate::core::types::{IssuanceRequest, IssuanceResult};

/// Anything able to turn an issuance request into certificate artifacts.
pub trait Issuer {
    fn issue(&self, request: &IssuanceRequest) -> Result<IssuanceResult, IssueError>;
}

#[derive(Error, Debug)]
pub enum IssueError {
    #[error("invalid issuance request: {0}")]
    InvalidRequest(String),
    #[error("certificate agent executable not found: {0}")]
    ExecutableNotFound(String),
    #[error("workspace error: {context}: {source}")]
    Workspace {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("certificate agent failed: {reason}")]
    ProcessFailed {
        reason: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("certificate agent timed out after {elapsed_ms}ms")]
    ProcessTimedOut {
        elapsed_ms: u64,
        stdout: String,
        stderr: String,
    },
    #[error("expected artifact missing from workspace: {0}")]
    MissingArtifact(String),
}

impl IssueError {
    pub(crate) fn workspace(context: impl Into<String>, source: io::Error) -> Self {
        IssueError::Workspace {
            context: context.into(),
            source,
        }
    }

    /// Captured agent stderr, when the failure came from the agent itself.
    pub fn agent_stderr(&self) -> Option<&str> {
        match self {
            IssueError::ProcessFailed { stderr, .. } | IssueError::ProcessTimedOut { stderr, .. } => {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}
