//! Orchestrator configuration.
//!
//! Settings that belong to the host running the agent rather than to a single
//! request: where the agent binary lives, how long a run may take, where
//! scratch workspaces go, and which environment the agent inherits.

use std::{ffi::OsString, path::PathBuf, time::Duration};

use thiserror::Error;

/// Agent binary looked up on `PATH` when nothing else is configured.
pub const DEFAULT_AGENT_BINARY: &str = "letsgo";
/// Name of the ACME account key file inside a workspace.
pub const ACCOUNT_KEY_FILENAME: &str = "account.key";

pub const ENV_AGENT_BINARY: &str = "LETSGO_BIN";
pub const ENV_TIMEOUT_SECS: &str = "LETSGO_TIMEOUT_SECS";
pub const ENV_WORKSPACE_ROOT: &str = "LETSGO_WORKSPACE_ROOT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Environment the agent starts from before request keys are overlaid.
#[derive(Debug, Clone, Default)]
pub enum InheritedEnv {
    /// Snapshot of this process's environment, taken at every call.
    #[default]
    Process,
    Explicit(Vec<(OsString, OsString)>),
}

impl InheritedEnv {
    pub fn snapshot(&self) -> Vec<(OsString, OsString)> {
        match self {
            InheritedEnv::Process => std::env::vars_os().collect(),
            InheritedEnv::Explicit(vars) => vars.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Fallback agent path or name when the request has none.
    pub executable: Option<String>,
    /// Deadline for one agent run. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Parent directory for workspaces; the system temp dir when unset.
    pub workspace_root: Option<PathBuf>,
    pub inherited_env: InheritedEnv,
}

impl OrchestratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let executable = lookup(ENV_AGENT_BINARY).filter(|value| !value.trim().is_empty());

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) if !raw.trim().is_empty() => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            _ => None,
        };

        let workspace_root = lookup(ENV_WORKSPACE_ROOT)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            executable,
            timeout,
            workspace_root,
            inherited_env: InheritedEnv::Process,
        })
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn with_inherited_env(mut self, vars: Vec<(OsString, OsString)>) -> Self {
        self.inherited_env = InheritedEnv::Explicit(vars);
        self
    }
}
