//! Issuance pipeline.
//!
//! One call runs the agent once: validate the request, resolve the binary,
//! prepare its environment, create a workspace, seed the account key, run the
//! agent, collect the artifacts and remove the workspace. The workspace is
//! removed on every path out of [`Orchestrator::issue`], success or not.

use std::{ffi::OsString, path::Path};

use log::{debug, info, warn};

use super::{
    account::seed_account_key,
    artifacts::read_artifacts,
    environment::EnvironmentBuilder,
    issuer::{IssueError, Issuer},
    process::run_agent,
    resolver::resolve_executable,
    workspace::Workspace,
};
use crate::{
    core::{
        config::{DEFAULT_AGENT_BINARY, OrchestratorConfig},
        types::{CaDirectory, IssuanceRequest, IssuanceResult},
    },
    domain::{derive_alias, validate_domain_list},
};

#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    pub fn issue(&self, request: &IssuanceRequest) -> Result<IssuanceResult, IssueError> {
        validate_domain_list(&request.domains)
            .map_err(|err| IssueError::InvalidRequest(err.to_string()))?;
        let alias = derive_alias(&request.domains);

        let inherited = self.config.inherited_env.snapshot();
        let hint = request
            .executable
            .as_deref()
            .or(self.config.executable.as_deref())
            .unwrap_or(DEFAULT_AGENT_BINARY);
        let executable = resolve_executable(hint, search_path(&inherited).as_deref())?;

        info!(
            "[issue] requesting certificate for {} ({}) from {}",
            alias,
            request.domains,
            CaDirectory::parse(&request.ca_directory).directory_url()
        );
        let env = EnvironmentBuilder::new(inherited).with_request(request, &alias);

        let workspace = Workspace::acquire(self.config.workspace_root.as_deref())?;
        let outcome = self.run_in_workspace(&workspace, env, request, &executable, &alias);

        match (outcome, workspace.release()) {
            (Ok(result), Ok(())) => Ok(result),
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(err), Ok(())) => {
                warn!("[issue] issuance for {} failed: {}", alias, err);
                Err(err)
            }
            (Err(err), Err(release_err)) => {
                warn!("[issue] issuance for {} failed: {}", alias, err);
                warn!("[issue] workspace cleanup also failed: {}", release_err);
                Err(err)
            }
        }
    }

    fn run_in_workspace(
        &self,
        workspace: &Workspace,
        env: EnvironmentBuilder,
        request: &IssuanceRequest,
        executable: &Path,
        alias: &str,
    ) -> Result<IssuanceResult, IssueError> {
        let env = env.with_workspace(workspace).build();
        let reused_key = seed_account_key(workspace, &request.account_key)?;
        let run = run_agent(executable, &env, self.config.timeout)?;
        if !run.stdout.trim().is_empty() {
            debug!("[issue] agent stdout for {}:\n{}", alias, run.stdout.trim_end());
        }
        if !run.stderr.trim().is_empty() {
            debug!("[issue] agent stderr for {}:\n{}", alias, run.stderr.trim_end());
        }
        let result = read_artifacts(workspace, alias)?;
        info!(
            "[issue] issued {} in {}ms ({} account key)",
            alias,
            run.duration.as_millis(),
            if reused_key { "reused" } else { "new" }
        );
        Ok(result)
    }
}

impl Issuer for Orchestrator {
    fn issue(&self, request: &IssuanceRequest) -> Result<IssuanceResult, IssueError> {
        Orchestrator::issue(self, request)
    }
}

/// Issues with the default configuration: `letsgo` from `PATH`, this
/// process's environment, no deadline.
pub fn issue(request: &IssuanceRequest) -> Result<IssuanceResult, IssueError> {
    Orchestrator::default().issue(request)
}

fn search_path(vars: &[(OsString, OsString)]) -> Option<OsString> {
    vars.iter()
        .find(|(key, _)| key == "PATH")
        .map(|(_, value)| value.clone())
}
