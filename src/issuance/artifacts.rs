use std::fs;

use log::debug;

use super::{issuer::IssueError, workspace::Workspace};
use crate::core::{config::ACCOUNT_KEY_FILENAME, types::IssuanceResult};

/// File names the agent writes for `alias`, in read order.
pub fn artifact_names(alias: &str) -> [String; 4] {
    [
        format!("{alias}.crt"),
        format!("{alias}.key"),
        format!("{alias}.issuer.crt"),
        ACCOUNT_KEY_FILENAME.to_string(),
    ]
}

/// Reads the certificate, key, issuer chain and account key from the
/// workspace. Any absent, unreadable or empty file is `MissingArtifact`.
pub fn read_artifacts(workspace: &Workspace, alias: &str) -> Result<IssuanceResult, IssueError> {
    let [cert_name, key_name, issuer_name, account_name] = artifact_names(alias);

    let certificate = read_artifact(workspace, &cert_name)?;
    let key = read_artifact(workspace, &key_name)?;
    let issuer = read_artifact(workspace, &issuer_name)?;
    let account_key = read_artifact(workspace, &account_name)?;

    Ok(IssuanceResult {
        alias: alias.to_string(),
        certificate,
        key,
        issuer,
        account_key,
    })
}

fn read_artifact(workspace: &Workspace, name: &str) -> Result<String, IssueError> {
    let path = workspace.file(name);
    let content = fs::read_to_string(&path).map_err(|err| {
        debug!("[artifacts] cannot read {}: {}", path.display(), err);
        IssueError::MissingArtifact(name.to_string())
    })?;
    if content.is_empty() {
        debug!("[artifacts] {} is empty", path.display());
        return Err(IssueError::MissingArtifact(name.to_string()));
    }
    Ok(content)
}
