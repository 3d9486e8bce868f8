use std::{fs, io::Write};

use log::debug;

use super::{issuer::IssueError, workspace::Workspace};

/// Writes a caller-supplied account key into the workspace.
///
/// Nothing is written for an empty key; the missing file makes the agent
/// generate a new account key at the same path. Returns whether a key was
/// seeded.
pub fn seed_account_key(workspace: &Workspace, account_key: &str) -> Result<bool, IssueError> {
    if account_key.is_empty() {
        debug!("[account] no account key supplied, agent will generate one");
        return Ok(false);
    }

    let path = workspace.account_key_path();
    let mut file = open_private(&path)
        .map_err(|err| IssueError::workspace("failed to create account key file", err))?;
    file.write_all(account_key.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|err| IssueError::workspace("failed to write account key file", err))?;
    debug!("[account] seeded account key at {}", path.display());
    Ok(true)
}

#[cfg(unix)]
fn open_private(path: &std::path::Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &std::path::Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}
