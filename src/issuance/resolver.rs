use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use super::issuer::IssueError;

/// Resolves an agent hint to an absolute, executable file.
///
/// Hints containing a path separator are taken as paths (relative ones from
/// the current directory). Bare names are searched in `search_path`, a
/// `PATH`-style list. Symlinks are followed and the final target must be an
/// executable regular file.
pub fn resolve_executable(hint: &str, search_path: Option<&OsStr>) -> Result<PathBuf, IssueError> {
    if hint.trim().is_empty() {
        return Err(IssueError::ExecutableNotFound("<empty>".to_string()));
    }

    let candidate = if is_bare_name(hint) {
        find_in_path(hint, search_path)
            .ok_or_else(|| IssueError::ExecutableNotFound(hint.to_string()))?
    } else {
        PathBuf::from(hint)
    };

    let resolved = fs::canonicalize(&candidate)
        .map_err(|_| IssueError::ExecutableNotFound(hint.to_string()))?;
    if !is_executable_file(&resolved) {
        return Err(IssueError::ExecutableNotFound(hint.to_string()));
    }

    debug!("[resolver] {} -> {}", hint, resolved.display());
    Ok(resolved)
}

fn is_bare_name(hint: &str) -> bool {
    let path = Path::new(hint);
    !path.is_absolute() && path.components().count() == 1 && !hint.contains(std::path::MAIN_SEPARATOR)
}

fn find_in_path(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let search_path = search_path?;
    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable_file(candidate))
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}
