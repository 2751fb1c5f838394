use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::errors::{ReconcileError, Result};

/// Resolve a binary name or path to an absolute executable path.
///
/// Names containing a path separator are checked as given. Bare names are
/// searched for in each `PATH` entry, first match wins.
pub fn locate_binary(name: &str) -> Result<PathBuf> {
    locate_in(name, std::env::var_os("PATH").as_deref())
}

fn locate_in(name: &str, search_path: Option<&OsStr>) -> Result<PathBuf> {
    let not_found = || ReconcileError::BinaryNotFound {
        name: name.to_string(),
    };

    if name.is_empty() {
        return Err(not_found());
    }

    let candidate = Path::new(name);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        let absolute = std::path::absolute(candidate).map_err(|_| not_found())?;
        return if is_executable(&absolute) {
            Ok(absolute)
        } else {
            Err(not_found())
        };
    }

    let found = search_path
        .into_iter()
        .flat_map(|paths| std::env::split_paths(paths))
        .map(|dir| dir.join(name))
        .find(|path| is_executable(path))
        .ok_or_else(not_found)?;

    let absolute = std::path::absolute(&found).map_err(|_| not_found())?;
    debug!(binary = %absolute.display(), "located binary");
    Ok(absolute)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
