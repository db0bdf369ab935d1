//! Shared helpers reused across modules (e.g., path normalization).

use std::{
    env, io,
    path::{Path, PathBuf},
};

/// Make `path` absolute by joining it onto the current directory. Symlinks are kept.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(env::current_dir()?.join(path))
}

/// Returns true if the path is non-empty and relative.
pub fn is_nonempty_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_relative()
}
