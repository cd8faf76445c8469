use std::path::{Path, PathBuf};

use crate::{Error, Result, DOWNLOADS_DIR};

/// Picks the directory a job writes into.
///
/// An explicit directory always wins. Without one, the legacy layout is used:
/// go `levels_up` directories above `cwd` and join `downloads`.
/// The directory is neither checked nor created; a missing one surfaces when the file is saved.
pub fn resolve_output_dir(
    explicit: Option<&Path>,
    cwd: &Path,
    levels_up: usize,
) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let root = cwd.ancestors().nth(levels_up).ok_or_else(|| Error::NoAncestor {
        cwd: cwd.to_path_buf(),
        levels: levels_up,
    })?;
    Ok(root.join(DOWNLOADS_DIR))
}

#[inline]
pub fn output_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(file_name)
}
