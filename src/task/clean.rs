//! Clean task: empty a directory, keeping the directory itself.

use std::fs;
use std::io;
use std::path::Path;

use jwalk::WalkDir;

use super::{Task, TaskError, TaskReport};

pub fn run(task: Task, dir: &Path) -> Result<TaskReport, TaskError> {
    let mut report = TaskReport::new(task);
    report.removed = clean_dir(dir).map_err(TaskError::io(task, dir))?;
    Ok(report)
}

/// Remove every entry inside `dir`. Returns the number of top-level
/// entries removed; an absent directory removes nothing.
pub fn clean_dir(dir: &Path) -> io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    clear_readonly(dir);

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Best effort: read-only entries block removal on Windows.
#[allow(clippy::permissions_set_readonly_false)]
fn clear_readonly(dir: &Path) {
    for entry in WalkDir::new(dir).skip_hidden(false).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if let Ok(meta) = fs::symlink_metadata(&path)
            && meta.permissions().readonly()
        {
            let mut perms = meta.permissions();
            perms.set_readonly(false);
            let _ = fs::set_permissions(&path, perms);
        }
    }
}
