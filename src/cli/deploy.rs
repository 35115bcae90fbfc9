//! `deploy` command: upload the selected part of `paths.base` with rsync.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::log;
use crate::utils::exec::{Cmd, FilterRule};
use crate::utils::path::to_slash;
use crate::watch::PatternSet;

const RSYNC: &str = "rsync";

/// Symlinks outside the tree and sockets are reported per file; not errors.
const RSYNC_FILTER: FilterRule = FilterRule::new(&["skipping non-regular file"]);

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("invalid deploy pattern")]
    Pattern(#[from] ignore::Error),

    #[error("failed to read `{}`", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: jwalk::Error,
    },

    #[error("`rsync` not found in PATH")]
    RsyncMissing,

    #[error("upload to `{remote}` failed\n{message}")]
    Transfer { remote: String, message: String },
}

/// Files under `base`, relative to it, that deploy would upload.
///
/// A file is selected when it or a parent directory matches an include
/// pattern and neither it nor any parent matches an exclude pattern.
pub fn select_files(config: &PipelineConfig) -> Result<Vec<PathBuf>, DeployError> {
    let include = PatternSet::new(&config.deploy.include)?;
    let exclude = PatternSet::new(&config.deploy.exclude)?;
    let base = config.base();

    if !base.is_dir() || include.is_empty() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(base).skip_hidden(false).sort(true) {
        let entry = entry.map_err(|source| DeployError::Walk {
            path: base.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(base) else {
            continue;
        };
        if include.matches(rel) && !exclude.matches(rel) {
            files.push(rel.to_path_buf());
        }
    }
    Ok(files)
}

/// rsync `--files-from` list: one slash-separated path per line.
fn file_list(files: &[PathBuf]) -> String {
    let mut list = String::new();
    for file in files {
        list.push_str(&to_slash(file));
        list.push('\n');
    }
    list
}

/// Upload the selected files. With `dry_run`, only print them.
pub fn deploy(config: &PipelineConfig, dry_run: bool) -> Result<usize, DeployError> {
    let files = select_files(config)?;
    let remote = config.deploy.remote();

    if dry_run {
        for file in &files {
            println!("{}", to_slash(file));
        }
        log!("deploy"; "{} files would be uploaded to {}", files.len(), remote);
        return Ok(files.len());
    }

    if files.is_empty() {
        log!("deploy"; "nothing to upload");
        return Ok(0);
    }

    which::which(RSYNC).map_err(|_| DeployError::RsyncMissing)?;

    log!("deploy"; "uploading {} files to {}", files.len(), remote);
    rsync(config.base(), &remote)
        .stdin(file_list(&files))
        .run()
        .map_err(|e| DeployError::Transfer {
            remote: remote.clone(),
            message: format!("{e:#}"),
        })?;

    log!("deploy"; "done");
    Ok(files.len())
}

fn rsync(base: &Path, remote: &str) -> Cmd {
    // trailing slash: copy the contents of base, not base itself
    let source = format!("{}/", base.display());
    Cmd::new(RSYNC)
        .args(["--archive", "--compress", "--recursive", "--files-from=-"])
        .arg(source)
        .arg(remote)
        .filter(&RSYNC_FILTER)
}
