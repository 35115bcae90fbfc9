//! Images task: compress new or changed images, in parallel.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rayon::prelude::*;

use super::{Category, Target, Task, TaskError, TaskReport};
use crate::config::PipelineConfig;
use crate::freshness::needs_update;
use crate::image::{CompressOptions, ImageKind, compress};

const TASK: Task = Task::Images;

/// Per-file outcome.
enum Outcome {
    Written(PathBuf),
    Fresh,
    Failed(PathBuf, String),
}

pub fn run(config: &PipelineConfig, target: Target) -> Result<TaskReport, TaskError> {
    let src_dir = config.source_dir(Category::Images);
    let out_dir = config.output_dir(Category::Images, target);
    let options = CompressOptions {
        jpeg_quality: config.images.jpeg_quality,
    };

    let sources = collect_files(&src_dir);
    let outcomes: Vec<_> = sources
        .par_iter()
        .map(|src| {
            let rel = src.strip_prefix(&src_dir).unwrap_or(src.as_path());
            process(src, &out_dir.join(rel), options)
        })
        .collect();

    let mut report = TaskReport::new(TASK);
    for outcome in outcomes {
        match outcome {
            Outcome::Written(path) => report.written.push(path),
            Outcome::Fresh => report.skipped += 1,
            Outcome::Failed(path, reason) => report.failed.push((path, reason)),
        }
    }
    Ok(report)
}

/// Every regular file under `dir`, sorted. Absent dir yields nothing.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

fn process(src: &Path, dest: &Path, options: CompressOptions) -> Outcome {
    if !needs_update(src, dest) {
        return Outcome::Fresh;
    }

    let Some(kind) = ImageKind::from_path(src) else {
        return Outcome::Failed(src.to_path_buf(), "unsupported format".into());
    };

    let result = fs::read(src)
        .map_err(anyhow::Error::from)
        .and_then(|data| compress(kind, &data, options))
        .and_then(|bytes| {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(dest, bytes)?;
            Ok(())
        });

    match result {
        Ok(()) => Outcome::Written(dest.to_path_buf()),
        Err(e) => Outcome::Failed(src.to_path_buf(), format!("{e:#}")),
    }
}
