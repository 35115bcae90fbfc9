//! Fonts / icons task: plain recursive copy.

use std::fs;

use super::images::collect_files;
use super::{Category, Target, Task, TaskError, TaskReport};
use crate::config::PipelineConfig;

pub fn run(
    task: Task,
    config: &PipelineConfig,
    category: Category,
    target: Target,
) -> Result<TaskReport, TaskError> {
    let src_dir = config.source_dir(category);
    let out_dir = config.output_dir(category, target);
    let mut report = TaskReport::new(task);

    // Dev defaults put fonts and icons in place already
    if src_dir == out_dir {
        return Ok(report);
    }

    for src in collect_files(&src_dir) {
        let rel = src.strip_prefix(&src_dir).unwrap_or(src.as_path());
        let dest = out_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(TaskError::io(task, parent))?;
        }
        fs::copy(&src, &dest).map_err(TaskError::io(task, &src))?;
        report.written.push(dest);
    }
    Ok(report)
}
