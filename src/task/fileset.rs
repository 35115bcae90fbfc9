//! In-memory file sets and the step pipeline that transforms them.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Task, TaskError};
use crate::debug;

/// One file flowing through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the set's root (source dir on input, dest dir on output).
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    /// Contents as UTF-8, or a compile error naming the file.
    pub fn text(&self, task: Task) -> Result<&str, TaskError> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| TaskError::compile(task, &self.path, format!("not valid UTF-8: {e}")))
    }
}

/// Ordered list of files. Order is preserved by every step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<SourceFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `paths` (absolute) in the given order, keyed relative to `root`.
    pub fn read(task: Task, root: &Path, paths: &[PathBuf]) -> Result<Self, TaskError> {
        let mut set = Self::new();
        for path in paths {
            if !path.is_file() {
                return Err(TaskError::Missing {
                    task,
                    path: path.clone(),
                });
            }
            let bytes = fs::read(path).map_err(TaskError::io(task, path))?;
            let rel = path.strip_prefix(root).unwrap_or(path.as_path());
            set.push(SourceFile::new(rel, bytes));
        }
        Ok(set)
    }

    pub fn push(&mut self, file: SourceFile) {
        self.files.push(file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceFile> {
        self.files.iter()
    }

    /// Write every file under `dir`, creating parents. Returns absolute paths.
    pub fn write_to(&self, task: Task, dir: &Path) -> Result<Vec<PathBuf>, TaskError> {
        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let out = dir.join(&file.path);
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).map_err(TaskError::io(task, parent))?;
            }
            fs::write(&out, &file.bytes).map_err(TaskError::io(task, &out))?;
            written.push(out);
        }
        Ok(written)
    }
}

impl IntoIterator for FileSet {
    type Item = SourceFile;
    type IntoIter = std::vec::IntoIter<SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<SourceFile> for FileSet {
    fn from_iter<I: IntoIterator<Item = SourceFile>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// One transformation over a whole file set.
pub trait Step {
    /// Short name for verbose logs.
    fn name(&self) -> &'static str;

    fn apply(&self, input: FileSet) -> Result<FileSet, TaskError>;
}

/// Explicit ordered list of steps owned by one task.
pub struct Pipeline {
    task: Task,
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Names of the steps, in execution order.
    #[cfg(test)]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order; the first failure aborts.
    pub fn run(&self, input: FileSet) -> Result<FileSet, TaskError> {
        self.steps.iter().try_fold(input, |files, step| {
            debug!(self.task.name(); "{} ({} file(s))", step.name(), files.len());
            step.apply(files)
        })
    }
}
