//! Asset tasks.
//!
//! Each task reads its category's sources, pushes them through an ordered
//! [`Pipeline`] of [`Step`]s and writes the result to the category's
//! destination for the selected [`Target`].
//!
//! | Task       | Pipeline                                            | Notify  |
//! |------------|-----------------------------------------------------|---------|
//! | `styles`   | compile → concat → prefix/group/minify/map          | stream  |
//! | `scripts`  | concat → minify                                     | stream  |
//! | `html`     | resolve includes                                    | reload  |
//! | `images`   | per file: freshness check → compress (parallel)     | -       |
//! | `fonts`    | copy                                                | -       |
//! | `icons`    | copy                                                | -       |
//! | `cleanimg` | empty the images destination                        | -       |

mod clean;
mod copy;
mod fileset;
mod html;
mod images;
mod scripts;
mod styles;

pub use fileset::{FileSet, Pipeline, SourceFile, Step};

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::config::PipelineConfig;
use crate::debug;

// ============================================================================
// Category / Target
// ============================================================================

/// Asset category, each with its own `{src, dest, build}` locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Styles,
    Scripts,
    Html,
    Images,
    Fonts,
    Icons,
}

/// Where a task writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// `{base}/{dest}`, served by the dev server.
    #[default]
    Dev,
    /// `{build}/{build}`, the release tree.
    Release,
}

// ============================================================================
// Task
// ============================================================================

/// What a finished task tells connected browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    /// Nothing to reload.
    None,
    /// Push the written files: stylesheets are swapped in place, anything
    /// else reloads the page.
    Stream,
    /// Full page reload.
    Reload,
}

/// A single invocable unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Styles,
    Scripts,
    Html,
    Images,
    Fonts,
    Icons,
    /// Empty the images destination.
    CleanImages,
    /// Empty the release build directory.
    CleanBuild,
}

impl Task {
    /// Name used in logs and failure reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Html => "html",
            Self::Images => "images",
            Self::Fonts => "fonts",
            Self::Icons => "icons",
            Self::CleanImages => "cleanimg",
            Self::CleanBuild => "clean",
        }
    }

    pub const fn notify(self) -> Notify {
        match self {
            Self::Styles | Self::Scripts => Notify::Stream,
            Self::Html => Notify::Reload,
            Self::Images | Self::Fonts | Self::Icons | Self::CleanImages | Self::CleanBuild => {
                Notify::None
            }
        }
    }

    /// Run the task to completion.
    pub fn run(self, config: &PipelineConfig, target: Target) -> Result<TaskReport, TaskError> {
        let start = Instant::now();
        debug!(self.name(); "started ({:?})", target);

        let mut report = match self {
            Self::Styles => styles::run(config, target)?,
            Self::Scripts => scripts::run(config, target)?,
            Self::Html => html::run(config, target)?,
            Self::Images => images::run(config, target)?,
            Self::Fonts => copy::run(self, config, Category::Fonts, target)?,
            Self::Icons => copy::run(self, config, Category::Icons, target)?,
            Self::CleanImages => {
                let dir = config.output_dir(Category::Images, Target::Dev);
                clean::run(self, &dir)?
            }
            Self::CleanBuild => clean::run(self, config.build_dir())?,
        };

        report.elapsed_ms = start.elapsed().as_millis();
        Ok(report)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// TaskReport
// ============================================================================

/// Outcome of a successful task run.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task: Task,
    /// Files written, absolute.
    pub written: Vec<PathBuf>,
    /// Files left untouched because their output was fresh.
    pub skipped: usize,
    /// Files that could not be processed; the task carried on without them.
    pub failed: Vec<(PathBuf, String)>,
    /// Entries removed by a clean task.
    pub removed: usize,
    pub elapsed_ms: u128,
}

impl TaskReport {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            written: Vec::new(),
            skipped: 0,
            failed: Vec::new(),
            removed: 0,
            elapsed_ms: 0,
        }
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if matches!(self.task, Task::CleanImages | Task::CleanBuild) {
            parts.push(format!("removed {}", self.removed));
        } else {
            parts.push(format!("wrote {}", self.written.len()));
        }
        if self.skipped > 0 {
            parts.push(format!("{} unchanged", self.skipped));
        }
        if !self.failed.is_empty() {
            parts.push(format!("{} failed", self.failed.len()));
        }
        format!("{} in {}ms", parts.join(", "), self.elapsed_ms)
    }
}

// ============================================================================
// TaskError
// ============================================================================

/// Failure that aborts a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A source could not be compiled or transformed.
    #[error("failed to compile `{}`\n{message}", .path.display())]
    Compile {
        task: Task,
        path: PathBuf,
        message: String,
    },

    /// A required source file is absent.
    #[error("missing source `{}`", .path.display())]
    Missing { task: Task, path: PathBuf },

    #[error("I/O error on `{}`", .path.display())]
    Io {
        task: Task,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TaskError {
    pub fn compile(task: Task, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Compile {
            task,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Closure for `map_err` on filesystem calls.
    pub fn io(task: Task, path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            task,
            path: path.to_path_buf(),
            source,
        }
    }

    pub const fn task(&self) -> Task {
        match self {
            Self::Compile { task, .. } | Self::Missing { task, .. } | Self::Io { task, .. } => {
                *task
            }
        }
    }
}
