//! HTML task: resolve `//= path` include directives.
//!
//! ```html
//! <body>
//!     //= _header.html
//! </body>
//! ```
//!
//! The directive must be alone on its line. The included file's lines are
//! indented like the directive; includes nest, paths are relative to the
//! including file, and a file including itself (directly or not) is an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::{Category, FileSet, Pipeline, SourceFile, Step, Target, Task, TaskError, TaskReport};
use crate::config::PipelineConfig;

const TASK: Task = Task::Html;

pub fn run(config: &PipelineConfig, target: Target) -> Result<TaskReport, TaskError> {
    let src_dir = config.source_dir(Category::Html);
    let pages = find_pages(&src_dir)?;

    let pipeline = Pipeline::new(TASK).then(Includes {
        src_dir: src_dir.clone(),
    });
    let files = pipeline.run(FileSet::read(TASK, &src_dir, &pages)?)?;

    let mut report = TaskReport::new(TASK);
    report.written = files.write_to(TASK, &config.output_dir(Category::Html, target))?;
    Ok(report)
}

/// Whether a file name marks an include-only fragment.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Top-level `*.html` pages in `dir`, partials excluded, sorted.
fn find_pages(dir: &Path) -> Result<Vec<PathBuf>, TaskError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut pages: Vec<_> = fs::read_dir(dir)
        .map_err(TaskError::io(TASK, dir))?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && !is_partial(p)
                && p.extension().and_then(|e| e.to_str()) == Some("html")
        })
        .collect();
    pages.sort();
    Ok(pages)
}

fn directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^([ \t]*)//=[ \t]*(\S+)[ \t\r]*$").unwrap())
}

struct Includes {
    src_dir: PathBuf,
}

impl Step for Includes {
    fn name(&self) -> &'static str {
        "includes"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet, TaskError> {
        input
            .into_iter()
            .map(|file| {
                let path = self.src_dir.join(&file.path);
                let mut stack = vec![canonical(&path)];
                let html = resolve(file.text(TASK)?, &path, &mut stack)?;
                Ok(SourceFile::new(file.path, html))
            })
            .collect()
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Expand every directive in `text`, which was read from `file`.
///
/// `stack` holds the chain of files currently being expanded.
fn resolve(text: &str, file: &Path, stack: &mut Vec<PathBuf>) -> Result<String, TaskError> {
    let re = directive();
    let dir = file.parent().unwrap_or(Path::new(""));

    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let (Some(whole), Some(indent), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        let include = dir.join(target.as_str());
        let key = canonical(&include);
        if stack.contains(&key) {
            let chain: Vec<_> = stack
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect();
            return Err(TaskError::compile(
                TASK,
                file,
                format!("include cycle: {}", chain.join(" -> ")),
            ));
        }
        if !include.is_file() {
            return Err(TaskError::compile(
                TASK,
                file,
                format!("included file not found: {}", include.display()),
            ));
        }

        let content = fs::read_to_string(&include).map_err(TaskError::io(TASK, &include))?;
        stack.push(key);
        let expanded = resolve(&content, &include, stack)?;
        stack.pop();

        push_indented(&mut out, expanded.strip_suffix('\n').unwrap_or(&expanded), indent.as_str());
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Append `text` with `indent` in front of every non-empty line.
fn push_indented(out: &mut String, text: &str, indent: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if !line.trim().is_empty() {
            out.push_str(indent);
        }
        out.push_str(line);
    }
}
