//! Script task: concat in declared order → minify and mangle.

use super::{Category, FileSet, Pipeline, SourceFile, Step, Target, Task, TaskError, TaskReport};
use crate::asset::minify_js;
use crate::config::PipelineConfig;

const TASK: Task = Task::Scripts;

/// Inserted between concatenated files so a missing trailing `;` in one
/// file cannot merge its last statement with the next file's first.
const SEPARATOR: &[u8] = b"\n;\n";

pub fn run(config: &PipelineConfig, target: Target) -> Result<TaskReport, TaskError> {
    let pipeline = Pipeline::new(TASK)
        .then(Concat {
            output: config.scripts.output.clone(),
        })
        .then(Minify);

    let input = FileSet::read(TASK, config.base(), &config.script_sources())?;
    let files = pipeline.run(input)?;

    let mut report = TaskReport::new(TASK);
    report.written = files.write_to(TASK, &config.output_dir(Category::Scripts, target))?;
    Ok(report)
}

struct Concat {
    output: String,
}

impl Step for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet, TaskError> {
        let mut bytes = Vec::new();
        for (i, file) in input.into_iter().enumerate() {
            if i > 0 {
                bytes.extend_from_slice(SEPARATOR);
            }
            bytes.extend_from_slice(&file.bytes);
        }
        Ok([SourceFile::new(&self.output, bytes)].into_iter().collect())
    }
}

struct Minify;

impl Step for Minify {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet, TaskError> {
        input
            .into_iter()
            .map(|file| {
                let code = minify_js(file.text(TASK)?)
                    .map_err(|e| TaskError::compile(TASK, &file.path, e))?;
                Ok(SourceFile::new(file.path, code))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_concat_in_declared_order() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(
            dir.path(),
            "[scripts]\nsrc = [\"vendor/zeta.js\", \"js/app.js\", \"vendor/alpha.js\"]",
        );
        write(&config.base().join("vendor/zeta.js"), "window.order = ['zeta']");
        write(&config.base().join("js/app.js"), "window.order.push('app')");
        write(&config.base().join("vendor/alpha.js"), "window.order.push('alpha');");

        let report = Task::Scripts.run(&config, Target::Dev).unwrap();
        assert_eq!(report.written, vec![config.base().join("js/app.min.js")]);

        let js = fs::read_to_string(&report.written[0]).unwrap();
        let zeta = js.find("zeta").unwrap();
        let app = js.find("app").unwrap();
        let alpha = js.find("alpha").unwrap();
        assert!(zeta < app && app < alpha);
    }

    #[test]
    fn test_separator_guards_missing_semicolon() {
        let concat = Concat {
            output: "out.js".into(),
        };
        let input: FileSet = [SourceFile::new("a.js", "var a = 1"), SourceFile::new("b.js", "(function(){})()")]
            .into_iter()
            .collect();
        let out = concat.apply(input).unwrap();
        let bytes = &out.iter().next().unwrap().bytes;
        assert_eq!(bytes.as_slice(), b"var a = 1\n;\n(function(){})()");
        assert!(minify_js(std::str::from_utf8(bytes).unwrap()).is_ok());
    }

    #[test]
    fn test_missing_source_aborts() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let err = Task::Scripts.run(&config, Target::Dev).unwrap_err();
        assert!(matches!(err, TaskError::Missing { .. }));
    }

    #[test]
    fn test_syntax_error_aborts() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        write(&config.base().join("js/app.js"), "function (");

        let err = Task::Scripts.run(&config, Target::Dev).unwrap_err();
        assert!(matches!(err, TaskError::Compile { .. }));
        assert!(!config.base().join("js/app.min.js").exists());
    }

    #[test]
    fn test_release_goes_to_build_root() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        write(&config.base().join("js/app.js"), "console.log(1)");

        let report = Task::Scripts.run(&config, Target::Release).unwrap();
        assert_eq!(report.written, vec![config.build_dir().join("app.min.js")]);
    }
}
