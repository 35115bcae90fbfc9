//! Stylesheet task: compile → concat → prefix, group media, minify, map.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Category, FileSet, Pipeline, SourceFile, Step, Target, Task, TaskError, TaskReport};
use crate::asset::{CssOptions, minify_css};
use crate::config::{PipelineConfig, Preprocessor};
use crate::utils::exec::Cmd;

const TASK: Task = Task::Styles;

pub fn run(config: &PipelineConfig, target: Target) -> Result<TaskReport, TaskError> {
    let src_dir = config.source_dir(Category::Styles);
    let entries = find_entries(&src_dir, &config.styles.entry)?;
    if entries.is_empty() {
        return Err(TaskError::Missing {
            task: TASK,
            path: src_dir.join(format!(
                "{}.{}",
                config.styles.entry,
                config.styles.preprocessor.extension()
            )),
        });
    }

    let output = &config.styles.output;
    let css = CssOptions {
        filename: unminified_name(output),
        group_media: true,
        source_map: config.styles.source_map,
        ..CssOptions::default()
    }
    .with_browsers(&config.styles.browsers)
    .map_err(|e| TaskError::compile(TASK, "styles.browsers", e))?;

    let pipeline = Pipeline::new(TASK)
        .then(Compile {
            preprocessor: config.styles.preprocessor,
            src_dir: src_dir.clone(),
        })
        .then(Concat {
            output: unminified_name(output),
        })
        .then(Optimize {
            output: output.clone(),
            options: css,
        });

    let input = FileSet::read(TASK, &src_dir, &entries)?;
    let files = pipeline.run(input)?;

    let mut report = TaskReport::new(TASK);
    report.written = files.write_to(TASK, &config.output_dir(Category::Styles, target))?;
    Ok(report)
}

/// Entry files `{stem}.*` directly inside `dir`, sorted by name.
fn find_entries(dir: &Path, stem: &str) -> Result<Vec<PathBuf>, TaskError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(TaskError::io(TASK, dir))?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.file_stem().and_then(|s| s.to_str()) == Some(stem))
        .collect();
    entries.sort();
    Ok(entries)
}

/// `app.min.css` → `app.css`
fn unminified_name(output: &str) -> String {
    output.replacen(".min.", ".", 1)
}

// ============================================================================
// Steps
// ============================================================================

/// Compile each entry with the active preprocessor.
struct Compile {
    preprocessor: Preprocessor,
    src_dir: PathBuf,
}

impl Compile {
    fn compile(&self, file: &SourceFile) -> Result<String, String> {
        let abs = self.src_dir.join(&file.path);
        match self.preprocessor {
            Preprocessor::Sass | Preprocessor::Scss => {
                let syntax = match file.path.extension().and_then(|e| e.to_str()) {
                    Some("sass") => grass::InputSyntax::Sass,
                    Some("css") => grass::InputSyntax::Css,
                    _ => grass::InputSyntax::Scss,
                };
                let options = grass::Options::default()
                    .load_path(&self.src_dir)
                    .input_syntax(syntax);
                let text = std::str::from_utf8(&file.bytes).map_err(|e| e.to_string())?;
                grass::from_string(text.to_owned(), &options).map_err(|e| e.to_string())
            }
            Preprocessor::Less => run_tool(Cmd::new("lessc").arg(&abs), &self.src_dir),
            Preprocessor::Styl => {
                run_tool(Cmd::new("stylus").arg("--print").arg(&abs), &self.src_dir)
            }
        }
    }
}

fn run_tool(cmd: Cmd, cwd: &Path) -> Result<String, String> {
    let output = cmd.cwd(cwd).run().map_err(|e| format!("{e:#}"))?;
    String::from_utf8(output.stdout).map_err(|e| e.to_string())
}

impl Step for Compile {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet, TaskError> {
        input
            .into_iter()
            .map(|file| {
                let css = self
                    .compile(&file)
                    .map_err(|e| TaskError::compile(TASK, &file.path, e))?;
                Ok(SourceFile::new(file.path.with_extension("css"), css))
            })
            .collect()
    }
}

/// Join every file into one, in order.
struct Concat {
    output: String,
}

impl Step for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet, TaskError> {
        let mut bytes = Vec::new();
        for file in input {
            if !bytes.is_empty() && !bytes.ends_with(b"\n") {
                bytes.push(b'\n');
            }
            bytes.extend_from_slice(&file.bytes);
        }
        Ok([SourceFile::new(&self.output, bytes)].into_iter().collect())
    }
}

/// Prefix, group media queries, minify and emit the source map.
struct Optimize {
    output: String,
    options: CssOptions,
}

impl Step for Optimize {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet, TaskError> {
        let mut out = FileSet::new();
        for file in input {
            let text = file.text(TASK)?;
            let minified =
                minify_css(text, &self.options).map_err(|e| TaskError::compile(TASK, &file.path, e))?;
            out.push(SourceFile::new(&self.output, minified.code));
            if let Some(map) = minified.map {
                out.push(SourceFile::new(format!("{}.map", self.output), map));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scss_with_partial_import() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let scss = config.base().join("scss");
        write(&scss.join("_vars.scss"), "$accent: #ff0000;\n");
        write(
            &scss.join("main.scss"),
            "/* header comment */\n@import 'vars';\n.btn {\n  color: $accent;\n  user-select: none;\n}\n",
        );

        let report = Task::Styles.run(&config, Target::Dev).unwrap();

        let css_path = config.base().join("css/app.min.css");
        let map_path = config.base().join("css/app.min.css.map");
        assert_eq!(report.written, vec![css_path.clone(), map_path.clone()]);

        let css = fs::read_to_string(&css_path).unwrap();
        assert!(css.contains(".btn{"));
        assert!(css.contains("red") || css.contains("#f00"));
        assert!(css.contains("-webkit-user-select"));
        assert!(!css.contains("/*"));
        assert!(!css.contains('\n'));

        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&map_path).unwrap()).unwrap();
        assert_eq!(map["version"], 3);

        // Partials are never compiled standalone
        assert!(!config.base().join("css/_vars.css").exists());
    }

    #[test]
    fn test_output_deterministic() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        write(
            &config.base().join("scss/main.scss"),
            "@media (min-width: 768px) { .a { color: red } }\n.b { display: flex }\n@media (min-width: 768px) { .c { color: blue } }\n",
        );

        Task::Styles.run(&config, Target::Dev).unwrap();
        let first = fs::read(config.base().join("css/app.min.css")).unwrap();
        Task::Styles.run(&config, Target::Dev).unwrap();
        let second = fs::read(config.base().join("css/app.min.css")).unwrap();
        assert_eq!(first, second);

        let css = String::from_utf8(first).unwrap();
        assert_eq!(css.matches("@media").count(), 1);
    }

    #[test]
    fn test_indented_sass() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[styles]\npreprocessor = \"sass\"");
        write(&config.base().join("sass/main.sass"), ".a\n  color: red\n");

        Task::Styles.run(&config, Target::Dev).unwrap();
        let css = fs::read_to_string(config.base().join("css/app.min.css")).unwrap();
        assert_eq!(css, ".a{color:red}");
    }

    #[test]
    fn test_compile_error_aborts() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        write(&config.base().join("scss/main.scss"), ".a { color: $missing; }");

        let err = Task::Styles.run(&config, Target::Dev).unwrap_err();
        assert!(matches!(err, TaskError::Compile { .. }));
        assert!(!config.base().join("css/app.min.css").exists());
    }

    #[test]
    fn test_missing_entry() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let err = Task::Styles.run(&config, Target::Dev).unwrap_err();
        assert!(matches!(err, TaskError::Missing { .. }));
    }

    #[test]
    fn test_no_source_map_when_disabled() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[styles]\nsource_map = false");
        write(&config.base().join("scss/main.scss"), ".a { color: red }");

        let report = Task::Styles.run(&config, Target::Release).unwrap();
        assert_eq!(report.written, vec![config.build_dir().join("css/app.min.css")]);
    }

    #[test]
    fn test_less_when_available() {
        if which::which("lessc").is_err() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[styles]\npreprocessor = \"less\"");
        write(
            &config.base().join("less/main.less"),
            "@c: red;\n.a { color: @c; }\n",
        );

        Task::Styles.run(&config, Target::Dev).unwrap();
        let first = fs::read(config.base().join("css/app.min.css")).unwrap();
        Task::Styles.run(&config, Target::Dev).unwrap();
        let second = fs::read(config.base().join("css/app.min.css")).unwrap();
        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), ".a{color:red}");
    }

    #[test]
    fn test_stylus_when_available() {
        if which::which("stylus").is_err() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[styles]\npreprocessor = \"styl\"");
        write(&config.base().join("styl/main.styl"), "c = red\n.a\n  color c\n");

        Task::Styles.run(&config, Target::Dev).unwrap();
        let css = fs::read_to_string(config.base().join("css/app.min.css")).unwrap();
        assert_eq!(css, ".a{color:red}");
    }

    #[test]
    fn test_unminified_name() {
        assert_eq!(unminified_name("app.min.css"), "app.css");
        assert_eq!(unminified_name("style.css"), "style.css");
    }
}
