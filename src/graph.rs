//! Task compositions behind each command.
//!
//! | Command       | Composition                                                  |
//! |---------------|--------------------------------------------------------------|
//! | `dev`         | bind server → parallel(html, images, styles, scripts) → watch |
//! | `browsersync` | bind server, live reload only                                |
//! | `assets`      | series(cleanimg, styles, scripts, images)                    |
//! | `build`       | series(clean, styles, scripts, html, images, fonts, icons)   |
//! | single tasks  | the task itself                                              |
//!
//! A series stops at its first failure. Parallel members all run to
//! completion and every failure is reported by task name.

use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::cli::{Commands, deploy, serve};
use crate::config::PipelineConfig;
use crate::task::{Target, Task, TaskError, TaskReport};
use crate::{core, log};

const DEV: [Task; 4] = [Task::Html, Task::Images, Task::Styles, Task::Scripts];

const ASSETS: [Task; 4] = [Task::CleanImages, Task::Styles, Task::Scripts, Task::Images];

const BUILD: [Task; 7] = [
    Task::CleanBuild,
    Task::Styles,
    Task::Scripts,
    Task::Html,
    Task::Images,
    Task::Fonts,
    Task::Icons,
];

/// Run the composition for `command`.
pub fn run(config: PipelineConfig, command: &Commands) -> Result<()> {
    match command {
        Commands::Dev { .. } => dev(config),
        Commands::Browsersync { .. } => browsersync(config),
        Commands::Assets => series(&config, &ASSETS, Target::Dev).map(drop),
        Commands::Build => {
            series(&config, &BUILD, Target::Release)?;
            log!("build"; "release written to {}", config.build_dir().display());
            Ok(())
        }
        Commands::Styles => single(&config, Task::Styles),
        Commands::Scripts => single(&config, Task::Scripts),
        Commands::Html => single(&config, Task::Html),
        Commands::Images => single(&config, Task::Images),
        Commands::Fonts => single(&config, Task::Fonts),
        Commands::Icons => single(&config, Task::Icons),
        Commands::Cleanimg => single(&config, Task::CleanImages),
        Commands::Deploy { dry_run } => {
            deploy::deploy(&config, *dry_run)?;
            Ok(())
        }
    }
}

/// Run one task and log its outcome.
pub fn run_task(config: &PipelineConfig, task: Task, target: Target) -> Result<TaskReport, TaskError> {
    match task.run(config, target) {
        Ok(report) => {
            log!(task.name(); "{}", report.summary());
            for (path, error) in &report.failed {
                log!(task.name(); "skipped {}: {}", config.base_relative(path).display(), error);
            }
            Ok(report)
        }
        Err(err) => {
            log!(task.name(); "{}", err);
            Err(err)
        }
    }
}

fn single(config: &PipelineConfig, task: Task) -> Result<()> {
    run_task(config, task, Target::Dev)?;
    Ok(())
}

/// Run `tasks` in order, stopping at the first failure.
pub fn series(config: &PipelineConfig, tasks: &[Task], target: Target) -> Result<Vec<TaskReport>> {
    let mut reports = Vec::with_capacity(tasks.len());
    for &task in tasks {
        let report =
            run_task(config, task, target).map_err(|e| anyhow!(e).context(format!("`{task}` failed")))?;
        reports.push(report);
    }
    Ok(reports)
}

/// Run `tasks` concurrently; every member runs even when a sibling fails.
pub fn parallel(config: &PipelineConfig, tasks: &[Task], target: Target) -> Result<Vec<TaskReport>> {
    let results: Vec<Result<TaskReport, TaskError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = tasks
            .iter()
            .map(|&task| scope.spawn(move || run_task(config, task, target)))
            .collect();
        handles
            .into_iter()
            .zip(tasks)
            .map(|(handle, &task)| {
                handle.join().unwrap_or_else(|_| {
                    Err(TaskError::compile(task, config.base(), "task panicked"))
                })
            })
            .collect()
    });

    let mut reports = Vec::with_capacity(results.len());
    let mut failed = Vec::new();
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => failed.push(err.task().name()),
        }
    }

    if failed.is_empty() {
        Ok(reports)
    } else {
        Err(anyhow!("failed tasks: {}", failed.join(", ")))
    }
}

/// Serve, build every dev output, then watch.
///
/// Server and reload channel are bound before the first task starts.
fn dev(config: PipelineConfig) -> Result<()> {
    let config = Arc::new(config);
    let mut server = serve::bind_server(&config)?;
    server.start_actors(Arc::clone(&config), true);

    if let Err(e) = parallel(&config, &DEV, Target::Dev) {
        log!("dev"; "{e}, watching anyway");
    }

    core::set_serving();
    log!("watch"; "watching {}", config.base().display());
    server.run()
}

/// Serve with live reload; nothing is built or watched.
fn browsersync(config: PipelineConfig) -> Result<()> {
    let config = Arc::new(config);
    let mut server = serve::bind_server(&config)?;
    server.start_actors(Arc::clone(&config), false);
    core::set_serving();
    server.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    fn site(scss: &str) -> (TempDir, PipelineConfig) {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("app");
        fs::create_dir_all(base.join("scss")).unwrap();
        fs::create_dir_all(base.join("js")).unwrap();
        fs::create_dir_all(base.join("sections")).unwrap();
        fs::write(base.join("scss/main.scss"), scss).unwrap();
        fs::write(base.join("js/app.js"), "var answer = 40 + 2;\nconsole.log(answer);\n").unwrap();
        fs::write(base.join("sections/index.html"), "<html><body>\n//= _nav.html\n</body></html>\n").unwrap();
        fs::write(base.join("sections/_nav.html"), "<nav></nav>\n").unwrap();
        let config = test_config_at(dir.path(), "");
        (dir, config)
    }

    #[test]
    fn test_series_in_order() {
        let (_dir, config) = site("a { color: red; }");
        let reports = series(&config, &[Task::Styles, Task::Scripts], Target::Dev).unwrap();
        let tasks: Vec<_> = reports.iter().map(|r| r.task).collect();
        assert_eq!(tasks, [Task::Styles, Task::Scripts]);
    }

    #[test]
    fn test_series_stops_at_failure() {
        let (_dir, config) = site("a { color: ");
        let err = series(&config, &[Task::Styles, Task::Scripts], Target::Dev).unwrap_err();
        assert!(err.to_string().contains("styles"));
        assert!(!config.base().join("js/app.min.js").exists());
    }

    #[test]
    fn test_parallel_runs_siblings_and_names_failures() {
        let (_dir, config) = site("a { color: ");
        let err = parallel(&config, &DEV, Target::Dev).unwrap_err();
        assert_eq!(err.to_string(), "failed tasks: styles");
        assert!(config.base().join("js/app.min.js").is_file());
        assert!(config.base().join("pages/index.html").is_file());
    }

    #[test]
    fn test_assets_cleans_images_first() {
        let (_dir, config) = site("a { color: red; }");
        let stale = config.base().join("assets/images/dest/stale.png");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        run(config.clone(), &Commands::Assets).unwrap();
        assert!(!stale.exists());
        assert!(config.base().join("css/app.min.css").is_file());
        assert!(config.base().join("js/app.min.js").is_file());
    }

    #[test]
    fn test_build_writes_release_tree() {
        let (_dir, config) = site("a { color: red; }");
        run(config.clone(), &Commands::Build).unwrap();
        let build = config.build_dir();
        assert!(build.join("css/app.min.css").is_file());
        assert!(build.join("app.min.js").is_file());
        assert!(build.join("pages/index.html").is_file());
        assert!(!build.join("pages/_nav.html").exists());
    }
}
