//! Change → action mapping.

use std::path::{Path, PathBuf};

use super::pattern::PatternSet;
use crate::config::PipelineConfig;
use crate::task::Task;
use crate::utils::path::to_slash;

/// What a matched change asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    /// Re-run a task, then notify browsers per [`Task::notify`].
    Run(Task),
    /// Reload connected browsers without building anything.
    Reload,
}

/// A named pattern set and the action it triggers.
#[derive(Debug, Clone)]
pub struct WatchRule {
    pub name: &'static str,
    pub patterns: PatternSet,
    pub action: WatchAction,
}

impl WatchRule {
    fn new(name: &'static str, patterns: &[String], action: WatchAction) -> Result<Self, ignore::Error> {
        Ok(Self {
            name,
            patterns: PatternSet::new(patterns)?,
            action,
        })
    }

    pub fn matches(&self, rel: &Path) -> bool {
        self.patterns.matches(rel)
    }
}

/// Ordered rule list for a config.
#[derive(Debug, Clone)]
pub struct WatchRules {
    rules: Vec<WatchRule>,
}

impl WatchRules {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ignore::Error> {
        let styles = vec![format!("**/{}/**", config.styles.preprocessor.name())];

        let html = vec![format!("**/{}/**", to_slash(&config.html.src))];

        let mut images = extension_patterns(&config.watch.images);
        images.push(format!("!/{}/**", to_slash(&config.images.dest)));

        let reload = extension_patterns(&config.watch.files);

        let bundle_dir = to_slash(&config.scripts.dest);
        let scripts = vec![
            "**/*.js".to_string(),
            if bundle_dir.is_empty() {
                "!/*.min.js".to_string()
            } else {
                format!("!/{bundle_dir}/*.min.js")
            },
        ];

        Ok(Self {
            rules: vec![
                WatchRule::new("styles", &styles, WatchAction::Run(Task::Styles))?,
                WatchRule::new("html", &html, WatchAction::Run(Task::Html))?,
                WatchRule::new("images", &images, WatchAction::Run(Task::Images))?,
                WatchRule::new("reload", &reload, WatchAction::Reload)?,
                WatchRule::new("scripts", &scripts, WatchAction::Run(Task::Scripts))?,
            ],
        })
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[WatchRule] {
        &self.rules
    }

    /// Actions for a batch of changed paths (relative to the base
    /// directory): each action at most once, in rule order.
    pub fn actions_for(&self, changed: &[PathBuf]) -> Vec<WatchAction> {
        let mut actions = Vec::new();
        for rule in &self.rules {
            if actions.contains(&rule.action) {
                continue;
            }
            if let Some(path) = changed.iter().find(|p| rule.matches(p)) {
                crate::debug!("watch"; "{} matched rule `{}`", path.display(), rule.name);
                actions.push(rule.action);
            }
        }
        actions
    }
}

fn extension_patterns(extensions: &[String]) -> Vec<String> {
    extensions.iter().map(|ext| format!("**/*.{ext}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn rules(extra: &str) -> WatchRules {
        WatchRules::from_config(&test_parse_config(extra)).unwrap()
    }

    fn actions(rules: &WatchRules, paths: &[&str]) -> Vec<WatchAction> {
        let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        rules.actions_for(&paths)
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = rules("").rules().iter().map(|r| r.name).collect();
        assert_eq!(names, ["styles", "html", "images", "reload", "scripts"]);
    }

    #[test]
    fn test_styles_directory_rule() {
        let rules = rules("");
        assert_eq!(
            actions(&rules, &["scss/_vars.scss"]),
            [WatchAction::Run(Task::Styles)]
        );
        assert_eq!(
            actions(&rules, &["theme/scss/parts/buttons.scss"]),
            [WatchAction::Run(Task::Styles)]
        );
        assert!(actions(&rules, &["css/app.min.css"]).is_empty());
    }

    #[test]
    fn test_styles_rule_follows_preprocessor() {
        let rules = rules("[styles]\npreprocessor = \"less\"");
        assert_eq!(actions(&rules, &["less/main.less"]), [WatchAction::Run(Task::Styles)]);
        assert!(actions(&rules, &["scss/main.scss"]).is_empty());
    }

    #[test]
    fn test_html_section_triggers_html_only() {
        let rules = rules("");
        assert_eq!(
            actions(&rules, &["sections/_header.txt"]),
            [WatchAction::Run(Task::Html), WatchAction::Reload]
        );
        assert_eq!(
            actions(&rules, &["sections/index.css"]),
            [WatchAction::Run(Task::Html)]
        );
    }

    #[test]
    fn test_built_page_triggers_reload() {
        assert_eq!(actions(&rules(""), &["pages/index.html"]), [WatchAction::Reload]);
    }

    #[test]
    fn test_images_destination_excluded() {
        let rules = rules("");
        assert_eq!(
            actions(&rules, &["assets/images/src/logo.png"]),
            [WatchAction::Run(Task::Images)]
        );
        assert!(actions(&rules, &["assets/images/dest/logo.png"]).is_empty());
        assert!(actions(&rules, &["assets/images/dest/sub/icon.svg"]).is_empty());
    }

    #[test]
    fn test_minified_bundle_does_not_trigger_scripts() {
        let rules = rules("");
        assert!(actions(&rules, &["js/app.min.js"]).is_empty());
        assert_eq!(actions(&rules, &["js/app.js"]), [WatchAction::Run(Task::Scripts)]);
        assert_eq!(
            actions(&rules, &["vendor/jquery.min.js"]),
            [WatchAction::Run(Task::Scripts)]
        );
    }

    #[test]
    fn test_bundle_at_base_root() {
        let rules = rules("[scripts]\ndest = \"\"");
        assert!(actions(&rules, &["app.min.js"]).is_empty());
        assert_eq!(actions(&rules, &["js/app.js"]), [WatchAction::Run(Task::Scripts)]);
    }

    #[test]
    fn test_batch_union_deduplicated() {
        let rules = rules("");
        let got = actions(
            &rules,
            &[
                "js/app.js",
                "scss/main.scss",
                "js/other.js",
                "fonts/a.woff2",
                "README.md",
            ],
        );
        assert_eq!(
            got,
            [
                WatchAction::Run(Task::Styles),
                WatchAction::Reload,
                WatchAction::Run(Task::Scripts),
            ]
        );
    }

    #[test]
    fn test_custom_watch_lists() {
        let rules = rules("[watch]\nfiles = [\"php\"]\nimages = [\"gif\"]");
        assert_eq!(actions(&rules, &["index.php"]), [WatchAction::Reload]);
        assert!(actions(&rules, &["index.html"]).is_empty());
        assert_eq!(
            actions(&rules, &["assets/images/src/a.gif"]),
            [WatchAction::Run(Task::Images)]
        );
    }
}
