//! Gitignore-style pattern sets.
//!
//! Used by watch rules and by deploy's include/exclude lists. Patterns are
//! matched against paths relative to `paths.base`; a path matches when it,
//! or any of its parent directories, is matched by the set. A later `!`
//! pattern re-admits what an earlier one matched.

use std::fmt;
use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Compiled list of gitignore-style patterns.
#[derive(Clone)]
pub struct PatternSet {
    matcher: Gitignore,
    patterns: Vec<String>,
}

impl PatternSet {
    /// Compile `patterns` in order. Blank lines are skipped.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new("");
        let mut kept = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            builder.add_line(None, pattern)?;
            kept.push(pattern.to_string());
        }

        Ok(Self {
            matcher: builder.build()?,
            patterns: kept,
        })
    }

    /// A set that matches nothing.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            patterns: Vec::new(),
        }
    }

    /// Syntax check for a single pattern.
    ///
    /// An unclosed `[` or `{` is rejected; the gitignore parser would
    /// otherwise read it literally.
    pub fn check_pattern(pattern: &str) -> Result<(), ignore::Error> {
        if let Some(err) = unclosed_group(pattern) {
            return Err(ignore::Error::Glob {
                glob: Some(pattern.to_string()),
                err: err.to_string(),
            });
        }
        Self::new(&[pattern]).map(|_| ())
    }

    /// Whether `rel` (a file path relative to the base directory) or one of
    /// its parents matches.
    pub fn matches(&self, rel: &Path) -> bool {
        if self.patterns.is_empty() || rel.as_os_str().is_empty() {
            return false;
        }
        self.matcher.matched_path_or_any_parents(rel, false).is_ignore()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// First unbalanced bracket group in `pattern`, honoring `\\` escapes.
fn unclosed_group(pattern: &str) -> Option<&'static str> {
    let mut chars = pattern.chars();
    let mut in_class = false;
    let mut alternates = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' if !in_class => {
                in_class = true;
                // `[]...]` and `[!]...]` start with a literal `]`
                let rest = chars.as_str();
                let skip = match rest.as_bytes() {
                    [b'!' | b'^', b']', ..] => 2,
                    [b']', ..] => 1,
                    _ => 0,
                };
                for _ in 0..skip {
                    chars.next();
                }
            }
            ']' if in_class => in_class = false,
            '{' if !in_class => alternates += 1,
            '}' if !in_class && alternates > 0 => alternates -= 1,
            _ => {}
        }
    }

    if in_class {
        Some("unclosed character class; missing ']'")
    } else if alternates > 0 {
        Some("unclosed alternate group; missing '}'")
    } else {
        None
    }
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PatternSet").field(&self.patterns).finish()
    }
}
