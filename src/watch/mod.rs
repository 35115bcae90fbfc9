//! File-change routing for watch mode.
//!
//! Changed paths (relative to `paths.base`) are matched against one
//! [`WatchRule`] per asset category; the union of their actions is what a
//! batch of changes triggers.

mod pattern;
mod rules;

pub use pattern::PatternSet;
pub use rules::{WatchAction, WatchRules};
