use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE_MS: u64 = 300;
pub(super) const REBUILD_COOLDOWN_MS: u64 = 800;
const IDLE: Duration = Duration::from_secs(86400);

/// Collects notify events until the quiet period has passed.
///
/// Pure timing and deduplication; which task a path triggers is decided
/// downstream by the watch rules.
pub(super) struct Debouncer {
    changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
    last_flush: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_flush: None,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;
        use notify::event::ModifyKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // mtime/chmod noise from our own writes would loop forever
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            self.record(path, kind);
        }
    }

    /// Merge one change into the pending batch.
    ///
    /// - removed, then created/modified: the file is back, keep the new kind
    /// - modified, then removed: removed
    /// - created, then removed: never existed, drop it
    /// - anything else: first kind wins
    pub(super) fn record(&mut self, path: &Path, kind: ChangeKind) {
        if is_temp_file(path) {
            return;
        }
        let path = normalize_path(path);

        match self.changes.get(&path).copied() {
            None => {
                crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                self.changes.insert(path, ChangeKind::Removed);
            }
            Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                crate::debug!("watch"; "discard created+removed: {}", path.display());
                self.changes.remove(&path);
                if self.changes.is_empty() {
                    self.last_event = None;
                }
                return;
            }
            Some(_) => return,
        }
        self.last_event = Some(Instant::now());
    }

    /// Take the pending batch once debounce and cooldown have elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;
        self.last_flush = Some(Instant::now());
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_flush) = self.last_flush
            && last_flush.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event.filter(|_| !self.changes.is_empty()) else {
            return IDLE;
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_flush
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }

    #[cfg(test)]
    fn backdate(&mut self, by: Duration) {
        self.last_event = self.last_event.map(|t| t - by);
    }
}

/// Editor swap/backup files and dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(name: &str) -> PathBuf {
        std::env::temp_dir().join("pipewright-debounce").join(name)
    }

    #[test]
    fn test_not_ready_inside_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.record(&path("a.scss"), ChangeKind::Modified);
        assert!(!debouncer.is_ready());
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_ready_after_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.record(&path("a.scss"), ChangeKind::Modified);
        debouncer.record(&path("a.scss"), ChangeKind::Modified);
        debouncer.backdate(Duration::from_millis(DEBOUNCE_MS + 10));

        let batch = debouncer.take_if_ready().unwrap();
        assert_eq!(batch.len(), 1);
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_cooldown_after_flush() {
        let mut debouncer = Debouncer::new();
        debouncer.record(&path("a.js"), ChangeKind::Modified);
        debouncer.backdate(Duration::from_millis(DEBOUNCE_MS + 10));
        assert!(debouncer.take_if_ready().is_some());

        debouncer.record(&path("b.js"), ChangeKind::Modified);
        debouncer.backdate(Duration::from_millis(DEBOUNCE_MS + 10));
        assert!(!debouncer.is_ready());
        assert!(debouncer.sleep_duration() > Duration::ZERO);
    }

    #[test]
    fn test_state_transitions() {
        let mut debouncer = Debouncer::new();
        debouncer.record(&path("gone.html"), ChangeKind::Created);
        debouncer.record(&path("gone.html"), ChangeKind::Removed);
        debouncer.record(&path("edited.html"), ChangeKind::Modified);
        debouncer.record(&path("edited.html"), ChangeKind::Removed);
        debouncer.record(&path("back.html"), ChangeKind::Removed);
        debouncer.record(&path("back.html"), ChangeKind::Created);
        debouncer.backdate(Duration::from_millis(DEBOUNCE_MS + 10));

        let batch = debouncer.take_if_ready().unwrap();
        assert!(!batch.contains_key(&normalize_path(&path("gone.html"))));
        assert_eq!(
            batch.get(&normalize_path(&path("edited.html"))),
            Some(&ChangeKind::Removed)
        );
        assert_eq!(
            batch.get(&normalize_path(&path("back.html"))),
            Some(&ChangeKind::Created)
        );
    }

    #[test]
    fn test_temp_files_ignored() {
        let mut debouncer = Debouncer::new();
        debouncer.record(&path("main.scss.swp"), ChangeKind::Modified);
        debouncer.record(&path("index.html~"), ChangeKind::Modified);
        debouncer.record(&path(".#app.js"), ChangeKind::Modified);
        assert!(!debouncer.is_ready());
        assert_eq!(debouncer.sleep_duration(), IDLE);
    }

    #[test]
    fn test_created_then_removed_only_goes_idle() {
        let mut debouncer = Debouncer::new();
        debouncer.record(&path("4913"), ChangeKind::Created);
        debouncer.record(&path("4913"), ChangeKind::Removed);
        debouncer.backdate(Duration::from_millis(DEBOUNCE_MS + 10));

        assert!(debouncer.take_if_ready().is_none());
        assert_eq!(debouncer.sleep_duration(), IDLE);
    }

    #[test]
    fn test_discarded_path_keeps_pending_batch() {
        let mut debouncer = Debouncer::new();
        debouncer.record(&path("main.scss"), ChangeKind::Modified);
        debouncer.record(&path("4913"), ChangeKind::Created);
        debouncer.record(&path("4913"), ChangeKind::Removed);
        assert!(debouncer.sleep_duration() < IDLE);

        debouncer.backdate(Duration::from_millis(DEBOUNCE_MS + 10));
        let batch = debouncer.take_if_ready().unwrap();
        assert_eq!(batch.len(), 1);
    }
}
