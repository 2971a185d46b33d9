//! Filesystem watcher for edits made outside the browser.
//!
//! notify delivers events on its own thread; a bridge thread forwards them
//! into a tokio channel and the watch loop batches them for a short settle
//! period before rebuilding the index and scheduling a compile.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use tokio::sync::mpsc;

use super::CompileScheduler;
use crate::utils::path::normalize_path;
use crate::workspace::Workspace;
use crate::{debug, log};

/// Editors often save as remove + create + modify; wait for the burst to end.
const SETTLE: Duration = Duration::from_millis(150);

/// Idle wait when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

pub struct FileWatcher {
    /// Must be kept alive for events to arrive.
    _watcher: RecommendedWatcher,
    events: mpsc::Receiver<notify::Event>,
    workspace: Arc<Workspace>,
    scheduler: Arc<CompileScheduler>,
}

impl FileWatcher {
    /// Start watching the workspace root (non-recursive).
    ///
    /// Events buffer in the channel until [`FileWatcher::run`] is polled.
    pub fn new(workspace: Arc<Workspace>, scheduler: Arc<CompileScheduler>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(workspace.store().root(), RecursiveMode::NonRecursive)?;

        let (async_tx, events) = mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // watch loop gone
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            events,
            workspace,
            scheduler,
        })
    }

    pub async fn run(mut self) {
        let mut dirty = false;

        loop {
            let wait = if dirty { SETTLE } else { IDLE };
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Some(event) => dirty |= self.is_relevant(&event),
                    None => break,
                },
                _ = tokio::time::sleep(wait) => {
                    if dirty {
                        dirty = false;
                        self.sources_changed();
                    }
                }
            }
        }
    }

    fn is_relevant(&self, event: &notify::Event) -> bool {
        let kind_matters = match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => true,
            // metadata-only changes (touch, chmod) do not alter content
            EventKind::Modify(ModifyKind::Metadata(_)) => false,
            EventKind::Modify(_) => true,
            _ => false,
        };
        kind_matters && event.paths.iter().any(|path| self.is_tracked(path))
    }

    fn is_tracked(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        let tracked = self.workspace.store().is_tracked_path(&path);
        if tracked {
            debug!("watch"; "change: {}", path.display());
        }
        tracked
    }

    fn sources_changed(&self) {
        match self.workspace.rebuild_index() {
            Ok(len) => debug!("watch"; "index: {} entries", len),
            Err(e) => log!("watch"; "index rebuild failed: {}", e),
        }
        self.scheduler.schedule();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use notify::event::{CreateKind, DataChange, MetadataKind};
    use std::fs;
    use tempfile::TempDir;

    fn event(kind: EventKind, path: &Path) -> notify::Event {
        notify::Event::new(kind).add_path(path.to_path_buf())
    }

    fn watcher(root: &Path) -> FileWatcher {
        let config = test_config_at(root);
        let workspace = Arc::new(Workspace::from_config(&config));
        let scheduler = CompileScheduler::new(
            Arc::clone(&workspace),
            tokio::runtime::Handle::current(),
            Duration::from_secs(60),
        );
        FileWatcher::new(workspace, scheduler).unwrap()
    }

    #[tokio::test]
    async fn test_relevance_filter() {
        let temp = TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        fs::write(root.join("main.tex"), "x").unwrap();
        let watcher = watcher(&root);

        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert!(watcher.is_relevant(&event(modify, &root.join("main.tex"))));
        assert!(watcher.is_relevant(&event(
            EventKind::Create(CreateKind::File),
            &root.join("new.sty")
        )));

        // untracked, hidden, state dir and metadata noise
        assert!(!watcher.is_relevant(&event(modify, &root.join("main.pdf"))));
        assert!(!watcher.is_relevant(&event(modify, &root.join(".main.tex.tmp"))));
        assert!(!watcher.is_relevant(&event(
            modify,
            &root.join(".texpane/backup/main.tex.bak")
        )));
        assert!(!watcher.is_relevant(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            &root.join("main.tex")
        )));
    }

    #[tokio::test]
    async fn test_change_rebuilds_index_and_schedules() {
        let temp = TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        let watcher = watcher(&root);

        fs::write(root.join("skills.tex"), "\\skill{Compiler Design}").unwrap();
        watcher.sources_changed();

        assert!(watcher.workspace.controller().lookup("compiler design").is_some());
        assert!(watcher.scheduler.is_pending());
        watcher.scheduler.cancel();
    }
}
