//! Debounced compile scheduling.
//!
//! Every edit calls [`CompileScheduler::schedule`]. The pending timer is
//! aborted and a new one started, so a compile runs once the sources have
//! been quiet for the whole period. Only the timer is ever aborted: once it
//! fires, the compile runs on its own task and is never cancelled by a later
//! edit.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::compiler::CompileError;
use crate::workspace::Workspace;
use crate::{debug, log};

pub struct CompileScheduler {
    workspace: Arc<Workspace>,
    runtime: Handle,
    quiet: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl CompileScheduler {
    pub fn new(workspace: Arc<Workspace>, runtime: Handle, quiet: Duration) -> Arc<Self> {
        Arc::new(Self {
            workspace,
            runtime,
            quiet,
            timer: Mutex::new(None),
        })
    }

    /// (Re)start the quiet period.
    pub fn schedule(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let quiet = self.quiet;

        let mut timer = self.timer.lock();
        if let Some(pending) = timer.take() {
            pending.abort();
        }
        *timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(quiet).await;
            // detach: aborting the timer from here on must not cancel the compile
            let runtime = this.runtime.clone();
            runtime.spawn(this.fire());
        }));
    }

    /// Drop the pending compile, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.timer.lock().take() {
            pending.abort();
        }
    }

    /// A timer is running and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    async fn fire(self: Arc<Self>) {
        match self.workspace.orchestrator().auto_compile_if_changed().await {
            Ok(result) if !result.compiled => debug!("compile"; "sources unchanged, skipped"),
            Ok(_) => {}
            // the running compile may predate the edit; try again after it
            Err(CompileError::Busy) => {
                debug!("compile"; "busy, rescheduling");
                self.schedule();
            }
            Err(e) => log!("compile"; "{}", e),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::compiler::CompileState;
    use crate::config::test_config_at;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const QUIET: Duration = Duration::from_millis(200);

    fn scheduler(root: &Path) -> Arc<CompileScheduler> {
        let mut config = test_config_at(root);
        config.compile.command = vec![
            "sh".into(),
            "-c".into(),
            "echo run >> runs.log; echo PDF > {outdir}/{stem}.pdf".into(),
        ];
        let workspace = Arc::new(Workspace::from_config(&config));
        CompileScheduler::new(workspace, Handle::current(), QUIET)
    }

    fn runs(root: &Path) -> usize {
        fs::read_to_string(root.join("runs.log"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    async fn wait_for_runs(root: &Path, expected: usize) {
        for _ in 0..100 {
            if runs(root) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_burst_collapses_into_one_compile() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.tex"), "x").unwrap();
        let scheduler = scheduler(temp.path());

        for _ in 0..5 {
            scheduler.schedule();
            tokio::time::sleep(QUIET / 4).await;
        }
        assert!(scheduler.is_pending());
        assert_eq!(runs(temp.path()), 0);

        wait_for_runs(temp.path(), 1).await;
        tokio::time::sleep(QUIET).await;
        assert_eq!(runs(temp.path()), 1);
        assert_eq!(
            scheduler.workspace.orchestrator().status().state,
            CompileState::Success
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancel_drops_pending() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.tex"), "x").unwrap();
        let scheduler = scheduler(temp.path());

        scheduler.schedule();
        scheduler.cancel();
        assert!(!scheduler.is_pending());

        tokio::time::sleep(QUIET * 3).await;
        assert_eq!(runs(temp.path()), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unchanged_sources_not_recompiled() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.tex"), "x").unwrap();
        let scheduler = scheduler(temp.path());

        scheduler.schedule();
        wait_for_runs(temp.path(), 1).await;
        tokio::time::sleep(QUIET).await;

        scheduler.schedule();
        tokio::time::sleep(QUIET * 3).await;
        assert_eq!(runs(temp.path()), 1);
    }
}
