//! The compile state machine.
//!
//! ```text
//! Idle ──compile()──► Compiling ──┬──► Success
//!   ▲                             └──► Error
//!   └─ Success / Error accept the next compile()
//! ```
//!
//! A request arriving while `Compiling` is refused with
//! [`CompileError::Busy`] and leaves the status untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use super::{ArtifactStore, CompileError, CompileStatus};
use crate::config::{CompileConfig, WorkspaceConfig};
use crate::freshness::needs_recompile;
use crate::utils::exec::{Cmd, find_program};
use crate::utils::time::duration_millis;
use crate::workspace::SourceStore;
use crate::{debug, log, logger};

/// Capacity of the status broadcast; slow subscribers skip stale updates.
const EVENT_CAPACITY: usize = 16;

/// Result of one compile that was allowed to run.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub status: CompileStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutoCompileResult {
    pub compiled: bool,
    #[serde(flatten)]
    pub result: Option<CompileOutcome>,
}

pub struct Orchestrator {
    store: SourceStore,
    artifact: ArtifactStore,
    root: PathBuf,
    build_dir: PathBuf,
    main: String,
    stem: String,
    artifact_ext: String,
    command: Vec<String>,
    timeout: Duration,
    status: Mutex<CompileStatus>,
    events: broadcast::Sender<CompileStatus>,
}

impl Orchestrator {
    pub fn new(store: SourceStore, workspace: &WorkspaceConfig, compile: &CompileConfig) -> Self {
        let state_dir = workspace.state_path();
        let stem = workspace.main_stem().to_string();
        let artifact = ArtifactStore::new(
            state_dir.join(format!("{stem}.{}", compile.artifact_ext)),
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            store,
            artifact,
            root: workspace.root.clone(),
            build_dir: state_dir.join("build"),
            main: workspace.main.clone(),
            stem,
            artifact_ext: compile.artifact_ext.clone(),
            command: compile.command.clone(),
            timeout: compile.timeout(),
            status: Mutex::new(CompileStatus::default()),
            events,
        }
    }

    pub fn artifact(&self) -> &ArtifactStore {
        &self.artifact
    }

    pub fn store(&self) -> &SourceStore {
        &self.store
    }

    pub fn main(&self) -> &str {
        &self.main
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> CompileStatus {
        self.status.lock().clone()
    }

    /// Receive a status snapshot after every terminal transition.
    pub fn subscribe(&self) -> broadcast::Receiver<CompileStatus> {
        self.events.subscribe()
    }

    /// Warn early when the configured compiler is not on `PATH`.
    ///
    /// Compiles still run (and fail with a clear message) so the server can
    /// serve the workspace without a TeX installation.
    pub fn probe_compiler(&self) -> bool {
        let Some(program) = self.command.first() else {
            return false;
        };
        match find_program(program) {
            Some(path) => {
                debug!("compile"; "using {}", path.display());
                true
            }
            None => {
                log!("warning"; "`{}` not found on PATH, compiles will fail", program);
                false
            }
        }
    }

    /// Run the compiler once.
    ///
    /// Returns `Err(Busy)` if a compile is already running; every other
    /// failure is recorded in the status and reported through the outcome.
    pub async fn compile(&self) -> Result<CompileOutcome, CompileError> {
        self.begin()?;
        let mut guard = CompilingGuard {
            status: &self.status,
            events: &self.events,
            armed: true,
        };

        let started = SystemTime::now();
        let clock = Instant::now();
        let result = self.run().await;
        let elapsed = clock.elapsed();
        guard.disarm();

        let outcome = match result {
            Ok(()) => {
                let status = self.finish(|s| s.succeed(started));
                logger::status_compiled(&self.main, elapsed);
                CompileOutcome {
                    success: true,
                    error: None,
                    elapsed_ms: duration_millis(elapsed),
                    status,
                }
            }
            Err(err) => {
                let message = err.to_string();
                let status = self.finish(|s| s.fail(message.clone()));
                logger::status_failed(&format!("compile of {} failed", self.main), &message);
                CompileOutcome {
                    success: false,
                    error: Some(message),
                    elapsed_ms: duration_millis(elapsed),
                    status,
                }
            }
        };
        Ok(outcome)
    }

    /// Compile only if a tracked file changed after the watermark.
    pub async fn auto_compile_if_changed(&self) -> Result<AutoCompileResult, CompileError> {
        let paths = self.store.tracked_paths().unwrap_or_else(|e| {
            debug!("compile"; "listing sources failed: {}", e);
            Vec::new()
        });
        let watermark = self.status.lock().last_success;

        if !needs_recompile(&paths, watermark) {
            logger::status_unchanged("sources unchanged");
            return Ok(AutoCompileResult {
                compiled: false,
                result: None,
            });
        }

        let outcome = self.compile().await?;
        Ok(AutoCompileResult {
            compiled: true,
            result: Some(outcome),
        })
    }

    /// Check-and-set under the status lock: the gate for one in-flight compile.
    fn begin(&self) -> Result<(), CompileError> {
        let mut status = self.status.lock();
        if status.is_compiling() {
            debug!("compile"; "busy, request dropped");
            return Err(CompileError::Busy);
        }
        status.begin();
        Ok(())
    }

    fn finish(&self, apply: impl FnOnce(&mut CompileStatus)) -> CompileStatus {
        let snapshot = {
            let mut status = self.status.lock();
            apply(&mut status);
            status.clone()
        };
        let _ = self.events.send(snapshot.clone());
        snapshot
    }

    async fn run(&self) -> Result<(), CompileError> {
        fs::create_dir_all(&self.build_dir).map_err(|source| CompileError::Io {
            path: self.build_dir.clone(),
            source,
        })?;

        let built = self.build_dir.join(format!("{}.{}", self.stem, self.artifact_ext));
        match fs::remove_file(&built) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                return Err(CompileError::Io {
                    path: built,
                    source: e,
                });
            }
            _ => {}
        }

        let args: Vec<String> = self.command.iter().map(|arg| self.expand(arg)).collect();
        let cmd = Cmd::from_slice(&args).ok_or(CompileError::NoCommand)?;
        debug!("compile"; "{}", args.join(" "));

        let output = cmd.cwd(&self.root).timeout(self.timeout).run().await?;
        if !output.success() {
            let diagnostic = output.diagnostic();
            if diagnostic.trim().is_empty() {
                return Err(CompileError::Failed(format!(
                    "compiler exited with {}",
                    output.status
                )));
            }
            return Err(CompileError::Failed(diagnostic));
        }

        let produced = fs::metadata(&built).is_ok_and(|m| m.is_file() && m.len() > 0);
        if !produced {
            return Err(CompileError::ArtifactMissing);
        }
        self.artifact.publish(&built)?;
        Ok(())
    }

    /// Substitute `{main}`, `{stem}` and `{outdir}` in one template argument.
    fn expand(&self, arg: &str) -> String {
        arg.replace("{main}", &self.main)
            .replace("{stem}", &self.stem)
            .replace("{outdir}", &self.build_dir.to_string_lossy())
    }
}

/// Lands the state in `Error` if a compile future is dropped mid-flight.
///
/// Disarmed once the compile future has produced a result; only fires on
/// cancellation or panic.
struct CompilingGuard<'a> {
    status: &'a Mutex<CompileStatus>,
    events: &'a broadcast::Sender<CompileStatus>,
    armed: bool,
}

impl CompilingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CompilingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut status = self.status.lock();
        if status.is_compiling() {
            status.fail("compilation interrupted");
            let _ = self.events.send(status.clone());
        }
    }
}
