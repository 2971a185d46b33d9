//! One-shot compile.

use anyhow::{Context, Result, bail};

use crate::config::PreviewConfig;
use crate::freshness::{get_mtime, needs_recompile};
use crate::log;
use crate::workspace::Workspace;

/// Compile the workspace once.
///
/// Without `force` the compile is skipped when the published artifact is
/// newer than every tracked source.
pub fn compile_once(config: &PreviewConfig, force: bool) -> Result<()> {
    let workspace = Workspace::from_config(config);
    let orchestrator = workspace.orchestrator();

    if !force && artifact_is_fresh(&workspace)? {
        log!("compile"; "{} is up to date", orchestrator.artifact().file_name());
        return Ok(());
    }

    orchestrator.probe_compiler();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let outcome = runtime.block_on(orchestrator.compile())?;
    if !outcome.success {
        bail!("compile of {} failed", orchestrator.main());
    }
    log!("compile"; "wrote {}", orchestrator.artifact().path().display());
    Ok(())
}

fn artifact_is_fresh(workspace: &Workspace) -> Result<bool> {
    let Some(built) = get_mtime(workspace.orchestrator().artifact().path()) else {
        return Ok(false);
    };
    let sources = workspace.store().tracked_paths()?;
    Ok(!needs_recompile(&sources, Some(built)))
}
