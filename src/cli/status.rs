//! Workspace overview: tracked files, artifact and compiler.

use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::config::PreviewConfig;
use crate::freshness::{get_mtime, needs_recompile};
use crate::utils::exec::find_program;
use crate::utils::time::to_millis;
use crate::workspace::Workspace;

#[derive(Debug, Serialize)]
struct StatusReport {
    root: PathBuf,
    main: String,
    files: Vec<String>,
    artifact: PathBuf,
    artifact_available: bool,
    /// Milliseconds since the epoch, `0` without an artifact.
    artifact_modified: u64,
    /// Whether some tracked file is newer than the artifact.
    stale: bool,
    compiler: Option<String>,
    compiler_path: Option<PathBuf>,
}

pub fn show_status(config: &PreviewConfig, json: bool) -> Result<()> {
    let report = collect(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn collect(config: &PreviewConfig) -> Result<StatusReport> {
    let workspace = Workspace::from_config(config);
    let store = workspace.store();
    let artifact = workspace.orchestrator().artifact();

    let built = get_mtime(artifact.path());
    let stale = needs_recompile(&store.tracked_paths()?, built);
    let compiler = config.compile.program().map(str::to_string);

    Ok(StatusReport {
        root: store.root().to_path_buf(),
        main: config.workspace.main.clone(),
        files: store.list_tracked()?,
        artifact: artifact.path().to_path_buf(),
        artifact_available: built.is_some(),
        artifact_modified: built.map(to_millis).unwrap_or(0),
        stale,
        compiler_path: compiler.as_deref().and_then(find_program),
        compiler,
    })
}

fn print_report(report: &StatusReport) {
    println!("{} {}", "workspace".bold(), report.root.display());
    if report.files.is_empty() {
        println!("  {}", "no tracked files".dimmed());
    }
    for file in &report.files {
        let marker = if *file == report.main { "*" } else { " " };
        println!("  {marker} {file}");
    }

    let artifact = report.artifact.display();
    match (report.artifact_available, report.stale) {
        (false, _) => println!("{} {} {}", "artifact".bold(), artifact, "(missing)".red()),
        (true, true) => println!("{} {} {}", "artifact".bold(), artifact, "(stale)".yellow()),
        (true, false) => println!("{} {} {}", "artifact".bold(), artifact, "(up to date)".green()),
    }

    match (&report.compiler, &report.compiler_path) {
        (Some(_), Some(path)) => println!("{} {}", "compiler".bold(), path.display()),
        (Some(name), None) => {
            println!("{} {} {}", "compiler".bold(), name, "(not found on PATH)".red())
        }
        (None, _) => println!("{} {}", "compiler".bold(), "(not configured)".red()),
    }
}
