//! Preview server: JSON API, optional static frontend, live push.
//!
//! ```text
//! tiny_http ─► rayon pool ─► api::handle ─► Workspace (block_on runtime for compiles)
//!                                   └─► CompileScheduler (debounced)
//! notify ─► FileWatcher ──────────────────┘
//! Orchestrator / index events ─► LiveChannel ─► WebSocket clients
//! ```

mod api;
mod lifecycle;
mod response;
mod ws;


use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Method, Request, Server};
use tokio::runtime::Handle;

use crate::config::PreviewConfig;
use crate::core::register_server;
use crate::watch::{CompileScheduler, FileWatcher};
use crate::workspace::Workspace;
use crate::{debug, log};
use api::{ApiError, Reply};
use ws::LiveChannel;

/// Largest accepted request body.
const MAX_BODY: u64 = 4 * 1024 * 1024;

/// Request threads.
const POOL_THREADS: usize = 4;

/// Everything a request handler needs.
pub struct ServeContext {
    pub workspace: Arc<Workspace>,
    pub scheduler: Arc<CompileScheduler>,
    pub runtime: Handle,
    pub frontend: Option<PathBuf>,
}

/// Start the preview server and block until Ctrl+C.
pub fn serve(config: &PreviewConfig) -> Result<()> {
    let runtime = lifecycle::build_runtime()?;
    let workspace = Arc::new(Workspace::from_config(config));

    workspace.orchestrator().probe_compiler();
    match workspace.rebuild_index() {
        Ok(len) => debug!("correlate"; "index: {} entries", len),
        Err(e) => log!("correlate"; "initial index failed: {}", e),
    }

    let scheduler = CompileScheduler::new(
        Arc::clone(&workspace),
        runtime.handle().clone(),
        config.compile.debounce(),
    );

    if config.serve.watch {
        match FileWatcher::new(Arc::clone(&workspace), Arc::clone(&scheduler)) {
            Ok(watcher) => {
                runtime.spawn(watcher.run());
                debug!("watch"; "{}", workspace.store().root().display());
            }
            Err(e) => log!("watch"; "watcher failed: {}", e),
        }
    }

    if config.serve.ws_port != 0 {
        let live = LiveChannel::default();
        match live.start(config.serve.interface, config.serve.ws_port) {
            Ok(port) => {
                log!("ws"; "ws://{}:{}", config.serve.interface, port);
                runtime.spawn(live.forward(Arc::clone(&workspace)));
            }
            Err(e) => log!("ws"; "live push disabled: {}", e),
        }
    }

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));
    log!("serve"; "http://{}", addr);

    // first compile right away instead of after the quiet period
    {
        let workspace = Arc::clone(&workspace);
        runtime.spawn(async move {
            let _ = workspace.orchestrator().auto_compile_if_changed().await;
        });
    }

    let ctx = Arc::new(ServeContext {
        workspace,
        scheduler: Arc::clone(&scheduler),
        runtime: runtime.handle().clone(),
        frontend: config.serve.frontend.clone(),
    });
    run_request_loop(&server, &ctx)?;

    scheduler.cancel();
    lifecycle::shutdown_runtime(runtime);
    Ok(())
}

fn run_request_loop(server: &Server, ctx: &Arc<ServeContext>) -> Result<()> {
    // compiles block a worker for their whole run; keep other requests moving
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_THREADS)
        .thread_name(|i| format!("texpane-http-{i}"))
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let ctx = Arc::clone(ctx);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

fn handle_request(mut request: Request, ctx: &ServeContext) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }
    if request.method() == &Method::Options {
        return response::respond_preflight(request);
    }

    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    debug!("serve"; "{} {}", request.method(), path);

    if path == "/api" || path.starts_with("/api/") {
        let Some(route) = api::parse_route(request.method(), path) else {
            return response::respond_error(request, &ApiError::not_found("no such endpoint"));
        };
        let body = match read_body(&mut request) {
            Ok(body) => body,
            Err(e) => return response::respond_error(request, &e),
        };
        return match api::handle(ctx, route, query, &body) {
            Ok(Reply::Json(status, value)) => response::respond_json(request, status, &value),
            Ok(Reply::Artifact {
                bytes,
                file_name,
                attachment,
            }) => response::respond_artifact(request, bytes, &file_name, attachment),
            Err(e) => response::respond_error(request, &e),
        };
    }

    match resolve_frontend(ctx, path) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}

fn read_body(request: &mut Request) -> Result<String, ApiError> {
    read_limited(request.as_reader(), MAX_BODY)
}

/// Read at most `limit` bytes of UTF-8; anything longer is rejected whole.
fn read_limited(reader: impl Read, limit: u64) -> Result<String, ApiError> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| ApiError::bad_request(format!("failed to read request body: {e}")))?;
    if bytes.len() as u64 > limit {
        return Err(ApiError::bad_request(format!(
            "request body too large (limit {} MiB)",
            limit / (1024 * 1024)
        )));
    }
    String::from_utf8(bytes).map_err(|_| ApiError::bad_request("request body must be UTF-8 text"))
}

/// Map a request path to a file of the frontend directory (`/` → index.html).
fn resolve_frontend(ctx: &ServeContext, path: &str) -> Option<PathBuf> {
    let root = ctx.frontend.as_deref()?;
    let mut file = crate::utils::path::safe_join(root, path)?;
    if file.is_dir() {
        file.push("index.html");
    }
    file.is_file().then_some(file)
}
