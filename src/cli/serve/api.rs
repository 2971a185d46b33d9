//! JSON API.
//!
//! | Method | Path                        | Handler                      |
//! |--------|-----------------------------|------------------------------|
//! | GET    | /api/status                 | status, files, artifact flag |
//! | POST   | /api/compile                | compile now                  |
//! | POST   | /api/compile/auto           | compile if sources changed   |
//! | GET    | /api/artifact[/download]    | artifact bytes               |
//! | GET    | /api/files/{name}           | read source                  |
//! | PUT    | /api/files/{name}           | save source                  |
//! | GET    | /api/files/{name}/backup    | content before last save     |
//! | POST   | /api/correlate/click        | click outcome                |
//! | POST   | /api/correlate/repeat       | re-issue last jump           |
//! | GET    | /api/correlate/lookup?text= | raw index lookup             |
//! | GET    | /api/correlate/mode         | current mode                 |
//! | PUT    | /api/correlate/mode         | switch mode                  |
//! | GET    | /api/correlate/index        | whole index                  |
//!
//! Errors are `{"error": message, "kind": class}`.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tiny_http::Method;

use super::ServeContext;
use crate::compiler::{CompileOutcome, CompileStatus};
use crate::core::{Classify, ErrorClass};
use crate::correlate::{ClickOutcome, InteractionMode};
use crate::utils::path::decode_segment;
use crate::{debug, log};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Status,
    Compile,
    AutoCompile,
    Artifact { download: bool },
    ReadFile(String),
    SaveFile(String),
    Backup(String),
    Click,
    Repeat,
    Lookup,
    Mode,
    SetMode,
    Index,
}

/// Match an `/api/...` path (query already stripped).
pub fn parse_route(method: &Method, path: &str) -> Option<Route> {
    let rest = path.strip_prefix("/api/")?.trim_end_matches('/');
    let segments: Vec<&str> = rest.split('/').collect();

    let route = match (method, segments.as_slice()) {
        (Method::Get, ["status"]) => Route::Status,
        (Method::Post, ["compile"]) => Route::Compile,
        (Method::Post, ["compile", "auto"]) => Route::AutoCompile,
        (Method::Get, ["artifact"]) => Route::Artifact { download: false },
        (Method::Get, ["artifact", "download"]) => Route::Artifact { download: true },
        (Method::Get, ["files", name]) => Route::ReadFile(decode_segment(name)?),
        (Method::Put, ["files", name]) => Route::SaveFile(decode_segment(name)?),
        (Method::Get, ["files", name, "backup"]) => Route::Backup(decode_segment(name)?),
        (Method::Post, ["correlate", "click"]) => Route::Click,
        (Method::Post, ["correlate", "repeat"]) => Route::Repeat,
        (Method::Get, ["correlate", "lookup"]) => Route::Lookup,
        (Method::Get, ["correlate", "mode"]) => Route::Mode,
        (Method::Put, ["correlate", "mode"]) => Route::SetMode,
        (Method::Get, ["correlate", "index"]) => Route::Index,
        _ => return None,
    };
    Some(route)
}

/// What to send back.
#[derive(Debug)]
pub enum Reply {
    Json(u16, Value),
    Artifact {
        bytes: Vec<u8>,
        file_name: String,
        attachment: bool,
    },
}

impl Reply {
    fn ok<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        Self::with_status(200, value)
    }

    fn with_status<T: Serialize>(status: u16, value: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value).map_err(ApiError::internal)?;
        Ok(Self::Json(status, value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub kind: ErrorClass,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, message)
    }

    pub fn internal(err: impl Display) -> Self {
        log!("error"; "{}", err);
        Self::new(ErrorClass::Internal, "internal error, see server log")
    }

    fn new(kind: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            status: kind.status_code(),
            kind,
            message: message.into(),
        }
    }

    pub fn body(&self) -> Value {
        json!({ "error": self.message, "kind": self.kind })
    }
}

impl<E: Classify + Display> From<E> for ApiError {
    fn from(err: E) -> Self {
        match err.class() {
            ErrorClass::Internal => log!("error"; "{}", err),
            ErrorClass::NotFound => debug!("serve"; "{}", err),
            _ => {}
        }
        Self {
            status: err.status_code(),
            kind: err.class(),
            message: err.public_message(),
        }
    }
}

#[derive(Deserialize)]
struct SaveBody {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ClickBody {
    text: String,
}

#[derive(Deserialize)]
struct ModeBody {
    mode: InteractionMode,
}

#[derive(Serialize)]
struct StatusReply<'a> {
    #[serde(flatten)]
    status: CompileStatus,
    main: &'a str,
    files: Vec<String>,
    artifact_available: bool,
    mode: InteractionMode,
    index_entries: usize,
}

pub fn handle(ctx: &ServeContext, route: Route, query: &str, body: &str) -> Result<Reply, ApiError> {
    let workspace = &ctx.workspace;
    let orchestrator = workspace.orchestrator();
    let controller = workspace.controller();

    match route {
        Route::Status => Reply::ok(&StatusReply {
            status: orchestrator.status(),
            main: orchestrator.main(),
            files: workspace.store().list_tracked()?,
            artifact_available: orchestrator.artifact().exists(),
            mode: controller.mode(),
            index_entries: controller.index().len(),
        }),

        Route::Compile => {
            let outcome = ctx.runtime.block_on(orchestrator.compile())?;
            compile_reply(&outcome, json!({}))
        }

        Route::AutoCompile => {
            let result = ctx.runtime.block_on(orchestrator.auto_compile_if_changed())?;
            match &result.result {
                Some(outcome) => compile_reply(outcome, json!({ "compiled": true })),
                None => Reply::ok(&result),
            }
        }

        Route::Artifact { download } => {
            let artifact = orchestrator.artifact().get()?;
            Ok(Reply::Artifact {
                bytes: artifact.bytes,
                file_name: orchestrator.artifact().file_name(),
                attachment: download,
            })
        }

        Route::ReadFile(name) => {
            let file = workspace.store().read(&name)?;
            controller.set_open_file(&file.name);
            Reply::ok(&file)
        }

        Route::SaveFile(name) => {
            let body: SaveBody = parse_body(body)?;
            let content = body
                .content
                .ok_or_else(|| ApiError::bad_request("no content provided"))?;
            let file = workspace.save(&name, &content)?;
            ctx.scheduler.schedule();
            Reply::ok(&json!({
                "success": true,
                "name": file.name,
                "modified": crate::utils::time::to_millis(file.modified),
            }))
        }

        Route::Backup(name) => {
            let content = workspace.store().read_backup(&name)?;
            Reply::ok(&json!({ "name": name, "content": content }))
        }

        Route::Click => {
            let body: ClickBody = parse_body(body)?;
            Reply::ok(&controller.click(&body.text))
        }

        Route::Repeat => match controller.repeat_jump() {
            Some(effects) => Reply::ok(&ClickOutcome::Jump(effects)),
            None => Err(ApiError::not_found("no previous jump")),
        },

        Route::Lookup => {
            let text = query_param(query, "text")
                .ok_or_else(|| ApiError::bad_request("missing `text` parameter"))?;
            match controller.lookup(&text) {
                Some(location) => Reply::ok(&location),
                None => Err(ApiError::not_found(format!("no source for `{text}`"))),
            }
        }

        Route::Mode => Reply::ok(&json!({ "mode": controller.mode() })),

        Route::SetMode => {
            let body: ModeBody = parse_body(body)?;
            controller.set_mode(body.mode);
            Reply::ok(&json!({ "mode": body.mode }))
        }

        Route::Index => {
            let index = controller.index();
            Reply::ok(&json!({ "len": index.len(), "entries": index.sorted() }))
        }
    }
}

/// 200 on success; 422 with the outcome and an error class on failure.
fn compile_reply(outcome: &CompileOutcome, extra: Value) -> Result<Reply, ApiError> {
    let mut value = serde_json::to_value(outcome).map_err(ApiError::internal)?;
    if let (Value::Object(map), Value::Object(extra)) = (&mut value, extra) {
        map.extend(extra);
        if !outcome.success {
            map.insert("kind".into(), json!(ErrorClass::CompileFailure));
        }
    }
    let status = if outcome.success {
        200
    } else {
        ErrorClass::CompileFailure.status_code()
    };
    Reply::with_status(status, &value)
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::bad_request("missing request body"));
    }
    serde_json::from_str(body).map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
}

fn query_param(query: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
