//! HTTP response helpers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::api::ApiError;
use crate::utils::mime::types::{JSON, PLAIN};

/// Serialize `value` and send it with `status`.
pub fn respond_json<T: Serialize>(request: Request, status: u16, value: &T) -> Result<()> {
    let body = serde_json::to_vec(value).context("Failed to serialize response")?;
    send_body(request, status, JSON, body, &[])
}

pub fn respond_error(request: Request, error: &ApiError) -> Result<()> {
    respond_json(request, error.status, &error.body())
}

/// Send the artifact, inline for the viewer or as a download.
pub fn respond_artifact(
    request: Request,
    bytes: Vec<u8>,
    file_name: &str,
    attachment: bool,
) -> Result<()> {
    let content_type = crate::utils::mime::from_path(Path::new(file_name));
    let disposition = format!(
        "{}; filename=\"{}\"",
        if attachment { "attachment" } else { "inline" },
        file_name.replace('"', "")
    );
    let disposition = Header::from_bytes("Content-Disposition", disposition.as_bytes())
        .map_err(|()| anyhow::anyhow!("invalid file name `{file_name}`"))?;
    send_body(request, 200, content_type, bytes, &[disposition])
}

/// Serve a frontend file. The editor is reloaded often during development,
/// so nothing is cached.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);

    if is_head_request(&request) {
        let response = Response::empty(StatusCode(200))
            .with_header(make_header("Content-Type", content_type));
        return request.respond(response).map_err(Into::into);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body, &[])
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec(), &[])
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec(), &[])
}

/// Answer a CORS preflight.
pub fn respond_preflight(request: Request) -> Result<()> {
    let response = Response::empty(StatusCode(204))
        .with_header(make_header("Access-Control-Allow-Origin", "*"))
        .with_header(make_header(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, OPTIONS",
        ))
        .with_header(make_header("Access-Control-Allow-Headers", "Content-Type"));
    request.respond(response)?;
    Ok(())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    extra: &[Header],
) -> Result<()> {
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-cache, no-store, must-revalidate"))
        .with_header(make_header("Pragma", "no-cache"))
        .with_header(make_header("Expires", "0"))
        .with_header(make_header("Access-Control-Allow-Origin", "*"));
    for header in extra {
        response.add_header(header.clone());
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
