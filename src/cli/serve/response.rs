//! HTTP response helpers with cross-origin header injection.

use crate::utils::mime;
use anyhow::{Context, Result};
use std::{fs, io::Read, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Header set attached to every response: any origin may GET, preflights
/// succeed, nothing is cached between edits.
const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, OPTIONS"),
    ("Access-Control-Allow-Headers", "content-type"),
    ("Cache-Control", "no-store, no-cache, must-revalidate"),
];

/// Respond with a static file.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::content_type(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

/// Answer a preflight request: 200 with the fixed header set, no body.
pub fn respond_preflight(request: Request) -> Result<()> {
    let response = with_cors(Response::empty(StatusCode(200)));
    request.respond(response)?;
    Ok(())
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, mime::TEXT_PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 405 for anything other than GET/HEAD/OPTIONS.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send_body(
        request,
        405,
        mime::TEXT_PLAIN,
        b"405 Method Not Allowed".to_vec(),
    )
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = with_cors(
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type)),
    );
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = with_cors(
        Response::from_data(body)
            .with_status_code(StatusCode(status))
            .with_header(make_header("Content-Type", content_type)),
    );
    request.respond(response)?;
    Ok(())
}

/// Attach the fixed cross-origin header set to a response.
fn with_cors<R: Read>(mut response: Response<R>) -> Response<R> {
    for (key, value) in CORS_HEADERS {
        response = response.with_header(make_header(key, value));
    }
    response
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
