//! HTTP response handlers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::content::maybe_inject_reload;
use crate::utils::mime::types::{HTML, JAVASCRIPT, PLAIN};

/// Respond with a file from disk.
///
/// HTML gets the reload client injected; stylesheets and scripts with a
/// sibling `.map` advertise it through a `SourceMap` header.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);
    let mut headers = vec![make_header("Content-Type", content_type)?];
    if let Some(map) = source_map_for(path) {
        headers.push(make_header("SourceMap", &map)?);
    }

    if is_head_request(&request) {
        return send(request, 200, headers, Vec::new());
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type);
    send(request, 200, headers, body)
}

/// Respond with the reload client, bound to the actual WebSocket port.
pub fn respond_reload_js(request: Request, ws_port: u16) -> Result<()> {
    use crate::embed::{RELOAD_JS, ReloadVars};

    let headers = vec![
        make_header("Content-Type", JAVASCRIPT)?,
        make_header("Cache-Control", "no-cache")?,
    ];
    let body = RELOAD_JS.render(&ReloadVars { ws_port });
    send(request, 200, headers, body.into_bytes())
}

/// Respond with `404.html` from the served root when present.
pub fn respond_not_found(request: Request, root: &Path) -> Result<()> {
    let custom = root.join("404.html");
    if custom.is_file()
        && let Ok(body) = fs::read(&custom)
    {
        let headers = vec![make_header("Content-Type", HTML)?];
        let body = if is_head_request(&request) {
            Vec::new()
        } else {
            maybe_inject_reload(body, HTML)
        };
        return send(request, 404, headers, body);
    }

    let headers = vec![make_header("Content-Type", PLAIN)?];
    send(request, 404, headers, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    let headers = vec![make_header("Content-Type", PLAIN)?];
    send(request, 503, headers, b"503 Service Unavailable".to_vec())
}

/// `SourceMap` header value for a `.css`/`.js` file with a sibling map.
fn source_map_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !matches!(ext, "css" | "js") {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let map = PathBuf::from(format!("{}.map", path.display()));
    map.is_file().then(|| format!("{name}.map"))
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send(request: Request, status: u16, headers: Vec<Header>, body: Vec<u8>) -> Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
