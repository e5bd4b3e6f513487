//! HTTP response handlers.

use anyhow::Result;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{
    PLAYGROUND_CSS, PLAYGROUND_HTML, PLAYGROUND_JS, PageVars, PlaygroundVars,
};

mod mime {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
}

/// Respond with the playground page.
pub fn respond_page(request: Request) -> Result<()> {
    let body = PLAYGROUND_HTML.render(&PageVars {
        version: env!("CARGO_PKG_VERSION"),
    });
    send_body(request, 200, mime::HTML, body.into_bytes())
}

/// Respond with playground.js, wired to the live WebSocket port.
pub fn respond_script(request: Request, ws_port: u16) -> Result<()> {
    let body = PLAYGROUND_JS.render(&PlaygroundVars { ws_port });
    send_body(request, 200, mime::JAVASCRIPT, body.into_bytes())
}

pub fn respond_style(request: Request) -> Result<()> {
    send_body(request, 200, mime::CSS, PLAYGROUND_CSS.as_bytes().to_vec())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, mime::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, mime::PLAIN, b"503 Service Unavailable".to_vec())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    if is_head_request(&request) {
        let response = Response::empty(StatusCode(status))
            .with_header(make_header("Content-Type", content_type));
        request.respond(response)?;
        return Ok(());
    }

    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-store"));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
