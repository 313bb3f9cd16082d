//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: preflight, body limits, route
//! matching, then the common CORS/Server headers and the access line.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response};

use super::{contact, diagnostic, general};
use crate::config::AppState;
use crate::http;
use crate::logger;

/// Main entry point for HTTP request handling
///
/// Generic over the body so tests can drive it with an in-memory `Full<Bytes>`.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let origin = req.headers().get(header::ORIGIN).cloned();

    let mut resp = route_request(req, &state, &method, &path).await;

    http::apply_cors(&mut resp, origin.as_ref());
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        resp.headers_mut().insert(header::SERVER, server);
    }

    if state.access_log_enabled() {
        logger::log_request(method.as_str(), &path, resp.status().as_u16(), started.elapsed());
    }
    Ok(resp)
}

async fn route_request<B>(
    req: Request<B>,
    state: &Arc<AppState>,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if http::is_preflight(method, req.headers()) {
        return http::build_preflight_response(req.headers());
    }

    match (method, path) {
        (&Method::GET, "/") => general::root(),
        (&Method::GET, "/api/hello") => general::hello(),
        (&Method::GET, "/test") => diagnostic::handle_diagnostic(state).await,
        (&Method::POST, "/api/contact") => match read_body(req, state.config.http.max_body_size).await {
            Ok(body) => contact::handle_contact(&body, state).await,
            Err(resp) => resp,
        },
        (_, "/" | "/api/hello" | "/test") => http::build_405_response("GET"),
        (_, "/api/contact") => http::build_405_response("POST"),
        _ => http::build_404_response(),
    }
}

/// Collect the request body, refusing anything above `max_body_size`
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return Err(resp);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("Failed to read request body"))
        }
    }
}

/// Validate Content-Length header against max body size
/// Returns Some(413 response) if too large, None otherwise
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(header::CONTENT_LENGTH)?;
    match content_length.to_str().ok()?.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        _ => None,
    }
}
