//! HTTP response building module
//!
//! JSON builders for every status the service returns.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return raw_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"detail":"Internal Server Error"}"#,
            );
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build `{"detail": ...}` error response
pub fn detail_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "detail": detail }))
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    detail_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let mut resp = detail_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    if let Ok(value) = allow.parse() {
        resp.headers_mut().insert(hyper::header::ALLOW, value);
    }
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    detail_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Build 400 response for an unreadable body
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    detail_response(StatusCode::BAD_REQUEST, message)
}

fn raw_json(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
