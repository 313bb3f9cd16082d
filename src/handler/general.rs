// Fixed-payload endpoints

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::http::json_response;

pub const ROOT_MESSAGE: &str = "Energy Management API running";
pub const HELLO_MESSAGE: &str = "Hello from the backend API!";

/// GET /
pub fn root() -> Response<Full<Bytes>> {
    message(ROOT_MESSAGE)
}

/// GET /api/hello
pub fn hello() -> Response<Full<Bytes>> {
    message(HELLO_MESSAGE)
}

fn message(text: &str) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({ "message": text }))
}
