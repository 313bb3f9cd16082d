//! Cross-origin policy
//!
//! Every origin, method and header is allowed, with credentials. Browsers reject
//! a literal `*` next to `Allow-Credentials`, so a request's `Origin` is echoed back.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Method, Response, StatusCode};

const ALLOW_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const PREFLIGHT_MAX_AGE: &str = "600";

/// True for a CORS preflight (`OPTIONS` with `Access-Control-Request-Method`)
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Add the common CORS headers to a response
pub fn apply_cors<B>(resp: &mut Response<B>, origin: Option<&HeaderValue>) {
    let headers = resp.headers_mut();
    match origin {
        Some(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
        None => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }
    }
}

/// Build the answer to a preflight request
pub fn build_preflight_response(request_headers: &HeaderMap) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from_static(b"OK")));
    *resp.status_mut() = StatusCode::OK;

    let headers = resp.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );
    if let Some(requested) = request_headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }

    apply_cors(&mut resp, request_headers.get(header::ORIGIN));
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_without_origin() {
        let mut resp = Response::new(());
        apply_cors(&mut resp, None);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert!(!resp.headers().contains_key("access-control-allow-credentials"));
    }

    #[test]
    fn test_origin_echoed_with_credentials() {
        let mut resp = Response::new(());
        let origin = HeaderValue::from_static("https://app.example.com");
        apply_cors(&mut resp, Some(&origin));
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "https://app.example.com"
        );
        assert_eq!(resp.headers()["access-control-allow-credentials"], "true");
        assert_eq!(resp.headers()["vary"], "Origin");
    }

    #[test]
    fn test_preflight_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_preflight(&Method::OPTIONS, &headers));
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        );
        assert!(is_preflight(&Method::OPTIONS, &headers));
        assert!(!is_preflight(&Method::POST, &headers));
    }

    #[test]
    fn test_preflight_echoes_requested_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"));
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        );
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("content-type, x-trace"),
        );

        let resp = build_preflight_response(&headers);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["access-control-allow-headers"], "content-type, x-trace");
        assert_eq!(resp.headers()["access-control-allow-methods"], ALLOW_METHODS);
        assert_eq!(resp.headers()["access-control-max-age"], "600");
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
    }
}
