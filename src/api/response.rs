// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::types::ErrorResponse;
use crate::http::cache::CachePolicy;
use crate::logger;

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(
                    r#"{"detail":"Internal Server Error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", CachePolicy::NoStore.to_header_value())
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// `{"detail": ...}` error response
pub fn detail_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    json_response(status, &ErrorResponse::new(detail))
}

/// 404 Not Found response
pub fn not_found() -> Response<Full<Bytes>> {
    detail_response(StatusCode::NOT_FOUND, "Not Found")
}

/// 405 Method Not Allowed response with the route's `Allow` header
pub fn method_not_allowed(allow: &'static str) -> Response<Full<Bytes>> {
    let mut resp = detail_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    resp.headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static(allow));
    resp
}

/// 422 response for a missing required query parameter
pub fn missing_query_param(name: &str) -> Response<Full<Bytes>> {
    detail_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        &format!("Missing required query parameter: {name}"),
    )
}
