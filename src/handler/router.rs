//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for request validation,
//! route matching, dispatching, and access logging.

use crate::api::{self, ApiRoute};
use crate::config::{AppState, RoutesConfig};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// No endpoint reads a request body, so the body is dropped up front and any
/// body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
{
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = &parts.method;

    // 1. Check body size
    let mut response = if let Some(resp) =
        check_body_size(&parts.headers, state.config.http.max_body_size)
    {
        resp
    } else {
        // 2. Log headers if enabled
        logger::log_headers_count(parts.headers.len(), state.config.logging.show_headers);

        let ctx = RequestContext {
            method,
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: *method == Method::HEAD,
            if_none_match: header_string(&parts.headers, "if-none-match"),
        };

        // 3. Dispatch
        route_request(&ctx, &state).await
    };

    apply_common_headers(&mut response, &state);

    if state.config.logging.access_log {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request based on path and configuration
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let routes: &RoutesConfig = &state.config.routes;

    // 0. Preflight
    if *ctx.method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // 1. Health check endpoints
    if routes.health.enabled
        && (ctx.path == routes.health.liveness_path || ctx.path == routes.health.readiness_path)
    {
        return http::build_health_response("ok");
    }

    // 2. Root redirects to the front-end
    if ctx.path == "/" {
        return if is_read_method(ctx.method) {
            http::build_redirect_response(&routes.index_page)
        } else {
            api::method_not_allowed("GET, HEAD")
        };
    }

    // 3. Activity API
    if let Some(route) = ApiRoute::parse(ctx.path) {
        return api::handle_activities(route, ctx.method, ctx.query, state).await;
    }

    // 4. Static files
    if is_static_path(ctx.path, &routes.static_prefix) {
        if !is_read_method(ctx.method) {
            return api::method_not_allowed("GET, HEAD");
        }
        return static_files::serve_directory(ctx, &routes.static_dir, &routes.static_prefix)
            .await;
    }

    api::not_found()
}

fn is_read_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

fn is_static_path(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Attach `Server` and, when enabled, CORS headers
fn apply_common_headers(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    match HeaderValue::from_str(&state.config.http.server_name) {
        Ok(value) => {
            headers.insert("Server", value);
        }
        Err(e) => logger::log_warning(&format!("Invalid server_name header value: {e}")),
    }
    if state.config.http.enable_cors && !headers.contains_key("Access-Control-Allow-Origin") {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn log_access(
    parts: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = http_version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
        .unwrap_or(usize::MAX);
    entry.referer = header_string(&parts.headers, "referer");
    entry.user_agent = header_string(&parts.headers, "user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

const fn http_version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
