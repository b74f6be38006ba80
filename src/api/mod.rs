// API module entry
// JSON endpoints over the activity registry

mod handlers;
mod response;
pub mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use crate::config::AppState;
use crate::http::decode_path_segment;

// Re-export public types
pub use response::*;

/// Path prefix owned by this module
pub const ACTIVITIES_PATH: &str = "/activities";

/// A request path resolved against the activity routes
#[derive(Debug, PartialEq, Eq)]
pub enum ApiRoute {
    List,
    Signup(String),
    Unregister(String),
    /// Under `/activities` but matches no route
    Unknown,
}

impl ApiRoute {
    /// Resolve `path`; `None` when the path is outside `/activities`.
    ///
    /// The activity name segment is percent-decoded here.
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix(ACTIVITIES_PATH)?;
        if rest.is_empty() {
            return Some(Self::List);
        }
        let rest = rest.strip_prefix('/')?;

        let Some((raw_name, action)) = rest.split_once('/') else {
            return Some(Self::Unknown);
        };
        if raw_name.is_empty() {
            return Some(Self::Unknown);
        }
        let Some(name) = decode_path_segment(raw_name) else {
            return Some(Self::Unknown);
        };

        Some(match action {
            "signup" => Self::Signup(name),
            "unregister" => Self::Unregister(name),
            _ => Self::Unknown,
        })
    }

    const fn allowed_methods(&self) -> &'static str {
        match self {
            Self::List => "GET, HEAD",
            Self::Signup(_) => "POST",
            Self::Unregister(_) => "DELETE",
            Self::Unknown => "",
        }
    }
}

/// API route handler
///
/// Dispatches an already-parsed route based on request method
pub async fn handle_activities(
    route: ApiRoute,
    method: &Method,
    query: Option<&str>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    match (method, &route) {
        (&Method::GET | &Method::HEAD, ApiRoute::List) => handlers::list_activities(state).await,
        (&Method::POST, ApiRoute::Signup(name)) => handlers::signup(state, name, query).await,
        (&Method::DELETE, ApiRoute::Unregister(name)) => {
            handlers::unregister(state, name, query).await
        }
        (_, ApiRoute::Unknown) => not_found(),
        _ => method_not_allowed(route.allowed_methods()),
    }
}
