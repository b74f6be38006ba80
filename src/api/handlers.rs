// Activity endpoint handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::{detail_response, json_response, missing_query_param};
use super::types::MessageResponse;
use crate::config::AppState;
use crate::http::query_param;
use crate::logger;
use crate::registry::RegistryError;

/// `GET /activities`
pub async fn list_activities(state: &AppState) -> Response<Full<Bytes>> {
    let activities = state.registry.read().await.list_activities();
    json_response(StatusCode::OK, &activities)
}

/// `POST /activities/{activity_name}/signup?email=...`
pub async fn signup(
    state: &AppState,
    activity_name: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let Some(email) = query_param(query, "email") else {
        return missing_query_param("email");
    };

    let result = state.registry.write().await.signup(activity_name, &email);
    registry_result_response(result)
}

/// `DELETE /activities/{activity_name}/unregister?email=...`
pub async fn unregister(
    state: &AppState,
    activity_name: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let Some(email) = query_param(query, "email") else {
        return missing_query_param("email");
    };

    let result = state.registry.write().await.unregister(activity_name, &email);
    registry_result_response(result)
}

fn registry_result_response(result: Result<String, RegistryError>) -> Response<Full<Bytes>> {
    match result {
        Ok(message) => {
            logger::log_registry_change(&message);
            json_response(StatusCode::OK, &MessageResponse { message })
        }
        Err(e) => detail_response(e.status(), &e.detail()),
    }
}
