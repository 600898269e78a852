mod admin;
mod middleware;
mod public;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
};
use folio_api_types::PasswordBody;
use url::form_urlencoded;

use crate::application::access::AccessGate;
use crate::application::error::{ErrorReport, HttpError};
use crate::application::posts::{PostService, PostServiceError};
use crate::application::projects::ProjectFeed;
use crate::application::render::RenderService;
use crate::application::repos::{PostsRepo, RepoError};
use crate::presentation::views::SiteView;

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
    pub store: Arc<dyn PostsRepo>,
    pub renderer: Arc<dyn RenderService>,
    pub projects: Arc<ProjectFeed>,
    pub gate: Arc<AccessGate>,
    pub site: Arc<SiteView>,
}

/// Public pages and the admin panel behind one router with request logging.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .merge(public::routes())
        .merge(admin::routes())
        .fallback(public::fallback)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

fn store_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::store_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Map a post service error to the JSON error answered by the admin endpoints.
pub fn post_error_to_http(source: &'static str, err: PostServiceError) -> HttpError {
    match err {
        PostServiceError::Validation(message) => {
            HttpError::new(source, StatusCode::BAD_REQUEST, message.clone(), message)
        }
        PostServiceError::DuplicateSlug(slug) => HttpError::new(
            source,
            StatusCode::BAD_REQUEST,
            "A post with this slug already exists",
            format!("duplicate slug `{slug}`"),
        ),
        PostServiceError::NotFound(slug) => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Post not found",
            format!("post `{slug}` not found"),
        ),
        PostServiceError::Backend(err) => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            &err,
        ),
    }
}

/// The admin secret a request offers: body field, then `?password=`, then a
/// bearer token. Blank values are skipped.
fn offered_password(headers: &HeaderMap, body: &[u8], query: Option<&str>) -> Option<String> {
    body_password(headers, body)
        .or_else(|| query.map(str::to_string))
        .or_else(|| bearer_token(headers))
        .filter(|value| !value.is_empty())
}

fn body_password(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let password = if content_type.starts_with("application/x-www-form-urlencoded") {
        form_urlencoded::parse(body)
            .find(|(key, _)| key == "password")
            .map(|(_, value)| value.into_owned())
    } else {
        serde_json::from_slice::<PasswordBody>(body)
            .ok()
            .and_then(|parsed| parsed.password)
    };
    password.filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn body_password_wins_over_query_and_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header"));

        let offered = offered_password(&headers, br#"{"password":"body"}"#, Some("query"));
        assert_eq!(offered.as_deref(), Some("body"));

        let offered = offered_password(&headers, br#"{"password":""}"#, Some("query"));
        assert_eq!(offered.as_deref(), Some("query"));

        let offered = offered_password(&headers, b"", None);
        assert_eq!(offered.as_deref(), Some("header"));
    }

    #[test]
    fn form_bodies_are_read() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let offered = offered_password(&headers, b"password=a%20b&x=1", None);
        assert_eq!(offered.as_deref(), Some("a b"));
    }

    #[test]
    fn bearer_token_is_taken_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer  secret "));
        assert_eq!(bearer_token(&headers).as_deref(), Some(" secret "));

        let gate = AccessGate::new("secret");
        assert!(!gate.allows(offered_password(&headers, b"", None).as_deref()));
    }

    #[test]
    fn nothing_offered_is_none() {
        assert!(offered_password(&HeaderMap::new(), b"not json", Some("")).is_none());
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let source = "tests";
        let cases = [
            (
                PostServiceError::Validation("Missing required fields".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PostServiceError::DuplicateSlug("a".into()),
                StatusCode::BAD_REQUEST,
            ),
            (PostServiceError::NotFound("a".into()), StatusCode::NOT_FOUND),
            (
                PostServiceError::Backend(RepoError::from_persistence("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(post_error_to_http(source, err).status(), status);
        }
    }
}
