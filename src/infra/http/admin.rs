use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use bytes::Bytes;
use folio_api_types::{DeletePostResponse, PasswordBody, SavePostRequest, SavePostResponse};

use crate::{
    application::{
        error::{ErrorReport, HttpError},
        posts::SavePostInput,
    },
    presentation::{
        admin::views::{
            AdminEditorTemplate, AdminEditorView, AdminLoginTemplate, AdminLoginView,
            AdminPostsTemplate, AdminPostsView, password_query,
        },
        views::{
            LayoutChrome, LayoutContext, Section, render_not_found_response,
            render_template_response,
        },
    },
};

use super::{HttpState, offered_password, post_error_to_http};

const LOGIN_PATH: &str = "/admin";
const INVALID_PASSWORD: &str = "Invalid password";

pub(super) fn routes() -> Router<HttpState> {
    Router::new()
        .route("/admin", get(login_page).post(login_submit))
        .route("/admin/posts", get(post_list))
        .route("/admin/posts/new", get(new_post))
        .route("/admin/posts/edit/{slug}", get(edit_post))
        .route("/admin/posts/save", post(save_post))
        .route("/admin/posts/delete/{slug}", post(delete_post))
}

fn chrome(state: &HttpState, title: &str) -> LayoutChrome {
    LayoutChrome::new(&state.site, Section::Admin).with_title(title)
}

fn posts_location(password: &str) -> String {
    format!("/admin/posts?password={}", password_query(password))
}

fn unauthorized(source: &'static str) -> HttpError {
    HttpError::new(
        source,
        StatusCode::UNAUTHORIZED,
        "Unauthorized",
        "admin secret missing or incorrect",
    )
}

fn login_response(state: &HttpState, status: StatusCode, error: Option<&str>) -> Response {
    let content = AdminLoginView {
        error: error.map(str::to_string),
    };
    let view = LayoutContext::new(chrome(state, "Admin Login"), content);
    render_template_response(AdminLoginTemplate { view }, status)
}

/// `?password=` on a page request, only when it unlocks the panel.
fn authorized_query(state: &HttpState, query: &PasswordBody) -> Option<String> {
    query
        .password
        .as_deref()
        .filter(|candidate| state.gate.allows(Some(*candidate)))
        .map(str::to_string)
}

async fn login_page(State(state): State<HttpState>, Query(query): Query<PasswordBody>) -> Response {
    match authorized_query(&state, &query) {
        Some(password) => Redirect::to(&posts_location(&password)).into_response(),
        None => login_response(&state, StatusCode::OK, None),
    }
}

async fn login_submit(State(state): State<HttpState>, Form(form): Form<PasswordBody>) -> Response {
    match form.password.as_deref() {
        Some(password) if state.gate.allows(Some(password)) => {
            Redirect::to(&posts_location(password)).into_response()
        }
        _ => {
            let mut response =
                login_response(&state, StatusCode::UNAUTHORIZED, Some(INVALID_PASSWORD));
            ErrorReport::from_message(
                "infra::http::admin::login_submit",
                StatusCode::UNAUTHORIZED,
                "login rejected",
            )
            .attach(&mut response);
            response
        }
    }
}

async fn post_list(State(state): State<HttpState>, Query(query): Query<PasswordBody>) -> Response {
    let Some(password) = authorized_query(&state, &query) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let posts = state.posts.list_all().await;
    let view = LayoutContext::new(
        chrome(&state, "Manage Posts"),
        AdminPostsView::new(&password, &posts),
    );
    render_template_response(AdminPostsTemplate { view }, StatusCode::OK)
}

async fn new_post(State(state): State<HttpState>, Query(query): Query<PasswordBody>) -> Response {
    let Some(password) = authorized_query(&state, &query) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let content = AdminEditorView::new_post(&password, state.posts.default_author());
    let view = LayoutContext::new(chrome(&state, "New Post"), content);
    render_template_response(AdminEditorTemplate { view }, StatusCode::OK)
}

async fn edit_post(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PasswordBody>,
) -> Response {
    const SOURCE: &str = "infra::http::admin::edit_post";
    let Some(password) = authorized_query(&state, &query) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match state.posts.get_for_edit(&slug).await {
        Ok(Some(post)) => {
            let content = AdminEditorView::edit_post(&password, &post);
            let view = LayoutContext::new(chrome(&state, "Edit Post"), content);
            render_template_response(AdminEditorTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(LayoutChrome::new(&state.site, Section::Admin)),
        Err(err) => post_error_to_http(SOURCE, err).into_response(),
    }
}

/// JSON save endpoint used by the editor. The secret is checked before the
/// payload is looked at.
async fn save_post(
    State(state): State<HttpState>,
    Query(query): Query<PasswordBody>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SavePostResponse>, HttpError> {
    const SOURCE: &str = "infra::http::admin::save_post";

    let offered = offered_password(&headers, &body, query.password.as_deref());
    if state.gate.check(offered.as_deref()).is_err() {
        return Err(unauthorized(SOURCE));
    }

    let request: SavePostRequest = serde_json::from_slice(&body).map_err(|err| {
        HttpError::from_error(SOURCE, StatusCode::BAD_REQUEST, "Invalid request body", &err)
    })?;

    let saved = state
        .posts
        .save(SavePostInput::from(request))
        .await
        .map_err(|err| post_error_to_http(SOURCE, err))?;

    Ok(Json(SavePostResponse {
        success: true,
        slug: saved.slug,
    }))
}

async fn delete_post(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PasswordBody>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DeletePostResponse>, HttpError> {
    const SOURCE: &str = "infra::http::admin::delete_post";

    let offered = offered_password(&headers, &body, query.password.as_deref());
    if state.gate.check(offered.as_deref()).is_err() {
        return Err(unauthorized(SOURCE));
    }

    state
        .posts
        .delete(&slug)
        .await
        .map_err(|err| post_error_to_http(SOURCE, err))?;

    Ok(Json(DeletePostResponse { success: true }))
}
