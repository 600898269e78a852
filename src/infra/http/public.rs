use std::error::Error as StdError;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
};
use tracing::error;

use crate::{
    application::error::ErrorReport,
    domain::hobbies::{self, HobbyKind},
    infra::assets,
    presentation::views::{
        BlogTemplate, BlogView, ErrorPageView, HobbiesTemplate, HobbiesView, HobbyCard,
        HobbyDetailView, HobbyTemplate, HomeTemplate, HomeView, LayoutChrome, LayoutContext,
        PodcastTemplate, PodcastView, PostCard, PostDetailContext, PostTemplate,
        ProjectCardView, ProjectsTemplate, ProjectsView, Section, render_error_page,
        render_not_found_response, render_template_response,
    },
};

use super::{HttpState, store_health_response};

const HOME_RECENT_POSTS: usize = 3;

pub(super) fn routes() -> Router<HttpState> {
    Router::new()
        .route("/", get(home))
        .route("/projects", get(projects))
        .route("/podcast", get(podcast))
        .route("/hobbies", get(hobby_index))
        .route("/hobbies/{slug}", get(hobby_detail))
        .route("/blog", get(blog_index))
        .route("/blog/{slug}", get(post_detail))
        .route("/_health", get(health))
        .route("/static/{*path}", get(assets::serve))
}

fn chrome(state: &HttpState, section: Section) -> LayoutChrome {
    LayoutChrome::new(&state.site, section)
}

async fn home(State(state): State<HttpState>) -> Response {
    let posts = state.posts.list_published().await;
    let content = HomeView {
        author: state.site.author.clone(),
        recent_posts: posts
            .iter()
            .take(HOME_RECENT_POSTS)
            .map(PostCard::from)
            .collect(),
        hobbies: hobbies::all().map(HobbyCard::from).collect(),
    };
    let view = LayoutContext::new(chrome(&state, Section::Home), content);
    render_template_response(HomeTemplate { view }, StatusCode::OK)
}

async fn projects(State(state): State<HttpState>) -> Response {
    let user = state.projects.user().to_string();
    let cards = state.projects.projects().await;
    let content = ProjectsView {
        profile_url: format!("https://github.com/{user}"),
        user,
        projects: cards.into_iter().map(ProjectCardView::from).collect(),
    };
    let view = LayoutContext::new(
        chrome(&state, Section::Projects).with_title("Projects"),
        content,
    );
    render_template_response(ProjectsTemplate { view }, StatusCode::OK)
}

async fn podcast(State(state): State<HttpState>) -> Response {
    let content = PodcastView {
        host: state.site.author.clone(),
    };
    let view = LayoutContext::new(
        chrome(&state, Section::Podcast).with_title("Podcast"),
        content,
    );
    render_template_response(PodcastTemplate { view }, StatusCode::OK)
}

async fn hobby_index(State(state): State<HttpState>) -> Response {
    let content = HobbiesView {
        hobbies: hobbies::all().map(HobbyCard::from).collect(),
    };
    let view = LayoutContext::new(
        chrome(&state, Section::Hobbies).with_title("Hobbies"),
        content,
    );
    render_template_response(HobbiesTemplate { view }, StatusCode::OK)
}

async fn hobby_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let chrome = chrome(&state, Section::Hobbies);
    let Some(kind) = HobbyKind::from_slug(&slug) else {
        return render_not_found_response(chrome);
    };

    let content = HobbyDetailView::new(kind);
    let chrome = chrome
        .with_title(content.hobby.title)
        .with_description(content.hobby.subtitle);
    let view = LayoutContext::new(chrome, content);
    render_template_response(HobbyTemplate { view }, StatusCode::OK)
}

async fn blog_index(State(state): State<HttpState>) -> Response {
    let posts = state.posts.list_published().await;
    let view = LayoutContext::new(
        chrome(&state, Section::Blog).with_title("Blog"),
        BlogView::new(&posts),
    );
    render_template_response(BlogTemplate { view }, StatusCode::OK)
}

async fn post_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    const SOURCE: &str = "infra::http::public::post_detail";
    let chrome = chrome(&state, Section::Blog);

    let post = match state.posts.get_by_slug(&slug).await {
        Ok(Some(post)) => post,
        Ok(None) => {
            return render_error_page(chrome, StatusCode::NOT_FOUND, ErrorPageView::post_not_found());
        }
        Err(err) => return page_failure(chrome, SOURCE, &err),
    };

    let html = match state.renderer.render(&post.content) {
        Ok(html) => html,
        Err(err) => {
            error!(target = SOURCE, slug = %post.slug, error = %err, "failed to render post");
            return page_failure(chrome, SOURCE, &err);
        }
    };

    let chrome = chrome.with_title(post.title.clone());
    let content = PostDetailContext::new(&post, html.into_string());
    let view = LayoutContext::new(chrome, content);
    render_template_response(PostTemplate { view }, StatusCode::OK)
}

async fn health(State(state): State<HttpState>) -> Response {
    store_health_response(state.store.health_check().await)
}

pub(super) async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(chrome(&state, Section::None))
}

/// A 500 page whose report carries the underlying cause chain.
fn page_failure(chrome: LayoutChrome, source: &'static str, err: &dyn StdError) -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let mut response = render_error_page(chrome, status, ErrorPageView::unavailable());
    ErrorReport::from_error(source, status, err).attach(&mut response);
    response
}
