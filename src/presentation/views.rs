use crate::application::error::{ErrorReport, HttpError};
use crate::application::projects::ProjectCard;
use crate::domain::hobbies::{Hobby, HobbyKind};
use crate::domain::posts::{ISO_DATE_FORMAT, PostRecord, PostSummary, human_date};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    render_error_page(chrome, StatusCode::NOT_FOUND, ErrorPageView::not_found())
}

/// Render the error template and attach a report for the response logger.
pub fn render_error_page(chrome: LayoutChrome, status: StatusCode, page: ErrorPageView) -> Response {
    let message = page.message.clone();
    let view = LayoutContext::new(chrome.with_title(page.title.clone()), page);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    ErrorReport::from_message("presentation::views::render_error_page", status, message)
        .attach(&mut response);
    response
}

/// Site identity shared by every page.
#[derive(Debug, Clone)]
pub struct SiteView {
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Projects,
    Blog,
    Podcast,
    Hobbies,
    Admin,
    None,
}

const NAVIGATION: [(Section, &str, &str); 5] = [
    (Section::Home, "About", "/"),
    (Section::Projects, "Projects", "/projects"),
    (Section::Blog, "Blog", "/blog"),
    (Section::Podcast, "Podcast", "/podcast"),
    (Section::Hobbies, "Hobbies", "/hobbies"),
];

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn new(site: &SiteView, section: Section) -> Self {
        let entries = NAVIGATION
            .iter()
            .map(|(entry, label, href)| NavigationLinkView {
                label: (*label).to_string(),
                href: (*href).to_string(),
                is_active: *entry == section,
            })
            .collect();

        Self {
            brand: BrandView {
                title: site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                copy: format!("© {} {}", OffsetDateTime::now_utc().year(), site.author),
            },
            meta: PageMetaView {
                title: site.title.clone(),
                description: format!("{} · developer portfolio, blog and notes", site.author),
            },
        }
    }

    /// Prefix the document title with the page name.
    pub fn with_title(self, page_title: impl Into<String>) -> Self {
        let page_title = page_title.into();
        let title = format!("{page_title} | {}", self.brand.title);
        Self {
            meta: PageMetaView {
                title,
                ..self.meta
            },
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            meta: PageMetaView {
                description: description.into(),
                ..self.meta
            },
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub asset_version: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            asset_version: env!("CARGO_PKG_VERSION").to_string(),
            content,
        }
    }
}

#[derive(Clone)]
pub struct TagBadge {
    pub value: String,
    pub label: String,
}

pub fn build_tag_badges<'a, T>(tags: T) -> Vec<TagBadge>
where
    T: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(|tag| TagBadge {
            value: tag.clone(),
            label: format!("#{tag}"),
        })
        .collect()
}

pub fn iso_day(date: OffsetDateTime) -> String {
    date.date()
        .format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| date.date().to_string())
}

#[derive(Clone)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub excerpt: String,
    pub iso_date: String,
    pub published: String,
    pub badges: Vec<TagBadge>,
}

impl From<&PostSummary> for PostCard {
    fn from(post: &PostSummary) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            author: post.author.clone(),
            excerpt: post.excerpt.clone(),
            iso_date: iso_day(post.date),
            published: human_date(post.date),
            badges: build_tag_badges(&post.tags),
        }
    }
}

#[derive(Clone)]
pub struct HobbyCard {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub icon: String,
    pub background_image: String,
}

impl From<&Hobby> for HobbyCard {
    fn from(hobby: &Hobby) -> Self {
        Self {
            slug: hobby.kind.slug().to_string(),
            title: hobby.title.to_string(),
            subtitle: hobby.subtitle.to_string(),
            icon: hobby.icon.to_string(),
            background_image: hobby.background_image.to_string(),
        }
    }
}

pub struct HomeView {
    pub author: String,
    pub recent_posts: Vec<PostCard>,
    pub hobbies: Vec<HobbyCard>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

pub struct ProjectCardView {
    pub name: String,
    pub description: String,
    pub url: String,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub updated: Option<String>,
}

impl From<ProjectCard> for ProjectCardView {
    fn from(card: ProjectCard) -> Self {
        Self {
            name: card.name,
            description: card.description,
            url: card.url,
            language: card.language,
            stars: card.stars,
            forks: card.forks,
            updated: card.updated.map(human_date),
        }
    }
}

pub struct ProjectsView {
    pub user: String,
    pub profile_url: String,
    pub projects: Vec<ProjectCardView>,
}

#[derive(Template)]
#[template(path = "projects.html")]
pub struct ProjectsTemplate {
    pub view: LayoutContext<ProjectsView>,
}

pub struct PodcastView {
    pub host: String,
}

#[derive(Template)]
#[template(path = "podcast.html")]
pub struct PodcastTemplate {
    pub view: LayoutContext<PodcastView>,
}

pub struct HobbiesView {
    pub hobbies: Vec<HobbyCard>,
}

#[derive(Template)]
#[template(path = "hobbies.html")]
pub struct HobbiesTemplate {
    pub view: LayoutContext<HobbiesView>,
}

pub struct HobbyDetailView {
    pub hobby: &'static Hobby,
    pub related: Vec<HobbyCard>,
}

impl HobbyDetailView {
    pub fn new(kind: HobbyKind) -> Self {
        Self {
            hobby: kind.details(),
            related: kind.related().map(HobbyCard::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "hobby.html")]
pub struct HobbyTemplate {
    pub view: LayoutContext<HobbyDetailView>,
}

pub struct BlogView {
    pub posts: Vec<PostCard>,
    pub has_results: bool,
}

impl BlogView {
    pub fn new(posts: &[PostSummary]) -> Self {
        let posts: Vec<PostCard> = posts.iter().map(PostCard::from).collect();
        Self {
            has_results: !posts.is_empty(),
            posts,
        }
    }
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub view: LayoutContext<BlogView>,
}

pub struct PostDetailContext {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub published: String,
    pub iso_date: String,
    pub tags: Vec<TagBadge>,
    pub content_html: String,
}

impl PostDetailContext {
    pub fn new(post: &PostRecord, content_html: String) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            author: post.author.clone(),
            published: human_date(post.date),
            iso_date: iso_day(post.date),
            tags: build_tag_badges(&post.tags),
            content_html,
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn post_not_found() -> Self {
        Self {
            title: "Post Not Found".to_string(),
            message: "That post does not exist or is no longer published.".to_string(),
            primary_action: Some(ErrorAction {
                href: "/blog".to_string(),
                label: "Back to the blog".to_string(),
            }),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: "Something Went Wrong".to_string(),
            message: "The page could not be loaded right now. Please try again shortly.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
