use askama::Template;
use url::form_urlencoded;

use crate::domain::posts::{PostRecord, PostSummary, format_post_date, human_date};
use crate::presentation::views::LayoutContext;

/// Percent-encode the admin secret for links that carry it as `?password=`.
pub fn password_query(password: &str) -> String {
    form_urlencoded::byte_serialize(password.as_bytes()).collect()
}

pub struct AdminLoginView {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub view: LayoutContext<AdminLoginView>,
}

#[derive(Clone)]
pub struct AdminPostRowView {
    pub slug: String,
    pub title: String,
    pub published: String,
    pub tags: String,
    pub is_draft: bool,
}

impl From<&PostSummary> for AdminPostRowView {
    fn from(post: &PostSummary) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            published: human_date(post.date),
            tags: post.tags.join(", "),
            is_draft: !post.published,
        }
    }
}

pub struct AdminPostsView {
    pub password: String,
    pub password_query: String,
    pub posts: Vec<AdminPostRowView>,
}

impl AdminPostsView {
    pub fn new(password: &str, posts: &[PostSummary]) -> Self {
        Self {
            password: password.to_string(),
            password_query: password_query(password),
            posts: posts.iter().map(AdminPostRowView::from).collect(),
        }
    }

    pub fn has_posts(&self) -> bool {
        !self.posts.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/posts.html")]
pub struct AdminPostsTemplate {
    pub view: LayoutContext<AdminPostsView>,
}

/// Editor form state. `original_slug` is empty for a new post.
pub struct AdminEditorView {
    pub heading: String,
    pub password: String,
    pub password_query: String,
    pub original_slug: String,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub author: String,
    pub tags: String,
    pub content: String,
    pub published: bool,
}

impl AdminEditorView {
    pub fn new_post(password: &str, default_author: &str) -> Self {
        Self {
            heading: "New Post".to_string(),
            password: password.to_string(),
            password_query: password_query(password),
            original_slug: String::new(),
            slug: String::new(),
            title: String::new(),
            date: String::new(),
            author: default_author.to_string(),
            tags: String::new(),
            content: String::new(),
            published: true,
        }
    }

    pub fn edit_post(password: &str, post: &PostRecord) -> Self {
        Self {
            heading: "Edit Post".to_string(),
            password: password.to_string(),
            password_query: password_query(password),
            original_slug: post.slug.clone(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: format_post_date(post.date),
            author: post.author.clone(),
            tags: post.tags.join(", "),
            content: post.content.clone(),
            published: post.published,
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.original_slug.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/editor.html")]
pub struct AdminEditorTemplate {
    pub view: LayoutContext<AdminEditorView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn password_query_is_percent_encoded() {
        assert_eq!(password_query("a b&c"), "a+b%26c");
    }

    #[test]
    fn editor_prefills_existing_post() {
        let post = PostRecord {
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            content: "Body".to_string(),
            author: "Ana".to_string(),
            date: datetime!(2024-02-01 00:00 UTC),
            tags: vec!["a".to_string(), "b".to_string()],
            published: false,
        };
        let view = AdminEditorView::edit_post("s3cret", &post);
        assert!(view.is_edit());
        assert_eq!(view.date, "2024-02-01");
        assert_eq!(view.tags, "a, b");
        assert!(!view.published);

        assert!(!AdminEditorView::new_post("s3cret", "Ana").is_edit());
    }
}
