//! Blog post use-cases: listing, reading, saving and deleting.

use std::sync::Arc;

use folio_api_types::SavePostRequest;
use thiserror::Error;
use tracing::info;

use crate::application::repos::{PostFilter, PostsRepo, RepoError};
use crate::domain::error::DomainError;
use crate::domain::posts::{
    PostRecord, PostSummary, normalize_tags, parse_post_date, sort_newest_first, today,
};
use crate::domain::slug::{is_valid_slug, normalize_slug};

pub const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("a post with slug `{0}` already exists")]
    DuplicateSlug(String),
    #[error("post `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Backend(RepoError),
}

impl From<RepoError> for PostServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { key } => Self::DuplicateSlug(key),
            other => Self::Backend(other),
        }
    }
}

impl From<DomainError> for PostServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::Validation(message),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Raw editor input before defaults and validation are applied.
#[derive(Debug, Clone, Default)]
pub struct SavePostInput {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub published: Option<bool>,
    pub original_slug: Option<String>,
}

impl From<SavePostRequest> for SavePostInput {
    fn from(request: SavePostRequest) -> Self {
        Self {
            slug: request.slug.unwrap_or_default(),
            title: request.title.unwrap_or_default(),
            content: request.content.unwrap_or_default(),
            author: request.author,
            date: request.date,
            tags: request.tags.map(|tags| tags.into_entries()).unwrap_or_default(),
            published: request.published,
            original_slug: request.original_slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPost {
    pub slug: String,
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostsRepo>,
    default_author: String,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostsRepo>, default_author: impl Into<String>) -> Self {
        Self {
            repo,
            default_author: default_author.into(),
        }
    }

    pub fn default_author(&self) -> &str {
        &self.default_author
    }

    /// Published posts, newest first.
    pub async fn list_published(&self) -> Vec<PostSummary> {
        self.list(PostFilter::Published).await
    }

    /// Every post including drafts, newest first.
    pub async fn list_all(&self) -> Vec<PostSummary> {
        self.list(PostFilter::All).await
    }

    async fn list(&self, filter: PostFilter) -> Vec<PostSummary> {
        let mut posts = self.repo.find_all(filter).await;
        posts.retain(|post| filter.admits(post));
        sort_newest_first(&mut posts, |post| post.date);
        posts.into_iter().map(PostSummary::from).collect()
    }

    /// A published post for the public view.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, PostServiceError> {
        Ok(self.get_for_edit(slug).await?.filter(|post| post.published))
    }

    /// Any post, drafts included.
    pub async fn get_for_edit(&self, slug: &str) -> Result<Option<PostRecord>, PostServiceError> {
        let candidate = slug.trim().to_lowercase();
        if !is_valid_slug(&candidate) {
            return Ok(None);
        }
        Ok(self.repo.find_by_slug(&candidate).await?)
    }

    pub async fn save(&self, input: SavePostInput) -> Result<SavedPost, PostServiceError> {
        let original_slug = input
            .original_slug
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(normalize_slug)
            .transpose()?;
        let record = self.build_record(input)?;

        match original_slug {
            Some(original) if original != record.slug => {
                if self.repo.exists(&record.slug).await? {
                    return Err(PostServiceError::DuplicateSlug(record.slug));
                }
                self.repo.update(&original, &record).await?;
                info!(
                    target = "folio::posts",
                    slug = %record.slug,
                    previous = %original,
                    "post renamed"
                );
            }
            Some(_) => {
                self.repo.update(&record.slug, &record).await?;
                info!(target = "folio::posts", slug = %record.slug, "post updated");
            }
            None => {
                if self.repo.exists(&record.slug).await? {
                    return Err(PostServiceError::DuplicateSlug(record.slug));
                }
                self.repo.create(&record).await?;
                info!(target = "folio::posts", slug = %record.slug, "post created");
            }
        }

        Ok(SavedPost { slug: record.slug })
    }

    pub async fn delete(&self, slug: &str) -> Result<(), PostServiceError> {
        let candidate = slug.trim().to_lowercase();
        if !is_valid_slug(&candidate) {
            return Err(PostServiceError::NotFound(candidate));
        }

        match self.repo.delete(&candidate).await {
            Ok(()) => {
                info!(target = "folio::posts", slug = %candidate, "post deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(PostServiceError::NotFound(candidate)),
            Err(err) => Err(err.into()),
        }
    }

    fn build_record(&self, input: SavePostInput) -> Result<PostRecord, PostServiceError> {
        let title = input.title.trim();
        let content = input.content.trim();
        if input.slug.trim().is_empty() || title.is_empty() || content.is_empty() {
            return Err(PostServiceError::Validation(MISSING_FIELDS.to_string()));
        }

        let slug = normalize_slug(&input.slug)?;

        let author = input
            .author
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.default_author)
            .to_string();

        let date = match input.date.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => parse_post_date(value)?,
            _ => today(),
        };

        Ok(PostRecord {
            slug,
            title: title.to_string(),
            content: input.content,
            author,
            date,
            tags: normalize_tags(&input.tags),
            published: input.published.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_conversion_splits_csv_tags() {
        let request: SavePostRequest = serde_json::from_value(serde_json::json!({
            "slug": "a",
            "title": "A",
            "content": "C",
            "tags": "x, y",
            "originalSlug": "b",
        }))
        .expect("request");
        let input = SavePostInput::from(request);
        assert_eq!(input.tags, vec!["x".to_string(), " y".to_string()]);
        assert_eq!(input.original_slug.as_deref(), Some("b"));
        assert_eq!(input.published, None);
    }

    #[test]
    fn domain_validation_maps_to_service_validation() {
        let err = PostServiceError::from(DomainError::invalid_date("soon"));
        assert!(matches!(err, PostServiceError::Validation(message) if message.contains("soon")));
    }
}
