//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::PostRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("a post with slug `{key}` already exists")]
    Duplicate { key: String },
    #[error("resource not found")]
    NotFound,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    Published,
    All,
}

impl PostFilter {
    pub fn admits(self, post: &PostRecord) -> bool {
        match self {
            PostFilter::Published => post.published,
            PostFilter::All => true,
        }
    }
}

/// Durable post storage keyed by slug.
///
/// Listing never fails: an unreachable backend is logged and reads as empty.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Posts admitted by `filter`, in store iteration order.
    async fn find_all(&self, filter: PostFilter) -> Vec<PostRecord>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    async fn exists(&self, slug: &str) -> Result<bool, RepoError>;

    /// Insert a new post; [`RepoError::Duplicate`] when the slug is taken.
    async fn create(&self, post: &PostRecord) -> Result<(), RepoError>;

    /// Upsert keyed by `existing_slug`. A differing `post.slug` renames the
    /// record; callers check that the new slug is free beforehand.
    async fn update(&self, existing_slug: &str, post: &PostRecord) -> Result<(), RepoError>;

    async fn delete(&self, slug: &str) -> Result<(), RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}
