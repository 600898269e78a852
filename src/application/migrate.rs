//! One-shot copy of posts between two stores.

use tracing::{info, warn};

use crate::application::repos::{PostFilter, PostsRepo, RepoError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub migrated: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Copy every post from `source` into `target`, leaving slugs that already
/// exist in `target` untouched.
pub async fn migrate_posts(
    source: &dyn PostsRepo,
    target: &dyn PostsRepo,
) -> Result<MigrationSummary, RepoError> {
    let posts = source.find_all(PostFilter::All).await;
    let mut summary = MigrationSummary {
        total: posts.len(),
        ..MigrationSummary::default()
    };

    for post in posts {
        if target.exists(&post.slug).await? {
            warn!(
                target = "application::migrate::migrate_posts",
                slug = %post.slug,
                "post already present, skipping"
            );
            summary.skipped += 1;
            continue;
        }

        target.create(&post).await?;
        info!(
            target = "application::migrate::migrate_posts",
            slug = %post.slug,
            "post migrated"
        );
        summary.migrated += 1;
    }

    Ok(summary)
}
