//! Project cards built from a remote repository listing.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

pub const NO_DESCRIPTION: &str = "No description available";
pub const README_SUMMARY_CHARS: usize = 160;
pub const DEFAULT_PROJECT_LIMIT: usize = 6;

#[derive(Debug, Error)]
pub enum ProjectSourceError {
    #[error("request to project source failed: {0}")]
    Transport(String),
    #[error("project source answered with status {status}")]
    Status { status: u16 },
    #[error("project source payload could not be decoded: {0}")]
    Decode(String),
}

/// A repository as reported by the remote source, before shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub updated_at: Option<OffsetDateTime>,
    pub fork: bool,
    pub private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub updated: Option<OffsetDateTime>,
}

#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn list_repositories(
        &self,
        user: &str,
    ) -> Result<Vec<RemoteRepository>, ProjectSourceError>;

    /// Raw readme text, `None` when the repository has none.
    async fn fetch_readme(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<String>, ProjectSourceError>;
}

#[derive(Clone)]
pub struct ProjectFeed {
    source: Arc<dyn ProjectSource>,
    user: String,
    limit: usize,
}

impl ProjectFeed {
    pub fn new(source: Arc<dyn ProjectSource>, user: impl Into<String>, limit: usize) -> Self {
        Self {
            source,
            user: user.into(),
            limit,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Most recently updated public, non-fork repositories. Never fails: any
    /// error from the source yields the static fallback card instead.
    pub async fn projects(&self) -> Vec<ProjectCard> {
        match self.load().await {
            Ok(cards) => cards,
            Err(err) => {
                warn!(
                    target = "application::projects::ProjectFeed",
                    user = %self.user,
                    error = %err,
                    "project feed unavailable, using fallback"
                );
                vec![fallback_card(&self.user)]
            }
        }
    }

    async fn load(&self) -> Result<Vec<ProjectCard>, ProjectSourceError> {
        let repositories = self.source.list_repositories(&self.user).await?;
        let selected = select_repositories(repositories, self.limit);

        let mut cards = Vec::with_capacity(selected.len());
        for repo in selected {
            let description = match repo.description.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => self.describe_from_readme(&repo).await,
            };
            cards.push(ProjectCard {
                name: repo.name,
                description,
                url: repo.url,
                language: repo.language,
                stars: repo.stars,
                forks: repo.forks,
                updated: repo.updated_at,
            });
        }
        Ok(cards)
    }

    async fn describe_from_readme(&self, repo: &RemoteRepository) -> String {
        let summary = match self.source.fetch_readme(&repo.owner, &repo.name).await {
            Ok(Some(readme)) => summarize_readme(&readme),
            Ok(None) => None,
            Err(err) => {
                debug!(
                    target = "application::projects::ProjectFeed",
                    repo = %repo.name,
                    error = %err,
                    "readme lookup failed"
                );
                None
            }
        };
        summary.unwrap_or_else(|| NO_DESCRIPTION.to_string())
    }
}

/// Drop private and forked repositories, newest update first, capped at `limit`.
pub fn select_repositories(
    mut repositories: Vec<RemoteRepository>,
    limit: usize,
) -> Vec<RemoteRepository> {
    repositories.retain(|repo| !repo.fork && !repo.private);
    // `None` sorts after every timestamp.
    repositories.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    repositories.truncate(limit);
    repositories
}

pub fn fallback_card(user: &str) -> ProjectCard {
    ProjectCard {
        name: "personal-portfolio".to_string(),
        description: "Personal portfolio website with a markdown blog and a password-gated editor."
            .to_string(),
        url: format!("https://github.com/{user}/personal-portfolio"),
        language: Some("Rust".to_string()),
        stars: 0,
        forks: 0,
        updated: None,
    }
}

/// First prose paragraph of a readme, skipping headings, badges, images,
/// HTML and code blocks. Truncated to [`README_SUMMARY_CHARS`].
pub fn summarize_readme(readme: &str) -> Option<String> {
    let mut paragraph: Vec<&str> = Vec::new();
    let mut in_code = false;

    for raw in readme.lines() {
        let line = raw.trim();

        if line.starts_with("```") || line.starts_with("~~~") {
            in_code = !in_code;
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if in_code {
            continue;
        }

        if line.is_empty() {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }

        if is_decoration(line) {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }

        paragraph.push(line);
    }

    if paragraph.is_empty() {
        return None;
    }

    let text = paragraph
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.chars().count() > README_SUMMARY_CHARS {
        let mut truncated: String = text.chars().take(README_SUMMARY_CHARS).collect();
        truncated.push_str("...");
        Some(truncated)
    } else {
        Some(text)
    }
}

fn is_decoration(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with("![")
        || line.starts_with("[![")
        || line.starts_with('<')
        || line.starts_with('|')
        || line.chars().all(|ch| matches!(ch, '=' | '-' | '*' | '_'))
}
