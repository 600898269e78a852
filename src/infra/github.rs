//! GitHub REST client backing the projects page.

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::application::projects::{ProjectSource, ProjectSourceError, RemoteRepository};

const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const PER_PAGE: &str = "100";

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    owner: GitHubOwner,
    description: Option<String>,
    html_url: String,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    updated_at: Option<String>,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    private: bool,
}

impl From<GitHubRepo> for RemoteRepository {
    fn from(repo: GitHubRepo) -> Self {
        let updated_at = repo
            .updated_at
            .as_deref()
            .and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok());
        Self {
            owner: repo.owner.login,
            name: repo.name,
            description: repo.description,
            url: repo.html_url,
            language: repo.language,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            updated_at,
            fork: repo.fork,
            private: repo.private,
        }
    }
}

impl GitHubClient {
    pub fn new(api_base: &str, token: Option<String>) -> Result<Self, ProjectSourceError> {
        let api_base =
            Url::parse(api_base).map_err(|err| ProjectSourceError::Transport(err.to_string()))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| ProjectSourceError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            api_base,
            token: token.filter(|value| !value.trim().is_empty()),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    /// Join path segments onto the API base, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ProjectSourceError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ProjectSourceError::Transport("api base cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, accept: &str) -> Result<reqwest::Response, ProjectSourceError> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
            .send()
            .await
            .map_err(|err| ProjectSourceError::Transport(err.to_string()))
    }
}

#[async_trait]
impl ProjectSource for GitHubClient {
    async fn list_repositories(
        &self,
        user: &str,
    ) -> Result<Vec<RemoteRepository>, ProjectSourceError> {
        let mut url = self.url(&["users", user, "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("per_page", PER_PAGE);

        let response = self.get(url, JSON_MEDIA_TYPE).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProjectSourceError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ProjectSourceError::Transport(err.to_string()))?;
        let repos: Vec<GitHubRepo> = serde_json::from_slice(&bytes)
            .map_err(|err| ProjectSourceError::Decode(err.to_string()))?;
        Ok(repos.into_iter().map(RemoteRepository::from).collect())
    }

    async fn fetch_readme(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<String>, ProjectSourceError> {
        let url = self.url(&["repos", owner, name, "readme"])?;
        let response = self.get(url, RAW_MEDIA_TYPE).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProjectSourceError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|err| ProjectSourceError::Transport(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_segments_are_encoded() {
        let client = GitHubClient::new("https://api.github.com", None).expect("client");
        let url = client.url(&["users", "a b/c", "repos"]).expect("url");
        assert_eq!(url.as_str(), "https://api.github.com/users/a%20b%2Fc/repos");
    }

    #[test]
    fn blank_token_is_ignored() {
        let client = GitHubClient::new("https://api.github.com", Some("  ".into())).expect("client");
        assert!(client.token.is_none());
    }

    #[test]
    fn repo_payload_maps_to_remote_repository() {
        let payload = r#"{
            "name": "tool",
            "owner": {"login": "someone"},
            "description": null,
            "html_url": "https://github.com/someone/tool",
            "language": "Rust",
            "stargazers_count": 3,
            "forks_count": 1,
            "updated_at": "2024-05-01T12:00:00Z",
            "fork": false,
            "private": false
        }"#;
        let repo: GitHubRepo = serde_json::from_str(payload).expect("payload");
        let remote = RemoteRepository::from(repo);
        assert_eq!(remote.owner, "someone");
        assert_eq!(remote.stars, 3);
        assert!(remote.updated_at.is_some());
        assert!(remote.description.is_none());
    }
}
