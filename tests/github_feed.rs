use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::{Value, json};

use folio::application::projects::{NO_DESCRIPTION, ProjectFeed};
use folio::infra::github::GitHubClient;

fn repo(name: &str, updated_at: &str, description: Option<&str>) -> Value {
    json!({
        "name": name,
        "owner": {"login": "someone"},
        "description": description,
        "html_url": format!("https://github.com/someone/{name}"),
        "language": "Rust",
        "stargazers_count": 2,
        "forks_count": 1,
        "updated_at": updated_at,
        "fork": false,
        "private": false
    })
}

fn feed(server: &MockServer, limit: usize) -> ProjectFeed {
    let client = GitHubClient::new(&server.base_url(), None).expect("client");
    ProjectFeed::new(Arc::new(client), "someone", limit)
}

#[tokio::test]
async fn lists_recent_public_repositories_with_readme_descriptions() {
    let server = MockServer::start_async().await;

    let mut private = repo("secret", "2024-06-01T00:00:00Z", Some("hidden"));
    private["private"] = json!(true);
    let mut forked = repo("forked", "2024-06-02T00:00:00Z", Some("copy"));
    forked["fork"] = json!(true);
    let payload = json!([
        private,
        forked,
        repo("oldest", "2024-01-01T00:00:00Z", Some("Old")),
        repo("newest", "2024-05-01T00:00:00Z", None),
        repo("middle", "2024-03-01T00:00:00Z", Some("Middle project")),
    ]);

    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/someone/repos")
                .query_param("sort", "updated")
                .query_param("per_page", "100")
                .header_exists("user-agent");
            then.status(200)
                .header("content-type", "application/json")
                .body(payload.to_string());
        })
        .await;
    let readme = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/someone/newest/readme");
            then.status(200).body(
                "# newest\n\n[![ci](https://example.com/badge.svg)](https://example.com)\n\nA small tool that does one thing well.\nIt has two lines.\n\n## Usage\n",
            );
        })
        .await;

    let cards = feed(&server, 2).projects().await;

    list.assert_async().await;
    readme.assert_async().await;
    let names: Vec<_> = cards.iter().map(|card| card.name.as_str()).collect();
    assert_eq!(names, vec!["newest", "middle"]);
    assert_eq!(
        cards[0].description,
        "A small tool that does one thing well. It has two lines."
    );
    assert_eq!(cards[1].description, "Middle project");
    assert_eq!(cards[1].stars, 2);
}

#[tokio::test]
async fn readme_failures_fall_back_per_repository() {
    let server = MockServer::start_async().await;
    let payload = json!([
        repo("missing", "2024-02-01T00:00:00Z", None),
        repo("broken", "2024-01-01T00:00:00Z", Some("   ")),
    ]);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/someone/repos");
            then.status(200)
                .header("content-type", "application/json")
                .body(payload.to_string());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/someone/missing/readme");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/someone/broken/readme");
            then.status(500);
        })
        .await;

    let cards = feed(&server, 6).projects().await;
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|card| card.description == NO_DESCRIPTION));
}

#[tokio::test]
async fn upstream_error_yields_single_fallback_card() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET).path("/users/someone/repos");
            then.status(500).body("boom");
        })
        .await;

    let cards = feed(&server, 6).projects().await;

    list.assert_async().await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "personal-portfolio");
    assert_eq!(cards[0].url, "https://github.com/someone/personal-portfolio");
}

#[tokio::test]
async fn undecodable_payload_yields_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/someone/repos");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"message": "not a list"}"#);
        })
        .await;

    let cards = feed(&server, 6).projects().await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "personal-portfolio");
}
