use std::sync::Arc;

use tempfile::TempDir;

use folio::application::migrate::migrate_posts;
use folio::application::posts::{PostService, PostServiceError, SavePostInput};
use folio::application::repos::{PostFilter, PostsRepo};
use folio::domain::posts::{EXCERPT_CHARS, parse_post_date};
use folio::infra::store::FileStore;

fn service() -> (PostService, Arc<FileStore>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileStore::new(dir.path(), "Default Author"));
    let service = PostService::new(store.clone(), "Default Author");
    (service, store, dir)
}

fn input(slug: &str, title: &str, content: &str) -> SavePostInput {
    SavePostInput {
        slug: slug.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        ..SavePostInput::default()
    }
}

#[tokio::test]
async fn saved_post_reads_back_unchanged() {
    let (service, _store, _dir) = service();
    let saved = service
        .save(SavePostInput {
            author: Some("Ana".to_string()),
            date: Some("2024-03-01".to_string()),
            tags: vec!["rust".to_string(), " web ".to_string(), "rust".to_string()],
            ..input("hello", "Hello: world", "# Heading\n\nFirst line\nsecond line\n")
        })
        .await
        .expect("save");
    assert_eq!(saved.slug, "hello");

    let post = service
        .get_by_slug("hello")
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(post.title, "Hello: world");
    assert_eq!(post.content, "# Heading\n\nFirst line\nsecond line\n");
    assert_eq!(post.author, "Ana");
    assert_eq!(post.tags, vec!["rust", "web"]);
    assert_eq!(post.date, parse_post_date("2024-03-01").expect("date"));
}

#[tokio::test]
async fn blank_optional_fields_take_defaults() {
    let (service, _store, _dir) = service();
    service
        .save(SavePostInput {
            author: Some("   ".to_string()),
            date: Some(String::new()),
            ..input("defaults", "Defaults", "Body")
        })
        .await
        .expect("save");

    let post = service
        .get_by_slug("defaults")
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(post.author, "Default Author");
    assert!(post.tags.is_empty());
    assert!(post.published);
}

#[tokio::test]
async fn missing_required_fields_fail_validation() {
    let (service, store, _dir) = service();
    for candidate in [input("", "T", "C"), input("a", " ", "C"), input("a", "T", "\n")] {
        let err = service.save(candidate).await.expect_err("invalid");
        assert!(matches!(err, PostServiceError::Validation(_)));
    }
    assert!(store.find_all(PostFilter::All).await.is_empty());
}

#[tokio::test]
async fn unsafe_slug_is_rejected() {
    let (service, _store, _dir) = service();
    let err = service
        .save(input("../etc/passwd", "T", "C"))
        .await
        .expect_err("invalid slug");
    assert!(matches!(err, PostServiceError::Validation(_)));

    let saved = service.save(input("  Mixed-Case ", "T", "C")).await.expect("save");
    assert_eq!(saved.slug, "mixed-case");
}

#[tokio::test]
async fn creating_an_existing_slug_is_a_duplicate() {
    let (service, _store, _dir) = service();
    service.save(input("a", "First", "One")).await.expect("save");

    let err = service
        .save(input("a", "Second", "Two"))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, PostServiceError::DuplicateSlug(slug) if slug == "a"));

    let post = service.get_by_slug("a").await.expect("lookup").expect("present");
    assert_eq!(post.title, "First");
}

#[tokio::test]
async fn same_slug_with_original_slug_updates_in_place() {
    let (service, store, _dir) = service();
    service.save(input("a", "First", "One")).await.expect("save");

    service
        .save(SavePostInput {
            original_slug: Some("a".to_string()),
            ..input("a", "Edited", "Two")
        })
        .await
        .expect("update");

    let all = store.find_all(PostFilter::All).await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Edited");
}

#[tokio::test]
async fn rename_moves_the_post() {
    let (service, _store, dir) = service();
    service.save(input("old", "Title", "Body")).await.expect("save");

    service
        .save(SavePostInput {
            original_slug: Some("old".to_string()),
            ..input("new", "Title", "Body")
        })
        .await
        .expect("rename");

    assert!(service.get_by_slug("old").await.expect("lookup").is_none());
    assert!(service.get_by_slug("new").await.expect("lookup").is_some());
    assert!(!dir.path().join("old.md").exists());
}

#[tokio::test]
async fn rename_onto_taken_slug_leaves_original_untouched() {
    let (service, _store, _dir) = service();
    service.save(input("x", "X", "Body X")).await.expect("save x");
    service.save(input("y", "Y", "Body Y")).await.expect("save y");

    let err = service
        .save(SavePostInput {
            original_slug: Some("x".to_string()),
            ..input("y", "X renamed", "Body X")
        })
        .await
        .expect_err("taken");
    assert!(matches!(err, PostServiceError::DuplicateSlug(_)));

    let x = service.get_by_slug("x").await.expect("lookup").expect("x");
    let y = service.get_by_slug("y").await.expect("lookup").expect("y");
    assert_eq!(x.title, "X");
    assert_eq!(y.title, "Y");
}

#[tokio::test]
async fn saving_over_a_file_owned_by_another_slug_is_refused() {
    let (service, store, dir) = service();
    std::fs::write(dir.path().join("a.md"), "---\nslug: b\ntitle: Bee\n---\nbee\n")
        .expect("a.md");
    std::fs::write(dir.path().join("c.md"), "---\nslug: b\ntitle: Bee2\n---\nbee2\n")
        .expect("c.md");

    let err = service.save(input("a", "Ay", "ay")).await.unwrap_err();
    assert!(matches!(err, PostServiceError::DuplicateSlug(slug) if slug == "a"));

    let posts: Vec<_> = store
        .find_all(PostFilter::All)
        .await
        .into_iter()
        .map(|post| (post.slug, post.title))
        .collect();
    assert_eq!(posts, vec![("b".to_string(), "Bee".to_string())]);
}

#[tokio::test]
async fn deleting_unknown_slug_is_not_found() {
    let (service, store, _dir) = service();
    service.save(input("keep", "Keep", "Body")).await.expect("save");

    let err = service.delete("ghost").await.expect_err("missing");
    assert!(matches!(err, PostServiceError::NotFound(_)));
    assert_eq!(store.find_all(PostFilter::All).await.len(), 1);

    service.delete("keep").await.expect("delete");
    assert!(store.find_all(PostFilter::All).await.is_empty());
}

#[tokio::test]
async fn listing_is_newest_first_and_hides_drafts() {
    let (service, _store, _dir) = service();
    for (slug, date) in [("jan", "2024-01-01"), ("mar", "2024-03-01"), ("feb", "2024-02-01")] {
        service
            .save(SavePostInput {
                date: Some(date.to_string()),
                ..input(slug, slug, "Body")
            })
            .await
            .expect("save");
    }
    service
        .save(SavePostInput {
            date: Some("2025-01-01".to_string()),
            published: Some(false),
            ..input("draft", "Draft", "Body")
        })
        .await
        .expect("save draft");

    let published: Vec<_> = service
        .list_published()
        .await
        .into_iter()
        .map(|post| post.slug)
        .collect();
    assert_eq!(published, vec!["mar", "feb", "jan"]);

    let all = service.list_all().await;
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].slug, "draft");
    assert!(service.get_by_slug("draft").await.expect("lookup").is_none());
    assert!(service.get_for_edit("draft").await.expect("lookup").is_some());
}

#[tokio::test]
async fn listing_excerpt_is_truncated_single_line() {
    let (service, _store, _dir) = service();
    let content = "line one\nline two\r\n".repeat(20);
    service.save(input("long", "Long", &content)).await.expect("save");

    let listed = service.list_published().await;
    let excerpt = &listed[0].excerpt;
    assert!(excerpt.ends_with("..."));
    assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
    assert!(!excerpt.contains('\n'));
    assert!(!excerpt.contains('\r'));
}

#[tokio::test]
async fn migration_copies_missing_posts_only() {
    let (service, source, _dir) = service();
    service.save(input("one", "One", "Body")).await.expect("save");
    service.save(input("two", "Two", "Body")).await.expect("save");

    let target_dir = tempfile::tempdir().expect("tempdir");
    let target = FileStore::new(target_dir.path(), "Default Author");
    let existing = source
        .find_by_slug("two")
        .await
        .expect("lookup")
        .expect("present");
    target.create(&existing).await.expect("seed");

    let summary = migrate_posts(&*source, &target).await.expect("migrate");
    assert_eq!(summary.total, 2);
    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.skipped, 1);
    assert!(target.exists("one").await.expect("exists"));
}
