use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::warn;

use crate::application::repos::{PostFilter, PostsRepo, RepoError};
use crate::domain::posts::PostRecord;
use crate::domain::slug::is_valid_slug;

use super::frontmatter::{parse_document, render_document};

const EXTENSION: &str = "md";

/// One `<slug>.md` file per post inside a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    default_author: String,
}

struct Entry {
    path: PathBuf,
    post: PostRecord,
}

impl Entry {
    /// The file is named after the slug it claims.
    fn is_canonical(&self) -> bool {
        self.path
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy() == self.post.slug)
    }
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, default_author: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_author: default_author.into(),
        }
    }

    fn path_for(&self, slug: &str) -> Result<PathBuf, RepoError> {
        if !is_valid_slug(slug) {
            return Err(RepoError::from_persistence(format!(
                "refusing to build a path for slug `{slug}`"
            )));
        }
        Ok(self.dir.join(format!("{slug}.{EXTENSION}")))
    }

    /// Every readable post, ordered by file name.
    async fn load_entries(&self) -> Result<Vec<Entry>, RepoError> {
        if fs::metadata(&self.dir).await.is_err() {
            fs::create_dir_all(&self.dir)
                .await
                .map_err(RepoError::from_persistence)?;
            return Ok(Vec::new());
        }

        let mut reader = fs::read_dir(&self.dir)
            .await
            .map_err(RepoError::from_persistence)?;
        let mut paths = Vec::new();
        while let Some(item) = reader
            .next_entry()
            .await
            .map_err(RepoError::from_persistence)?
        {
            let path = item.path();
            let is_markdown = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
            let is_file = item.file_type().await.is_ok_and(|kind| kind.is_file());
            if is_markdown && is_file {
                paths.push(path);
            }
        }
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = match fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(
                        target = "infra::store::fs",
                        path = %path.display(),
                        error = %err,
                        "skipping unreadable post file"
                    );
                    continue;
                }
            };
            match parse_document(&stem, &text, &self.default_author) {
                Ok(post) => entries.push(Entry { path, post }),
                Err(err) => warn!(
                    target = "infra::store::fs",
                    path = %path.display(),
                    error = %err,
                    "skipping malformed post file"
                ),
            }
        }
        Ok(dedupe_slugs(entries))
    }

    /// Whether `<slug>.md` is already on disk, whatever slug it declares.
    async fn path_taken(&self, slug: &str) -> Result<bool, RepoError> {
        let path = self.path_for(slug)?;
        fs::try_exists(&path)
            .await
            .map_err(RepoError::from_persistence)
    }

    async fn locate(&self, slug: &str) -> Result<Option<Entry>, RepoError> {
        let entries = self.load_entries().await?;
        Ok(entries.into_iter().find(|entry| entry.post.slug == slug))
    }

    async fn write(&self, post: &PostRecord) -> Result<PathBuf, RepoError> {
        let target = self.path_for(&post.slug)?;
        let document = render_document(post).map_err(RepoError::from_persistence)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(RepoError::from_persistence)?;

        let dir = self.dir.clone();
        let destination = target.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &destination, &document))
            .await
            .map_err(RepoError::from_persistence)?
            .map_err(RepoError::from_persistence)?;
        Ok(target)
    }
}

/// Keep one entry per slug. The file named after the slug wins, otherwise the
/// first in file name order; the rest are logged and ignored.
fn dedupe_slugs(entries: Vec<Entry>) -> Vec<Entry> {
    let mut kept: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let seen = index.get(&entry.post.slug).copied();
        let Some(at) = seen else {
            index.insert(entry.post.slug.clone(), kept.len());
            kept.push(entry);
            continue;
        };

        let shadowed = if entry.is_canonical() && !kept[at].is_canonical() {
            std::mem::replace(&mut kept[at], entry)
        } else {
            entry
        };
        warn!(
            target = "infra::store::fs",
            path = %shadowed.path.display(),
            slug = %shadowed.post.slug,
            "another file already claims this slug, ignoring"
        );
    }
    kept
}

/// Write through a temp file in the same directory, then rename over `target`.
fn write_atomically(dir: &Path, target: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|err| err.error)?;
    Ok(())
}

#[async_trait]
impl PostsRepo for FileStore {
    async fn find_all(&self, filter: PostFilter) -> Vec<PostRecord> {
        match self.load_entries().await {
            Ok(entries) => entries
                .into_iter()
                .map(|entry| entry.post)
                .filter(|post| filter.admits(post))
                .collect(),
            Err(err) => {
                warn!(
                    target = "infra::store::fs",
                    dir = %self.dir.display(),
                    error = %err,
                    "post directory unavailable, serving empty list"
                );
                Vec::new()
            }
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.locate(slug).await?.map(|entry| entry.post))
    }

    async fn exists(&self, slug: &str) -> Result<bool, RepoError> {
        if self.path_taken(slug).await? {
            return Ok(true);
        }
        Ok(self.locate(slug).await?.is_some())
    }

    async fn create(&self, post: &PostRecord) -> Result<(), RepoError> {
        if self.exists(&post.slug).await? {
            return Err(RepoError::Duplicate {
                key: post.slug.clone(),
            });
        }
        self.write(post).await.map(|_| ())
    }

    async fn update(&self, existing_slug: &str, post: &PostRecord) -> Result<(), RepoError> {
        let previous = self.locate(existing_slug).await?;

        // Never overwrite a file that holds some other post.
        let target = self.path_for(&post.slug)?;
        let owns_target = previous
            .as_ref()
            .is_some_and(|entry| entry.path == target);
        if !owns_target && self.path_taken(&post.slug).await? {
            return Err(RepoError::Duplicate {
                key: post.slug.clone(),
            });
        }

        let written = self.write(post).await?;

        if let Some(previous) = previous {
            if previous.path != written {
                fs::remove_file(&previous.path)
                    .await
                    .map_err(RepoError::from_persistence)?;
            }
        }
        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<(), RepoError> {
        let Some(entry) = self.locate(slug).await? else {
            return Err(RepoError::NotFound);
        };
        fs::remove_file(&entry.path)
            .await
            .map_err(RepoError::from_persistence)
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(RepoError::from_persistence)?;
        fs::read_dir(&self.dir)
            .await
            .map(|_| ())
            .map_err(RepoError::from_persistence)
    }
}
