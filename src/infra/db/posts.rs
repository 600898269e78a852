use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::application::repos::{PostFilter, PostsRepo, RepoError};
use crate::domain::posts::PostRecord;

use super::PostgresRepositories;
use super::util::map_sqlx_error;

const POST_COLUMNS: &str = "slug, title, content, author, date, tags, published";

#[derive(sqlx::FromRow)]
struct PostRow {
    slug: String,
    title: String,
    content: String,
    author: String,
    date: OffsetDateTime,
    tags: Vec<String>,
    published: bool,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            slug: row.slug,
            title: row.title,
            content: row.content,
            author: row.author,
            date: row.date,
            tags: row.tags,
            published: row.published,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn find_all(&self, filter: PostFilter) -> Vec<PostRecord> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts");
        if filter == PostFilter::Published {
            qb.push(" WHERE published = ");
            qb.push_bind(true);
        }
        qb.push(" ORDER BY date DESC, created_at ASC");

        match qb.build_query_as::<PostRow>().fetch_all(self.pool()).await {
            Ok(rows) => rows.into_iter().map(PostRecord::from).collect(),
            Err(err) => {
                warn!(
                    target = "infra::db::posts::find_all",
                    error = %err,
                    "post listing unavailable, serving empty list"
                );
                Vec::new()
            }
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(|err| map_sqlx_error(err, slug))?;
        Ok(row.map(PostRecord::from))
    }

    async fn exists(&self, slug: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE slug = $1)")
            .bind(slug)
            .fetch_one(self.pool())
            .await
            .map_err(|err| map_sqlx_error(err, slug))
    }

    async fn create(&self, post: &PostRecord) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, slug, title, content, author, date, tags, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.date)
        .bind(&post.tags)
        .bind(post.published)
        .execute(self.pool())
        .await
        .map(|_| ())
        .map_err(|err| map_sqlx_error(err, &post.slug))
    }

    async fn update(&self, existing_slug: &str, post: &PostRecord) -> Result<(), RepoError> {
        let map_err = |err: sqlx::Error| map_sqlx_error(err, &post.slug);
        let mut tx = self.begin().await.map_err(map_err)?;

        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET slug = $1, title = $2, content = $3, author = $4, date = $5,
                tags = $6, published = $7, updated_at = now()
            WHERE slug = $8
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.date)
        .bind(&post.tags)
        .bind(post.published)
        .bind(existing_slug)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO posts (id, slug, title, content, author, date, tags, published)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&post.slug)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.author)
            .bind(post.date)
            .bind(&post.tags)
            .bind(post.published)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;
        }

        tx.commit().await.map_err(map_err)
    }

    async fn delete(&self, slug: &str) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = $1")
            .bind(slug)
            .execute(self.pool())
            .await
            .map_err(|err| map_sqlx_error(err, slug))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await.map_err(RepoError::from_persistence)
    }
}
