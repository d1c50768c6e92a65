//! Blog repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::models::{Blog, BlogLikeResult, BlogPatch, NewBlog};
use orchard_core::{BlogId, BlogStatus};

use super::RepositoryError;

const BLOG_COLUMNS: &str = "id, title, subtitle, content, excerpt, image, category, tags, \
     status, author, read_time, featured, likes, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BlogRow {
    id: BlogId,
    title: String,
    subtitle: Option<String>,
    content: String,
    excerpt: String,
    image: Option<String>,
    category: String,
    tags: Vec<String>,
    status: BlogStatus,
    author: String,
    read_time: i32,
    featured: bool,
    likes: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            content: row.content,
            excerpt: row.excerpt,
            image: row.image,
            category: row.category,
            tags: row.tags,
            status: row.status,
            author: row.author,
            read_time: row.read_time,
            featured: row.featured,
            likes: row.likes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for blog database operations.
pub struct BlogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogRepository<'a> {
    /// Create a new blog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Blog>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blog ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BlogId) -> Result<Option<Blog>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blog WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a post. The excerpt is derived from the content when absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewBlog) -> Result<Blog, RepositoryError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            r"
            INSERT INTO blog (title, subtitle, content, excerpt, image, category, tags,
                              status, author, read_time, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {BLOG_COLUMNS}
            "
        ))
        .bind(new.title.trim())
        .bind(new.subtitle.as_deref().map(str::trim))
        .bind(&new.content)
        .bind(new.resolved_excerpt())
        .bind(new.image.as_deref())
        .bind(new.category.trim())
        .bind(&new.tags)
        .bind(new.status)
        .bind(new.author.trim())
        .bind(new.read_time)
        .bind(new.featured)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(&self, id: BlogId, patch: &BlogPatch) -> Result<Blog, RepositoryError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            r"
            UPDATE blog
            SET title = COALESCE($2, title),
                subtitle = COALESCE($3, subtitle),
                content = COALESCE($4, content),
                excerpt = COALESCE($5, excerpt),
                image = COALESCE($6, image),
                category = COALESCE($7, category),
                tags = COALESCE($8, tags),
                status = COALESCE($9, status),
                author = COALESCE($10, author),
                read_time = COALESCE($11, read_time),
                featured = COALESCE($12, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.subtitle.as_deref().map(str::trim))
        .bind(patch.content.as_deref())
        .bind(patch.resolved_excerpt())
        .bind(patch.image.as_deref())
        .bind(patch.category.as_deref().map(str::trim))
        .bind(patch.tags.as_deref())
        .bind(patch.status)
        .bind(patch.author.as_deref().map(str::trim))
        .bind(patch.read_time)
        .bind(patch.featured)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a post and its likes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BlogId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM blog WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Toggle `client_ip`'s like on a post, keeping the counter equal to the
    /// size of the like set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn toggle_like(
        &self,
        id: BlogId,
        client_ip: &str,
    ) -> Result<BlogLikeResult, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM blog WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let removed = sqlx::query("DELETE FROM blog_like WHERE blog_id = $1 AND client_ip = $2")
            .bind(id)
            .bind(client_ip)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query("INSERT INTO blog_like (blog_id, client_ip) VALUES ($1, $2)")
                .bind(id)
                .bind(client_ip)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, BlogRow>(&format!(
            r"
            UPDATE blog
            SET likes = (SELECT COUNT(*)::INTEGER FROM blog_like WHERE blog_id = $1)
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BlogLikeResult {
            blog: row.into(),
            has_liked: removed == 0,
        })
    }

    /// Total posts and posts created since `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self, since: DateTime<Utc>) -> Result<(i64, i64), RepositoryError> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE created_at >= $1) FROM blog",
        )
        .bind(since)
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }
}
