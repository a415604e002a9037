use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        like::Like,
        post::{AuthorStats, FeedSort, Post, PostWithAuthor},
    },
};

const POST_COLUMNS: &str = r#"
    p.id, p.title, p.content, p.excerpt, p.thumbnail, p.tags, p.author_id,
    p.published_at, p.read_time, p.likes, p.comments, p.is_published, p.audience,
    p.created_at, p.updated_at
"#;

const AUTHOR_COLUMNS: &str = r#"
    u.name AS author_name, u.avatar AS author_avatar, u.bio AS author_bio,
    u.linkedin_url AS author_linkedin_url, u.github_url AS author_github_url
"#;

/// Filters for the public feed.
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    pub search: Option<String>,
    pub sort: FeedSort,
    /// Include `subscribers` posts (caller is signed in).
    pub include_subscribers: bool,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), AppError>;

    /// Writes the client-editable and derived columns. Counters, author and
    /// creation time are never touched.
    async fn update(&self, post: &Post) -> Result<(), AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError>;

    async fn find_with_author(&self, id: &str) -> Result<Option<PostWithAuthor>, AppError>;

    /// Published posts visible in the feed.
    async fn list_published(&self, query: &FeedQuery) -> Result<Vec<PostWithAuthor>, AppError>;

    /// Every post of one author, drafts included, newest created first.
    async fn list_by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Records a like and bumps the counter atomically. Returns the new count.
    /// A duplicate (user, post) or (ip, post) pair fails with `Conflict`.
    async fn record_like(&self, like: &Like) -> Result<i64, AppError>;

    async fn author_stats(&self, author_id: &str) -> Result<AuthorStats, AppError>;
}

#[derive(Debug, Clone)]
pub struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn insert(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, title, content, excerpt, thumbnail, tags, author_id,
                published_at, read_time, likes, comments, is_published, audience,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.thumbnail)
        .bind(&post.tags)
        .bind(&post.author_id)
        .bind(post.published_at)
        .bind(post.read_time)
        .bind(post.likes)
        .bind(post.comments)
        .bind(post.is_published)
        .bind(post.audience)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, excerpt = ?, thumbnail = ?, tags = ?, audience = ?,
                is_published = ?, published_at = ?, read_time = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.thumbnail)
        .bind(&post.tags)
        .bind(post.audience)
        .bind(post.is_published)
        .bind(post.published_at)
        .bind(post.read_time)
        .bind(post.updated_at)
        .bind(&post.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn find_with_author(&self, id: &str) -> Result<Option<PostWithAuthor>, AppError> {
        let sql = format!(
            "SELECT {POST_COLUMNS}, {AUTHOR_COLUMNS}
             FROM posts p JOIN users u ON p.author_id = u.id
             WHERE p.id = ?"
        );
        let post = sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn list_published(&self, query: &FeedQuery) -> Result<Vec<PostWithAuthor>, AppError> {
        let order = match query.sort {
            FeedSort::Newest => "p.published_at DESC",
            FeedSort::Popular => "p.likes DESC, p.published_at DESC",
        };
        let sql = format!(
            "SELECT {POST_COLUMNS}, {AUTHOR_COLUMNS}
             FROM posts p JOIN users u ON p.author_id = u.id
             WHERE p.is_published = 1
               AND (p.audience = 'everyone' OR (p.audience = 'subscribers' AND ?))
             ORDER BY {order}"
        );

        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        // SQLite's lower() and LIKE only fold ASCII, so the text match runs here.
        let mut posts = sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(query.include_subscribers)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list posts: {:?}", e);
                AppError::from(e)
            })?;

        if let Some(needle) = needle {
            posts.retain(|p| p.post.matches_search(&needle));
        }

        Ok(posts)
    }

    async fn list_by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.author_id = ? ORDER BY p.created_at DESC"
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete post: {:?}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn record_like(&self, like: &Like) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO likes (id, user_id, post_id, ip_address, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&like.id)
        .bind(&like.user_id)
        .bind(&like.post_id)
        .bind(&like.ip_address)
        .bind(like.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict("Already liked".to_string());
            }
            AppError::from(e)
        })?;

        let likes: i64 =
            sqlx::query_scalar("UPDATE posts SET likes = likes + 1 WHERE id = ? RETURNING likes")
                .bind(&like.post_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        tx.commit().await?;

        Ok(likes)
    }

    async fn author_stats(&self, author_id: &str) -> Result<AuthorStats, AppError> {
        let stats = sqlx::query_as::<_, AuthorStats>(
            r#"
            SELECT
                COUNT(*) AS total_posts,
                COALESCE(SUM(CASE WHEN is_published = 1 THEN 1 ELSE 0 END), 0) AS published,
                COALESCE(SUM(CASE WHEN is_published = 1 THEN 0 ELSE 1 END), 0) AS drafts,
                COALESCE(SUM(likes), 0) AS total_likes
            FROM posts
            WHERE author_id = ?
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
