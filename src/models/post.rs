use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// Visibility tier of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Everyone,
    Subscribers,
    Private,
}

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Markdown source.
    pub content: String,
    pub excerpt: String,
    pub thumbnail: Option<String>,

    /// Ordered tag list, stored as a JSON array in a TEXT column.
    pub tags: Json<Vec<String>>,

    pub author_id: String,

    /// Set exactly when `is_published` is true. Sticky across edits that keep the post published.
    pub published_at: Option<DateTime<Utc>>,
    /// Minutes, always >= 1.
    pub read_time: i64,
    pub likes: i64,
    pub comments: i64,
    pub is_published: bool,
    pub audience: Audience,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Case-insensitive literal substring match on title, excerpt or any one tag.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.excerpt.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Public author card embedded in post responses.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    #[sqlx(rename = "author_id")]
    pub id: String,
    #[sqlx(rename = "author_name")]
    pub name: String,
    #[sqlx(rename = "author_avatar")]
    pub avatar: Option<String>,
    #[sqlx(rename = "author_bio")]
    pub bio: Option<String>,
    #[sqlx(rename = "author_linkedin_url")]
    pub linkedin_url: Option<String>,
    #[sqlx(rename = "author_github_url")]
    pub github_url: Option<String>,
}

/// A post joined with its author's public profile.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    #[sqlx(flatten)]
    pub author: AuthorSummary,
}

/// Client-writable post fields. Anything not listed here (id, author, counters,
/// timestamps) can never be changed through a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub thumbnail: Option<String>,
    pub tags: Option<Vec<String>>,
    pub audience: Option<Audience>,
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 100000, message = "Content must be at most 100000 chars"))]
    pub content: String,

    #[validate(length(max = 300, message = "Excerpt must be at most 300 chars"))]
    pub excerpt: Option<String>,

    pub thumbnail: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub audience: Audience,

    #[serde(default)]
    pub is_published: bool,
}

impl CreatePostRequest {
    pub fn into_fields(self) -> (PostFields, bool) {
        let fields = PostFields {
            title: Some(self.title),
            content: Some(self.content),
            excerpt: self.excerpt,
            thumbnail: self.thumbnail,
            tags: Some(self.tags),
            audience: Some(self.audience),
        };
        (fields, self.is_published)
    }
}

/// DTO for editing a post. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: Option<String>,

    #[validate(length(max = 100000, message = "Content must be at most 100000 chars"))]
    pub content: Option<String>,

    #[validate(length(max = 300, message = "Excerpt must be at most 300 chars"))]
    pub excerpt: Option<String>,

    pub thumbnail: Option<String>,
    pub tags: Option<Vec<String>>,
    pub audience: Option<Audience>,

    /// `None` keeps the current publish state.
    pub is_published: Option<bool>,
}

impl UpdatePostRequest {
    pub fn into_fields(self) -> (PostFields, Option<bool>) {
        let fields = PostFields {
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            thumbnail: self.thumbnail,
            tags: self.tags,
            audience: self.audience,
        };
        (fields, self.is_published)
    }
}

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    #[default]
    Newest,
    Popular,
}

/// Query parameters for the public feed.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    /// Case-insensitive match against title, excerpt and tags.
    pub q: Option<String>,

    #[serde(default)]
    pub sort: FeedSort,
}

/// Aggregated dashboard numbers for one author.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStats {
    pub total_posts: i64,
    pub published: i64,
    pub drafts: i64,
    pub total_likes: i64,
}
