//! Post publishing and authorship rules.
//!
//! Every transition here is a pure function over a `Post` value; persisting the
//! result is the caller's job. Invariants kept by this module:
//!
//! * `published_at.is_some() == is_published`
//! * a post that stays published keeps its first `published_at`
//! * `read_time >= 1` is always derived from the current content
//! * a generated excerpt follows the content; a hand-written one is kept until
//!   the author replaces it (an empty excerpt switches back to generated)

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        like::{Like, LikeIdentity},
        post::{Audience, Post, PostFields},
    },
    utils::markdown::{generate_excerpt, read_time},
};

/// Upper bound for an author-supplied excerpt, in characters.
pub const MAX_EXCERPT_CHARS: usize = 300;

/// Creates a new draft owned by `author_id`.
pub fn create_draft(author_id: &str, fields: PostFields, now: DateTime<Utc>) -> Result<Post, AppError> {
    let title = fields.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let mut post = Post {
        id: Uuid::new_v4().to_string(),
        title: String::new(),
        content: String::new(),
        excerpt: String::new(),
        thumbnail: None,
        tags: Json(Vec::new()),
        author_id: author_id.to_string(),
        published_at: None,
        read_time: 1,
        likes: 0,
        comments: 0,
        is_published: false,
        audience: Audience::default(),
        created_at: now,
        updated_at: now,
    };
    apply_fields(&mut post, fields)?;
    Ok(post)
}

/// Publishes `post`, applying `fields` first. The first publish time is kept
/// if the post is already published.
pub fn publish(mut post: Post, fields: PostFields, now: DateTime<Utc>) -> Result<Post, AppError> {
    apply_fields(&mut post, fields)?;
    post.is_published = true;
    post.published_at = Some(post.published_at.unwrap_or(now));
    post.updated_at = now;
    Ok(post)
}

/// Saves `post` as a draft, applying `fields`. Clears the publish timestamp.
pub fn update_draft(mut post: Post, fields: PostFields, now: DateTime<Utc>) -> Result<Post, AppError> {
    apply_fields(&mut post, fields)?;
    post.is_published = false;
    post.published_at = None;
    post.updated_at = now;
    Ok(post)
}

/// Takes a post back to draft without touching its content.
pub fn unpublish(post: Post, now: DateTime<Utc>) -> Post {
    let mut post = post;
    post.is_published = false;
    post.published_at = None;
    post.updated_at = now;
    post
}

/// Applies an edit. `is_published: None` keeps the current publish state.
pub fn edit(
    post: Post,
    fields: PostFields,
    is_published: Option<bool>,
    now: DateTime<Utc>,
) -> Result<Post, AppError> {
    if is_published.unwrap_or(post.is_published) {
        publish(post, fields, now)
    } else {
        update_draft(post, fields, now)
    }
}

/// Fails with `Forbidden` unless `requester_id` owns the post.
pub fn ensure_owner(post: &Post, requester_id: &str) -> Result<(), AppError> {
    if post.author_id != requester_id {
        return Err(AppError::Forbidden(
            "You are not the author of this post".to_string(),
        ));
    }
    Ok(())
}

/// Whether `viewer` (None for anonymous) may read `post`.
///
/// Authors always see their own posts. Everyone else sees published posts
/// whose audience admits them: `everyone` for all, `subscribers` for any
/// signed-in user, `private` for nobody.
pub fn can_view(post: &Post, viewer: Option<&str>) -> bool {
    if viewer == Some(post.author_id.as_str()) {
        return true;
    }
    if !post.is_published {
        return false;
    }
    match post.audience {
        Audience::Everyone => true,
        Audience::Subscribers => viewer.is_some(),
        Audience::Private => false,
    }
}

/// Builds the like record for `identity` on `post`.
///
/// Duplicate detection is left to the store's uniqueness constraints; this
/// only refuses a request that carries neither a user id nor an address.
/// Likes are never removed, so the counter only grows.
pub fn new_like(post: &Post, identity: LikeIdentity, now: DateTime<Utc>) -> Result<Like, AppError> {
    if identity.is_unidentified() {
        return Err(AppError::BadRequest(
            "Unable to identify the requester".to_string(),
        ));
    }
    Ok(Like {
        id: Uuid::new_v4().to_string(),
        user_id: identity.user_id,
        post_id: post.id.clone(),
        ip_address: identity.ip,
        created_at: now,
    })
}

/// Copies whitelisted fields onto `post` and recomputes the derived ones.
fn apply_fields(post: &mut Post, fields: PostFields) -> Result<(), AppError> {
    let generated = post.excerpt == generate_excerpt(&post.content);

    if let Some(title) = fields.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        post.title = title.to_string();
    }
    if let Some(content) = fields.content {
        post.content = content;
    }
    if let Some(thumbnail) = fields.thumbnail {
        let thumbnail = thumbnail.trim();
        post.thumbnail = (!thumbnail.is_empty()).then(|| thumbnail.to_string());
    }
    if let Some(tags) = fields.tags {
        post.tags = Json(normalize_tags(tags));
    }
    if let Some(audience) = fields.audience {
        post.audience = audience;
    }

    match fields.excerpt.as_deref().map(str::trim) {
        Some(excerpt) if excerpt.chars().count() > MAX_EXCERPT_CHARS => {
            return Err(AppError::BadRequest(format!(
                "Excerpt must be at most {} chars",
                MAX_EXCERPT_CHARS
            )));
        }
        Some(excerpt) if !excerpt.is_empty() => post.excerpt = excerpt.to_string(),
        Some(_) => post.excerpt = generate_excerpt(&post.content),
        None if generated => post.excerpt = generate_excerpt(&post.content),
        None => {}
    }
    post.read_time = read_time(&post.content);
    Ok(())
}

/// Trims tags, drops empties and duplicates, keeps first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
