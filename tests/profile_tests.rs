// tests/profile_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn test_profile_and_dashboard_flow() {
    // Arrange
    let app = spawn_app().await;
    let (token_a, user_a) = app.login("ada").await;
    let (token_b, _) = app.login("bob").await;

    // 1. User A writes one published post and one draft
    let published = app
        .create_post(
            &token_a,
            json!({ "title": "A Post 1", "content": "Content", "isPublished": true }),
        )
        .await;
    app.create_post(&token_a, json!({ "title": "A Post 2", "content": "Content" }))
        .await;

    // User B writes one post of their own
    app.create_post(&token_b, json!({ "title": "B Post", "content": "Content" }))
        .await;

    // 2. User B likes A's published post
    let like = app
        .client
        .post(app.url(&format!(
            "/api/posts/{}/like",
            published["id"].as_str().unwrap()
        )))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(like.status().as_u16(), 200);

    // 3. Dashboard lists all of A's posts, newest first, and nothing else
    let my_posts: Vec<Value> = app
        .client
        .get(app.url("/api/author/posts"))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = my_posts.iter().map(|p| p["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["A Post 2", "A Post 1"]);
    assert!(my_posts.iter().all(|p| p["authorId"] == user_a["id"]));

    // 4. Stats
    let stats: Value = app
        .client
        .get(app.url("/api/author/stats"))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalPosts"], 2);
    assert_eq!(stats["published"], 1);
    assert_eq!(stats["drafts"], 1);
    assert_eq!(stats["totalLikes"], 1);
}

#[tokio::test]
async fn profile_update_touches_only_whitelisted_fields() {
    let app = spawn_app().await;
    let (token, user) = app.login("ada").await;

    let response = app
        .client
        .put(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "  Ada L.  ",
            "bio": "<b>Engineer</b><script>alert(1)</script>",
            "linkedinUrl": "https://linkedin.com/in/ada",
            "email": "hijack@example.com",
            "id": "other-id",
            "provider": "local"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let profile: Value = app
        .client
        .get(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(profile["id"], user["id"]);
    assert_eq!(profile["email"], "ada@example.com");
    assert_eq!(profile["provider"], "google");
    assert_eq!(profile["name"], "Ada L.");
    assert_eq!(profile["bio"], "<b>Engineer</b>");
    assert_eq!(profile["linkedinUrl"], "https://linkedin.com/in/ada");
    // Untouched fields keep their value.
    assert_eq!(profile["avatar"], "https://pics.example/ada");
}

#[tokio::test]
async fn profile_update_validates_urls() {
    let app = spawn_app().await;
    let (token, _) = app.login("ada").await;

    let response = app
        .client
        .put(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .json(&json!({ "githubUrl": "not a url" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn blank_profile_name_is_rejected() {
    let app = spawn_app().await;
    let (token, _) = app.login("ada").await;

    let response = app
        .client
        .put(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let profile: Value = app
        .client
        .get(app.url("/api/user/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["name"], "ada");
}
